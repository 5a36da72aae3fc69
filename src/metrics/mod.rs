use crate::agent::{Agent, AgentStatus};
use serde::{Deserialize, Serialize};

/// Fleet-wide aggregates shown above the roster. Means are rounded to whole percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetMetrics {
    pub total: usize,
    pub active: usize,
    pub idle: usize,
    pub errors: usize,
    pub offline: usize,
    pub avg_cpu: u32,
    pub avg_memory: u32,
}

impl FleetMetrics {
    pub fn from_agents(agents: &[Agent]) -> Self {
        let count = |status: AgentStatus| agents.iter().filter(|a| a.status == status).count();

        let (avg_cpu, avg_memory) = if agents.is_empty() {
            (0, 0)
        } else {
            let n = agents.len() as f64;
            let cpu = agents.iter().map(|a| a.cpu).sum::<f64>() / n;
            let mem = agents.iter().map(|a| a.memory).sum::<f64>() / n;
            (cpu.round() as u32, mem.round() as u32)
        };

        Self {
            total: agents.len(),
            active: count(AgentStatus::Active),
            idle: count(AgentStatus::Idle),
            errors: count(AgentStatus::Error),
            offline: count(AgentStatus::Offline),
            avg_cpu,
            avg_memory,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Active: {}/{} | Errors: {} | CPU: {}% | MEM: {}%",
            self.active, self.total, self.errors, self.avg_cpu, self.avg_memory
        )
    }
}
