use crate::agent::AgentStatus;
use crate::logbook::{DEFAULT_CAPACITY, Severity};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub name: String,
    pub num_agents: usize,
    pub tick_interval: Duration,
    /// Chance that a tick emits one agent log line.
    pub chatter_probability: f64,
    pub cpu_jitter: f64,
    pub memory_jitter: f64,
    pub log_capacity: usize,
    /// Fixed seed for reproducible runs, entropy when `None`.
    pub seed: Option<u64>,
    pub status_weights: Vec<(AgentStatus, u32)>,
    pub severity_weights: Vec<(Severity, u32)>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: "command_center".to_string(),
            num_agents: 6,
            tick_interval: Duration::from_millis(1500),
            chatter_probability: 0.7,
            cpu_jitter: 10.0,
            memory_jitter: 5.0,
            log_capacity: DEFAULT_CAPACITY,
            seed: None,
            status_weights: vec![
                (AgentStatus::Active, 3),
                (AgentStatus::Idle, 1),
                (AgentStatus::Error, 1),
                (AgentStatus::Offline, 1),
            ],
            severity_weights: vec![
                (Severity::Info, 3),
                (Severity::Success, 1),
                (Severity::Warning, 1),
            ],
        }
    }
}

impl SimConfig {
    pub fn with_agents(mut self, agents: usize) -> Self {
        self.num_agents = agents;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    pub fn with_chatter_probability(mut self, probability: f64) -> Self {
        self.chatter_probability = probability;
        self
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.num_agents > 0, "Roster needs at least one agent");
        anyhow::ensure!(!self.tick_interval.is_zero(), "Tick interval must be positive");
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.chatter_probability),
            "Chatter probability {} is outside [0, 1]",
            self.chatter_probability
        );
        anyhow::ensure!(
            self.cpu_jitter >= 0.0 && self.memory_jitter >= 0.0,
            "Jitter amplitudes must not be negative"
        );
        anyhow::ensure!(self.log_capacity > 0, "Log capacity must be positive");
        Ok(())
    }
}
