use chrono::{DateTime, Local, TimeDelta};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NAME_POOL: [&str; 6] = ["ATLAS", "NOVA", "CIPHER", "ECHO", "VECTOR", "SENTINEL"];

pub const TASK_POOL: [&str; 8] = [
    "Processing data pipeline",
    "Monitoring network traffic",
    "Analyzing system logs",
    "Optimizing database queries",
    "Training neural model",
    "Indexing document store",
    "Running security audit",
    "Awaiting instructions",
];

pub const MAX_UPTIME_SECS: u64 = 86_400;
pub const MAX_HEARTBEAT_AGE_MS: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent-{:03}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Idle,
    Error,
    Offline,
}

impl AgentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Idle => "idle",
            AgentStatus::Error => "error",
            AgentStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub status: AgentStatus,
    pub task: String,
    pub cpu: f64,
    pub memory: f64,
    pub uptime_secs: u64,
    pub last_heartbeat: DateTime<Local>,
}

impl Agent {
    /// Builds the agent at roster position `index`. Name is taken cyclically from the pool,
    /// the rest is random. Status comes from the caller so the weighting stays in one place.
    pub fn generate<R: Rng + ?Sized>(
        index: usize,
        status: AgentStatus,
        now: DateTime<Local>,
        rng: &mut R,
    ) -> Self {
        let heartbeat_age = TimeDelta::milliseconds(rng.gen_range(0..=MAX_HEARTBEAT_AGE_MS));

        Self {
            id: AgentId::new(index as u32 + 1),
            name: NAME_POOL[index % NAME_POOL.len()].to_string(),
            status,
            task: TASK_POOL[rng.gen_range(0..TASK_POOL.len())].to_string(),
            cpu: rng.gen_range(0..=100) as f64,
            memory: rng.gen_range(0..=100) as f64,
            uptime_secs: rng.gen_range(0..MAX_UPTIME_SECS),
            last_heartbeat: now - heartbeat_age,
        }
    }

    /// One simulation step for this agent.
    pub fn perturb<R: Rng + ?Sized>(
        &mut self,
        cpu_jitter: f64,
        memory_jitter: f64,
        now: DateTime<Local>,
        rng: &mut R,
    ) {
        self.cpu = clamp_percent(self.cpu + jitter(rng, cpu_jitter));
        self.memory = clamp_percent(self.memory + jitter(rng, memory_jitter));
        self.uptime_secs = self.uptime_secs.saturating_add(1);

        if self.status != AgentStatus::Offline {
            self.last_heartbeat = now;
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f64) -> f64 {
    if amplitude <= 0.0 {
        return 0.0;
    }
    rng.gen_range(-amplitude..=amplitude)
}

/// Clamp to [0, 100]. NaN collapses to 0 so a bad value can never escape the range.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn names_cycle_through_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        let now = Local::now();

        let first = Agent::generate(0, AgentStatus::Idle, now, &mut rng);
        let wrapped = Agent::generate(NAME_POOL.len(), AgentStatus::Idle, now, &mut rng);

        assert_eq!(first.name, wrapped.name);
        assert_eq!(first.id, AgentId::new(1));
        assert_eq!(wrapped.id.to_string(), "agent-007");
    }

    #[test]
    fn generated_fields_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(9);
        let now = Local::now();

        for i in 0..200 {
            let agent = Agent::generate(i, AgentStatus::Active, now, &mut rng);
            assert!((0.0..=100.0).contains(&agent.cpu));
            assert!((0.0..=100.0).contains(&agent.memory));
            assert_eq!(agent.cpu.fract(), 0.0);
            assert!(agent.uptime_secs < MAX_UPTIME_SECS);
            assert!(agent.last_heartbeat <= now);
            assert!(now - agent.last_heartbeat <= TimeDelta::milliseconds(MAX_HEARTBEAT_AGE_MS));
        }
    }

    #[test]
    fn offline_agents_keep_stale_heartbeat() {
        let mut rng = StdRng::seed_from_u64(5);
        let then = Local::now();
        let later = then + TimeDelta::seconds(30);

        let mut offline = Agent::generate(0, AgentStatus::Offline, then, &mut rng);
        let mut online = Agent::generate(1, AgentStatus::Error, then, &mut rng);
        let stale = offline.last_heartbeat;

        offline.perturb(10.0, 5.0, later, &mut rng);
        online.perturb(10.0, 5.0, later, &mut rng);

        assert_eq!(offline.last_heartbeat, stale);
        assert_eq!(online.last_heartbeat, later);
    }

    #[test]
    fn clamp_handles_extremes() {
        assert_eq!(clamp_percent(-3.5), 0.0);
        assert_eq!(clamp_percent(140.0), 100.0);
        assert_eq!(clamp_percent(f64::NAN), 0.0);
        assert_eq!(clamp_percent(42.0), 42.0);
    }
}
