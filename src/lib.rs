pub mod agent;
pub mod center;
pub mod commands;
pub mod logbook;
pub mod metrics;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod simulation;

pub use agent::Agent;
pub use center::{CommandCenter, SharedCenter};
pub use commands::{Command, CommandRegistry};
pub use simulation::{Simulation, SimConfig};
pub use metrics::FleetMetrics;

pub mod prelude {
    pub use crate::agent::{Agent, AgentId, AgentStatus};
    pub use crate::center::{CommandCenter, DashboardSnapshot, SharedCenter};
    pub use crate::commands::{Command, CommandRegistry};
    pub use crate::logbook::{LogEntry, LogId, Severity};
    pub use crate::metrics::FleetMetrics;
    pub use crate::scheduler::Scheduler;
    pub use crate::simulation::{Simulation, SimConfig};
}
