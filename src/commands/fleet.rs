use super::{Command, CommandRegistry};
use crate::agent::AgentStatus;
use crate::logbook::{SYSTEM_SOURCE, Severity};
use crate::simulation::{Simulation, Timers};
use std::time::Duration;

const STATUS_STAGGER: Duration = Duration::from_millis(100);
const RESTART_DELAY: Duration = Duration::from_millis(3000);

/// One line per agent, staggered so the roster scrolls in.
#[derive(Debug, Clone, Copy)]
pub struct Status;

impl Command for Status {
    fn name(&self) -> &str {"status"}

    fn aliases(&self) -> &[&'static str] {
        &["ls"]
    }

    fn summary(&self) -> &str {"Show status of all agents"}

    fn execute(&self, sim: &mut Simulation, timers: &mut Timers, _registry: &CommandRegistry) {
        for index in 0..sim.agents().len() {
            timers.schedule_after(STATUS_STAGGER * index as u32, move |sim, timers| {
                // read at fire time so the line reflects the current metrics
                let Some(agent) = sim.agents().get(index) else {
                    return;
                };
                let severity = if agent.status == AgentStatus::Error {
                    Severity::Error
                } else {
                    Severity::Info
                };
                let line = format!(
                    "{}: {} | CPU: {}% | MEM: {}%",
                    agent.name,
                    agent.status.label().to_uppercase(),
                    agent.cpu.round(),
                    agent.memory.round()
                );
                sim.emit(timers.now(), SYSTEM_SOURCE, severity, line);
            });
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Restart;

impl Command for Restart {
    fn name(&self) -> &str {"restart"}

    fn summary(&self) -> &str {"Restart all agents"}

    fn execute(&self, sim: &mut Simulation, timers: &mut Timers, _registry: &CommandRegistry) {
        sim.emit(timers.now(), SYSTEM_SOURCE, Severity::Warning, "Restarting all agents...");
        sim.set_all_status(AgentStatus::Idle);

        timers.schedule_after(RESTART_DELAY, |sim, timers| {
            sim.set_all_status(AgentStatus::Active);
            sim.emit(
                timers.now(),
                SYSTEM_SOURCE,
                Severity::Success,
                "All agents restarted successfully.",
            );
        });
    }
}
