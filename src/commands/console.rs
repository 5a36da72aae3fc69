use super::{Command, CommandRegistry};
use crate::logbook::{SYSTEM_SOURCE, Severity};
use crate::simulation::{Simulation, Timers};
use std::time::Duration;

const HELP_STAGGER: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy)]
pub struct Help;

impl Command for Help {
    fn name(&self) -> &str {"help"}

    fn summary(&self) -> &str {"Show this help message"}

    fn execute(&self, _sim: &mut Simulation, timers: &mut Timers, registry: &CommandRegistry) {
        for (index, line) in registry.help_lines().into_iter().enumerate() {
            timers.schedule_after(HELP_STAGGER * index as u32, move |sim, timers| {
                sim.emit(timers.now(), SYSTEM_SOURCE, Severity::Info, line);
            });
        }
    }
}

/// Wipes the log, its own echo included.
#[derive(Debug, Clone, Copy)]
pub struct Clear;

impl Command for Clear {
    fn name(&self) -> &str {"clear"}

    fn summary(&self) -> &str {"Clear terminal output"}

    fn execute(&self, sim: &mut Simulation, _timers: &mut Timers, _registry: &CommandRegistry) {
        sim.clear_log();
    }
}
