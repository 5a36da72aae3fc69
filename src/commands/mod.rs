pub mod fleet;
pub mod ops;
pub mod console;

use crate::logbook::{SYSTEM_SOURCE, Severity, USER_SOURCE};
use crate::simulation::{Simulation, Timers};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A console command. Implementations mutate the simulation right away and queue
/// anything delayed on the timers.
pub trait Command: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
    fn aliases(&self) -> &[&'static str] {
        &[]
    }
    fn summary(&self) -> &str;
    fn execute(&self, sim: &mut Simulation, timers: &mut Timers, registry: &CommandRegistry);
}

pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
    order: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtin();
        registry
    }

    pub fn empty() -> Self {
        Self {
            commands: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn register_builtin(&mut self) {
        self.register(fleet::Status);
        self.register(ops::Deploy);
        self.register(fleet::Restart);
        self.register(ops::Scan);
        self.register(console::Clear);
        self.register(console::Help);
    }

    pub fn register<C: Command + 'static>(&mut self, command: C) {
        let command: Arc<dyn Command> = Arc::new(command);
        self.commands.insert(command.name().to_lowercase(), command.clone());
        for alias in command.aliases() {
            self.commands.insert(alias.to_lowercase(), command.clone());
        }
        self.order.push(command);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(&name.trim().to_lowercase())
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn help_lines(&self) -> Vec<String> {
        let mut lines = vec!["Available commands:".to_string()];
        for command in &self.order {
            let mut names = vec![command.name()];
            names.extend(command.aliases().iter().copied());
            lines.push(format!("  {:<12} {}", names.join(", "), command.summary()));
        }
        lines
    }

    /// Echoes the line as a USER entry, then runs the matching command or logs an error.
    /// Empty lines are filtered by the caller, here they count as unknown.
    pub fn interpret(&self, sim: &mut Simulation, timers: &mut Timers, input: &str) {
        let line = input.trim();
        sim.emit(timers.now(), USER_SOURCE, Severity::Info, format!("$ {}", line));

        match self.get(line) {
            Some(command) => {
                debug!("Running command {}", command.name());
                command.execute(sim, timers, self);
            }
            None => {
                debug!("Unknown command {:?}", line);
                sim.emit(
                    timers.now(),
                    SYSTEM_SOURCE,
                    Severity::Error,
                    format!("Unknown command: {}. Type 'help' for available commands.", line),
                );
            }
        }
    }

    pub fn global() -> &'static CommandRegistry {
        use std::sync::OnceLock;
        static REGISTRY: OnceLock<CommandRegistry> = OnceLock::new();
        REGISTRY.get_or_init(CommandRegistry::new)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.list())
            .finish()
    }
}
