pub mod config;
pub mod chatter;
pub mod weights;

pub use config::SimConfig;
pub use weights::WeightedTable;

use crate::agent::{Agent, AgentStatus};
use crate::logbook::{LogBook, LogId, SYSTEM_SOURCE, Severity};
use crate::metrics::FleetMetrics;
use crate::scheduler::Scheduler;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub type Timers = Scheduler<Simulation>;

/// Startup messages with their offset from boot, in milliseconds.
pub const BOOT_MESSAGES: [(u64, &str); 5] = [
    (300, "Initializing agent command center..."),
    (800, "Loading agent registry..."),
    (1200, "Establishing secure channels..."),
    (1600, "Synchronizing agent states..."),
    (2000, "All systems operational. Monitoring active."),
];

pub const BOOT_COMPLETE_MS: u64 = 2500;

/// The shared state every timer callback and command works on.
pub struct Simulation {
    config: SimConfig,
    agents: Vec<Agent>,
    log: LogBook,
    rng: StdRng,
    status_table: WeightedTable<AgentStatus>,
    severity_table: WeightedTable<Severity>,
    started_at: DateTime<Local>,
    boot_scheduled: bool,
    booted: bool,
    ticks: u64,
    shutdown: CancellationToken,
    ticker: Option<CancellationToken>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;

        let status_table = WeightedTable::new(&config.status_weights)
            .context("Bad agent status weights")?;
        let severity_table = WeightedTable::new(&config.severity_weights)
            .context("Bad chatter severity weights")?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let started_at = Local::now();
        let agents: Vec<Agent> = (0..config.num_agents)
            .map(|i| {
                let status = status_table.sample(&mut rng);
                Agent::generate(i, status, started_at, &mut rng)
            })
            .collect();

        info!("Created roster of {} agents for {}", agents.len(), config.name);

        Ok(Self {
            log: LogBook::new(config.log_capacity),
            config,
            agents,
            rng,
            status_table,
            severity_table,
            started_at,
            boot_scheduled: false,
            booted: false,
            ticks: 0,
            shutdown: CancellationToken::new(),
            ticker: None,
        })
    }

    /// Queues the boot messages and the boot-complete step that arms the tick.
    /// Boot happens once; later calls return `false` and queue nothing.
    pub fn schedule_boot(&mut self, timers: &mut Timers) -> bool {
        if self.boot_scheduled {
            warn!("Boot already scheduled, ignoring");
            return false;
        }
        self.boot_scheduled = true;

        for (delay_ms, message) in BOOT_MESSAGES {
            timers.schedule_after(Duration::from_millis(delay_ms), move |sim, timers| {
                sim.emit(timers.now(), SYSTEM_SOURCE, Severity::System, message);
            });
        }

        timers.schedule_after(Duration::from_millis(BOOT_COMPLETE_MS), |sim, timers| {
            sim.complete_boot(timers);
        });
        true
    }

    fn complete_boot(&mut self, timers: &mut Timers) {
        if self.shutdown.is_cancelled() {
            debug!("Boot finished after shutdown, not arming tick");
            return;
        }
        if self.booted || self.ticker.is_some() {
            return;
        }

        self.booted = true;
        let token = timers.schedule_repeating_with(
            self.config.tick_interval,
            self.shutdown.child_token(),
            |sim, timers| sim.tick(timers.now()),
        );
        self.ticker = Some(token);
        info!("Boot complete, ticking every {:?}", self.config.tick_interval);
    }

    /// One simulation step at virtual time `elapsed`. Does nothing before boot.
    pub fn tick(&mut self, elapsed: Duration) {
        if !self.booted {
            return;
        }

        self.ticks += 1;
        let now = self.wall_clock(elapsed);

        if !self.agents.is_empty() && self.rng.gen_bool(self.config.chatter_probability) {
            let idx = self.rng.gen_range(0..self.agents.len());
            let severity = self.severity_table.sample(&mut self.rng);
            let message = chatter::random_line(&mut self.rng);
            let source = self.agents[idx].name.clone();
            self.log.push(now, source, severity, message);
        }

        let (cpu_jitter, memory_jitter) = (self.config.cpu_jitter, self.config.memory_jitter);
        for agent in &mut self.agents {
            agent.perturb(cpu_jitter, memory_jitter, now, &mut self.rng);
        }

        debug!("Tick {} done, log holds {} entries", self.ticks, self.log.len());
    }

    /// Stops the periodic tick. Already queued one-shot effects still run.
    pub fn halt(&mut self) {
        self.shutdown.cancel();
        self.ticker = None;
    }

    pub fn emit(
        &mut self,
        elapsed: Duration,
        source: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> LogId {
        let now = self.wall_clock(elapsed);
        self.log.push(now, source, severity, message)
    }

    pub fn set_all_status(&mut self, status: AgentStatus) {
        for agent in &mut self.agents {
            agent.status = status;
        }
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Wall-clock time corresponding to a point on the virtual clock.
    pub fn wall_clock(&self, elapsed: Duration) -> DateTime<Local> {
        let offset = TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::zero());
        self.started_at + offset
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn log(&self) -> &LogBook {
        &self.log
    }

    pub fn metrics(&self) -> FleetMetrics {
        FleetMetrics::from_agents(&self.agents)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn status_table(&self) -> &WeightedTable<AgentStatus> {
        &self.status_table
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
