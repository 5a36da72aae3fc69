use crate::agent::Agent;
use crate::commands::CommandRegistry;
use crate::logbook::{LogEntry, LogId};
use crate::metrics::FleetMetrics;
use crate::simulation::{SimConfig, Simulation, Timers};
use anyhow::Result;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info};

/// Owns the simulation state together with its timers. Everything that mutates the
/// fleet or the log goes through here.
pub struct CommandCenter {
    sim: Simulation,
    timers: Timers,
    registry: &'static CommandRegistry,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub booted: bool,
    pub elapsed_ms: u64,
    pub ticks: u64,
    pub fleet: FleetMetrics,
    pub agents: Vec<Agent>,
    pub log: Vec<LogEntry>,
}

impl CommandCenter {
    pub fn new(config: SimConfig) -> Result<Self> {
        Ok(Self {
            sim: Simulation::new(config)?,
            timers: Timers::new(),
            registry: CommandRegistry::global(),
        })
    }

    /// Starts the boot sequence. Returns `false` if it was already started.
    pub fn boot(&mut self) -> bool {
        let queued = self.sim.schedule_boot(&mut self.timers);
        if queued {
            info!("Booting {}", self.sim.config().name);
        }
        queued
    }

    /// Submits one console line. Blank input is dropped and returns `false`.
    pub fn submit(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }

        debug!("Submitting {:?} at {:?}", line, self.timers.now());
        self.registry.interpret(&mut self.sim, &mut self.timers, line);
        true
    }

    pub fn advance(&mut self, by: Duration) -> usize {
        self.timers.advance(&mut self.sim, by)
    }

    pub fn advance_to(&mut self, elapsed: Duration) -> usize {
        self.timers.advance_to(&mut self.sim, elapsed)
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    pub fn elapsed(&self) -> Duration {
        self.timers.now()
    }

    pub fn shutdown(&mut self) {
        info!("Shutting down after {} ticks", self.sim.ticks());
        self.sim.halt();
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn last_log_id(&self) -> Option<LogId> {
        self.sim.log().last().map(|e| e.id)
    }

    /// Shuts down, then runs queued one-shot effects to completion.
    pub fn drain(&mut self) -> usize {
        self.shutdown();
        let mut fired = 0;
        while let Some(due) = self.next_due() {
            fired += self.advance_to(due);
        }
        fired
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            booted: self.sim.is_booted(),
            elapsed_ms: self.timers.now().as_millis() as u64,
            ticks: self.sim.ticks(),
            fleet: self.sim.metrics(),
            agents: self.sim.agents().to_vec(),
            log: self.sim.log().to_vec(),
        }
    }
}

/// Clonable handle for driving one command center from several tasks.
/// The mutex is the only critical section; `changed` wakes the clock task when
/// a submission may have queued an earlier timer.
#[derive(Clone)]
pub struct SharedCenter {
    inner: Arc<Mutex<CommandCenter>>,
    changed: Arc<Notify>,
}

impl SharedCenter {
    pub fn new(center: CommandCenter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(center)),
            changed: Arc::new(Notify::new()),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, CommandCenter> {
        self.inner.lock()
    }

    pub fn submit(&self, line: &str) -> bool {
        let accepted = self.inner.lock().submit(line);
        if accepted {
            self.changed.notify_one();
        }
        accepted
    }

    /// Catches the clock up to `elapsed` first so the echo carries the right time.
    pub fn submit_at(&self, elapsed: Duration, line: &str) -> bool {
        let accepted = {
            let mut center = self.inner.lock();
            center.advance_to(elapsed);
            center.submit(line)
        };
        if accepted {
            self.changed.notify_one();
        }
        accepted
    }

    pub fn notifier(&self) -> Arc<Notify> {
        self.changed.clone()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.inner.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> CommandCenter {
        CommandCenter::new(SimConfig::default().with_seed(5)).unwrap()
    }

    #[test]
    fn blank_input_is_not_submitted() {
        let mut center = center();
        assert!(!center.submit(""));
        assert!(!center.submit("   \t"));
        assert!(center.simulation().log().is_empty());
        assert!(center.submit(" help "));
    }

    #[test]
    fn snapshot_reflects_boot_progress() {
        let mut center = center();
        center.boot();

        center.advance(Duration::from_millis(1000));
        let early = center.snapshot();
        assert!(!early.booted);
        assert_eq!(early.log.len(), 2);
        assert_eq!(early.elapsed_ms, 1000);

        center.advance(Duration::from_millis(1500));
        assert!(center.snapshot().booted);
        assert_eq!(center.next_due(), Some(Duration::from_millis(4000)));
    }

    #[test]
    fn second_boot_is_ignored() {
        let mut center = center();
        assert!(center.boot());
        assert!(!center.boot());

        center.advance(Duration::from_millis(2500));
        let uptimes: Vec<u64> = center.snapshot().agents.iter().map(|a| a.uptime_secs).collect();
        center.advance(Duration::from_millis(1500));

        let snapshot = center.snapshot();
        assert_eq!(snapshot.log.iter().filter(|e| e.source == "SYSTEM").count(), 5);
        assert_eq!(snapshot.ticks, 1);
        for (agent, before) in snapshot.agents.iter().zip(uptimes) {
            assert_eq!(agent.uptime_secs, before + 1);
        }
    }

    #[test]
    fn shutdown_leaves_nothing_pending() {
        let mut center = center();
        center.boot();
        center.advance(Duration::from_secs(5));
        center.shutdown();
        assert_eq!(center.next_due(), None);
    }

    #[test]
    fn drain_finishes_pending_commands() {
        let mut center = center();
        center.boot();
        center.advance(Duration::from_secs(3));
        center.submit("restart");
        center.drain();

        let snapshot = center.snapshot();
        assert!(snapshot.agents.iter().all(|a| a.is_active()));
        assert_eq!(center.next_due(), None);
    }

    #[test]
    fn shared_submit_wakes_listener() {
        let shared = SharedCenter::new(center());
        let notify = shared.notifier();
        assert!(shared.submit("scan"));
        // permit stored by notify_one
        let waiter = notify.notified();
        tokio::pin!(waiter);
        assert!(futures_ready(waiter.as_mut()));
        assert_eq!(shared.snapshot().log.len(), 2);
    }

    fn futures_ready<F: std::future::Future>(fut: std::pin::Pin<&mut F>) -> bool {
        let waker = std::task::Waker::noop();
        let mut cx = std::task::Context::from_waker(waker);
        fut.poll(&mut cx).is_ready()
    }
}
