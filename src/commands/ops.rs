// Fake long-running operations: announce now, report success later.

use super::{Command, CommandRegistry};
use crate::logbook::{SYSTEM_SOURCE, Severity};
use crate::simulation::{Simulation, Timers};
use std::time::Duration;

const DEPLOY_DELAY: Duration = Duration::from_millis(2000);
const SCAN_DELAY: Duration = Duration::from_millis(2500);

fn announce_then_report(
    sim: &mut Simulation,
    timers: &mut Timers,
    start: &'static str,
    delay: Duration,
    done: &'static str,
) {
    sim.emit(timers.now(), SYSTEM_SOURCE, Severity::System, start);
    timers.schedule_after(delay, move |sim, timers| {
        sim.emit(timers.now(), SYSTEM_SOURCE, Severity::Success, done);
    });
}

#[derive(Debug, Clone, Copy)]
pub struct Deploy;

impl Command for Deploy {
    fn name(&self) -> &str {"deploy"}

    fn summary(&self) -> &str {"Deploy updates to all agents"}

    fn execute(&self, sim: &mut Simulation, timers: &mut Timers, _registry: &CommandRegistry) {
        announce_then_report(
            sim,
            timers,
            "Initiating deployment sequence...",
            DEPLOY_DELAY,
            "Deployment successful. All agents updated.",
        );
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Scan;

impl Command for Scan {
    fn name(&self) -> &str {"scan"}

    fn summary(&self) -> &str {"Run system diagnostics scan"}

    fn execute(&self, sim: &mut Simulation, timers: &mut Timers, _registry: &CommandRegistry) {
        announce_then_report(
            sim,
            timers,
            "Running system diagnostics scan...",
            SCAN_DELAY,
            "Scan complete. No anomalies detected.",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::logbook::USER_SOURCE;

    #[test]
    fn deploy_yields_echo_system_then_success() {
        let (mut sim, mut timers) = setup();
        run(&mut sim, &mut timers, "deploy");
        assert_eq!(sim.log().len(), 2);

        timers.advance(&mut sim, ms(1999));
        assert_eq!(sim.log().len(), 2);
        timers.advance(&mut sim, ms(1));

        let log = messages(&sim);
        assert_eq!(log.len(), 3);
        assert_eq!((log[0].0.as_str(), log[0].1), (USER_SOURCE, Severity::Info));
        assert_eq!((log[1].0.as_str(), log[1].1), (SYSTEM_SOURCE, Severity::System));
        assert_eq!(log[1].2, "Initiating deployment sequence...");
        assert_eq!(log[2].1, Severity::Success);
        assert_eq!(log[2].2, "Deployment successful. All agents updated.");
    }

    #[test]
    fn scan_reports_after_delay() {
        let (mut sim, mut timers) = setup();
        run(&mut sim, &mut timers, "Scan");

        timers.advance(&mut sim, ms(2499));
        assert_eq!(sim.log().last().map(|e| e.severity), Some(Severity::System));
        timers.advance(&mut sim, ms(1));
        assert_eq!(sim.log().last().map(|e| e.severity), Some(Severity::Success));
    }

    #[test]
    fn overlapping_operations_finish_in_deadline_order() {
        let (mut sim, mut timers) = setup();
        run(&mut sim, &mut timers, "scan");
        timers.advance(&mut sim, ms(100));
        run(&mut sim, &mut timers, "deploy");
        timers.advance(&mut sim, ms(5000));

        let done: Vec<_> = messages(&sim)
            .into_iter()
            .filter(|(_, sev, _)| *sev == Severity::Success)
            .map(|(_, _, msg)| msg)
            .collect();
        assert_eq!(done, vec![
            "Deployment successful. All agents updated.".to_string(),
            "Scan complete. No anomalies detected.".to_string(),
        ]);
    }
}
