// Drivers that move a command center's virtual clock: the interactive console maps it
// onto tokio time, the script runner steps it without waiting.

use crate::center::{CommandCenter, DashboardSnapshot, SharedCenter};
use crate::commands::CommandRegistry;
use crate::logbook::{LogId, USER_SOURCE};
use crate::render;
use crate::simulation::BOOT_COMPLETE_MS;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use std::io::BufRead;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// How long the clock sleeps when nothing is queued; a submission wakes it earlier
const IDLE_WAIT: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Default)]
pub struct ConsoleOptions {
    /// End the session once input is exhausted instead of waiting for Ctrl-C.
    pub exit_on_eof: bool,
    pub quiet: bool,
}

/// Collects lines for entries newer than `printed` and returns the new cursor.
/// Ids never repeat, so the cursor stays valid across a `clear`.
fn flush_log(center: &CommandCenter, printed: Option<LogId>, out: &mut Vec<String>) -> Option<LogId> {
    out.extend(center.simulation().log().since(printed).map(render::log_line));
    center.last_log_id().or(printed)
}

/// Reads stdin lines on a plain thread. A blocking read cannot be cancelled, so the
/// thread is left detached and never holds up runtime shutdown. The channel closes on
/// EOF or a read error.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(64);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// True for the echo of a `status`/`ls` submission.
fn is_status_echo(message: &str) -> bool {
    message
        .strip_prefix("$ ")
        .and_then(|line| CommandRegistry::global().get(line))
        .is_some_and(|command| command.name() == "status")
}

pub async fn run_console(
    shared: SharedCenter,
    mut input: mpsc::Receiver<String>,
    cancel: CancellationToken,
    options: ConsoleOptions,
) -> Result<DashboardSnapshot> {
    let origin = Instant::now();
    let notify = shared.notifier();

    let pb = if options.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.yellow} [{elapsed_precise}] {msg}")?);
    if !options.quiet {
        pb.enable_steady_tick(Duration::from_millis(120));
    }

    shared.lock().boot();

    let reader = {
        let shared = shared.clone();
        let cancel = cancel.clone();
        let exit_on_eof = options.exit_on_eof;
        tokio::spawn(async move {
            while let Some(line) = input.recv().await {
                if !shared.submit_at(origin.elapsed(), &line) {
                    debug!("Ignoring blank input");
                }
            }
            debug!("Input closed");
            if exit_on_eof {
                cancel.cancel();
            }
        })
    };

    let mut printed: Option<LogId> = None;
    let mut announced_boot = false;

    loop {
        let deadline = match shared.lock().next_due() {
            Some(due) => origin + due,
            None => Instant::now() + IDLE_WAIT,
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = notify.notified() => {}
            _ = sleep_until(deadline) => {}
        }

        let mut lines = Vec::new();
        let (summary, roster) = {
            let mut center = shared.lock();
            center.advance_to(origin.elapsed());
            let status_requested = center
                .simulation()
                .log()
                .since(printed)
                .any(|e| e.source == USER_SOURCE && is_status_echo(&e.message));
            printed = flush_log(&center, printed, &mut lines);

            let sim = center.simulation();
            let first_boot = sim.is_booted() && !announced_boot;
            let roster = if first_boot || status_requested {
                announced_boot |= first_boot;
                Some(render::roster_table(sim.agents(), &sim.metrics()))
            } else {
                None
            };
            (sim.metrics().summary(), roster)
        };

        if !options.quiet {
            pb.suspend(|| {
                for line in &lines {
                    println!("{}", line);
                }
                if let Some(table) = &roster {
                    println!("{}", table);
                }
            });
        }
        pb.set_message(summary);
    }

    reader.abort();
    pb.finish_and_clear();

    let snapshot = {
        let mut center = shared.lock();
        center.shutdown();
        let mut lines = Vec::new();
        flush_log(&center, printed, &mut lines);
        if !options.quiet {
            for line in lines {
                println!("{}", line);
            }
            let sim = center.simulation();
            println!("{}", render::roster_table(sim.agents(), &sim.metrics()));
        }
        center.snapshot()
    };

    info!("Console closed after {:.1}s", origin.elapsed().as_secs_f64());
    Ok(snapshot)
}

/// Boots, waits for boot to finish, submits `commands` one `gap` apart, runs until
/// `duration` of virtual time has passed, then lets queued effects finish.
pub fn run_script(
    center: &mut CommandCenter,
    commands: &[String],
    gap: Duration,
    duration: Duration,
) -> DashboardSnapshot {
    center.boot();
    center.advance(Duration::from_millis(BOOT_COMPLETE_MS));

    for command in commands {
        if center.submit(command) {
            info!("Submitted {:?} at {:?}", command, center.elapsed());
        }
        center.advance(gap);
    }

    if duration > center.elapsed() {
        center.advance_to(duration);
    }
    center.drain();
    center.snapshot()
}
