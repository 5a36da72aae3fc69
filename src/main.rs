//  ,---.,--.                 ,--.     ,--.           ,--.
// /  .-'|  | ,---.  ,---.  ,-|  | ,---. |  |,-.  ,---. |  |,-.
// |  `-,|  || .-. :| .-. :' .-. || .-. :|     / | .--'|     /
// |  .-'|  |\   --.\   --.\ `-' |\   --.|  \  \ \ `--.|  \  \
// `--'  `--' `----' `----' `---'  `----'`--'`--' `---'`--'`--'

// A mock agent command center. None of the agents are real, it's all dice rolls and timers.

// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use fleetdeck::prelude::*;
use fleetdeck::render;
use fleetdeck::runtime::{self, ConsoleOptions};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    sim: SimArgs,
}

#[derive(Args)]
struct SimArgs {
    #[arg(short = 'n', long, global = true, default_value_t = 6)]
    agents: usize,
    #[arg(long, global = true, default_value_t = 1500)]
    tick_ms: u64,
    #[arg(long, global = true, default_value_t = 100)]
    log_capacity: usize,
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console, reads commands from stdin
    Run {
        #[arg(long)]
        exit_on_eof: bool,
    },

    /// Replays commands on the virtual clock without waiting
    Script {
        commands: Vec<String>,
        #[arg(long, default_value_t = 500)]
        gap_ms: u64,
        #[arg(short, long, default_value_t = 30)]
        duration: u64,
        #[arg(long)]
        json: bool,
    },

    /// List the console commands
    Commands,
}

impl SimArgs {
    fn config(&self) -> SimConfig {
        let mut config = SimConfig::default()
            .with_agents(self.agents)
            .with_tick_interval(Duration::from_millis(self.tick_ms))
            .with_log_capacity(self.log_capacity);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let program_start = Instant::now();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { exit_on_eof } => {
            run_interactive(cli.sim.config(), exit_on_eof).await?;
        }

        Commands::Script { commands, gap_ms, duration, json } => {
            run_script(cli.sim.config(), &commands, gap_ms, duration, json)?;
        }

        Commands::Commands => {
            println!("\nAvailable Console Commands");

            for line in CommandRegistry::global().help_lines().iter().skip(1) {
                println!("{}", line);
            }

            println!("\nUsage: cargo run -- run");
            println!("Example: cargo run -- script status deploy --duration 10\n");
        }
    }

    let total_time = program_start.elapsed();
    info!("Total runtime: {:.2}s", total_time.as_secs_f64());

    Ok(())
}

async fn run_interactive(config: SimConfig, exit_on_eof: bool) -> Result<()> {
    info!("Fleetdeck: Interactive Console");

    let shared = SharedCenter::new(CommandCenter::new(config)?);
    let cancel = CancellationToken::new();

    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for Ctrl-C: {}", e);
                return;
            }
            cancel.cancel();
        })
    };

    let options = ConsoleOptions {
        exit_on_eof,
        quiet: false,
    };
    let input = runtime::spawn_stdin_reader();
    let snapshot = runtime::run_console(shared, input, cancel, options).await?;
    ctrl_c.abort();

    info!(
        "Session ended: {} ticks, {} log entries",
        snapshot.ticks,
        snapshot.log.len()
    );
    Ok(())
}

fn run_script(
    config: SimConfig,
    commands: &[String],
    gap_ms: u64,
    duration: u64,
    json: bool,
) -> Result<()> {
    info!("Fleetdeck: Script ({} commands)", commands.len());

    let mut center = CommandCenter::new(config)?;
    let snapshot = runtime::run_script(
        &mut center,
        commands,
        Duration::from_millis(gap_ms),
        Duration::from_secs(duration),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    for entry in &snapshot.log {
        println!("{}", render::log_line(entry));
    }
    println!();
    println!("{}", render::roster_table(&snapshot.agents, &snapshot.fleet));

    Ok(())
}
