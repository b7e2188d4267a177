//! `guard-eta` - CLI for guard-countdown
//!
//! This binary runs live or simulated responder ETA countdowns and manages
//! the configuration they read.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use guard_countdown::cli::{Cli, Command, ConfigCommand, SimulateCommand, TrackCommand, UnitArgs};
use guard_countdown::driver::{IntervalTicks, TickDriver};
use guard_countdown::{init_logging, Config, CountdownStore, TickReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Track(track_cmd) => handle_track(&config, &track_cmd).await,
        Command::Simulate(simulate_cmd) => handle_simulate(&config, &simulate_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn print_report(report: &TickReport, json: bool) {
    if json {
        match serde_json::to_string(report) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Failed to serialize report for tick {}: {e}", report.tick),
        }
    } else {
        println!("{report}");
    }
}

fn build_store(config: &Config, args: &UnitArgs) -> anyhow::Result<CountdownStore> {
    let store = args
        .resolve(config)
        .and_then(|units| CountdownStore::new(&units));
    store.map_err(|e| {
        if e.is_unit_input_error() {
            anyhow::Error::new(e)
                .context("no usable units: pass --unit ID=SECS or --scenario FILE")
        } else {
            e.into()
        }
    })
}

async fn handle_track(config: &Config, cmd: &TrackCommand) -> anyhow::Result<()> {
    let store = build_store(config, &cmd.units)?;

    let period = cmd
        .interval_ms
        .map_or_else(|| config.tick_interval(), Duration::from_millis);
    let ticks = IntervalTicks::new(period)?;

    let json = cmd.json;
    let session = TickDriver::new(store, ticks)
        .stop_when_complete(cmd.exit_on_complete || config.tracker.stop_when_complete)
        .max_ticks(cmd.max_ticks.or(config.tracker.max_ticks))
        .observer(move |report: &TickReport| print_report(report, json))
        .start();
    print_report(&session.latest(), json);

    let mut reports = session.subscribe();
    let interrupted = tokio::select! {
        _ = tokio::signal::ctrl_c() => true,
        () = async { while reports.changed().await.is_ok() {} } => false,
    };
    if interrupted {
        info!("Interrupted, stopping countdown");
    }

    let store = session.stop().await?;
    info!(
        ticks = store.ticks_elapsed(),
        overall_eta = store.overall_eta(),
        complete = store.is_complete(),
        "Countdown finished"
    );
    Ok(())
}

fn handle_simulate(config: &Config, cmd: &SimulateCommand) -> anyhow::Result<()> {
    let mut store = build_store(config, &cmd.units)?;
    cmd.run(&mut store, |report| print_report(report, cmd.json));
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Tracker]");
                println!("  Tick interval (ms): {}", config.tracker.tick_interval_ms);
                println!(
                    "  Stop when complete: {}",
                    config.tracker.stop_when_complete
                );
                match config.tracker.max_ticks {
                    Some(max) => println!("  Max ticks:          {max}"),
                    None => println!("  Max ticks:          unlimited"),
                }
                println!();
                println!("[Units]");
                if config.units.is_empty() {
                    println!("  (none)");
                }
                for unit in &config.units {
                    println!(
                        "  {:<12} {:>6}s  {}",
                        unit.id,
                        unit.initial_eta_seconds,
                        unit.label.as_deref().unwrap_or("")
                    );
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
