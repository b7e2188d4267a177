//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::report::TickReport;
use crate::store::CountdownStore;
use crate::unit::UnitSpec;

/// Where the units to track come from.
#[derive(Debug, Clone, Default, Args)]
pub struct UnitArgs {
    /// Unit to track, as ID[:LABEL]=SECS[/REMAINING] (repeatable)
    #[arg(short, long = "unit", value_name = "UNIT", value_parser = parse_unit)]
    pub units: Vec<UnitSpec>,

    /// JSON scenario file with the units to track
    #[arg(short, long, value_name = "FILE")]
    pub scenario: Option<PathBuf>,
}

impl UnitArgs {
    /// Resolve the unit list.
    ///
    /// Scenario units come first, followed by `--unit` entries. When neither
    /// is given, the units from the configuration file are used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoUnits`] if no source provides any units, or a
    /// validation error if ids are empty or repeated.
    pub fn resolve(&self, config: &Config) -> Result<Vec<UnitSpec>> {
        let mut units = match &self.scenario {
            Some(path) => config::load_scenario(path)?,
            None => Vec::new(),
        };
        units.extend(self.units.iter().cloned());

        if units.is_empty() {
            units.clone_from(&config.units);
        }
        if units.is_empty() {
            return Err(Error::NoUnits);
        }
        config::validate_units(&units)?;
        Ok(units)
    }
}

fn parse_unit(raw: &str) -> std::result::Result<UnitSpec, String> {
    raw.parse().map_err(|e: Error| e.to_string())
}

/// Track command arguments.
#[derive(Debug, Args)]
pub struct TrackCommand {
    /// Units to track
    #[command(flatten)]
    pub units: UnitArgs,

    /// Tick period in milliseconds (overrides config)
    #[arg(short, long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Stop after this many ticks
    #[arg(short, long, value_name = "N")]
    pub max_ticks: Option<u64>,

    /// Exit once every unit has arrived
    #[arg(short, long)]
    pub exit_on_complete: bool,

    /// Print one JSON report per tick
    #[arg(short, long)]
    pub json: bool,
}

/// Simulate command arguments.
#[derive(Debug, Args)]
pub struct SimulateCommand {
    /// Units to track
    #[command(flatten)]
    pub units: UnitArgs,

    /// Number of ticks to apply
    #[arg(short, long, default_value = "1")]
    pub ticks: u64,

    /// Also print a report every N ticks along the way
    #[arg(long, value_name = "N")]
    pub every: Option<u64>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl SimulateCommand {
    /// Apply the requested ticks to `store`, handing reports to `emit`.
    ///
    /// With `--every N` a report is emitted every N ticks. Otherwise the loop
    /// stops early once every unit has arrived. The final state is always
    /// emitted last.
    pub fn run(&self, store: &mut CountdownStore, mut emit: impl FnMut(&TickReport)) {
        let every = self.every.filter(|&n| n > 0);
        for _ in 0..self.ticks {
            if every.is_none() && store.is_complete() {
                break;
            }
            store.tick();
            let tick = store.ticks_elapsed();
            if every.is_some_and(|n| tick % n == 0) && tick < self.ticks {
                emit(&TickReport::from_store(store));
            }
        }
        emit(&TickReport::from_store(store));
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
