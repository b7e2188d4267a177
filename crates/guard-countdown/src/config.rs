//! Configuration management for guard-countdown.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. It also
//! reads JSON scenario files describing the units to track.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::unit::UnitSpec;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "guard-countdown";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "GUARD_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `GUARD_`, nested keys split on `__`)
/// 2. TOML config file at `~/.config/guard-countdown/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tick driver configuration.
    pub tracker: TrackerConfig,
    /// Units tracked when none are given on the command line.
    pub units: Vec<UnitSpec>,
}

/// Tick driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Tick period in milliseconds. One tick always advances one second of ETA.
    pub tick_interval_ms: u64,
    /// End the session once every unit has arrived.
    pub stop_when_complete: bool,
    /// End the session after this many ticks.
    pub max_ticks: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            stop_when_complete: false,
            max_ticks: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        debug!("Loading configuration from {}", config_file.display());

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.tracker.tick_interval_ms == 0 {
            return Err(Error::config_validation(
                "tick_interval_ms must be greater than 0",
            ));
        }

        validate_units(&self.units)
    }

    /// Get the tick interval as a Duration.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tracker.tick_interval_ms)
    }
}

/// Check that unit ids are present and unique.
///
/// # Errors
///
/// Returns [`Error::ConfigValidation`] naming the first offending id.
pub fn validate_units(units: &[UnitSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for unit in units {
        let id = unit.id.trim();
        if id.is_empty() {
            return Err(Error::config_validation("unit id must not be empty"));
        }
        if !seen.insert(id) {
            return Err(Error::config_validation(format!("duplicate unit id: {id}")));
        }
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioFile {
    List(Vec<UnitSpec>),
    Wrapped { units: Vec<UnitSpec> },
}

/// Read units from a JSON scenario file.
///
/// The file holds either a bare array of units or an object with a `units`
/// array.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON of either
/// shape, or contains empty or duplicate ids.
pub fn load_scenario(path: &Path) -> Result<Vec<UnitSpec>> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::ScenarioRead {
        path: path.to_path_buf(),
        source,
    })?;
    let units = match serde_json::from_str(&raw)? {
        ScenarioFile::List(units) | ScenarioFile::Wrapped { units } => units,
    };
    validate_units(&units)?;
    debug!("Loaded {} units from {}", units.len(), path.display());
    Ok(units)
}
