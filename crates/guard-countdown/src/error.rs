//! Error types for guard-countdown.
//!
//! The countdown arithmetic itself never fails: out-of-range numbers are
//! clamped. Errors only come from the edges of the engine, such as malformed
//! unit input, configuration loading, and the driver task lifecycle.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for guard-countdown operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Unit Errors ===
    /// A unit specification could not be parsed or is unusable.
    #[error("invalid unit spec '{input}': {message}")]
    InvalidUnitSpec {
        /// The offending input.
        input: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Two units were registered under the same id.
    #[error("duplicate unit id: {0}")]
    DuplicateUnit(String),

    /// An operation referenced a unit the store does not track.
    #[error("unknown unit id: {0}")]
    UnknownUnit(String),

    /// A tracking session was requested without any units.
    #[error("no units to track")]
    NoUnits,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// A scenario file could not be read.
    #[error("failed to read scenario {path}: {source}")]
    ScenarioRead {
        /// Path to the scenario file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Driver Errors ===
    /// The tick driver task panicked or was aborted before returning.
    #[error("tick driver task failed: {0}")]
    DriverJoin(#[from] tokio::task::JoinError),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for guard-countdown operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid unit spec error.
    #[must_use]
    pub fn invalid_unit_spec(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUnitSpec {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error refers to a unit the store does not know.
    #[must_use]
    pub fn is_unknown_unit(&self) -> bool {
        matches!(self, Self::UnknownUnit(_))
    }

    /// Check if this error came from malformed or conflicting unit input.
    #[must_use]
    pub fn is_unit_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidUnitSpec { .. } | Self::DuplicateUnit(_) | Self::NoUnits
        )
    }
}
