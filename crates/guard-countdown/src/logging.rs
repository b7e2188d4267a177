//! Logging configuration for guard-countdown.
//!
//! Logging goes through `tracing`. The binary installs a `tracing-subscriber`
//! formatter whose default level comes from the command-line verbosity.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How chatty the `guard-eta` binary is on stderr.
///
/// Session start and stop plus arrivals are logged at info. Every tick is
/// logged at trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// `-q`: errors only.
    Quiet,
    /// No flag: session lifecycle and arrivals.
    #[default]
    Normal,
    /// `-v`: config loading, resets and cancellation.
    Verbose,
    /// `-vv`: one line per tick.
    Trace,
}

impl Verbosity {
    /// The most detailed level let through.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// `EnvFilter` directive scoping the level to `guard_countdown`.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        format!("guard_countdown={}", self.to_level_filter())
    }
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over `verbosity` when set. Reports own stdout, so
/// `--json` output can be piped without log lines mixed in. Later calls are
/// no-ops.
///
/// # Examples
///
/// ```no_run
/// use guard_countdown::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    let _ = subscriber.try_init();
}

/// Route warnings from driver tests through the libtest capture.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
