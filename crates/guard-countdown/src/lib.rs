//! `guard-countdown` - Live countdown and progress engine for responder ETAs
//!
//! This library tracks several units counting down toward arrival. A
//! [`CountdownStore`] owns each unit's remaining seconds, progress and the
//! overall ETA are derived from it on demand, and the [`driver`] advances the
//! store once per tick and publishes a consistent [`TickReport`] after each one.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod progress;
pub mod report;
pub mod store;
pub mod unit;

pub use aggregate::overall_eta;
pub use config::Config;
pub use driver::{TickDriver, TickObserver, TickSource, TrackingSession};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use progress::{percent_complete, ProgressSnapshot};
pub use report::{format_eta, TickReport, UnitReport};
pub use store::CountdownStore;
pub use unit::{TrackedUnit, UnitSpec, UnitStatus};
