//! Progress derivation.
//!
//! Progress is never stored. It is recomputed from a unit's initial and
//! remaining ETA whenever it is needed.

use serde::{Deserialize, Serialize};

use crate::unit::TrackedUnit;

/// Percent of the countdown that has elapsed, in `[0, 100]`.
///
/// A unit with a zero initial ETA is already complete and reports `100.0`.
#[must_use]
pub fn percent_complete(initial_eta_seconds: u32, remaining_eta_seconds: u32) -> f64 {
    if initial_eta_seconds == 0 {
        return 100.0;
    }
    let initial = f64::from(initial_eta_seconds);
    let elapsed = initial - f64::from(remaining_eta_seconds);
    (elapsed / initial * 100.0).clamp(0.0, 100.0)
}

/// Progress of a single unit at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// The unit this snapshot describes.
    pub unit_id: String,
    /// Elapsed share of the countdown, `0.0..=100.0`.
    pub percent_complete: f64,
}

impl ProgressSnapshot {
    /// Derive the snapshot for a unit.
    #[must_use]
    pub fn of(unit: &TrackedUnit) -> Self {
        Self {
            unit_id: unit.id().to_string(),
            percent_complete: percent_complete(
                unit.initial_eta_seconds(),
                unit.remaining_eta_seconds(),
            ),
        }
    }
}

/// Derive snapshots for every unit, in order.
#[must_use]
pub fn snapshots(units: &[TrackedUnit]) -> Vec<ProgressSnapshot> {
    units.iter().map(ProgressSnapshot::of).collect()
}
