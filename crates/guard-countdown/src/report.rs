//! Per-tick reports published to observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::CountdownStore;
use crate::unit::UnitStatus;

/// The state of one unit as published after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitReport {
    /// The unit id.
    pub unit_id: String,
    /// Display label, if the unit has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Seconds left on the countdown.
    pub remaining_eta_seconds: u32,
    /// Elapsed share of the countdown, `0.0..=100.0`.
    pub percent_complete: f64,
    /// Whether the unit has arrived.
    pub status: UnitStatus,
}

/// A consistent view of every unit after a tick has been fully applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Number of ticks applied so far. The report published at start is tick 0.
    pub tick: u64,
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
    /// Per-unit state, in registration order.
    pub units: Vec<UnitReport>,
    /// Smallest remaining ETA among active units, `0` if none are active.
    pub overall_eta_seconds: u32,
    /// Whether every unit has arrived.
    pub complete: bool,
}

impl TickReport {
    /// Derive a report from the current store state.
    #[must_use]
    pub fn from_store(store: &CountdownStore) -> Self {
        let units = store
            .units()
            .iter()
            .zip(store.progress())
            .map(|(unit, progress)| UnitReport {
                unit_id: progress.unit_id,
                label: unit.label().map(str::to_string),
                remaining_eta_seconds: unit.remaining_eta_seconds(),
                percent_complete: progress.percent_complete,
                status: unit.status(),
            })
            .collect();

        Self {
            tick: store.ticks_elapsed(),
            timestamp: Utc::now(),
            units,
            overall_eta_seconds: store.overall_eta(),
            complete: store.is_complete(),
        }
    }

    /// Look up a unit's entry by id.
    #[must_use]
    pub fn unit(&self, unit_id: &str) -> Option<&UnitReport> {
        self.units.iter().find(|u| u.unit_id == unit_id)
    }
}

impl std::fmt::Display for TickReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[tick {}] overall ETA {}",
            self.tick,
            format_eta(self.overall_eta_seconds)
        )?;
        for unit in &self.units {
            let name = unit.label.as_deref().unwrap_or(&unit.unit_id);
            match unit.status {
                UnitStatus::Arrived => write!(f, " | {name} arrived")?,
                UnitStatus::EnRoute => write!(
                    f,
                    " | {name} {} ({:.1}%)",
                    format_eta(unit.remaining_eta_seconds),
                    unit.percent_complete
                )?,
            }
        }
        Ok(())
    }
}

/// Render seconds as `MM:SS`, or `H:MM:SS` from one hour up.
#[must_use]
pub fn format_eta(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}
