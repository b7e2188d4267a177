//! Tracked unit types.
//!
//! A [`UnitSpec`] is what callers hand in: loosely typed, possibly negative,
//! possibly missing a remaining value. A [`TrackedUnit`] is what the store
//! owns: clamped so that `0 <= remaining <= initial` always holds.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Caller-supplied description of a unit to track.
///
/// Parses from the command-line form `ID[:LABEL]=SECS[/REMAINING]`, e.g.
/// `amb:Ambulance=720` or `police=480/300`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    /// Unique identifier of the unit.
    pub id: String,

    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// ETA at the start of tracking, in seconds.
    pub initial_eta_seconds: i64,

    /// Remaining seconds at the start of tracking. Defaults to the initial ETA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_eta_seconds: Option<i64>,
}

impl UnitSpec {
    /// Create a spec whose remaining time equals its initial ETA.
    #[must_use]
    pub fn new(id: impl Into<String>, initial_eta_seconds: i64) -> Self {
        Self {
            id: id.into(),
            label: None,
            initial_eta_seconds,
            remaining_eta_seconds: None,
        }
    }

    /// Set the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set an explicit starting remaining time.
    #[must_use]
    pub fn with_remaining(mut self, remaining_eta_seconds: i64) -> Self {
        self.remaining_eta_seconds = Some(remaining_eta_seconds);
        self
    }
}

impl FromStr for UnitSpec {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let (name, times) = input
            .split_once('=')
            .ok_or_else(|| Error::invalid_unit_spec(input, "expected ID=SECS"))?;

        let (id, label) = match name.split_once(':') {
            Some((id, label)) => (id.trim(), Some(label.trim())),
            None => (name.trim(), None),
        };
        if id.is_empty() {
            return Err(Error::invalid_unit_spec(input, "unit id is empty"));
        }

        let parse = |raw: &str| {
            let raw = raw.trim();
            raw.parse::<i64>().map_err(|_| {
                Error::invalid_unit_spec(input, format!("'{raw}' is not a whole number of seconds"))
            })
        };
        let (initial, remaining) = match times.split_once('/') {
            Some((initial, remaining)) => (parse(initial)?, Some(parse(remaining)?)),
            None => (parse(times)?, None),
        };

        Ok(Self {
            id: id.to_string(),
            label: label.filter(|l| !l.is_empty()).map(str::to_string),
            initial_eta_seconds: initial,
            remaining_eta_seconds: remaining,
        })
    }
}

/// Arrival state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// Still counting down.
    EnRoute,
    /// Countdown reached zero.
    Arrived,
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnRoute => write!(f, "en_route"),
            Self::Arrived => write!(f, "arrived"),
        }
    }
}

/// A unit owned by the countdown store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedUnit {
    id: String,
    label: Option<String>,
    initial_eta_seconds: u32,
    remaining_eta_seconds: u32,
}

impl TrackedUnit {
    /// Build a unit from raw values, clamping them into range.
    ///
    /// Negative values become zero and `remaining` never exceeds `initial`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        initial_eta_seconds: i64,
        remaining_eta_seconds: i64,
    ) -> Self {
        let initial = clamp_seconds(initial_eta_seconds);
        Self {
            id: id.into(),
            label: None,
            initial_eta_seconds: initial,
            remaining_eta_seconds: clamp_seconds(remaining_eta_seconds).min(initial),
        }
    }

    /// Build a unit from a spec.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUnitSpec`] if the spec has an empty id.
    pub fn from_spec(spec: &UnitSpec) -> Result<Self> {
        if spec.id.trim().is_empty() {
            return Err(Error::invalid_unit_spec(&spec.id, "unit id is empty"));
        }
        let remaining = spec
            .remaining_eta_seconds
            .unwrap_or(spec.initial_eta_seconds);
        let mut unit = Self::new(spec.id.trim(), spec.initial_eta_seconds, remaining);
        unit.label.clone_from(&spec.label);
        Ok(unit)
    }

    /// The unit id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The label, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// ETA at the start of tracking.
    #[must_use]
    pub fn initial_eta_seconds(&self) -> u32 {
        self.initial_eta_seconds
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn remaining_eta_seconds(&self) -> u32 {
        self.remaining_eta_seconds
    }

    /// Whether the countdown is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining_eta_seconds > 0
    }

    /// Current arrival state.
    #[must_use]
    pub fn status(&self) -> UnitStatus {
        if self.is_active() {
            UnitStatus::EnRoute
        } else {
            UnitStatus::Arrived
        }
    }

    /// Advance one second. Returns `true` if the remaining time changed.
    pub(crate) fn tick(&mut self) -> bool {
        if self.remaining_eta_seconds == 0 {
            return false;
        }
        self.remaining_eta_seconds -= 1;
        true
    }

    pub(crate) fn set_remaining(&mut self, remaining_eta_seconds: i64) {
        self.remaining_eta_seconds =
            clamp_seconds(remaining_eta_seconds).min(self.initial_eta_seconds);
    }
}

fn clamp_seconds(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
