//! Countdown store.
//!
//! The store is the single owner of every unit's remaining time. Everything
//! else (progress, overall ETA, reports) is derived from it on demand.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::aggregate;
use crate::error::{Error, Result};
use crate::progress::{self, ProgressSnapshot};
use crate::unit::{TrackedUnit, UnitSpec};

/// Authoritative remaining-time state for a set of units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountdownStore {
    units: Vec<TrackedUnit>,
    ticks_elapsed: u64,
}

impl CountdownStore {
    /// Create a store from caller-supplied specs, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateUnit`] if two specs share an id, or
    /// [`Error::InvalidUnitSpec`] if a spec has an empty id.
    pub fn new<'a>(specs: impl IntoIterator<Item = &'a UnitSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut units = Vec::new();
        for spec in specs {
            let unit = TrackedUnit::from_spec(spec)?;
            if !seen.insert(unit.id().to_string()) {
                return Err(Error::DuplicateUnit(unit.id().to_string()));
            }
            units.push(unit);
        }
        debug!("Countdown store created with {} units", units.len());
        Ok(Self {
            units,
            ticks_elapsed: 0,
        })
    }

    /// Advance every active unit by one second.
    ///
    /// Units already at zero are left alone, so ticking a fully elapsed store
    /// changes nothing but the tick counter. Returns how many units changed.
    pub fn tick(&mut self) -> usize {
        self.ticks_elapsed += 1;
        let mut changed = 0;
        for unit in &mut self.units {
            if unit.tick() {
                changed += 1;
                if !unit.is_active() {
                    info!(unit = unit.id(), tick = self.ticks_elapsed, "Unit arrived");
                }
            }
        }
        changed
    }

    /// Override a unit's remaining time. The value is clamped to
    /// `[0, initial_eta_seconds]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUnit`] if no unit has this id.
    pub fn reset(&mut self, unit_id: &str, new_remaining: i64) -> Result<()> {
        let unit = self
            .units
            .iter_mut()
            .find(|u| u.id() == unit_id)
            .ok_or_else(|| Error::UnknownUnit(unit_id.to_string()))?;
        unit.set_remaining(new_remaining);
        debug!(
            unit = unit_id,
            remaining = unit.remaining_eta_seconds(),
            "Unit remaining time reset"
        );
        Ok(())
    }

    /// All units, in registration order.
    #[must_use]
    pub fn units(&self) -> &[TrackedUnit] {
        &self.units
    }

    /// Look up a unit by id.
    #[must_use]
    pub fn get(&self, unit_id: &str) -> Option<&TrackedUnit> {
        self.units.iter().find(|u| u.id() == unit_id)
    }

    /// Number of tracked units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the store tracks no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Ticks applied since creation.
    #[must_use]
    pub fn ticks_elapsed(&self) -> u64 {
        self.ticks_elapsed
    }

    /// Whether every unit has reached zero.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        aggregate::active_count(&self.units) == 0
    }

    /// Minimum remaining ETA over active units, `0` if none are active.
    #[must_use]
    pub fn overall_eta(&self) -> u32 {
        aggregate::overall_eta(&self.units)
    }

    /// Progress of every unit, in registration order.
    #[must_use]
    pub fn progress(&self) -> Vec<ProgressSnapshot> {
        progress::snapshots(&self.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(specs: &[UnitSpec]) -> CountdownStore {
        CountdownStore::new(specs).unwrap()
    }

    #[test]
    fn test_new_keeps_order() {
        let s = store(&[UnitSpec::new("B", 10), UnitSpec::new("A", 20)]);
        let ids: Vec<_> = s.units().iter().map(TrackedUnit::id).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.ticks_elapsed(), 0);
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = CountdownStore::new(&[UnitSpec::new("A", 10), UnitSpec::new("A", 20)])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateUnit(id) if id == "A"));
    }

    #[test]
    fn test_empty_store() {
        let mut s = CountdownStore::default();
        assert!(s.is_empty());
        assert!(s.is_complete());
        assert_eq!(s.overall_eta(), 0);
        assert_eq!(s.tick(), 0);
    }

    #[test]
    fn test_remaining_after_n_ticks() {
        let initials = [0_i64, 1, 5, 17, 60];
        let specs: Vec<_> = initials
            .iter()
            .enumerate()
            .map(|(i, &secs)| UnitSpec::new(format!("u{i}"), secs))
            .collect();
        let mut s = store(&specs);

        for n in 1..=70_i64 {
            s.tick();
            for (unit, &initial) in s.units().iter().zip(&initials) {
                let expected = u32::try_from((initial - n).max(0)).unwrap();
                assert_eq!(unit.remaining_eta_seconds(), expected);
            }
        }
    }

    #[test]
    fn test_percent_non_decreasing_and_hundred_iff_zero() {
        let mut s = store(&[UnitSpec::new("A", 7), UnitSpec::new("B", 3)]);
        let mut last = s.progress();
        for _ in 0..10 {
            s.tick();
            let now = s.progress();
            for ((before, after), unit) in last.iter().zip(&now).zip(s.units()) {
                assert!(after.percent_complete >= before.percent_complete);
                let full = (after.percent_complete - 100.0).abs() < f64::EPSILON;
                assert_eq!(full, unit.remaining_eta_seconds() == 0);
            }
            last = now;
        }
    }

    #[test]
    fn test_tick_idempotent_once_complete() {
        let mut s = store(&[UnitSpec::new("A", 2)]);
        s.tick();
        s.tick();
        assert!(s.is_complete());
        let units_before = s.units().to_vec();

        assert_eq!(s.tick(), 0);
        assert_eq!(s.units(), units_before.as_slice());
        assert_eq!(s.overall_eta(), 0);
    }

    #[test]
    fn test_single_unit_scenario() {
        let mut s = store(&[UnitSpec::new("A", 480)]);
        s.tick();
        let unit = s.get("A").unwrap();
        assert_eq!(unit.remaining_eta_seconds(), 479);
        assert!((s.progress()[0].percent_complete - 0.208).abs() < 0.001);

        for _ in 1..480 {
            s.tick();
        }
        assert_eq!(s.get("A").unwrap().remaining_eta_seconds(), 0);
        assert!((s.progress()[0].percent_complete - 100.0).abs() < f64::EPSILON);
        assert_eq!(s.ticks_elapsed(), 480);
    }

    #[test]
    fn test_two_unit_overall_eta_scenario() {
        let mut s = store(&[UnitSpec::new("A", 360), UnitSpec::new("B", 720)]);
        assert_eq!(s.overall_eta(), 360);

        for _ in 0..360 {
            s.tick();
        }
        assert_eq!(s.get("A").unwrap().remaining_eta_seconds(), 0);
        assert_eq!(s.get("B").unwrap().remaining_eta_seconds(), 360);
        assert_eq!(s.overall_eta(), 360);

        s.tick();
        assert_eq!(s.overall_eta(), 359);
    }

    #[test]
    fn test_reset_clamps_and_reports_unknown() {
        let mut s = store(&[UnitSpec::new("A", 100)]);
        s.reset("A", 40).unwrap();
        assert_eq!(s.get("A").unwrap().remaining_eta_seconds(), 40);
        s.reset("A", 1_000).unwrap();
        assert_eq!(s.get("A").unwrap().remaining_eta_seconds(), 100);
        s.reset("A", -8).unwrap();
        assert_eq!(s.get("A").unwrap().remaining_eta_seconds(), 0);

        let err = s.reset("missing", 10).unwrap_err();
        assert!(err.is_unknown_unit());
    }
}
