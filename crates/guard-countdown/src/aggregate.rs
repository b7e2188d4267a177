//! Aggregates across all tracked units.

use crate::unit::TrackedUnit;

/// Smallest remaining ETA among units still counting down, or `0` if none are.
#[must_use]
pub fn overall_eta(units: &[TrackedUnit]) -> u32 {
    units
        .iter()
        .map(TrackedUnit::remaining_eta_seconds)
        .filter(|&remaining| remaining > 0)
        .min()
        .unwrap_or(0)
}

/// Number of units still counting down.
#[must_use]
pub fn active_count(units: &[TrackedUnit]) -> usize {
    units.iter().filter(|u| u.is_active()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(overall_eta(&[]), 0);
        assert_eq!(active_count(&[]), 0);
    }

    #[test]
    fn test_minimum_of_active_units() {
        let units = vec![
            TrackedUnit::new("A", 360, 0),
            TrackedUnit::new("B", 720, 360),
            TrackedUnit::new("C", 900, 500),
        ];
        assert_eq!(overall_eta(&units), 360);
        assert_eq!(active_count(&units), 2);
    }

    #[test]
    fn test_all_arrived_is_zero() {
        let units = vec![TrackedUnit::new("A", 10, 0), TrackedUnit::new("B", 0, 0)];
        assert_eq!(overall_eta(&units), 0);
        assert_eq!(active_count(&units), 0);
    }
}
