//! Movement filter deciding which samples are worth reporting

use super::distance::haversine_meters;
use crate::types::GeoPoint;

/// Minimum displacement from the last accepted point before a new point
/// is reported. Fixed policy, not configurable per call.
pub const MOVEMENT_THRESHOLD_METERS: f64 = 15.0;

/// Keeps the last accepted point and admits a candidate only when it has
/// moved at least [`MOVEMENT_THRESHOLD_METERS`] away from it.
///
/// The first candidate is always accepted so the path has a starting fix.
/// Rejected candidates never become the new baseline.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    baseline: Option<GeoPoint>,
}

impl MovementFilter {
    /// Create an unseeded filter
    pub fn new() -> Self {
        Self::default()
    }

    /// The last accepted point, if any
    pub fn baseline(&self) -> Option<GeoPoint> {
        self.baseline
    }

    /// Decide whether `candidate` is significant movement. Accepting makes
    /// it the new baseline.
    pub fn accept(&mut self, candidate: GeoPoint) -> bool {
        match self.baseline {
            None => {
                self.baseline = Some(candidate);
                true
            }
            Some(previous) => {
                if haversine_meters(previous, candidate) >= MOVEMENT_THRESHOLD_METERS {
                    self.baseline = Some(candidate);
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_always_accepted() {
        let mut filter = MovementFilter::new();
        assert!(filter.accept(GeoPoint::new(24.0, 46.0)));
        assert_eq!(filter.baseline(), Some(GeoPoint::new(24.0, 46.0)));
    }

    #[test]
    fn test_zero_movement_never_accepted() {
        let mut filter = MovementFilter::new();
        let p = GeoPoint::new(24.0, 46.0);
        assert!(filter.accept(p));
        assert!(!filter.accept(p));
    }

    #[test]
    fn test_below_threshold_rejected_and_baseline_kept() {
        let mut filter = MovementFilter::new();
        let origin = GeoPoint::new(24.0, 46.0);
        assert!(filter.accept(origin));

        // ~11 meters, under the 15 m threshold
        let nudge = GeoPoint::new(24.0001, 46.0);
        assert!(!filter.accept(nudge));
        assert_eq!(filter.baseline(), Some(origin));
    }

    #[test]
    fn test_threshold_crossing_accepted() {
        let mut filter = MovementFilter::new();
        assert!(filter.accept(GeoPoint::new(24.0, 46.0)));

        // ~22 meters away
        let moved = GeoPoint::new(24.0002, 46.0);
        assert!(filter.accept(moved));
        assert_eq!(filter.baseline(), Some(moved));
    }

    #[test]
    fn test_creep_below_threshold_never_reports() {
        // Repeated sub-threshold nudges relative to the same baseline must
        // not accumulate into acceptance.
        let mut filter = MovementFilter::new();
        assert!(filter.accept(GeoPoint::new(24.0, 46.0)));
        for i in 1..=5 {
            let creep = GeoPoint::new(24.0 + 0.00002 * i as f64, 46.0);
            assert!(!filter.accept(creep), "nudge {i} was accepted");
        }
        assert_eq!(filter.baseline(), Some(GeoPoint::new(24.0, 46.0)));
    }
}
