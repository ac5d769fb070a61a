use serde::{Deserialize, Serialize};

/// Count ranges at or below this width are not bucketed
pub const MIN_WEIGHTED_RANGE: u64 = 5;

/// Visual prominence bucket, 1 (lightest) through 6 (heaviest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightClass(u8);

impl WeightClass {
    pub const NEUTRAL: WeightClass = WeightClass(1);
    pub const HEAVIEST: WeightClass = WeightClass(6);

    pub fn get(self) -> u8 {
        self.0
    }

    /// CSS class used by the rendered tag list
    pub fn css_class(self) -> String {
        format!("wt{}", self.0)
    }
}

/// Assign a weight class to `count` relative to the `(min, max)` of the current view.
///
/// Thresholds are exclusive upper bounds at the 10th, 25th, 50th, 75th and
/// 90th percentile of the range; a count equal to a threshold falls into
/// the next class.
pub fn classify(count: u64, min: u64, max: u64) -> WeightClass {
    let range = max.saturating_sub(min);
    if range <= MIN_WEIGHTED_RANGE {
        return WeightClass::NEUTRAL;
    }

    let min = min as f64;
    let range = range as f64;
    let thresholds = [
        min + range / 10.0,
        min + range / 4.0,
        min + range / 2.0,
        min + range * 0.75,
        min + range * 0.90,
    ];

    let count = count as f64;
    thresholds
        .iter()
        .position(|threshold| count < *threshold)
        .map(|idx| WeightClass(idx as u8 + 1))
        .unwrap_or(WeightClass::HEAVIEST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_range_is_neutral() {
        for (min, max) in [(0, 0), (0, 5), (10, 15), (3, 7)] {
            for count in min..=max {
                assert_eq!(classify(count, min, max), WeightClass::NEUTRAL);
            }
        }
    }

    #[test]
    fn test_buckets_over_hundred() {
        // thresholds: 10, 25, 50, 75, 90
        let cases = [
            (0, 1),
            (9, 1),
            (10, 2),
            (24, 2),
            (25, 3),
            (49, 3),
            (50, 4),
            (74, 4),
            (75, 5),
            (89, 5),
            (90, 6),
            (100, 6),
        ];
        for (count, expected) in cases {
            assert_eq!(classify(count, 0, 100).get(), expected, "count {}", count);
        }
    }

    #[test]
    fn test_thresholds_are_offset_by_min() {
        // range 20 from min 40: thresholds 42, 45, 50, 55, 58
        assert_eq!(classify(41, 40, 60).get(), 1);
        assert_eq!(classify(42, 40, 60).get(), 2);
        assert_eq!(classify(45, 40, 60).get(), 3);
        assert_eq!(classify(50, 40, 60).get(), 4);
        assert_eq!(classify(55, 40, 60).get(), 5);
        assert_eq!(classify(58, 40, 60).get(), 6);
    }

    #[test]
    fn test_fractional_thresholds() {
        // range 6: thresholds 0.6, 1.5, 3.0, 4.5, 5.4
        assert_eq!(classify(0, 0, 6).get(), 1);
        assert_eq!(classify(1, 0, 6).get(), 2);
        assert_eq!(classify(2, 0, 6).get(), 3);
        assert_eq!(classify(3, 0, 6).get(), 4);
        assert_eq!(classify(5, 0, 6).get(), 5);
        assert_eq!(classify(6, 0, 6).get(), 6);
    }

    #[test]
    fn test_inverted_bounds_are_neutral() {
        assert_eq!(classify(5, 10, 2), WeightClass::NEUTRAL);
    }

    #[test]
    fn test_css_class() {
        assert_eq!(classify(100, 0, 100).css_class(), "wt6");
    }
}
