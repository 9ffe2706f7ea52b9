//! Rating aggregation for marketplace models.
//!
//! A model's rating is kept as the running mean of all star ratings, scaled
//! by [`RATING_SCALE`] so it can be stored as an integer. The mean is folded
//! in incrementally with truncating division:
//!
//! ```text
//! new = (old * count + rating * 100) / (count + 1)
//! ```
//!
//! Repeated truncation means the stored value can sit slightly below the mean
//! recomputed from raw ratings. The incremental formula is kept as-is.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Scale factor applied to stored ratings (4.25 stars is stored as 425).
pub const RATING_SCALE: u64 = 100;

/// Lowest accepted star rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted star rating.
pub const MAX_RATING: u8 = 5;

/// Running rating of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingAggregate {
    scaled: u64,
    count: u64,
}

impl RatingAggregate {
    /// Creates an empty aggregate (no ratings yet).
    #[must_use]
    pub const fn new() -> Self {
        Self { scaled: 0, count: 0 }
    }

    /// Rebuilds an aggregate from stored parts.
    #[must_use]
    pub const fn from_parts(scaled: u64, count: u64) -> Self {
        Self { scaled, count }
    }

    /// Checks that `rating` is a valid star rating.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRating` if `rating` is outside 1..=5.
    pub const fn validate(rating: u8) -> Result<u8, CoreError> {
        if rating < MIN_RATING || rating > MAX_RATING {
            return Err(CoreError::InvalidRating {
                min: MIN_RATING,
                max: MAX_RATING,
                got: rating,
            });
        }
        Ok(rating)
    }

    /// Computes the aggregate that results from folding in `rating`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRating` if `rating` is outside 1..=5.
    pub fn with_rating(self, rating: u8) -> Result<Self, CoreError> {
        let rating = Self::validate(rating)?;

        // u128 keeps old * count from overflowing for any reachable count.
        let total = u128::from(self.scaled) * u128::from(self.count)
            + u128::from(rating) * u128::from(RATING_SCALE);
        let count = self.count.saturating_add(1);
        let scaled = total / u128::from(count);

        Ok(Self {
            scaled: scaled as u64,
            count,
        })
    }

    /// Folds `rating` into this aggregate in place.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRating` if `rating` is outside 1..=5; the
    /// aggregate is left unchanged.
    pub fn record(&mut self, rating: u8) -> Result<(), CoreError> {
        *self = self.with_rating(rating)?;
        Ok(())
    }

    /// The rating scaled by 100.
    #[must_use]
    pub const fn scaled(&self) -> u64 {
        self.scaled
    }

    /// The number of ratings folded in.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn new_aggregate_is_empty() {
        let agg = RatingAggregate::new();
        assert_eq!(agg.scaled(), 0);
        assert_eq!(agg.count(), 0);
    }

    #[test_case(0, false ; "zero")]
    #[test_case(1, true ; "min")]
    #[test_case(3, true ; "middle")]
    #[test_case(5, true ; "max")]
    #[test_case(6, false ; "above max")]
    fn validate_bounds(rating: u8, ok: bool) {
        assert_eq!(RatingAggregate::validate(rating).is_ok(), ok);
    }

    #[test]
    fn first_rating_sets_mean() {
        let mut agg = RatingAggregate::new();
        agg.record(4).unwrap();
        assert_eq!(agg.scaled(), 400);
        assert_eq!(agg.count(), 1);
    }

    #[test]
    fn incremental_mean_truncates() {
        let mut agg = RatingAggregate::new();
        agg.record(5).unwrap();
        agg.record(4).unwrap();
        // (500 * 1 + 400) / 2 = 450
        assert_eq!(agg.scaled(), 450);
        agg.record(4).unwrap();
        // (450 * 2 + 400) / 3 = 433 (433.33 truncated)
        assert_eq!(agg.scaled(), 433);
        assert_eq!(agg.count(), 3);
    }

    #[test]
    fn truncation_drift_is_preserved() {
        let mut agg = RatingAggregate::new();
        for rating in [5, 4, 4, 1] {
            agg.record(rating).unwrap();
        }
        // 500 -> 450 -> 433 -> (433*3 + 100)/4 = 349; the true mean is 350.
        assert_eq!(agg.scaled(), 349);
    }

    #[test]
    fn invalid_rating_leaves_aggregate_unchanged() {
        let mut agg = RatingAggregate::from_parts(300, 2);
        assert!(agg.record(0).is_err());
        assert!(agg.record(9).is_err());
        assert_eq!(agg, RatingAggregate::from_parts(300, 2));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn aggregate_stays_within_star_bounds(ratings in prop::collection::vec(1u8..=5, 1..64)) {
                let mut agg = RatingAggregate::new();
                for rating in &ratings {
                    agg.record(*rating).unwrap();
                }
                prop_assert_eq!(agg.count(), ratings.len() as u64);
                prop_assert!(agg.scaled() >= 100 && agg.scaled() <= 500);
            }

            #[test]
            fn aggregate_matches_incremental_formula(ratings in prop::collection::vec(1u8..=5, 0..64)) {
                let mut agg = RatingAggregate::new();
                let (mut expected, mut count) = (0u64, 0u64);
                for rating in &ratings {
                    agg.record(*rating).unwrap();
                    expected = (expected * count + u64::from(*rating) * 100) / (count + 1);
                    count += 1;
                }
                prop_assert_eq!(agg.scaled(), expected);
            }
        }
    }
}
