//! Types for the rating subsystem

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What kind of party a rating targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    /// A delivery driver
    Driver,
    /// A restaurant
    Restaurant,
}

impl SubjectType {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Driver => "driver",
            SubjectType::Restaurant => "restaurant",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One accepted rating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    /// Rating customer
    pub rater_id: Uuid,

    /// Rated driver or restaurant
    pub subject_id: Uuid,

    /// Kind of the subject
    pub subject_type: SubjectType,

    /// Order the rating refers to
    pub order_id: Uuid,

    /// Score in 1..=5
    pub score: u8,

    /// Free-form comment
    pub comment: String,

    /// Acceptance timestamp
    pub created_at: DateTime<Utc>,
}

/// Dedup key: a rater rates a given subject kind at most once per order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RatingKey {
    /// Rating customer
    pub rater_id: Uuid,
    /// Order the rating refers to
    pub order_id: Uuid,
    /// Kind of the subject
    pub subject_type: SubjectType,
}

/// Derived count + mean for one subject
///
/// A recomputable projection over the stored ratings, never the source of
/// truth. The running sum is exact (`Decimal`); the mean is derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRating {
    /// Rated subject
    pub subject_id: Uuid,

    /// Kind of the subject
    pub subject_type: SubjectType,

    /// Number of accepted ratings
    pub count: u64,

    /// Exact sum of scores
    pub sum: Decimal,
}

impl AggregateRating {
    /// Empty aggregate for a subject with no ratings
    pub fn empty(subject_id: Uuid, subject_type: SubjectType) -> Self {
        Self {
            subject_id,
            subject_type,
            count: 0,
            sum: Decimal::ZERO,
        }
    }

    /// Arithmetic mean at full precision (0 when no ratings exist)
    pub fn average(&self) -> Decimal {
        if self.count == 0 {
            Decimal::ZERO
        } else {
            self.sum / Decimal::from(self.count)
        }
    }

    /// Mean rounded to 2 decimal places for display
    pub fn average_display(&self) -> Decimal {
        self.average().round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aggregate_average_is_zero() {
        let agg = AggregateRating::empty(Uuid::new_v4(), SubjectType::Driver);
        assert_eq!(agg.average(), Decimal::ZERO);
        assert_eq!(agg.average_display(), Decimal::ZERO);
    }

    #[test]
    fn test_average_display_rounds_to_two_places() {
        let mut agg = AggregateRating::empty(Uuid::new_v4(), SubjectType::Restaurant);
        agg.count = 3;
        agg.sum = Decimal::from(4 + 5 + 4);

        // 13/3 = 4.333...
        assert_eq!(agg.average_display(), Decimal::new(433, 2));
        // Full precision is retained internally.
        assert!(agg.average() > Decimal::new(433, 2));
    }
}
