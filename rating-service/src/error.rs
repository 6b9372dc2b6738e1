//! Error types for the rating subsystem

use crate::types::SubjectType;
use thiserror::Error;
use uuid::Uuid;

/// Result type for rating operations
pub type Result<T> = std::result::Result<T, Error>;

/// Rating errors
///
/// `NotEligible` and `AlreadyRated` are policy rejections surfaced to the
/// end user verbatim. `Unavailable` is a transient infrastructure fault and
/// must never be conflated with "the delivery does not exist".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The rater may not rate this subject for this order
    #[error("Not eligible to rate: {0}")]
    NotEligible(String),

    /// A rating for this (rater, order, subject kind) already exists
    #[error("Already rated {subject_type} for order {order_id}")]
    AlreadyRated {
        /// Rating customer
        rater_id: Uuid,
        /// Order the duplicate refers to
        order_id: Uuid,
        /// Kind of the subject
        subject_type: SubjectType,
    },

    /// Score outside 1..=5
    #[error("Invalid score {0}: must be between 1 and 5")]
    InvalidScore(u8),

    /// The delivery service could not be reached
    #[error("Delivery service unavailable after {attempts} attempts")]
    Unavailable {
        /// Total attempts made, including retries
        attempts: u32,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for validator calls
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Faults a validator call can surface
///
/// `NotFound` means the authoritative service answered and the record does
/// not exist. `Unavailable` means the service could not answer; callers must
/// keep the two distinct.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Authoritative answer: no such delivery
    #[error("No delivery found for order {0}")]
    NotFound(Uuid),

    /// Transport fault: no authoritative answer
    #[error("Delivery lookup unavailable after {attempts} attempts")]
    Unavailable {
        /// Total attempts made, including retries
        attempts: u32,
    },
}
