//! QuickBite Rating Service
//!
//! Validates ratings against the delivery service's authoritative state,
//! deduplicates them, and maintains derived per-subject aggregates.
//!
//! # Architecture
//!
//! - **Capability validation**: the cross-service check is an injected
//!   [`Validator`] trait, swappable for a network client or a test double
//! - **Fault taxonomy**: `NotFound` (authoritative negative) is never
//!   conflated with `Unavailable` (transport fault); outages surface as
//!   degraded service, not as rejections
//! - **Dedup by construction**: insert-if-absent on the
//!   (rater, order, subject kind) key
//! - **Derived aggregates**: count + exact running sum, recomputable from
//!   the stored ratings at any time

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod aggregator;
pub mod config;
pub mod error;
pub mod types;
pub mod validator;

// Re-exports
pub use aggregator::RatingService;
pub use config::{Config, RetryConfig};
pub use error::{Error, Result, ValidationError, ValidationResult};
pub use types::{AggregateRating, Rating, RatingKey, SubjectType};
pub use validator::{DeliveryFacts, RetryPolicy, RetryingValidator, Validator};
