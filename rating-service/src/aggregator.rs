//! Rating storage and aggregation
//!
//! Ratings are accepted only after the cross-service validator confirms the
//! delivery, deduplicated on (rater, order, subject kind) by an atomic
//! insert-if-absent, and folded into a per-subject aggregate. The aggregate
//! is a derived projection; [`RatingService::recompute`] rebuilds it from
//! the stored ratings, which remain the source of truth.

use crate::{
    error::ValidationError,
    types::{AggregateRating, Rating, RatingKey, SubjectType},
    validator::{DeliveryFacts, Validator},
    Error, Result,
};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Rating service
pub struct RatingService {
    /// Cross-service delivery validator
    validator: Arc<dyn Validator>,

    /// Accepted ratings, keyed for uniqueness
    ratings: DashMap<RatingKey, Rating>,

    /// Derived per-subject aggregates
    aggregates: DashMap<(Uuid, SubjectType), AggregateRating>,
}

impl RatingService {
    /// Create a service over an injected validator
    pub fn new(validator: Arc<dyn Validator>) -> Self {
        Self {
            validator,
            ratings: DashMap::new(),
            aggregates: DashMap::new(),
        }
    }

    /// Submit a rating
    ///
    /// Pipeline: score validation, cross-service delivery check, atomic
    /// dedup insert, incremental aggregate update. A duplicate fails with
    /// `AlreadyRated`; a validator transport fault surfaces as
    /// `Unavailable` and is never treated as "delivery does not exist".
    pub async fn submit_rating(
        &self,
        rater_id: Uuid,
        order_id: Uuid,
        subject_id: Uuid,
        subject_type: SubjectType,
        score: u8,
        comment: impl Into<String>,
    ) -> Result<Rating> {
        if !(1..=5).contains(&score) {
            return Err(Error::InvalidScore(score));
        }

        let facts = match self.validator.get_delivery_by_order(order_id).await {
            Ok(facts) => facts,
            Err(ValidationError::NotFound(_)) => {
                return Err(Error::NotEligible(format!(
                    "no completed delivery found for order {}",
                    order_id
                )));
            }
            Err(ValidationError::Unavailable { attempts }) => {
                return Err(Error::Unavailable { attempts });
            }
        };

        self.check_eligibility(rater_id, subject_id, subject_type, &facts)?;

        let rating = Rating {
            rater_id,
            subject_id,
            subject_type,
            order_id,
            score,
            comment: comment.into(),
            created_at: Utc::now(),
        };

        let key = RatingKey {
            rater_id,
            order_id,
            subject_type,
        };

        // The subject's aggregate entry guard is taken first and held across
        // the dedup insert, so the stored rating and the incremental fold
        // commit as one unit. `recompute` takes the same guard for its
        // rescan, which keeps the two update paths serialized per subject.
        let mut agg_entry = self
            .aggregates
            .entry((subject_id, subject_type))
            .or_insert_with(|| AggregateRating::empty(subject_id, subject_type));

        // Insert-if-absent under the entry guard: the uniqueness constraint
        // holds even for concurrent duplicate submissions.
        match self.ratings.entry(key) {
            Entry::Occupied(_) => {
                return Err(Error::AlreadyRated {
                    rater_id,
                    order_id,
                    subject_type,
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(rating.clone());
            }
        }

        let agg = agg_entry.value_mut();
        agg.count += 1;
        agg.sum += rust_decimal::Decimal::from(rating.score);
        drop(agg_entry);

        info!(
            order_id = %order_id,
            subject_id = %subject_id,
            subject_type = %subject_type,
            score,
            "rating accepted"
        );

        Ok(rating)
    }

    /// Check the rater and subject against the authoritative delivery record
    fn check_eligibility(
        &self,
        rater_id: Uuid,
        subject_id: Uuid,
        subject_type: SubjectType,
        facts: &DeliveryFacts,
    ) -> Result<()> {
        if !facts.delivered {
            return Err(Error::NotEligible(
                "order has not been delivered yet".to_string(),
            ));
        }

        if rater_id != facts.customer_id {
            return Err(Error::NotEligible(
                "rater is not the customer of this order".to_string(),
            ));
        }

        let subject_matches = match subject_type {
            SubjectType::Driver => facts.driver_id == Some(subject_id),
            SubjectType::Restaurant => facts.restaurant_id == subject_id,
        };
        if !subject_matches {
            return Err(Error::NotEligible(format!(
                "{} {} did not participate in this order",
                subject_type, subject_id
            )));
        }

        Ok(())
    }

    /// Current aggregate for a subject
    ///
    /// Returns an empty aggregate (count 0, average 0) for an unrated
    /// subject, never an error.
    pub fn get_aggregate(&self, subject_id: Uuid, subject_type: SubjectType) -> AggregateRating {
        self.aggregates
            .get(&(subject_id, subject_type))
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| AggregateRating::empty(subject_id, subject_type))
    }

    /// Reconciliation backstop: rebuild a subject's aggregate from storage
    ///
    /// The full rescan is the fallback path only; the hot path updates the
    /// aggregate incrementally on each accepted rating.
    pub fn recompute(&self, subject_id: Uuid, subject_type: SubjectType) -> AggregateRating {
        // The entry guard is held across the whole rescan. A concurrent
        // submission for this subject blocks on the same guard before it
        // inserts its rating, so the rebuilt value can neither miss an
        // in-flight rating nor overwrite an increment the scan did not see.
        let mut entry = self
            .aggregates
            .entry((subject_id, subject_type))
            .or_insert_with(|| AggregateRating::empty(subject_id, subject_type));

        let mut rebuilt = AggregateRating::empty(subject_id, subject_type);
        for rating_entry in self.ratings.iter() {
            let rating = rating_entry.value();
            if rating.subject_id == subject_id && rating.subject_type == subject_type {
                rebuilt.count += 1;
                rebuilt.sum += rust_decimal::Decimal::from(rating.score);
            }
        }

        debug!(
            subject_id = %subject_id,
            subject_type = %subject_type,
            count = rebuilt.count,
            "aggregate recomputed from ratings"
        );
        *entry.value_mut() = rebuilt.clone();
        rebuilt
    }

    /// Number of accepted ratings
    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }
}
