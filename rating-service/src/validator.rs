//! Cross-service delivery validation
//!
//! Before a rating is accepted, the delivery it refers to is confirmed
//! against the delivery service's authoritative record. The check is a
//! capability interface so deployments can inject a network client, an
//! in-process lookup, or a test double.

use crate::error::{ValidationError, ValidationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// Authoritative facts about one delivery, as reported by the delivery service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryFacts {
    /// The delivered order
    pub order_id: Uuid,

    /// Customer the order belongs to
    pub customer_id: Uuid,

    /// Fulfilling restaurant
    pub restaurant_id: Uuid,

    /// Driver who carried the delivery (if claimed)
    pub driver_id: Option<Uuid>,

    /// Whether the order reached `delivered`
    pub delivered: bool,
}

/// Capability interface for the cross-service delivery lookup
#[async_trait]
pub trait Validator: Send + Sync {
    /// Fetch the authoritative delivery record for an order
    ///
    /// `NotFound` is an authoritative negative; a transport fault must
    /// surface as `Unavailable`, never as `NotFound`.
    async fn get_delivery_by_order(&self, order_id: Uuid) -> ValidationResult<DeliveryFacts>;
}

/// Retry policy for validator calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Cap on the backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Decorator adding bounded retry with exponential backoff
///
/// Retries only on `Unavailable`; `NotFound` is an authoritative answer and
/// returns immediately.
pub struct RetryingValidator<V> {
    inner: V,
    policy: RetryPolicy,
}

impl<V: Validator> RetryingValidator<V> {
    /// Wrap a validator with the given retry policy
    pub fn new(inner: V, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Wrap with the default policy (2 retries, 100ms initial backoff)
    pub fn with_defaults(inner: V) -> Self {
        Self::new(inner, RetryPolicy::default())
    }
}

#[async_trait]
impl<V: Validator> Validator for RetryingValidator<V> {
    async fn get_delivery_by_order(&self, order_id: Uuid) -> ValidationResult<DeliveryFacts> {
        let mut attempts = 0;
        let mut delay = self.policy.initial_delay;

        loop {
            attempts += 1;

            match self.inner.get_delivery_by_order(order_id).await {
                Ok(facts) => return Ok(facts),
                Err(ValidationError::NotFound(id)) => return Err(ValidationError::NotFound(id)),
                Err(ValidationError::Unavailable { .. }) => {
                    if attempts > self.policy.max_retries {
                        return Err(ValidationError::Unavailable { attempts });
                    }

                    warn!(
                        order_id = %order_id,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "delivery lookup unavailable, retrying"
                    );
                    tokio::time::sleep(delay).await;

                    // Exponential backoff
                    delay = (delay * 2).min(self.policy.max_delay);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Test double failing a fixed number of times before answering
    struct FlakyValidator {
        failures_before_success: u32,
        calls: AtomicU32,
        facts: DeliveryFacts,
    }

    impl FlakyValidator {
        fn new(failures_before_success: u32) -> Self {
            Self {
                failures_before_success,
                calls: AtomicU32::new(0),
                facts: DeliveryFacts {
                    order_id: Uuid::new_v4(),
                    customer_id: Uuid::new_v4(),
                    restaurant_id: Uuid::new_v4(),
                    driver_id: Some(Uuid::new_v4()),
                    delivered: true,
                },
            }
        }
    }

    #[async_trait]
    impl Validator for FlakyValidator {
        async fn get_delivery_by_order(&self, _order_id: Uuid) -> ValidationResult<DeliveryFacts> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(ValidationError::Unavailable { attempts: 1 })
            } else {
                Ok(self.facts)
            }
        }
    }

    struct NotFoundValidator {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Validator for NotFoundValidator {
        async fn get_delivery_by_order(&self, order_id: Uuid) -> ValidationResult<DeliveryFacts> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ValidationError::NotFound(order_id))
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let inner = FlakyValidator::new(2);
        let validator = RetryingValidator::new(inner, fast_policy());

        let facts = validator.get_delivery_by_order(Uuid::new_v4()).await.unwrap();
        assert!(facts.delivered);
        assert_eq!(validator.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_bounded_retries_surface_unavailable() {
        let inner = FlakyValidator::new(10);
        let validator = RetryingValidator::new(inner, fast_policy());

        let err = validator
            .get_delivery_by_order(Uuid::new_v4())
            .await
            .unwrap_err();
        // 1 initial attempt + 2 retries.
        assert_eq!(err, ValidationError::Unavailable { attempts: 3 });
        assert_eq!(validator.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let inner = NotFoundValidator {
            calls: AtomicU32::new(0),
        };
        let validator = RetryingValidator::new(inner, fast_policy());

        let order_id = Uuid::new_v4();
        let err = validator.get_delivery_by_order(order_id).await.unwrap_err();
        assert_eq!(err, ValidationError::NotFound(order_id));
        assert_eq!(validator.inner.calls.load(Ordering::SeqCst), 1);
    }
}
