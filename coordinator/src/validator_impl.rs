//! In-process delivery validator
//!
//! Deployment without a network partition between the rating and delivery
//! services: the `Validator` capability is answered directly from the
//! delivery pool's authoritative slot record plus the ledger's order state.

use async_trait::async_trait;
use delivery_pool::DeliveryPool;
use order_ledger::{OrderLedger, OrderStatus};
use rating_service::{DeliveryFacts, ValidationError, ValidationResult, Validator};
use std::sync::Arc;
use uuid::Uuid;

/// Validator backed by the local pool and ledger
pub struct LocalValidator {
    pool: Arc<DeliveryPool>,
    ledger: Arc<OrderLedger>,
}

impl LocalValidator {
    /// Create a validator over the local services
    pub fn new(pool: Arc<DeliveryPool>, ledger: Arc<OrderLedger>) -> Self {
        Self { pool, ledger }
    }
}

#[async_trait]
impl Validator for LocalValidator {
    async fn get_delivery_by_order(&self, order_id: Uuid) -> ValidationResult<DeliveryFacts> {
        // No slot means the order never reached preparation: an
        // authoritative negative, not a fault.
        let slot = self
            .pool
            .get_delivery(order_id)
            .map_err(|_| ValidationError::NotFound(order_id))?;

        let order = self
            .ledger
            .get_order(order_id)
            .map_err(|_| ValidationError::NotFound(order_id))?;

        Ok(DeliveryFacts {
            order_id: slot.order_id,
            customer_id: order.customer_id,
            restaurant_id: order.restaurant_id,
            driver_id: order.driver_id,
            delivered: order.status == OrderStatus::Delivered,
        })
    }
}
