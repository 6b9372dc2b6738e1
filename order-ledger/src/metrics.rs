//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `orders_created_total` - Total orders opened in the ledger
//! - `order_transitions_total` - Total committed transitions
//! - `order_transitions_idempotent_total` - Re-submissions answered idempotently
//! - `order_transitions_rejected_total` - Triggers rejected as invalid

use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Total orders created
    pub orders_created: IntCounter,

    /// Total committed transitions
    pub transitions_committed: IntCounter,

    /// Idempotent re-submissions
    pub transitions_idempotent: IntCounter,

    /// Rejected invalid triggers
    pub transitions_rejected: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let orders_created =
            IntCounter::new("orders_created_total", "Total orders opened in the ledger")?;
        registry.register(Box::new(orders_created.clone()))?;

        let transitions_committed =
            IntCounter::new("order_transitions_total", "Total committed transitions")?;
        registry.register(Box::new(transitions_committed.clone()))?;

        let transitions_idempotent = IntCounter::new(
            "order_transitions_idempotent_total",
            "Re-submissions answered idempotently",
        )?;
        registry.register(Box::new(transitions_idempotent.clone()))?;

        let transitions_rejected = IntCounter::new(
            "order_transitions_rejected_total",
            "Triggers rejected as invalid",
        )?;
        registry.register(Box::new(transitions_rejected.clone()))?;

        Ok(Self {
            orders_created,
            transitions_committed,
            transitions_idempotent,
            transitions_rejected,
            registry,
        })
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
