//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `delivery_slots_opened_total` - Total slots opened
//! - `delivery_claims_won_total` - Claims that took an open slot
//! - `delivery_claims_contended_total` - Claims lost to a holder or archived slot
//! - `delivery_claims_released_total` - Claims rolled back by compensation

use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Total slots opened
    pub slots_opened: IntCounter,

    /// Claims that won an open slot
    pub claims_won: IntCounter,

    /// Claims rejected with `AlreadyClaimed`
    pub claims_contended: IntCounter,

    /// Claims released by the compensation path
    pub claims_released: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let slots_opened =
            IntCounter::new("delivery_slots_opened_total", "Total slots opened")?;
        registry.register(Box::new(slots_opened.clone()))?;

        let claims_won = IntCounter::new(
            "delivery_claims_won_total",
            "Claims that took an open slot",
        )?;
        registry.register(Box::new(claims_won.clone()))?;

        let claims_contended = IntCounter::new(
            "delivery_claims_contended_total",
            "Claims lost to a holder or archived slot",
        )?;
        registry.register(Box::new(claims_contended.clone()))?;

        let claims_released = IntCounter::new(
            "delivery_claims_released_total",
            "Claims rolled back by compensation",
        )?;
        registry.register(Box::new(claims_released.clone()))?;

        Ok(Self {
            slots_opened,
            claims_won,
            claims_contended,
            claims_released,
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
