//! Error types for the delivery pool

use thiserror::Error;
use uuid::Uuid;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Delivery pool errors
///
/// `AlreadyClaimed` and `NotClaimOwner` are expected contention outcomes,
/// not faults: callers treat them as normal control flow.
#[derive(Error, Debug)]
pub enum Error {
    /// Another driver holds the slot
    #[error("Delivery already claimed for order {order_id}")]
    AlreadyClaimed {
        /// The contested order
        order_id: Uuid,
    },

    /// Caller does not hold the claim
    #[error("Driver {driver_id} does not hold the claim for order {order_id}")]
    NotClaimOwner {
        /// The order in question
        order_id: Uuid,
        /// The rejected driver
        driver_id: Uuid,
    },

    /// No slot exists for the order
    #[error("No delivery slot for order {0}")]
    SlotNotFound(Uuid),

    /// A slot already exists for the order (slots are 1:1 with orders)
    #[error("Delivery slot already open for order {0}")]
    SlotAlreadyOpen(Uuid),

    /// Ledger transition failed
    #[error("Ledger error: {0}")]
    Ledger(#[from] order_ledger::Error),
}
