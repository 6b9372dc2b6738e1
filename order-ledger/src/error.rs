//! Error types for the order ledger

use crate::types::{OrderStatus, Trigger};
use thiserror::Error;
use uuid::Uuid;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Trigger is not legal from the order's current status
    #[error("Invalid transition: trigger {trigger} not legal from status {current}")]
    InvalidTransition {
        /// Status the order was in when the trigger arrived
        current: OrderStatus,
        /// The rejected trigger
        trigger: Trigger,
    },

    /// Order does not exist
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    /// Actor is not allowed to submit this trigger
    #[error("Actor {actor} not authorized for trigger {trigger}: {details}")]
    UnauthorizedActor {
        /// The rejected trigger
        trigger: Trigger,
        /// Kind of the submitting actor
        actor: &'static str,
        /// Why the actor was rejected
        details: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
