//! QuickBite Order Ledger
//!
//! Authoritative owner of order status for the fulfillment core.
//!
//! # Architecture
//!
//! - **Closed transition table**: one exhaustively-matched function owns
//!   every legal edge; there is no other way to mutate a status
//! - **Per-order serialization**: a per-key mutex sequences concurrent
//!   triggers for the same order
//! - **Idempotent triggers**: at-most-once delivery re-submissions observe
//!   the committed outcome without side effects
//! - **Audit history**: every commit gets a per-order sequence number and
//!   is published best-effort to a notification sink

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod notify;
pub mod types;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::OrderLedger;
pub use notify::{ChannelSink, NotificationSink, StatusChange, TracingSink};
pub use types::{
    transition, Actor, Order, OrderStatus, TransitionOutcome, TransitionRecord, Trigger,
};
