//! QuickBite Delivery Pool & Claim Broker
//!
//! Owns delivery slots and arbitrates competitive claims by drivers.
//!
//! # Architecture
//!
//! - **Atomic claim**: the conditional check and the write on `claimed_by`
//!   happen under one sharded-map entry guard, never check-then-act
//! - **Compensation**: a claim whose ledger transition fails reopens the
//!   slot deterministically before the error surfaces
//! - **Snapshot listing**: `list_unclaimed` is a point-in-time read; stale
//!   listings are resolved by the claim itself

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod broker;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod types;

// Re-exports
pub use broker::ClaimBroker;
pub use error::{Error, Result};
pub use metrics::Metrics;
pub use pool::DeliveryPool;
pub use types::{DeliverySlot, GeoBounds, GeoPoint};
