//! QuickBite Fulfillment Coordinator
//!
//! Entry point sequencing actor actions across the order ledger, the
//! delivery pool and the rating service.
//!
//! # Example
//!
//! ```no_run
//! use coordinator::{Config, Coordinator};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> coordinator::Result<()> {
//!     let coordinator = Coordinator::new(Config::default());
//!
//!     let order = coordinator.checkout(Uuid::new_v4(), Uuid::new_v4());
//!     coordinator.confirm_payment(order.order_id).await?;
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod error;
pub mod facade;
pub mod validator_impl;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use facade::Coordinator;
pub use validator_impl::LocalValidator;
