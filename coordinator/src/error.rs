//! Error types for the coordinator facade

use thiserror::Error;

/// Result type for coordinator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coordinator errors
///
/// The facade never swallows a dependency failure: the first hard error is
/// surfaced after any required compensation has completed downstream.
#[derive(Error, Debug)]
pub enum Error {
    /// Order ledger failure
    #[error(transparent)]
    Ledger(#[from] order_ledger::Error),

    /// Delivery pool / claim broker failure
    #[error(transparent)]
    Pool(#[from] delivery_pool::Error),

    /// Rating subsystem failure
    #[error(transparent)]
    Rating(#[from] rating_service::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
