//! Record-store and identifier error types.

use thiserror::Error;

/// Error constructing an identifier.
#[derive(Debug, Error)]
pub enum IdError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Errors surfaced by record-store operations.
///
/// Store failures are transient from the webhook's perspective: they map to
/// HTTP 500 so the payment provider redelivers the event.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn database(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}
