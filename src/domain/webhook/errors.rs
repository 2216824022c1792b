//! Webhook processing error taxonomy.
//!
//! The HTTP status decides the payment provider's retry behavior: 2xx
//! acknowledges, 4xx stops redelivery, 5xx triggers redelivery. The service
//! performs no internal retries; provider redelivery is the recovery path.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook verification and purchase finalization.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature verification failed.
    #[error("signature verification failed")]
    InvalidSignature,

    /// Event is older than the replay window.
    #[error("timestamp outside of tolerance window")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock-skew tolerance.
    #[error("timestamp in the future")]
    InvalidTimestamp,

    /// Failed to parse the signature header or the payload.
    #[error("parse error: {0}")]
    ParseError(String),

    /// A succeeded-payment event had no associated checkout session.
    /// Inconsistent upstream state, surfaced as a server error.
    #[error("no checkout session found for payment intent {0}")]
    SessionNotFound(String),

    /// Session metadata referenced a transaction this store does not have.
    #[error("transaction {0} not found")]
    TransactionNotFound(String),

    /// Payment provider API call failed.
    #[error("payment provider call failed: {0}")]
    Provider(String),

    /// Record store operation failed.
    #[error("store failure: {0}")]
    Store(String),

    /// Purchase-completed job could not be dispatched.
    #[error("job dispatch failed: {0}")]
    JobDispatch(String),
}

impl WebhookError {
    /// True if the payment provider should redeliver the event.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound(_) | Self::Provider(_) | Self::Store(_) | Self::JobDispatch(_)
        )
    }

    /// Maps the error to the HTTP status returned at the webhook boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Verification failures reject the delivery outright.
            Self::InvalidSignature
            | Self::TimestampOutOfRange
            | Self::InvalidTimestamp
            | Self::ParseError(_) => StatusCode::BAD_REQUEST,

            // Data inconsistency between provider and store.
            Self::TransactionNotFound(_) => StatusCode::NOT_FOUND,

            // Transient failures: provider redelivery drives recovery.
            Self::SessionNotFound(_)
            | Self::Provider(_)
            | Self::Store(_)
            | Self::JobDispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
