//! Payment provider port.
//!
//! Webhook signature verification lives in `domain::webhook`; this port
//! covers the provider API calls the finalizer makes after verification.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// Metadata key carrying the record-store transaction id.
pub const METADATA_TRANSACTION_ID: &str = "transactionId";

/// Metadata key tagging which application created the session.
pub const METADATA_APP_ID: &str = "appId";

/// A provider-side checkout session correlating a payment attempt with
/// application-supplied metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Provider session id (`cs_...`).
    pub id: String,

    /// Application-supplied metadata attached at checkout creation.
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn transaction_id(&self) -> Option<&str> {
        self.metadata.get(METADATA_TRANSACTION_ID).map(String::as_str)
    }

    pub fn app_id(&self) -> Option<&str> {
        self.metadata.get(METADATA_APP_ID).map(String::as_str)
    }
}

/// Errors from payment provider API calls.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("provider call failed: {0}")]
    Call(String),

    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

/// Port for payment provider API access.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Lists the checkout sessions associated with a payment intent.
    async fn list_checkout_sessions(
        &self,
        payment_intent_id: &str,
    ) -> Result<Vec<CheckoutSession>, PaymentError>;
}
