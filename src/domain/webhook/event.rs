//! Typed webhook event payloads.
//!
//! Only the fields this service acts on are captured; the rest of the
//! provider's event schema is ignored.

use serde::{Deserialize, Serialize};

/// A verified webhook event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEvent {
    /// Provider event id (`evt_...`).
    pub id: String,

    /// Event type tag (e.g. "payment_intent.succeeded").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp at which the event was created.
    pub created: i64,

    pub data: WebhookEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,
}

/// Container for the event-specific object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEventData {
    /// Polymorphic payload, shaped by `event_type`.
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// Parses the event type into the router's dispatch enum.
    pub fn kind(&self) -> WebhookEventKind {
        WebhookEventKind::from_str(&self.event_type)
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// Event types this service dispatches on.
///
/// Anything unknown is acknowledged without side effects so the provider
/// does not endlessly retry event types we intentionally ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventKind {
    PaymentIntentSucceeded,
    Unknown(String),
}

impl WebhookEventKind {
    pub fn from_str(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// The payment-intent object carried by a `payment_intent.succeeded` event.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    /// Provider payment-intent id (`pi_...`).
    pub id: String,
}
