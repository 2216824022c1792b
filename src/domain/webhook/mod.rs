//! Payment-provider webhook model.
//!
//! Signature verification, typed event decoding, and the webhook error
//! taxonomy with its HTTP mapping. Verification must succeed before any
//! part of the payload is acted upon.

mod errors;
mod event;
mod signature;

pub use errors::WebhookError;
pub use event::{PaymentIntent, WebhookEvent, WebhookEventData, WebhookEventKind};
pub use signature::{SignatureHeader, WebhookVerifier};

#[cfg(test)]
pub use signature::compute_test_signature;
