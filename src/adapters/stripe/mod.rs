//! Stripe adapter for the payment provider port.

mod client;

pub use client::{StripeClient, StripeClientConfig};
