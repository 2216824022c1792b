//! Payment configuration (Stripe)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration for the Stripe integration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key (sk_test_... or sk_live_...)
    pub api_key: SecretString,

    /// Webhook endpoint signing secret (whsec_...)
    pub webhook_secret: SecretString,

    /// Stripe API base URL, overridable for tests
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Application identifier expected in checkout session metadata.
    /// Sessions carrying a different value belong to a sibling app
    /// sharing the Stripe account and are acknowledged untouched.
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// HTTP timeout for Stripe API calls, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl PaymentConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let key = self.api_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__API_KEY"));
        }
        if !key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        let secret = self.webhook_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }
        if !secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        Ok(())
    }
}

fn default_api_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_app_id() -> String {
    "social-profile-marketplace".to_string()
}

fn default_timeout() -> u64 {
    10
}
