//! Stripe API client.
//!
//! Implements the `PaymentProvider` port over the Stripe REST API. The only
//! call the purchase finalizer needs is listing the checkout sessions that
//! belong to a payment intent, which is where the application-supplied
//! metadata lives.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::PaymentConfig;
use crate::ports::{CheckoutSession, PaymentError, PaymentProvider};

/// Stripe client configuration.
#[derive(Clone)]
pub struct StripeClientConfig {
    api_key: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl StripeClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&PaymentConfig> for StripeClientConfig {
    fn from(config: &PaymentConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_base_url: config.api_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Stripe implementation of the PaymentProvider port.
pub struct StripeClient {
    config: StripeClientConfig,
    http_client: reqwest::Client,
}

impl StripeClient {
    pub fn new(config: StripeClientConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Call(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

/// Stripe list envelope (`{"object": "list", "data": [...]}`).
///
/// The envelope always carries `data`, so no field default is needed (a
/// default would also impose a `T: Default` bound the session type lacks).
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

/// Checkout session as returned by the Stripe API, reduced to the fields
/// the finalizer reads.
#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    id: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl From<StripeCheckoutSession> for CheckoutSession {
    fn from(session: StripeCheckoutSession) -> Self {
        Self {
            id: session.id,
            metadata: session.metadata,
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn list_checkout_sessions(
        &self,
        payment_intent_id: &str,
    ) -> Result<Vec<CheckoutSession>, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("payment_intent", payment_intent_id)])
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::Call(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                error = %error_text,
                "Stripe checkout session listing failed"
            );
            return Err(PaymentError::Call(format!(
                "Stripe API error ({}): {}",
                status, error_text
            )));
        }

        let list: ListResponse<StripeCheckoutSession> = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        Ok(list.data.into_iter().map(CheckoutSession::from).collect())
    }
}
