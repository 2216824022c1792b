//! Clerk backend API client for the user directory.
//!
//! Implements the `IdentityProvider` port: the identity sync gate fetches the
//! canonical profile from here when a caller has no local record yet.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::AuthConfig;
use crate::domain::marketplace::UserId;
use crate::ports::{IdentityError, IdentityProfile, IdentityProvider};

/// Clerk implementation of the IdentityProvider port.
pub struct ClerkUserDirectory {
    api_url: String,
    secret_key: SecretString,
    http_client: reqwest::Client,
}

impl ClerkUserDirectory {
    pub fn new(
        api_url: impl Into<String>,
        secret_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Call(e.to_string()))?;

        Ok(Self {
            api_url: api_url.into(),
            secret_key,
            http_client,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, IdentityError> {
        Self::new(
            config.api_url.clone(),
            config.secret_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl IdentityProvider for ClerkUserDirectory {
    async fn fetch_user(&self, user_id: &UserId) -> Result<IdentityProfile, IdentityError> {
        let url = format!(
            "{}/v1/users/{}",
            self.api_url.trim_end_matches('/'),
            user_id
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| IdentityError::Call(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IdentityError::UserNotFound(user_id.to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                error = %error_text,
                "Clerk user lookup failed"
            );
            return Err(IdentityError::Call(format!(
                "Clerk API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))
    }
}

impl std::fmt::Debug for ClerkUserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkUserDirectory")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}
