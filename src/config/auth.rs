//! Authentication configuration (Clerk)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Authentication configuration for the Clerk identity provider
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Clerk backend API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Clerk secret key for backend API calls
    pub secret_key: SecretString,

    /// JWKS endpoint for session token verification
    pub jwks_url: String,

    /// Expected `iss` claim on session tokens
    pub issuer: String,

    /// Comma-separated list of admin email addresses
    #[serde(default)]
    pub admin_emails: String,

    /// HTTP timeout for identity provider calls, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AuthConfig {
    /// Parsed admin allow-list. Entries are trimmed, empty ones dropped;
    /// matching against the caller's email is case-sensitive.
    pub fn admin_email_list(&self) -> Vec<String> {
        self.admin_emails
            .split(',')
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.secret_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__SECRET_KEY"));
        }
        if self.jwks_url.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWKS_URL"));
        }
        if self.issuer.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ISSUER"));
        }
        if production && !self.api_url.starts_with("https://") {
            return Err(ValidationError::IdentityApiMustBeHttps);
        }
        Ok(())
    }
}

fn default_api_url() -> String {
    "https://api.clerk.com".to_string()
}

fn default_timeout() -> u64 {
    10
}
