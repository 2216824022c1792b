//! Background job configuration (Inngest)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the background job dispatcher
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Inngest event API base URL
    #[serde(default = "default_event_api_url")]
    pub event_api_url: String,

    /// Event key used to authorize event submission
    pub event_key: SecretString,

    /// HTTP timeout for event submission, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl JobsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.event_api_url.is_empty() {
            return Err(ValidationError::MissingRequired("JOBS__EVENT_API_URL"));
        }
        if self.event_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("JOBS__EVENT_KEY"));
        }
        Ok(())
    }
}

fn default_event_api_url() -> String {
    "https://inn.gs".to_string()
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_an_event_key() {
        let config = JobsConfig {
            event_api_url: default_event_api_url(),
            event_key: SecretString::new(String::new()),
            timeout_secs: default_timeout(),
        };
        assert!(config.validate().is_err());
    }
}
