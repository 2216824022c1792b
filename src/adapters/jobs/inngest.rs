//! Inngest implementation of the job dispatcher port.
//!
//! Sends named events to the Inngest event API; functions subscribed to the
//! event name run asynchronously on their infrastructure. Dispatch failures
//! surface as `JobError` so the webhook can fail and be redelivered.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::JobsConfig;
use crate::ports::{JobDispatcher, JobError, JobEvent};

/// Inngest dispatcher configuration.
#[derive(Clone)]
pub struct InngestConfig {
    event_api_url: String,
    event_key: SecretString,
    timeout: Duration,
}

impl InngestConfig {
    pub fn new(event_key: impl Into<String>) -> Self {
        Self {
            event_api_url: "https://inn.gs".to_string(),
            event_key: SecretString::new(event_key.into()),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom event API base URL (for testing or local dev server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.event_api_url = url.into();
        self
    }
}

impl From<&JobsConfig> for InngestConfig {
    fn from(config: &JobsConfig) -> Self {
        Self {
            event_api_url: config.event_api_url.clone(),
            event_key: config.event_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Wire format for an Inngest event submission.
#[derive(Debug, Serialize)]
struct EventPayload<'a> {
    name: &'a str,
    data: &'a serde_json::Value,
}

/// Inngest implementation of the JobDispatcher port.
pub struct InngestDispatcher {
    config: InngestConfig,
    http_client: reqwest::Client,
}

impl InngestDispatcher {
    pub fn new(config: InngestConfig) -> Result<Self, JobError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JobError::Dispatch(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl JobDispatcher for InngestDispatcher {
    async fn dispatch(&self, event: JobEvent) -> Result<(), JobError> {
        let url = format!(
            "{}/e/{}",
            self.config.event_api_url.trim_end_matches('/'),
            self.config.event_key.expose_secret()
        );

        let payload = EventPayload {
            name: &event.name,
            data: &event.data,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| JobError::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                job = %event.name,
                status = %status,
                error = %error_text,
                "Job dispatch failed"
            );
            return Err(JobError::Dispatch(format!(
                "event API returned {}: {}",
                status, error_text
            )));
        }

        tracing::info!(job = %event.name, "Job dispatched");

        Ok(())
    }
}

impl std::fmt::Debug for InngestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InngestDispatcher")
            .field("event_api_url", &self.config.event_api_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_hosted_event_api() {
        let config = InngestConfig::new("evt_key");
        assert_eq!(config.event_api_url, "https://inn.gs");
    }

    #[test]
    fn event_payload_serializes_name_and_data() {
        let data = serde_json::json!({ "transaction": { "id": "t1" } });
        let payload = EventPayload {
            name: "app/purchase",
            data: &data,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["name"], "app/purchase");
        assert_eq!(json["data"]["transaction"]["id"], "t1");
    }
}
