//! Identity provider port - the canonical user directory.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::marketplace::UserId;

/// An email address record in the provider's directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailAddress {
    pub id: String,
    pub email_address: String,
}

/// Canonical user profile as held by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityProfile {
    pub id: String,

    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,

    #[serde(default)]
    pub primary_email_address_id: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub image_url: String,
}

impl IdentityProfile {
    /// Resolves the primary email: the address matching
    /// `primary_email_address_id`, falling back to the first one listed.
    pub fn primary_email(&self) -> Option<&str> {
        if let Some(primary_id) = &self.primary_email_address_id {
            if let Some(found) = self.email_addresses.iter().find(|e| &e.id == primary_id) {
                return Some(&found.email_address);
            }
        }
        self.email_addresses.first().map(|e| e.email_address.as_str())
    }

    /// Assembles a display name from first and last name.
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{} {}", first, last).trim().to_string()
    }
}

/// Errors from identity provider lookups.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("user {0} not found in identity provider")]
    UserNotFound(String),

    #[error("identity provider call failed: {0}")]
    Call(String),

    #[error("unexpected identity provider response: {0}")]
    InvalidResponse(String),
}

/// Port for fetching canonical user profiles.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_user(&self, user_id: &UserId) -> Result<IdentityProfile, IdentityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> IdentityProfile {
        IdentityProfile {
            id: "user_1".to_string(),
            email_addresses: vec![
                EmailAddress {
                    id: "idn_1".to_string(),
                    email_address: "first@example.com".to_string(),
                },
                EmailAddress {
                    id: "idn_2".to_string(),
                    email_address: "primary@example.com".to_string(),
                },
            ],
            primary_email_address_id: Some("idn_2".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            image_url: "https://img.example.com/u1.png".to_string(),
        }
    }

    #[test]
    fn primary_email_prefers_primary_id() {
        assert_eq!(profile().primary_email(), Some("primary@example.com"));
    }

    #[test]
    fn primary_email_falls_back_to_first_address() {
        let mut p = profile();
        p.primary_email_address_id = None;
        assert_eq!(p.primary_email(), Some("first@example.com"));

        p.email_addresses.clear();
        assert_eq!(p.primary_email(), None);
    }

    #[test]
    fn display_name_joins_and_trims() {
        assert_eq!(profile().display_name(), "Ada Lovelace");

        let mut p = profile();
        p.last_name = None;
        assert_eq!(p.display_name(), "Ada");

        p.first_name = None;
        assert_eq!(p.display_name(), "");
    }

    #[test]
    fn deserializes_directory_response() {
        let json = serde_json::json!({
            "id": "user_9",
            "email_addresses": [
                { "id": "idn_9", "email_address": "nine@example.com" }
            ],
            "primary_email_address_id": "idn_9",
            "first_name": "Nine",
            "last_name": null,
            "image_url": "https://img.example.com/u9.png"
        });

        let p: IdentityProfile = serde_json::from_value(json).unwrap();
        assert_eq!(p.primary_email(), Some("nine@example.com"));
        assert_eq!(p.display_name(), "Nine");
    }
}
