//! Listing lifecycle status.

use serde::{Deserialize, Serialize};

/// Listing lifecycle status. The only transition this service performs is
/// `Active -> Sold`, after the owning transaction is marked paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Sold => "sold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "sold" => Some(Self::Sold),
            _ => None,
        }
    }
}
