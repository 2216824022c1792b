//! Entitlement tier attached to authenticated requests.

use serde::{Deserialize, Serialize};

/// Coarse access level derived from the caller's subscription state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Premium,
}

impl Plan {
    /// Maps the auth context's premium entitlement check to a tier.
    pub fn from_premium(has_premium: bool) -> Self {
        if has_premium {
            Self::Premium
        } else {
            Self::Free
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }
}
