//! Session validation port - the request's authentication context.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::marketplace::UserId;

/// A validated authentication context.
///
/// Exposes the caller's subject id and an entitlement check over the plan
/// claims carried by the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: UserId,
    plans: Vec<String>,
}

impl AuthSession {
    pub fn new(user_id: UserId, plans: Vec<String>) -> Self {
        Self { user_id, plans }
    }

    /// Entitlement-check capability: does the caller hold the named plan?
    pub fn has_plan(&self, plan: &str) -> bool {
        self.plans.iter().any(|p| p == plan)
    }
}

/// Token validation failures.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Port for validating session tokens.
///
/// Provider-agnostic: the middleware does not change whether the
/// implementation talks to Clerk or is a test mock.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<AuthSession, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_plan_checks_claims() {
        let session = AuthSession::new(
            UserId::new("user_1").unwrap(),
            vec!["premium".to_string()],
        );

        assert!(session.has_plan("premium"));
        assert!(!session.has_plan("enterprise"));
    }

    #[test]
    fn session_without_plans_has_none() {
        let session = AuthSession::new(UserId::new("user_2").unwrap(), vec![]);
        assert!(!session.has_plan("premium"));
    }
}
