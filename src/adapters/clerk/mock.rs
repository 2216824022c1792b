//! Mock authentication adapters for testing.
//!
//! Implement the `SessionValidator` and `IdentityProvider` ports without a
//! real Clerk instance.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::marketplace::UserId;
use crate::ports::{
    AuthError, AuthSession, IdentityError, IdentityProfile, IdentityProvider, SessionValidator,
};

/// Mock session validator for testing.
///
/// Stores a map of tokens to sessions. Unknown tokens return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthSession>>,
    /// Optional error to return for all validations (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a session.
    pub fn with_session(self, token: impl Into<String>, session: AuthSession) -> Self {
        self.tokens.write().unwrap().insert(token.into(), session);
        self
    }

    /// Adds a valid token for a user with no plan claims.
    pub fn with_test_user(self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        let session = AuthSession::new(UserId::new(user_id.into()).unwrap(), vec![]);
        self.with_session(token, session)
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, session: AuthSession) {
        self.tokens.write().unwrap().insert(token.into(), session);
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        self.tokens.write().unwrap().remove(token);
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthSession, AuthError> {
        if let Some(error) = self.force_error.read().unwrap().clone() {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Mock identity provider for testing.
///
/// Stores a map of user ids to profiles. Unknown ids return `UserNotFound`.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    profiles: RwLock<HashMap<String, IdentityProfile>>,
    force_error: RwLock<Option<String>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a profile to the directory.
    pub fn with_profile(self, profile: IdentityProfile) -> Self {
        self.profiles
            .write()
            .unwrap()
            .insert(profile.id.clone(), profile);
        self
    }

    /// Forces all lookups to fail with a call error.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        *self.force_error.write().unwrap() = Some(message.into());
        self
    }

    /// Adds a profile at runtime.
    pub fn add_profile(&self, profile: IdentityProfile) {
        self.profiles
            .write()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn fetch_user(&self, user_id: &UserId) -> Result<IdentityProfile, IdentityError> {
        if let Some(message) = self.force_error.read().unwrap().clone() {
            return Err(IdentityError::Call(message));
        }

        self.profiles
            .read()
            .unwrap()
            .get(user_id.as_str())
            .cloned()
            .ok_or_else(|| IdentityError::UserNotFound(user_id.to_string()))
    }
}
