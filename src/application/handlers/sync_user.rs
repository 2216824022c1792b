//! SyncUserHandler - lazy provisioning of local user records.
//!
//! Called by the identity sync gate on every authenticated request. If the
//! caller has no local record yet, the canonical profile is fetched from the
//! identity provider and a record is created. Failures block the request
//! (fail closed): downstream route logic may assume the record exists.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::marketplace::{NewUser, StoreError, User, UserId};
use crate::ports::{IdentityError, IdentityProvider, UserRepository};

/// Lazy-sync failures. All of them reject the request at the gate.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The provider's profile carries no email address; a local record
    /// cannot be provisioned from it.
    #[error("identity profile for {0} has no email address")]
    ProfileIncomplete(UserId),
}

/// Handler ensuring a local user record exists for an authenticated caller.
pub struct SyncUserHandler {
    users: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl SyncUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { users, identity }
    }

    /// Returns the local user record, creating it on first sight.
    pub async fn ensure_user(&self, user_id: &UserId) -> Result<User, SyncError> {
        if let Some(user) = self.users.find_by_id(user_id).await? {
            return Ok(user);
        }

        let profile = self.identity.fetch_user(user_id).await?;
        let email = profile
            .primary_email()
            .ok_or_else(|| SyncError::ProfileIncomplete(user_id.clone()))?
            .to_string();

        let user = self
            .users
            .create(NewUser {
                id: user_id.clone(),
                email,
                name: profile.display_name(),
                image: profile.image_url.clone(),
            })
            .await?;

        tracing::info!(user_id = %user_id, "provisioned local user from identity provider");

        Ok(user)
    }
}
