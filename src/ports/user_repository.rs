//! User store port used by the identity sync gate.

use async_trait::async_trait;

use crate::domain::marketplace::{NewUser, StoreError, User, UserId};

/// Port over the record store for local user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Creates the record if absent. Two concurrent first-sight requests for
    /// the same id must both succeed, resolving to a single stored record.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
}
