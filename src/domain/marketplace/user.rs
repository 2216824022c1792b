//! Local user record, lazily provisioned from the identity provider.

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// A marketplace user.
///
/// The id equals the identity provider's subject id. Records are created by
/// the identity sync gate on first authenticated request; `earned` is only
/// ever incremented, by the purchase finalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub image: String,

    /// Running total of seller proceeds, in currency minor units.
    pub earned: i64,
}

/// Fields required to provision a user from the identity provider's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub image: String,
}

impl NewUser {
    /// Materializes the record as it will exist after creation.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            image: self.image,
            earned: 0,
        }
    }
}
