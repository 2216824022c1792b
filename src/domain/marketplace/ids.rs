//! Identifier newtypes for marketplace records.
//!
//! Identifiers originate outside this service (the identity provider issues
//! user ids, the record store issues transaction/listing ids), so they are
//! opaque non-empty strings rather than UUIDs.

use serde::{Deserialize, Serialize};

use super::errors::IdError;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new id, rejecting empty or whitespace-only input.
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(IdError::Empty(stringify!($name)));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id! {
    /// Identity-provider subject id (e.g. `user_2abc...`).
    UserId
}

string_id! {
    /// Record-store id of a purchase transaction.
    TransactionId
}

string_id! {
    /// Record-store id of a marketplace listing.
    ListingId
}
