//! Purchase transaction record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ListingId, TransactionId, UserId};

/// A purchase transaction created when a buyer initiates checkout.
///
/// The only mutation this service performs is the paid transition, and it is
/// applied as a conditional update at the store layer so that duplicate
/// webhook deliveries cannot claim the same transaction twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,

    /// Listing being purchased.
    pub listing_id: ListingId,

    /// Seller receiving the funds.
    pub owner_id: UserId,

    /// Price in currency minor units.
    pub amount: i64,

    /// Starts false, transitions to true at most once.
    pub is_paid: bool,

    pub created_at: DateTime<Utc>,
}
