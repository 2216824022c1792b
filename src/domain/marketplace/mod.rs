//! Marketplace records: transactions, listings, users.
//!
//! These are the three records mutated by the purchase finalizer and the
//! identity sync gate. All state transitions are one-way:
//!
//! - `Transaction.is_paid`: false -> true, never reverts
//! - `Listing.status`: active -> sold
//! - `User.earned`: monotonically non-decreasing

mod errors;
mod ids;
mod listing;
mod plan;
mod transaction;
mod user;

pub use errors::{IdError, StoreError};
pub use ids::{ListingId, TransactionId, UserId};
pub use listing::ListingStatus;
pub use plan::Plan;
pub use transaction::Transaction;
pub use user::{NewUser, User};
