//! Command handlers for the two core flows.

mod finalize_purchase;
mod sync_user;

pub use finalize_purchase::{
    FinalizePurchaseCommand, FinalizePurchaseHandler, FinalizePurchaseResult,
};
pub use sync_user::{SyncError, SyncUserHandler};
