//! Job emission port.
//!
//! The purchase finalizer emits a named job consumed by the notification
//! system, which delivers purchased credentials to the buyer's email. No
//! response is awaited for business logic, but dispatch failure must be
//! observable so the webhook can fail and be redelivered.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::domain::marketplace::Transaction;

/// Job name for a finalized purchase.
pub const PURCHASE_COMPLETED_JOB: &str = "app/purchase";

/// A named job event with a JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub name: String,
    pub data: serde_json::Value,
}

impl JobEvent {
    pub fn new(name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// The purchase-completed job, carrying the finalized transaction.
    pub fn purchase_completed(transaction: &Transaction) -> Self {
        Self::new(
            PURCHASE_COMPLETED_JOB,
            json!({ "transaction": transaction }),
        )
    }
}

/// Job dispatch failure.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("job dispatch failed: {0}")]
    Dispatch(String),
}

/// Port for emitting jobs to the asynchronous job system.
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    async fn dispatch(&self, event: JobEvent) -> Result<(), JobError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::marketplace::{ListingId, TransactionId, UserId};

    #[test]
    fn purchase_completed_job_carries_transaction() {
        let tx = Transaction {
            id: TransactionId::new("t1").unwrap(),
            listing_id: ListingId::new("l1").unwrap(),
            owner_id: UserId::new("u1").unwrap(),
            amount: 500,
            is_paid: true,
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
        };

        let event = JobEvent::purchase_completed(&tx);

        assert_eq!(event.name, PURCHASE_COMPLETED_JOB);
        assert_eq!(event.data["transaction"]["id"], "t1");
        assert_eq!(event.data["transaction"]["isPaid"], true);
        assert_eq!(event.data["transaction"]["amount"], 500);
    }
}
