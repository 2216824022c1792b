//! Transaction store port used by the purchase finalizer.

use async_trait::async_trait;

use crate::domain::marketplace::{StoreError, Transaction, TransactionId};

/// Result of the conditional paid transition.
///
/// Folding the existence lookup and the idempotency guard into one atomic
/// check-and-set closes the read-then-write race between duplicate
/// deliveries: at most one delivery observes `Claimed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkPaidOutcome {
    /// This caller won the check-and-set; the transaction is now paid.
    Claimed(Transaction),
    /// The transaction was already paid by an earlier delivery.
    ///
    /// `effects_applied` tells the caller whether that delivery got as far
    /// as the purchase effects. When it did not (it failed between the claim
    /// and the effects), the redelivery must finish the remaining steps
    /// instead of acknowledging a duplicate.
    AlreadyPaid {
        transaction: Transaction,
        effects_applied: bool,
    },
    /// No such transaction.
    NotFound,
}

/// Port over the record store for purchase finalization.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Atomically transitions `is_paid` from false to true.
    ///
    /// Must be a conditional update at the store layer, not a read followed
    /// by a write separated by unguarded time.
    async fn mark_paid(&self, id: &TransactionId) -> Result<MarkPaidOutcome, StoreError>;

    /// Applies the downstream purchase effects for a just-paid transaction:
    /// marks the listing sold and credits the seller's earned balance.
    ///
    /// Implementations must apply both mutations as one atomic unit, guarded
    /// by a predicate re-derivable from state so a partial failure followed
    /// by a retry cannot double-apply either step.
    async fn apply_purchase_effects(&self, transaction: &Transaction) -> Result<(), StoreError>;
}
