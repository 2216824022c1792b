//! PostgreSQL implementation of TransactionRepository.
//!
//! The paid transition is a conditional update so that concurrent webhook
//! deliveries race on the database row, not on application state: exactly one
//! delivery claims the transaction, the rest observe `AlreadyPaid`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::marketplace::{
    ListingId, ListingStatus, StoreError, Transaction, TransactionId, UserId,
};
use crate::ports::{MarkPaidOutcome, TransactionRepository};

/// PostgreSQL implementation of the TransactionRepository port.
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a transaction.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    listing_id: String,
    owner_id: String,
    amount: i64,
    is_paid: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: TransactionId::new(row.id).map_err(StoreError::database)?,
            listing_id: ListingId::new(row.listing_id).map_err(StoreError::database)?,
            owner_id: UserId::new(row.owner_id).map_err(StoreError::database)?,
            amount: row.amount,
            is_paid: row.is_paid,
            created_at: row.created_at,
        })
    }
}

/// Row shape for the already-paid lookup: the transaction plus whether the
/// purchase effects have been applied (`credited_at` set).
#[derive(Debug, sqlx::FromRow)]
struct PaidStateRow {
    id: String,
    listing_id: String,
    owner_id: String,
    amount: i64,
    is_paid: bool,
    created_at: DateTime<Utc>,
    effects_applied: bool,
}

impl PaidStateRow {
    fn into_outcome(self) -> Result<MarkPaidOutcome, StoreError> {
        let effects_applied = self.effects_applied;
        let transaction = Transaction {
            id: TransactionId::new(self.id).map_err(StoreError::database)?,
            listing_id: ListingId::new(self.listing_id).map_err(StoreError::database)?,
            owner_id: UserId::new(self.owner_id).map_err(StoreError::database)?,
            amount: self.amount,
            is_paid: self.is_paid,
            created_at: self.created_at,
        };
        Ok(MarkPaidOutcome::AlreadyPaid {
            transaction,
            effects_applied,
        })
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn mark_paid(&self, id: &TransactionId) -> Result<MarkPaidOutcome, StoreError> {
        let claimed: Option<TransactionRow> = sqlx::query_as(
            r#"
            UPDATE transactions
            SET is_paid = TRUE
            WHERE id = $1 AND is_paid = FALSE
            RETURNING id, listing_id, owner_id, amount, is_paid, created_at
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::database)?;

        if let Some(row) = claimed {
            return Ok(MarkPaidOutcome::Claimed(row.try_into()?));
        }

        // No row claimed: either the transaction is already paid or it does
        // not exist at all. For the paid case the caller needs the row and
        // whether the effects already ran, so an earlier delivery that died
        // between claim and effects can be resumed.
        let paid: Option<PaidStateRow> = sqlx::query_as(
            r#"
            SELECT id, listing_id, owner_id, amount, is_paid, created_at,
                   credited_at IS NOT NULL AS effects_applied
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::database)?;

        match paid {
            Some(row) => row.into_outcome(),
            None => Ok(MarkPaidOutcome::NotFound),
        }
    }

    async fn apply_purchase_effects(&self, transaction: &Transaction) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::database)?;

        // The credited_at stamp guards the whole unit of work. A redelivery
        // that somehow reaches this point finds it set and changes nothing.
        let stamped = sqlx::query(
            r#"
            UPDATE transactions
            SET credited_at = NOW()
            WHERE id = $1 AND credited_at IS NULL
            "#,
        )
        .bind(transaction.id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(StoreError::database)?;

        if stamped.rows_affected() == 0 {
            tx.rollback().await.map_err(StoreError::database)?;
            return Ok(());
        }

        sqlx::query("UPDATE listings SET status = $2 WHERE id = $1")
            .bind(transaction.listing_id.as_str())
            .bind(ListingStatus::Sold.as_str())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::database)?;

        sqlx::query("UPDATE users SET earned = earned + $2 WHERE id = $1")
            .bind(transaction.owner_id.as_str())
            .bind(transaction.amount)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::database)?;

        tx.commit().await.map_err(StoreError::database)?;

        Ok(())
    }
}
