//! FinalizePurchaseHandler - processes payment-provider webhook deliveries.
//!
//! Verifies the delivery, routes by event type, and finalizes the purchase
//! for `payment_intent.succeeded`:
//!
//! 1. Resolve the checkout session for the payment intent; take the first.
//! 2. Validate session metadata (application tag, transaction id).
//! 3. Atomically claim the paid transition on the transaction.
//! 4. Dispatch the purchase-completed job.
//! 5. Mark the listing sold and credit the seller, as one unit of work.
//!
//! The claim in step 3 is the idempotency guard: duplicate deliveries are
//! acknowledged without repeating any side effect.

use std::sync::Arc;

use crate::domain::marketplace::{Transaction, TransactionId};
use crate::domain::webhook::{PaymentIntent, WebhookError, WebhookEventKind, WebhookVerifier};
use crate::ports::{
    CheckoutSession, JobDispatcher, JobEvent, MarkPaidOutcome, PaymentProvider,
    TransactionRepository,
};

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct FinalizePurchaseCommand {
    /// Raw request body, unparsed.
    pub payload: Vec<u8>,
    /// Provider signature header value.
    pub signature: String,
}

/// Terminal outcomes of webhook processing. All variants are acknowledged
/// with HTTP 200 at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizePurchaseResult {
    /// The purchase was finalized by this delivery.
    Finalized { transaction_id: TransactionId },
    /// Duplicate delivery for an already-paid transaction; no mutations.
    Duplicate { transaction_id: TransactionId },
    /// Session metadata belongs to another application, or carries no
    /// transaction id. Passed through harmlessly.
    NotOurs,
    /// Event type this service intentionally ignores.
    Ignored { event_type: String },
}

/// Handler for payment-provider webhook deliveries.
pub struct FinalizePurchaseHandler {
    verifier: WebhookVerifier,
    payment_provider: Arc<dyn PaymentProvider>,
    transactions: Arc<dyn TransactionRepository>,
    jobs: Arc<dyn JobDispatcher>,
    /// Application tag expected in session metadata; the webhook endpoint
    /// is shared by multiple applications.
    app_id: String,
}

impl FinalizePurchaseHandler {
    pub fn new(
        verifier: WebhookVerifier,
        payment_provider: Arc<dyn PaymentProvider>,
        transactions: Arc<dyn TransactionRepository>,
        jobs: Arc<dyn JobDispatcher>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            payment_provider,
            transactions,
            jobs,
            app_id: app_id.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: FinalizePurchaseCommand,
    ) -> Result<FinalizePurchaseResult, WebhookError> {
        // Nothing in the payload is acted upon before verification.
        let event = self.verifier.verify_and_parse(&cmd.payload, &cmd.signature)?;

        match event.kind() {
            WebhookEventKind::PaymentIntentSucceeded => {
                let intent: PaymentIntent = event
                    .deserialize_object()
                    .map_err(|e| WebhookError::ParseError(e.to_string()))?;
                self.finalize(&intent).await
            }
            WebhookEventKind::Unknown(event_type) => {
                tracing::info!(event_type = %event_type, "unhandled webhook event type");
                Ok(FinalizePurchaseResult::Ignored { event_type })
            }
        }
    }

    async fn finalize(
        &self,
        intent: &PaymentIntent,
    ) -> Result<FinalizePurchaseResult, WebhookError> {
        let sessions = self
            .payment_provider
            .list_checkout_sessions(&intent.id)
            .await
            .map_err(|e| WebhookError::Provider(e.to_string()))?;

        // A succeeded payment with no session is inconsistent upstream state.
        let session = sessions
            .into_iter()
            .next()
            .ok_or_else(|| WebhookError::SessionNotFound(intent.id.clone()))?;

        let Some(transaction_id) = self.our_transaction_id(&session) else {
            tracing::debug!(
                session_id = %session.id,
                "checkout session not addressed to this application"
            );
            return Ok(FinalizePurchaseResult::NotOurs);
        };

        match self
            .transactions
            .mark_paid(&transaction_id)
            .await
            .map_err(|e| WebhookError::Store(e.to_string()))?
        {
            MarkPaidOutcome::NotFound => Err(WebhookError::TransactionNotFound(
                transaction_id.to_string(),
            )),
            MarkPaidOutcome::AlreadyPaid {
                effects_applied: true,
                ..
            } => {
                tracing::info!(
                    transaction_id = %transaction_id,
                    "duplicate delivery for finalized transaction, acknowledging"
                );
                Ok(FinalizePurchaseResult::Duplicate { transaction_id })
            }
            // An earlier delivery claimed the transaction but failed before
            // the purchase effects ran. The provider's redelivery is the
            // recovery path, so finish the remaining steps here. The job may
            // be emitted a second time if the earlier dispatch succeeded
            // and only the effects failed (at-least-once emission).
            MarkPaidOutcome::AlreadyPaid {
                transaction,
                effects_applied: false,
            } => {
                tracing::warn!(
                    transaction_id = %transaction.id,
                    "resuming interrupted finalization on redelivery"
                );
                self.complete(transaction).await
            }
            MarkPaidOutcome::Claimed(transaction) => self.complete(transaction).await,
        }
    }

    /// Runs the post-claim steps: job dispatch, then the purchase effects.
    ///
    /// Dispatch must be attempted before success is reported; a failure at
    /// either step fails the delivery so the provider redelivers and the
    /// redelivery resumes from here.
    async fn complete(
        &self,
        transaction: Transaction,
    ) -> Result<FinalizePurchaseResult, WebhookError> {
        self.jobs
            .dispatch(JobEvent::purchase_completed(&transaction))
            .await
            .map_err(|e| WebhookError::JobDispatch(e.to_string()))?;

        self.transactions
            .apply_purchase_effects(&transaction)
            .await
            .map_err(|e| WebhookError::Store(e.to_string()))?;

        tracing::info!(
            transaction_id = %transaction.id,
            listing_id = %transaction.listing_id,
            owner_id = %transaction.owner_id,
            amount = transaction.amount,
            "purchase finalized"
        );

        Ok(FinalizePurchaseResult::Finalized {
            transaction_id: transaction.id,
        })
    }

    /// Extracts the transaction id from session metadata, but only when the
    /// session was created by this application.
    fn our_transaction_id(&self, session: &CheckoutSession) -> Option<TransactionId> {
        if session.app_id() != Some(self.app_id.as_str()) {
            return None;
        }
        TransactionId::new(session.transaction_id()?).ok()
    }
}
