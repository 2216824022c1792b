//! Integration tests for the Stripe webhook endpoint.
//!
//! These tests drive the full HTTP stack through the router with in-memory
//! adapters behind the ports, verifying:
//! 1. Signature verification at the boundary
//! 2. Status mapping (200 acknowledge, 400 reject, 404 unknown, 500 retry)
//! 3. Idempotent finalization under duplicate delivery

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower::ServiceExt;

use profile_market::adapters::clerk::{MockIdentityProvider, MockSessionValidator};
use profile_market::adapters::http::{build_router, AppState};
use profile_market::adapters::jobs::InMemoryJobDispatcher;
use profile_market::application::handlers::{FinalizePurchaseHandler, SyncUserHandler};
use profile_market::domain::marketplace::{
    ListingId, NewUser, StoreError, Transaction, TransactionId, User, UserId,
};
use profile_market::domain::webhook::WebhookVerifier;
use profile_market::ports::{
    CheckoutSession, MarkPaidOutcome, PaymentError, PaymentProvider, SessionValidator,
    TransactionRepository, UserRepository,
};

const TEST_SECRET: &str = "whsec_integration_secret";
const APP_ID: &str = "social-profile-marketplace";

// =============================================================================
// Test Infrastructure
// =============================================================================

/// In-memory transaction store tracking the purchase effects.
#[derive(Default)]
struct InMemoryTransactionRepository {
    transactions: Mutex<HashMap<String, Transaction>>,
    credited: Mutex<Vec<String>>,
    effects_applied: Mutex<Vec<String>>,
}

impl InMemoryTransactionRepository {
    fn with_transaction(transaction: Transaction) -> Self {
        let repo = Self::default();
        repo.transactions
            .lock()
            .unwrap()
            .insert(transaction.id.as_str().to_string(), transaction);
        repo
    }

    fn is_paid(&self, id: &str) -> bool {
        self.transactions
            .lock()
            .unwrap()
            .get(id)
            .map(|t| t.is_paid)
            .unwrap_or(false)
    }

    fn effects_count(&self, id: &str) -> usize {
        self.effects_applied
            .lock()
            .unwrap()
            .iter()
            .filter(|applied| applied.as_str() == id)
            .count()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn mark_paid(&self, id: &TransactionId) -> Result<MarkPaidOutcome, StoreError> {
        let mut transactions = self.transactions.lock().unwrap();
        match transactions.get_mut(id.as_str()) {
            None => Ok(MarkPaidOutcome::NotFound),
            Some(tx) if tx.is_paid => Ok(MarkPaidOutcome::AlreadyPaid {
                transaction: tx.clone(),
                effects_applied: self
                    .credited
                    .lock()
                    .unwrap()
                    .contains(&id.as_str().to_string()),
            }),
            Some(tx) => {
                tx.is_paid = true;
                Ok(MarkPaidOutcome::Claimed(tx.clone()))
            }
        }
    }

    async fn apply_purchase_effects(&self, transaction: &Transaction) -> Result<(), StoreError> {
        // The credited stamp makes reapplication a no-op.
        let mut credited = self.credited.lock().unwrap();
        if credited.contains(&transaction.id.as_str().to_string()) {
            return Ok(());
        }
        credited.push(transaction.id.as_str().to_string());
        self.effects_applied
            .lock()
            .unwrap()
            .push(transaction.id.as_str().to_string());
        Ok(())
    }
}

/// Payment provider returning a fixed session list, counting calls.
struct FixedPaymentProvider {
    sessions: Vec<CheckoutSession>,
    calls: Mutex<usize>,
}

impl FixedPaymentProvider {
    fn with_metadata(metadata: HashMap<String, String>) -> Self {
        Self {
            sessions: vec![CheckoutSession {
                id: "cs_integration".to_string(),
                metadata,
            }],
            calls: Mutex::new(0),
        }
    }

    fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PaymentProvider for FixedPaymentProvider {
    async fn list_checkout_sessions(
        &self,
        _payment_intent_id: &str,
    ) -> Result<Vec<CheckoutSession>, PaymentError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.sessions.clone())
    }
}

/// User store stub; the webhook path never touches it.
#[derive(Default)]
struct EmptyUserRepository;

#[async_trait]
impl UserRepository for EmptyUserRepository {
    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(None)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        Ok(user.into_user())
    }
}

fn test_transaction(id: &str) -> Transaction {
    Transaction {
        id: TransactionId::new(id).unwrap(),
        listing_id: ListingId::new("listing_1").unwrap(),
        owner_id: UserId::new("user_seller").unwrap(),
        amount: 1500,
        is_paid: false,
        created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
    }
}

fn our_metadata(transaction_id: &str) -> HashMap<String, String> {
    HashMap::from([
        ("transactionId".to_string(), transaction_id.to_string()),
        ("appId".to_string(), APP_ID.to_string()),
    ])
}

fn build_app(
    transactions: Arc<InMemoryTransactionRepository>,
    provider: Arc<FixedPaymentProvider>,
    jobs: Arc<InMemoryJobDispatcher>,
) -> axum::Router {
    let finalize = Arc::new(FinalizePurchaseHandler::new(
        WebhookVerifier::new(TEST_SECRET),
        provider,
        transactions,
        jobs,
        APP_ID,
    ));

    let users = Arc::new(EmptyUserRepository);
    let identity = Arc::new(MockIdentityProvider::new());
    let sync = Arc::new(SyncUserHandler::new(users, identity.clone()));
    let sessions: Arc<dyn SessionValidator> = Arc::new(MockSessionValidator::new());

    build_router(AppState::new(finalize, sync, sessions, identity, vec![]))
}

/// Signs a payload the way the provider does.
fn sign(timestamp: i64, payload: &str) -> String {
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac = Hmac::<Sha256>::new_from_slice(TEST_SECRET.as_bytes()).unwrap();
    mac.update(signed_payload.as_bytes());
    let hex: String = mac
        .finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    format!("t={},v1={}", timestamp, hex)
}

fn event_payload(event_type: &str) -> String {
    serde_json::json!({
        "id": "evt_integration",
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "data": { "object": { "id": "pi_integration" } },
        "livemode": false
    })
    .to_string()
}

fn webhook_request(payload: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/stripe")
        .header("content-type", "application/json");

    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }

    builder.body(Body::from(payload.to_string())).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn health_endpoint_reports_liveness() {
    let app = build_app(
        Arc::new(InMemoryTransactionRepository::default()),
        Arc::new(FixedPaymentProvider::with_metadata(HashMap::new())),
        Arc::new(InMemoryJobDispatcher::new()),
    );

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Server is live!");
}

#[tokio::test]
async fn valid_delivery_finalizes_purchase() {
    let transactions = Arc::new(InMemoryTransactionRepository::with_transaction(
        test_transaction("txn_1"),
    ));
    let provider = Arc::new(FixedPaymentProvider::with_metadata(our_metadata("txn_1")));
    let jobs = Arc::new(InMemoryJobDispatcher::new());
    let app = build_app(transactions.clone(), provider, jobs.clone());

    let payload = event_payload("payment_intent.succeeded");
    let signature = sign(chrono::Utc::now().timestamp(), &payload);

    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["received"], true);

    assert!(transactions.is_paid("txn_1"));
    assert_eq!(transactions.effects_count("txn_1"), 1);
    assert_eq!(jobs.dispatched_count(), 1);
    assert_eq!(jobs.dispatched()[0].name, "app/purchase");
    assert_eq!(jobs.dispatched()[0].data["transaction"]["id"], "txn_1");
}

#[tokio::test]
async fn duplicate_delivery_is_acknowledged_without_side_effects() {
    let transactions = Arc::new(InMemoryTransactionRepository::with_transaction(
        test_transaction("txn_1"),
    ));
    let provider = Arc::new(FixedPaymentProvider::with_metadata(our_metadata("txn_1")));
    let jobs = Arc::new(InMemoryJobDispatcher::new());

    let payload = event_payload("payment_intent.succeeded");
    let signature = sign(chrono::Utc::now().timestamp(), &payload);

    for _ in 0..2 {
        let app = build_app(transactions.clone(), provider.clone(), jobs.clone());
        let response = app
            .oneshot(webhook_request(&payload, Some(&signature)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Exactly one job and one effects application across both deliveries.
    assert_eq!(jobs.dispatched_count(), 1);
    assert_eq!(transactions.effects_count("txn_1"), 1);
}

#[tokio::test]
async fn invalid_signature_is_rejected_before_any_work() {
    let transactions = Arc::new(InMemoryTransactionRepository::with_transaction(
        test_transaction("txn_1"),
    ));
    let provider = Arc::new(FixedPaymentProvider::with_metadata(our_metadata("txn_1")));
    let jobs = Arc::new(InMemoryJobDispatcher::new());
    let app = build_app(transactions.clone(), provider.clone(), jobs.clone());

    let payload = event_payload("payment_intent.succeeded");
    let bad_signature = format!("t={},v1={}", chrono::Utc::now().timestamp(), "a".repeat(64));

    let response = app
        .oneshot(webhook_request(&payload, Some(&bad_signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.starts_with("Webhook Error:"));

    assert_eq!(provider.call_count(), 0);
    assert!(!transactions.is_paid("txn_1"));
    assert_eq!(jobs.dispatched_count(), 0);
}

#[tokio::test]
async fn missing_signature_header_is_rejected() {
    let app = build_app(
        Arc::new(InMemoryTransactionRepository::default()),
        Arc::new(FixedPaymentProvider::with_metadata(HashMap::new())),
        Arc::new(InMemoryJobDispatcher::new()),
    );

    let payload = event_payload("payment_intent.succeeded");
    let response = app.oneshot(webhook_request(&payload, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.starts_with("Webhook Error:"));
}

#[tokio::test]
async fn stale_timestamp_is_rejected() {
    let app = build_app(
        Arc::new(InMemoryTransactionRepository::default()),
        Arc::new(FixedPaymentProvider::with_metadata(HashMap::new())),
        Arc::new(InMemoryJobDispatcher::new()),
    );

    let payload = event_payload("payment_intent.succeeded");
    let stale = sign(chrono::Utc::now().timestamp() - 600, &payload);

    let response = app
        .oneshot(webhook_request(&payload, Some(&stale)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unhandled_event_type_is_acknowledged_untouched() {
    let transactions = Arc::new(InMemoryTransactionRepository::with_transaction(
        test_transaction("txn_1"),
    ));
    let provider = Arc::new(FixedPaymentProvider::with_metadata(our_metadata("txn_1")));
    let jobs = Arc::new(InMemoryJobDispatcher::new());
    let app = build_app(transactions.clone(), provider.clone(), jobs.clone());

    let payload = event_payload("charge.refunded");
    let signature = sign(chrono::Utc::now().timestamp(), &payload);

    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(provider.call_count(), 0);
    assert!(!transactions.is_paid("txn_1"));
    assert_eq!(jobs.dispatched_count(), 0);
}

#[tokio::test]
async fn foreign_application_session_is_passed_through() {
    let transactions = Arc::new(InMemoryTransactionRepository::with_transaction(
        test_transaction("txn_1"),
    ));
    let metadata = HashMap::from([
        ("transactionId".to_string(), "txn_1".to_string()),
        ("appId".to_string(), "another-storefront".to_string()),
    ]);
    let provider = Arc::new(FixedPaymentProvider::with_metadata(metadata));
    let jobs = Arc::new(InMemoryJobDispatcher::new());
    let app = build_app(transactions.clone(), provider, jobs.clone());

    let payload = event_payload("payment_intent.succeeded");
    let signature = sign(chrono::Utc::now().timestamp(), &payload);

    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!transactions.is_paid("txn_1"));
    assert_eq!(jobs.dispatched_count(), 0);
}

#[tokio::test]
async fn unknown_transaction_returns_not_found() {
    let transactions = Arc::new(InMemoryTransactionRepository::default());
    let provider = Arc::new(FixedPaymentProvider::with_metadata(our_metadata("txn_missing")));
    let app = build_app(transactions, provider, Arc::new(InMemoryJobDispatcher::new()));

    let payload = event_payload("payment_intent.succeeded");
    let signature = sign(chrono::Utc::now().timestamp(), &payload);

    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["message"], "Transaction not found");
}

#[tokio::test]
async fn job_dispatch_failure_fails_the_delivery_for_retry() {
    let transactions = Arc::new(InMemoryTransactionRepository::with_transaction(
        test_transaction("txn_1"),
    ));
    let provider = Arc::new(FixedPaymentProvider::with_metadata(our_metadata("txn_1")));
    let jobs = Arc::new(InMemoryJobDispatcher::failing());
    let app = build_app(transactions.clone(), provider, jobs);

    let payload = event_payload("payment_intent.succeeded");
    let signature = sign(chrono::Utc::now().timestamp(), &payload);

    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // The effects must not run when the job was never dispatched.
    assert_eq!(transactions.effects_count("txn_1"), 0);
}

#[tokio::test]
async fn redelivery_recovers_from_a_failed_dispatch() {
    let transactions = Arc::new(InMemoryTransactionRepository::with_transaction(
        test_transaction("txn_1"),
    ));
    let provider = Arc::new(FixedPaymentProvider::with_metadata(our_metadata("txn_1")));

    let payload = event_payload("payment_intent.succeeded");
    let signature = sign(chrono::Utc::now().timestamp(), &payload);

    // First delivery claims the transaction but fails at job dispatch.
    let app = build_app(
        transactions.clone(),
        provider.clone(),
        Arc::new(InMemoryJobDispatcher::failing()),
    );
    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The provider redelivers once the job system is back: the interrupted
    // finalization completes instead of being acknowledged as a duplicate.
    let jobs = Arc::new(InMemoryJobDispatcher::new());
    let app = build_app(transactions.clone(), provider, jobs.clone());
    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(jobs.dispatched_count(), 1);
    assert_eq!(transactions.effects_count("txn_1"), 1);
}
