//! Stripe webhook boundary.
//!
//! Receives raw deliveries, hands them to the finalizer, and maps the
//! outcome to the status the provider's retry machinery expects:
//!
//! - 200 `{"received": true}` — processed, ignored, duplicate, or foreign;
//!   any outcome that must not be redelivered
//! - 400 `Webhook Error: …` — verification or parse failure
//! - 404 `{"message": "Transaction not found"}` — metadata referenced a
//!   transaction the store does not have
//! - 500 — transient failure; the provider redelivers

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::FinalizePurchaseCommand;
use crate::domain::webhook::WebhookError;

use super::state::AppState;

/// Header carrying the provider's signature.
const SIGNATURE_HEADER: &str = "stripe-signature";

pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok()) else {
        return (
            StatusCode::BAD_REQUEST,
            "Webhook Error: missing Stripe-Signature header".to_string(),
        )
            .into_response();
    };

    let command = FinalizePurchaseCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match state.finalize_purchase.handle(command).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "webhook delivery acknowledged");
            Json(serde_json::json!({ "received": true })).into_response()
        }
        Err(e) => error_response(e),
    }
}

fn error_response(error: WebhookError) -> Response {
    let status = error.status_code();
    match status {
        StatusCode::BAD_REQUEST => {
            tracing::warn!(error = %error, "webhook delivery rejected");
            (status, format!("Webhook Error: {}", error)).into_response()
        }
        StatusCode::NOT_FOUND => {
            tracing::warn!(error = %error, "webhook referenced unknown transaction");
            (
                status,
                Json(serde_json::json!({ "message": "Transaction not found" })),
            )
                .into_response()
        }
        _ => {
            tracing::error!(
                error = %error,
                retryable = error.is_retryable(),
                "webhook processing failed"
            );
            (status, "Internal Server Error".to_string()).into_response()
        }
    }
}
