//! Router assembly.

use std::time::Duration;

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::middleware::{require_admin, require_session, CurrentUser};
use super::state::AppState;
use super::webhook::stripe_webhook;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the application router.
///
/// The webhook route authenticates by signature, not by session, so it sits
/// outside the session gate. Everything else under `/api` runs behind it.
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/status", get(admin_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    let api = Router::new()
        .route("/me", get(me))
        .nest("/admin", admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ))
        .route("/stripe", post(stripe_webhook));

    Router::new()
        .route("/", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}

/// Liveness probe.
async fn health() -> &'static str {
    "Server is live!"
}

/// The caller's local record and entitlement tier.
async fn me(CurrentUser(identity): CurrentUser) -> impl IntoResponse {
    Json(serde_json::json!({
        "user": identity.user,
        "plan": identity.plan,
    }))
}

/// Stub behind the admin gate; admin business routes are out of scope.
async fn admin_status() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
