//! Session authentication middleware and extractors.
//!
//! `require_session` is the identity sync gate:
//!
//! 1. Extracts the Bearer token from the Authorization header
//! 2. Validates it through the `SessionValidator` port
//! 3. Ensures a local user record exists (lazy provisioning from the
//!    identity provider on first sight)
//! 4. Derives the entitlement tier from the session's plan claims
//! 5. Injects `RequestIdentity` into request extensions
//!
//! The gate fails closed: a missing or invalid token, or any failure during
//! lazy sync, rejects the request before it reaches route logic. Handlers
//! behind the gate may assume the local record exists.
//!
//! ```text
//! Request -> require_session -> injects RequestIdentity into extensions
//!                                        v
//!                               Handler -> CurrentUser extractor reads it
//! ```

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::SyncError;
use crate::domain::marketplace::{Plan, User};
use crate::ports::{AuthError, IdentityError};

use super::super::state::AppState;

/// Plan claim that grants the premium tier.
const PREMIUM_PLAN: &str = "premium";

/// Authenticated request context produced by the gate.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    /// Local user record, provisioned if this was the caller's first request.
    pub user: User,

    /// Entitlement tier derived from the session token's plan claims.
    pub plan: Plan,
}

/// Session authentication middleware. See the module docs for the pipeline.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return error_response(StatusCode::UNAUTHORIZED, "Authentication required");
    };

    let session = match state.sessions.validate(token).await {
        Ok(session) => session,
        Err(e) => {
            let (status, message) = match &e {
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!("Auth service unavailable: {}", msg);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Authentication service unavailable",
                    )
                }
            };
            return error_response(status, message);
        }
    };

    let plan = Plan::from_premium(session.has_plan(PREMIUM_PLAN));

    // Identity sync gate: no request proceeds without a local record.
    let user = match state.sync_user.ensure_user(&session.user_id).await {
        Ok(user) => user,
        Err(SyncError::Identity(IdentityError::UserNotFound(id))) => {
            tracing::warn!(user_id = %id, "session subject unknown to identity provider");
            return error_response(StatusCode::UNAUTHORIZED, "Unknown user");
        }
        Err(e) => {
            tracing::error!(error = %e, "identity sync failed, rejecting request");
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "User synchronization unavailable",
            );
        }
    };

    request
        .extensions_mut()
        .insert(RequestIdentity { user, plan });

    next.run(request).await
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Extractor for the authenticated request context.
///
/// Only valid behind `require_session`; a route reached without the gate
/// rejects with 401.
///
/// # Example
///
/// ```ignore
/// async fn my_handler(CurrentUser(identity): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", identity.user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub RequestIdentity);

impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<RequestIdentity>()
                .cloned()
                .map(CurrentUser)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication required")
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
