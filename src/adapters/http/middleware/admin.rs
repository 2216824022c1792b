//! Admin gate middleware.
//!
//! Runs behind `require_session`. The caller's email is re-resolved from the
//! identity provider on every check rather than read from the local record,
//! which can lag behind a provider-side email change. Only allow-listed
//! emails are admitted; matching is case-sensitive. Any resolution failure
//! or non-membership rejects with 401.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::ports::IdentityProvider;

use super::super::state::AppState;
use super::auth::RequestIdentity;

pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(identity) = request.extensions().get::<RequestIdentity>() else {
        // The session gate did not run; treat as unauthenticated.
        return unauthorized();
    };

    let email = match state.identity.fetch_user(&identity.user.id).await {
        Ok(profile) => profile.primary_email().map(str::to_string),
        Err(e) => {
            tracing::warn!(
                user_id = %identity.user.id,
                error = %e,
                "admin gate could not resolve caller profile"
            );
            None
        }
    };

    let admitted = email
        .as_deref()
        .map(|email| state.is_admin_email(email))
        .unwrap_or(false);

    if !admitted {
        tracing::warn!(
            user_id = %identity.user.id,
            "caller rejected at admin gate"
        );
        return unauthorized();
    }

    next.run(request).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "Admin access required" })),
    )
        .into_response()
}
