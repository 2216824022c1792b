//! Request middleware: session authentication and the admin gate.

mod admin;
mod auth;

pub use admin::require_admin;
pub use auth::{require_session, CurrentUser, RequestIdentity};
