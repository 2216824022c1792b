//! Shared application state for the HTTP layer.

use std::sync::Arc;

use crate::application::handlers::{FinalizePurchaseHandler, SyncUserHandler};
use crate::ports::{IdentityProvider, SessionValidator};

/// State handed to routes and middleware.
#[derive(Clone)]
pub struct AppState {
    /// Webhook processing pipeline.
    pub finalize_purchase: Arc<FinalizePurchaseHandler>,

    /// Lazy user provisioning used by the identity sync gate.
    pub sync_user: Arc<SyncUserHandler>,

    /// Session token validation.
    pub sessions: Arc<dyn SessionValidator>,

    /// Canonical user directory; the admin gate re-resolves the caller's
    /// email here instead of trusting the local record.
    pub identity: Arc<dyn IdentityProvider>,

    /// Emails allowed through the admin gate (case-sensitive).
    pub admin_emails: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(
        finalize_purchase: Arc<FinalizePurchaseHandler>,
        sync_user: Arc<SyncUserHandler>,
        sessions: Arc<dyn SessionValidator>,
        identity: Arc<dyn IdentityProvider>,
        admin_emails: Vec<String>,
    ) -> Self {
        Self {
            finalize_purchase,
            sync_user,
            sessions,
            identity,
            admin_emails: Arc::new(admin_emails),
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e == email)
    }
}
