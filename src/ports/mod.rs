//! Ports - interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! core flows and the outside world. Adapters implement these ports.
//!
//! - `TransactionRepository` / `UserRepository` - the transactional record store
//! - `PaymentProvider` - checkout-session lookup at the payment provider
//! - `IdentityProvider` - canonical user directory
//! - `SessionValidator` - request auth context (token -> session + entitlements)
//! - `JobDispatcher` - asynchronous job emission

mod identity_provider;
mod job_dispatcher;
mod payment_provider;
mod session_validator;
mod transaction_repository;
mod user_repository;

pub use identity_provider::{EmailAddress, IdentityError, IdentityProfile, IdentityProvider};
pub use job_dispatcher::{JobDispatcher, JobError, JobEvent, PURCHASE_COMPLETED_JOB};
pub use payment_provider::{CheckoutSession, PaymentError, PaymentProvider};
pub use session_validator::{AuthError, AuthSession, SessionValidator};
pub use transaction_repository::{MarkPaidOutcome, TransactionRepository};
pub use user_repository::UserRepository;
