//! Clerk adapters for session validation and the user directory.

mod mock;
mod session_validator;
mod user_directory;

pub use mock::{MockIdentityProvider, MockSessionValidator};
pub use session_validator::{ClerkConfig, ClerkSessionValidator};
pub use user_directory::ClerkUserDirectory;
