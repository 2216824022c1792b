//! Job dispatcher adapters.

mod in_memory;
mod inngest;

pub use in_memory::InMemoryJobDispatcher;
pub use inngest::{InngestConfig, InngestDispatcher};
