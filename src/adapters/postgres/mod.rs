//! PostgreSQL adapters for the record-store ports.

mod transaction_repository;
mod user_repository;

pub use transaction_repository::PostgresTransactionRepository;
pub use user_repository::PostgresUserRepository;
