//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresAccountRepository` - customers and providers
//! - `PostgresRequestRepository`, `PostgresBidRepository` - requests and bids
//! - `PostgresMessagingRepository` - chats and messages
//! - `PostgresReviewRepository`, `PostgresTransactionRepository`
//! - `PostgresServiceCatalog` - bookable services
//!
//! Queries are checked at runtime; the schema lives in `migrations/`.

mod account_repository;
mod messaging_repository;
mod pool;
mod request_repository;
mod review_repository;
mod service_catalog;
mod transaction_repository;

pub use account_repository::PostgresAccountRepository;
pub use messaging_repository::PostgresMessagingRepository;
pub use pool::connect;
pub use request_repository::{PostgresBidRepository, PostgresRequestRepository};
pub use review_repository::PostgresReviewRepository;
pub use service_catalog::PostgresServiceCatalog;
pub use transaction_repository::PostgresTransactionRepository;

use crate::domain::foundation::DomainError;

/// Wraps a sqlx error as a `DATABASE_ERROR` naming the failed action.
fn db_error(action: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::database(format!("Failed to {}: {}", action, e))
}
