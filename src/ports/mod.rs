//! Ports - interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! assistant and the outside world. Adapters implement these ports.
//!
//! ## Marketplace
//!
//! - `AccountRepository`, `RequestRepository`, `BidRepository`,
//!   `MessagingRepository`, `ReviewRepository`, `TransactionRepository`
//! - `ServiceCatalog` - categories and services customers can book
//!
//! ## Assistant infrastructure
//!
//! - `AIProvider` - chat completions
//! - `ConversationStore` - per-user flow state between requests
//! - `Clock` - current time

mod account_repository;
mod ai_provider;
mod bid_repository;
mod clock;
mod conversation_store;
mod messaging_repository;
mod request_repository;
mod review_repository;
mod service_catalog;
mod transaction_repository;

pub use account_repository::AccountRepository;
pub use ai_provider::{
    AIError, AIProvider, CompletionPurpose, CompletionRequest, CompletionResponse, Message,
    MessageRole, ProviderInfo, TokenUsage,
};
pub use bid_repository::BidRepository;
pub use clock::Clock;
pub use conversation_store::{ConversationStore, ConversationStoreError};
pub use messaging_repository::MessagingRepository;
pub use request_repository::RequestRepository;
pub use review_repository::ReviewRepository;
pub use service_catalog::ServiceCatalog;
pub use transaction_repository::TransactionRepository;
