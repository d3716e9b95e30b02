//! Conversation State Adapters
//!
//! Implementations of the ConversationStore port.
//!
//! - **InMemoryConversationStore** - process-local map (development, tests,
//!   single-instance deployments)
//! - **RedisConversationStore** - shared state across instances

mod in_memory_conversation_store;
mod redis_conversation_store;

pub use in_memory_conversation_store::InMemoryConversationStore;
pub use redis_conversation_store::RedisConversationStore;
