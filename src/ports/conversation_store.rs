//! Conversation state port.
//!
//! Key-value storage for in-flight dialogue state, keyed by the caller's
//! normalized email. At most one state exists per key.

use async_trait::async_trait;

use crate::domain::assistant::ConversationState;

#[derive(Debug, thiserror::Error)]
pub enum ConversationStoreError {
    #[error("failed to serialize state: {0}")]
    Serialization(String),

    #[error("failed to deserialize state: {0}")]
    Deserialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Current state, or `None` when the user is not mid-flow.
    async fn get(&self, key: &str) -> Result<Option<ConversationState>, ConversationStoreError>;

    /// Replace any existing state for `key`.
    async fn set(&self, key: &str, state: &ConversationState)
        -> Result<(), ConversationStoreError>;

    /// Remove the state for `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), ConversationStoreError>;
}
