//! In-Memory Conversation Store
//!
//! Keeps dialogue state in a process-local map. State is lost on restart,
//! which matches the behaviour of a single-instance deployment.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::domain::assistant::ConversationState;
use crate::ports::{ConversationStore, ConversationStoreError};

#[derive(Debug, Clone)]
struct Entry {
    state: ConversationState,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory storage for conversation state
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Option<Duration>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire idle conversations after `ttl`.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Number of live conversations
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get(&self, key: &str) -> Result<Option<ConversationState>, ConversationStoreError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.state.clone())),
                Some(_) => {}
            }
        }

        // Expired: purge on read
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        state: &ConversationState,
    ) -> Result<(), ConversationStoreError> {
        let entry = Entry {
            state: state.clone(),
            expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ConversationStoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assistant::FlowStep;
    use crate::domain::foundation::Timestamp;

    fn state(flow: FlowStep) -> ConversationState {
        ConversationState::new(flow, Timestamp::now())
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = InMemoryConversationStore::new();
        assert!(store.get("nobody@servibid.tech").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_replaces_existing_state() {
        let store = InMemoryConversationStore::new();
        let key = "amal@servibid.tech";

        store.set(key, &state(FlowStep::AwaitingCategory)).await.unwrap();
        store
            .set(key, &state(FlowStep::start_booking(Some("Plumbing".into()))))
            .await
            .unwrap();

        let loaded = store.get(key).await.unwrap().unwrap();
        assert_eq!(loaded.flow.name(), "awaiting_service");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryConversationStore::new();
        let key = "amal@servibid.tech";
        store.set(key, &state(FlowStep::AwaitingCategory)).await.unwrap();

        store.delete(key).await.unwrap();
        store.delete(key).await.unwrap();
        assert!(store.get(key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_state_is_purged_on_read() {
        let store = InMemoryConversationStore::new().with_ttl(Some(Duration::from_millis(10)));
        let key = "amal@servibid.tech";
        store.set(key, &state(FlowStep::AwaitingCategory)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(store.get(key).await.unwrap().is_none());
        assert!(store.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn without_ttl_state_persists() {
        let store = InMemoryConversationStore::new();
        let key = "amal@servibid.tech";
        store.set(key, &state(FlowStep::AwaitingCategory)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(store.get(key).await.unwrap().is_some());
    }
}
