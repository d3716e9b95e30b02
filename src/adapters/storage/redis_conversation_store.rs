//! Redis Conversation Store
//!
//! Stores each conversation as a JSON string under `{prefix}{email}`. With a
//! TTL configured the key is written with `SET ... EX` so Redis expires idle
//! conversations itself.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::assistant::ConversationState;
use crate::ports::{ConversationStore, ConversationStoreError};

#[derive(Clone)]
pub struct RedisConversationStore {
    conn: MultiplexedConnection,
    key_prefix: String,
    ttl: Option<Duration>,
}

impl RedisConversationStore {
    pub fn new(conn: MultiplexedConnection, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            ttl: None,
        }
    }

    /// Connects to `url` and builds the store.
    pub async fn connect(
        url: &str,
        key_prefix: impl Into<String>,
    ) -> Result<Self, ConversationStoreError> {
        let client = redis::Client::open(url).map_err(backend)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(backend)?;
        Ok(Self::new(conn, key_prefix))
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    fn redis_key(&self, key: &str) -> String {
        storage_key(&self.key_prefix, key)
    }
}

fn storage_key(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key)
}

fn backend(e: redis::RedisError) -> ConversationStoreError {
    ConversationStoreError::Backend(e.to_string())
}

#[async_trait]
impl ConversationStore for RedisConversationStore {
    async fn get(&self, key: &str) -> Result<Option<ConversationState>, ConversationStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.redis_key(key)).await.map_err(backend)?;

        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| ConversationStoreError::Deserialization(e.to_string()))
        })
        .transpose()
    }

    async fn set(
        &self,
        key: &str,
        state: &ConversationState,
    ) -> Result<(), ConversationStoreError> {
        let json = serde_json::to_string(state)
            .map_err(|e| ConversationStoreError::Serialization(e.to_string()))?;
        let redis_key = self.redis_key(key);
        let mut conn = self.conn.clone();

        match self.ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(redis_key, json, ttl.as_secs().max(1))
                .await
                .map_err(backend),
            None => conn.set::<_, _, ()>(redis_key, json).await.map_err(backend),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), ConversationStoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.redis_key(key)).await.map_err(backend)
    }
}
