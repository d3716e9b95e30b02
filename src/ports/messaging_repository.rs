//! Chats and messages between customers and providers.

use async_trait::async_trait;

use crate::domain::foundation::{CustomerId, DomainError, ParticipantId, ProviderId, Timestamp};
use crate::domain::marketplace::{Chat, Message};

#[async_trait]
pub trait MessagingRepository: Send + Sync {
    /// The chat for this pair, created if missing, with its last message and
    /// update time set. Calling twice never creates a second chat.
    async fn open_chat(
        &self,
        customer_id: &CustomerId,
        provider_id: &ProviderId,
        last_message: &str,
        at: Timestamp,
    ) -> Result<Chat, DomainError>;

    async fn append(&self, message: &Message) -> Result<(), DomainError>;

    async fn count_unseen(&self, receiver: &ParticipantId) -> Result<u64, DomainError>;

    /// Marks every unseen message addressed to `receiver` as seen and returns
    /// how many changed.
    async fn mark_all_seen(&self, receiver: &ParticipantId) -> Result<u64, DomainError>;

    async fn latest_received(&self, receiver: &ParticipantId)
        -> Result<Option<Message>, DomainError>;

    async fn count_sent(&self, sender: &ParticipantId) -> Result<u64, DomainError>;

    /// Most recent non-text message from `sender`.
    async fn latest_file_sent(&self, sender: &ParticipantId)
        -> Result<Option<Message>, DomainError>;
}
