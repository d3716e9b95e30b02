//! PostgreSQL implementation of MessagingRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::db_error;
use crate::domain::foundation::{
    ChatId, CustomerId, DomainError, ErrorCode, MessageId, ParticipantId, ProviderId, Timestamp,
};
use crate::domain::marketplace::{Chat, Message, MessageKind};
use crate::ports::MessagingRepository;

#[derive(Clone)]
pub struct PostgresMessagingRepository {
    pool: PgPool,
}

impl PostgresMessagingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChatRow {
    id: Uuid,
    customer_id: Uuid,
    provider_id: Uuid,
    last_message: String,
    updated_at: DateTime<Utc>,
}

impl From<ChatRow> for Chat {
    fn from(row: ChatRow) -> Self {
        Chat {
            id: ChatId::from_uuid(row.id),
            customer_id: CustomerId::from_uuid(row.customer_id),
            provider_id: ProviderId::from_uuid(row.provider_id),
            last_message: row.last_message,
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    chat_id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    text: String,
    kind: String,
    file_name: Option<String>,
    seen: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = DomainError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let kind = match row.kind.as_str() {
            "text" => MessageKind::Text,
            "file" => MessageKind::File,
            other => {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid message kind: {}", other),
                ))
            }
        };

        Ok(Message {
            id: MessageId::from_uuid(row.id),
            chat_id: ChatId::from_uuid(row.chat_id),
            sender_id: ParticipantId::from_uuid(row.sender_id),
            receiver_id: ParticipantId::from_uuid(row.receiver_id),
            text: row.text,
            kind,
            file_name: row.file_name,
            seen: row.seen,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

const MESSAGE_COLUMNS: &str =
    "id, chat_id, sender_id, receiver_id, text, kind, file_name, seen, created_at";

#[async_trait]
impl MessagingRepository for PostgresMessagingRepository {
    async fn open_chat(
        &self,
        customer_id: &CustomerId,
        provider_id: &ProviderId,
        last_message: &str,
        at: Timestamp,
    ) -> Result<Chat, DomainError> {
        // The unique pair constraint turns a concurrent second insert into an update.
        let row: ChatRow = sqlx::query_as(
            r#"
            INSERT INTO chats (id, customer_id, provider_id, last_message, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (customer_id, provider_id) DO UPDATE SET
                last_message = EXCLUDED.last_message,
                updated_at = EXCLUDED.updated_at
            RETURNING id, customer_id, provider_id, last_message, updated_at
            "#,
        )
        .bind(ChatId::new().as_uuid())
        .bind(customer_id.as_uuid())
        .bind(provider_id.as_uuid())
        .bind(last_message)
        .bind(at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("open chat"))?;

        Ok(Chat::from(row))
    }

    async fn append(&self, message: &Message) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, chat_id, sender_id, receiver_id, text, kind, file_name, seen, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.chat_id.as_uuid())
        .bind(message.sender_id.as_uuid())
        .bind(message.receiver_id.as_uuid())
        .bind(&message.text)
        .bind(message.kind.as_str())
        .bind(&message.file_name)
        .bind(message.seen)
        .bind(message.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("insert message"))?;

        Ok(())
    }

    async fn count_unseen(&self, receiver: &ParticipantId) -> Result<u64, DomainError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND NOT seen")
                .bind(receiver.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("count unseen messages"))?;

        Ok(count as u64)
    }

    async fn mark_all_seen(&self, receiver: &ParticipantId) -> Result<u64, DomainError> {
        let result =
            sqlx::query("UPDATE messages SET seen = TRUE WHERE receiver_id = $1 AND NOT seen")
                .bind(receiver.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(db_error("mark messages seen"))?;

        Ok(result.rows_affected())
    }

    async fn latest_received(
        &self,
        receiver: &ParticipantId,
    ) -> Result<Option<Message>, DomainError> {
        let row: Option<MessageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM messages WHERE receiver_id = $1 ORDER BY created_at DESC LIMIT 1",
            MESSAGE_COLUMNS
        ))
        .bind(receiver.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch latest received message"))?;

        row.map(Message::try_from).transpose()
    }

    async fn count_sent(&self, sender: &ParticipantId) -> Result<u64, DomainError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE sender_id = $1")
            .bind(sender.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count sent messages"))?;

        Ok(count as u64)
    }

    async fn latest_file_sent(
        &self,
        sender: &ParticipantId,
    ) -> Result<Option<Message>, DomainError> {
        let row: Option<MessageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM messages WHERE sender_id = $1 AND kind <> 'text' \
             ORDER BY created_at DESC LIMIT 1",
            MESSAGE_COLUMNS
        ))
        .bind(sender.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch latest file message"))?;

        row.map(Message::try_from).transpose()
    }
}
