//! Customer/provider chats and their messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChatId, CustomerId, MessageId, ParticipantId, ProviderId, Timestamp};

/// Opening line sent when the assistant starts a conversation for a user.
pub const ASSISTANT_GREETING: &str = "Hello from AI 👋";

/// One chat per customer/provider pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub customer_id: CustomerId,
    pub provider_id: ProviderId,
    pub last_message: String,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    File,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::File => "file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: ParticipantId,
    pub receiver_id: ParticipantId,
    pub text: String,
    pub kind: MessageKind,
    pub file_name: Option<String>,
    pub seen: bool,
    pub created_at: Timestamp,
}

impl Message {
    /// Unseen text message.
    pub fn text(
        chat_id: ChatId,
        sender_id: ParticipantId,
        receiver_id: ParticipantId,
        text: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::new(),
            chat_id,
            sender_id,
            receiver_id,
            text: text.into(),
            kind: MessageKind::Text,
            file_name: None,
            seen: false,
            created_at,
        }
    }
}
