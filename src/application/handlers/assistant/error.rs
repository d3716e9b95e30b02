//! Errors surfaced by the assistant handlers.

use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::ports::{AIError, ConversationStoreError};

#[derive(Debug, Error)]
pub enum AssistantError {
    /// A required field of the inbound message is missing or blank.
    #[error("Field '{field}' is required")]
    MissingField { field: &'static str },

    /// The email belongs to neither a customer nor a provider.
    #[error("No matching user found.")]
    UserNotFound,

    #[error("language model call failed: {0}")]
    Upstream(#[from] AIError),

    #[error("repository error: {0}")]
    Repository(#[from] DomainError),

    #[error("conversation state error: {0}")]
    State(#[from] ConversationStoreError),
}

impl AssistantError {
    pub fn missing(field: &'static str) -> Self {
        AssistantError::MissingField { field }
    }

    /// Caller mistakes that never reach a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AssistantError::MissingField { .. } | AssistantError::UserNotFound
        )
    }
}
