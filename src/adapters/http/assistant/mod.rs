//! HTTP adapter for the marketplace assistant.
//!
//! - `POST /ask-ai` - Answer one chat message

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{AskAiRequest, AskAiResponse, ErrorResponse};
pub use handlers::{AssistantApiError, AssistantAppState};
pub use routes::assistant_routes;
