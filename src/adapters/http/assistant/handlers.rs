//! HTTP handlers for the assistant endpoint.
//!
//! These handlers connect Axum routes to the application layer handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{error, warn};

use crate::application::handlers::assistant::{
    AskAssistantCommand, AskAssistantHandler, AssistantDeps, AssistantError,
};

use super::dto::{AskAiRequest, AskAiResponse, ErrorResponse};

const MISSING_FIELDS_MESSAGE: &str = "Message and email are required.";
const NO_USER_MESSAGE: &str = "No matching user found.";
const UPSTREAM_FAILURE_MESSAGE: &str = "AI assistant failed to respond.";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the assistant routes.
#[derive(Clone)]
pub struct AssistantAppState {
    pub deps: AssistantDeps,
}

impl AssistantAppState {
    pub fn new(deps: AssistantDeps) -> Self {
        Self { deps }
    }

    /// Create the handler on demand from the shared state.
    pub fn ask_assistant_handler(&self) -> AskAssistantHandler {
        AskAssistantHandler::new(self.deps.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /ask-ai - Answer one chat message
pub async fn ask_ai(
    State(state): State<AssistantAppState>,
    body: Result<Json<AskAiRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AssistantApiError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "rejected ask-ai body");
            return Err(AssistantApiError(AssistantError::missing("message")));
        }
    };

    let cmd = AskAssistantCommand {
        message: request.message.unwrap_or_default(),
        email: request.email.unwrap_or_default(),
    };

    let result = state.ask_assistant_handler().handle(cmd).await?;

    Ok(Json(AskAiResponse {
        message: result.reply,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper that converts assistant errors to HTTP responses.
#[derive(Debug)]
pub struct AssistantApiError(AssistantError);

impl From<AssistantError> for AssistantApiError {
    fn from(err: AssistantError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AssistantApiError {
    fn into_response(self) -> axum::response::Response {
        if !self.0.is_client_error() {
            error!(error = %self.0, "assistant failed to respond");
        }

        let (status, code, message) = match &self.0 {
            AssistantError::MissingField { .. } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                MISSING_FIELDS_MESSAGE,
            ),
            AssistantError::UserNotFound => {
                (StatusCode::NOT_FOUND, "USER_NOT_FOUND", NO_USER_MESSAGE)
            }
            AssistantError::Upstream(_)
            | AssistantError::Repository(_)
            | AssistantError::State(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ASSISTANT_FAILED",
                UPSTREAM_FAILURE_MESSAGE,
            ),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
