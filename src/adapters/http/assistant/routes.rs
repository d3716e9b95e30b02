//! Axum router configuration for the assistant endpoint.

use axum::{routing::post, Router};

use super::handlers::{ask_ai, AssistantAppState};

/// Create the assistant router.
///
/// # Routes
/// - `POST /ask-ai` - Answer one chat message for a customer or provider
pub fn assistant_routes() -> Router<AssistantAppState> {
    Router::new().route("/ask-ai", post(ask_ai))
}
