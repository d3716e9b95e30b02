//! HTTP adapters - REST API implementations.
//!
//! - `GET /health-check` - liveness probe
//! - `POST /ask-ai` - the marketplace assistant

pub mod assistant;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;

pub use assistant::{assistant_routes, AssistantAppState};

/// GET /health-check
pub async fn health_check() -> &'static str {
    "Server OK"
}

/// Routes without middleware; tests drive this directly.
pub fn api_router(state: AssistantAppState) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .merge(assistant_routes())
        .with_state(state)
}

/// Full application router with tracing, CORS and compression. A request
/// timeout is added only when one is configured.
pub fn app_router(state: AssistantAppState, server: &ServerConfig) -> Router {
    let mut router = api_router(state);
    if let Some(timeout) = server.request_timeout() {
        router = router.layer(TimeoutLayer::new(timeout));
    }
    router
        .layer(CompressionLayer::new())
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(allowed))
}
