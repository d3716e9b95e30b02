//! Configuration error types

use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Semantic configuration problems found by `validate()`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Invalid language model base URL")]
    InvalidAiBaseUrl,

    #[error("Language model name must not be empty")]
    EmptyModel,

    #[error("Conversation state TTL must be positive")]
    InvalidStateTtl,

    #[error("Redis state backend selected but no redis section configured")]
    RedisBackendWithoutRedis,
}
