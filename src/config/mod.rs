//! Application configuration
//!
//! Values come from environment variables prefixed with `SERVIBID`, with `__`
//! separating nested keys. A `.env` file is read first when present.
//!
//! # Example
//!
//! ```no_run
//! use servibid_assistant::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Listening on {}", config.server.socket_addr());
//! ```

mod ai;
mod assistant;
mod database;
mod error;
mod redis;
mod server;

pub use ai::AiConfig;
pub use assistant::{AssistantConfig, StateBackend};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL; absent means the in-memory marketplace
    pub database: Option<DatabaseConfig>,

    /// Redis; required only for the redis state backend
    pub redis: Option<RedisConfig>,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// - `SERVIBID__SERVER__PORT=5000` -> `server.port = 5000`
    /// - `SERVIBID__AI__API_KEY=...` -> `ai.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadError` when a value cannot be parsed into its
    /// field type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SERVIBID")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.ai.validate()?;
        self.assistant.validate()?;
        if self.assistant.state_backend == StateBackend::Redis && self.redis.is_none() {
            return Err(ValidationError::RedisBackendWithoutRedis);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
