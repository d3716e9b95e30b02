//! Conversational assistant behaviour

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// JSON Lines knowledge corpus; unset means an empty corpus
    pub knowledge_path: Option<PathBuf>,

    /// Where in-flight conversations are kept
    #[serde(default)]
    pub state_backend: StateBackend,

    /// Expire idle conversations after this many seconds; unset keeps them forever
    pub state_ttl_secs: Option<u64>,

    /// Pick reply wording at random among equivalent variants
    #[serde(default = "default_vary_phrasing")]
    pub vary_phrasing: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    #[default]
    Memory,
    Redis,
}

impl AssistantConfig {
    pub fn state_ttl(&self) -> Option<Duration> {
        self.state_ttl_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.state_ttl_secs == Some(0) {
            return Err(ValidationError::InvalidStateTtl);
        }
        Ok(())
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            knowledge_path: None,
            state_backend: StateBackend::default(),
            state_ttl_secs: None,
            vary_phrasing: default_vary_phrasing(),
        }
    }
}

fn default_vary_phrasing() -> bool {
    true
}
