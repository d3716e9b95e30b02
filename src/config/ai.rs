//! Language model configuration
//!
//! The assistant talks to a single OpenAI-compatible chat completions endpoint
//! (OpenRouter by default).

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Bearer token for the completions endpoint
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every completion
    #[serde(default = "default_model")]
    pub model: String,

    /// Optional HTTP timeout; unset means the client waits indefinitely
    pub timeout_secs: Option<u64>,
}

impl AiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("AI__API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidAiBaseUrl);
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::EmptyModel);
        }
        if self.timeout_secs == Some(0) {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "openai/gpt-3.5-turbo".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key() -> AiConfig {
        AiConfig {
            api_key: Some("sk-or-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_point_at_openrouter() {
        let config = AiConfig::default();
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.model, "openai/gpt-3.5-turbo");
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn api_key_is_required() {
        assert_eq!(
            AiConfig::default().validate(),
            Err(ValidationError::MissingRequired("AI__API_KEY"))
        );
        let blank = AiConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!blank.has_api_key());
        assert!(with_key().validate().is_ok());
    }

    #[test]
    fn rejects_bad_base_url_and_empty_model() {
        let config = AiConfig {
            base_url: "openrouter.ai".to_string(),
            ..with_key()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidAiBaseUrl));

        let config = AiConfig {
            model: String::new(),
            ..with_key()
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyModel));
    }

    #[test]
    fn optional_timeout() {
        let config = AiConfig {
            timeout_secs: Some(45),
            ..with_key()
        };
        assert_eq!(config.timeout(), Some(Duration::from_secs(45)));

        let zero = AiConfig {
            timeout_secs: Some(0),
            ..with_key()
        };
        assert_eq!(zero.validate(), Err(ValidationError::InvalidTimeout));
    }
}
