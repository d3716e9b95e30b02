//! AI Provider Adapters.
//!
//! - `OpenAIProvider` - any OpenAI-compatible chat completions endpoint
//!   (OpenRouter in production)
//! - `MockAIProvider` - scripted responses for tests

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
