//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod assistant;

pub use assistant::{
    AskAssistantCommand, AskAssistantHandler, AskAssistantResult, AssistantDeps, AssistantError,
    MarketplacePorts,
};
