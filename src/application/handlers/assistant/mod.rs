//! Assistant handlers: identity resolution, analytics, flows, one-shot
//! actions and knowledge answers behind a single chat entry point.

mod actions;
mod analytics;
mod ask_assistant;
mod classifier;
mod deps;
mod dialogue;
mod error;
mod identity;
mod knowledge_answer;

#[cfg(test)]
mod fixtures;

pub use actions::AccountActions;
pub use analytics::AnalyticsResponder;
pub use ask_assistant::{AskAssistantCommand, AskAssistantHandler, AskAssistantResult};
pub use classifier::IntentClassifier;
pub use deps::{AssistantDeps, MarketplacePorts};
pub use dialogue::{DialogueEngine, StateChange, Turn};
pub use error::AssistantError;
pub use identity::IdentityResolver;
pub use knowledge_answer::KnowledgeResponder;
