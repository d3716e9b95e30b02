//! Conversational assistant domain: intents, slot parsing, the flow state
//! machine, analytics phrase tables, knowledge retrieval and reply text.

pub mod analytics;
pub mod flow;
pub mod intent;
pub mod knowledge;
pub mod prompts;
pub mod replies;
pub mod slots;

pub use flow::{
    transition, BookingDraft, ConversationState, CustomerCandidate, FlowEffect, FlowStep,
    ProviderCandidate, ServiceChoice, SlotKind, SlotValue, Transition,
};
pub use intent::{match_rule, Intent, IntentLabel, ProfileField};
pub use knowledge::{KnowledgeBase, KnowledgeChunk, KnowledgeError, DEFAULT_TOP_N};
pub use replies::{FirstPicker, RandomPicker, ReplyFormatter, VariantPicker, FALLBACK_REPLY};
