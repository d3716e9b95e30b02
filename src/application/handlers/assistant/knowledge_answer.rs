//! Fallback answers grounded in the knowledge corpus.

use std::sync::Arc;

use tracing::debug;

use crate::domain::assistant::prompts::{knowledge_system_prompt, GENERAL_SYSTEM_PROMPT};
use crate::domain::assistant::{KnowledgeBase, DEFAULT_TOP_N, FALLBACK_REPLY};
use crate::ports::{AIError, AIProvider, CompletionPurpose, CompletionRequest, MessageRole};

pub struct KnowledgeResponder {
    ai: Arc<dyn AIProvider>,
    knowledge: Arc<KnowledgeBase>,
}

impl KnowledgeResponder {
    pub fn new(ai: Arc<dyn AIProvider>, knowledge: Arc<KnowledgeBase>) -> Self {
        Self { ai, knowledge }
    }

    /// Answers from the best matching chunks, or from general knowledge when
    /// nothing in the corpus overlaps the question.
    pub async fn answer(&self, message: &str) -> Result<String, AIError> {
        let chunks = self.knowledge.retrieve(message, DEFAULT_TOP_N);
        debug!(matched = chunks.len(), "knowledge retrieval");

        let system_prompt = if chunks.is_empty() {
            GENERAL_SYSTEM_PROMPT.to_string()
        } else {
            let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
            knowledge_system_prompt(&contents)
        };

        let request = CompletionRequest::new(CompletionPurpose::AnswerQuestion)
            .with_system_prompt(system_prompt)
            .with_message(MessageRole::User, message);
        let response = self.ai.complete(request).await?;

        let reply = response.content.trim();
        if reply.is_empty() {
            Ok(FALLBACK_REPLY.to_string())
        } else {
            Ok(reply.to_string())
        }
    }
}
