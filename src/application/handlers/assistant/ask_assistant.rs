//! AskAssistantHandler - answers one chat message for a marketplace user.
//!
//! Dispatch order for a resolved caller:
//! 1. analytics phrase tables,
//! 2. deterministic intent rules (a match replaces any flow in progress),
//! 3. the stored flow, if one is in progress,
//! 4. language model intent classification,
//! 5. knowledge retrieval with a model answer.

use std::sync::Arc;

use tracing::{debug, info};

use super::actions::AccountActions;
use super::analytics::AnalyticsResponder;
use super::classifier::IntentClassifier;
use super::deps::AssistantDeps;
use super::dialogue::{DialogueEngine, StateChange, Turn};
use super::error::AssistantError;
use super::identity::IdentityResolver;
use super::knowledge_answer::KnowledgeResponder;
use crate::domain::assistant::{match_rule, ConversationState, Intent, FALLBACK_REPLY};
use crate::domain::marketplace::{normalize_email, Identity};
use crate::ports::{Clock, ConversationStore};

/// Command carrying one inbound chat message.
#[derive(Debug, Clone)]
pub struct AskAssistantCommand {
    pub message: String,
    pub email: String,
}

/// Reply shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskAssistantResult {
    pub reply: String,
}

/// Handler for chat messages.
pub struct AskAssistantHandler {
    identity: IdentityResolver,
    analytics: AnalyticsResponder,
    classifier: Arc<IntentClassifier>,
    dialogue: DialogueEngine,
    actions: AccountActions,
    knowledge: KnowledgeResponder,
    conversations: Arc<dyn ConversationStore>,
    clock: Arc<dyn Clock>,
}

impl AskAssistantHandler {
    pub fn new(deps: AssistantDeps) -> Self {
        let classifier = Arc::new(IntentClassifier::new(deps.ai.clone()));
        Self {
            identity: IdentityResolver::new(deps.marketplace.accounts.clone()),
            analytics: AnalyticsResponder::new(&deps),
            dialogue: DialogueEngine::new(&deps, classifier.clone()),
            actions: AccountActions::new(&deps),
            knowledge: KnowledgeResponder::new(deps.ai.clone(), deps.knowledge.clone()),
            classifier,
            conversations: deps.conversations,
            clock: deps.clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: AskAssistantCommand,
    ) -> Result<AskAssistantResult, AssistantError> {
        let message = cmd.message.trim();
        if message.is_empty() {
            return Err(AssistantError::missing("message"));
        }
        let key = normalize_email(&cmd.email);
        if key.is_empty() {
            return Err(AssistantError::missing("email"));
        }

        let identity = self
            .identity
            .resolve(&key)
            .await?
            .ok_or(AssistantError::UserNotFound)?;

        let reply = self.respond(&identity, &key, message).await?;
        Ok(AskAssistantResult { reply })
    }

    async fn respond(
        &self,
        identity: &Identity,
        key: &str,
        message: &str,
    ) -> Result<String, AssistantError> {
        let role = identity.role();

        if let Some(reply) = self.analytics.answer(identity, message).await? {
            return Ok(reply);
        }

        if let Some(intent) = match_rule(message, role) {
            debug!(?intent, "intent matched by rule");
            return self.dispatch(identity, key, intent, message).await;
        }

        if let Some(state) = self.conversations.get(key).await? {
            let turn = self
                .dialogue
                .continue_flow(identity, &state.flow, message)
                .await?;
            return self.commit(key, turn).await;
        }

        if let Some(intent) = self.classifier.classify(message, role).await? {
            debug!(?intent, "intent matched by model");
            return self.dispatch(identity, key, intent, message).await;
        }

        Ok(self.knowledge.answer(message).await?)
    }

    async fn dispatch(
        &self,
        identity: &Identity,
        key: &str,
        intent: Intent,
        message: &str,
    ) -> Result<String, AssistantError> {
        if intent.starts_flow() {
            let turn = self.dialogue.start(identity, intent, message).await?;
            return self.commit(key, turn).await;
        }

        if let Some(reply) = self.actions.perform(identity, intent).await? {
            return Ok(reply);
        }

        match (intent, identity) {
            (Intent::ViewRequests, Identity::Customer(customer)) => {
                self.analytics.view_requests(customer).await
            }
            (Intent::ProviderInfo, Identity::Customer(customer)) => {
                self.analytics.provider_info(customer).await
            }
            _ => Ok(FALLBACK_REPLY.to_string()),
        }
    }

    /// Persists the state change of a finished turn and hands back its reply.
    async fn commit(&self, key: &str, turn: Turn) -> Result<String, AssistantError> {
        match turn.state {
            StateChange::Keep => {}
            StateChange::Set(step) => {
                debug!(step = step.name(), "conversation state saved");
                let state = ConversationState::new(step, self.clock.now());
                self.conversations.set(key, &state).await?;
            }
            StateChange::Clear => {
                info!("conversation flow finished");
                self.conversations.delete(key).await?;
            }
        }
        Ok(turn.reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::application::handlers::assistant::fixtures::{april, request, Harness};
    use crate::domain::assistant::FlowStep;
    use crate::domain::marketplace::{RequestDetails, RequestState};
    use crate::ports::AIError;

    fn command(message: &str, email: &str) -> AskAssistantCommand {
        AskAssistantCommand {
            message: message.to_string(),
            email: email.to_string(),
        }
    }

    async fn ask(handler: &AskAssistantHandler, message: &str, email: &str) -> String {
        handler.handle(command(message, email)).await.unwrap().reply
    }

    async fn stored_step(h: &Harness, key: &str) -> Option<FlowStep> {
        h.store.get(key).await.unwrap().map(|s| s.flow)
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let h = Harness::new();
        let handler = AskAssistantHandler::new(h.deps());

        let err = handler.handle(command("   ", "lina@example.com")).await.unwrap_err();
        assert!(matches!(err, AssistantError::MissingField { field: "message" }));

        let err = handler.handle(command("hi", " ")).await.unwrap_err();
        assert!(matches!(err, AssistantError::MissingField { field: "email" }));
    }

    #[tokio::test]
    async fn unknown_email_touches_nothing() {
        let h = Harness::new();
        let handler = AskAssistantHandler::new(h.deps());

        let err = handler
            .handle(command("create request for plumbing", "ghost@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AssistantError::UserNotFound));
        assert_eq!(h.store.len().await, 0);
        assert_eq!(h.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn plumbing_booking_end_to_end() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;
        let handler = AskAssistantHandler::new(h.deps());
        let email = "Lina@Example.com";

        ask(&handler, "I want to create request for plumbing", email).await;
        assert_eq!(
            stored_step(&h, "lina@example.com").await.map(|s| s.name()),
            Some("awaiting_service")
        );

        ask(&handler, "Leak Detection & Repair", email).await;
        ask(&handler, "2025-04-20", email).await;
        let reply = ask(&handler, "-5", email).await;
        assert!(reply.contains("valid amount"));
        assert_eq!(
            stored_step(&h, "lina@example.com").await.map(|s| s.name()),
            Some("awaiting_budget")
        );
        ask(&handler, "200", email).await;
        ask(&handler, "Please bring a ladder", email).await;
        assert!(h.market.requests().await.is_empty());

        let reply = ask(&handler, "24.4539, 54.3773", email).await;
        assert!(reply.starts_with("✅ Your request for \"Leak Detection & Repair\""));
        assert_eq!(stored_step(&h, "lina@example.com").await, None);

        let saved = h.market.requests().await;
        assert_eq!(saved.len(), 1);
        let request = &saved[0];
        assert_eq!(request.customer_id, customer.id);
        assert_eq!(request.category, "Plumbing");
        assert_eq!(request.budget, 200.0);
        assert_eq!(request.date, april(20));
        assert_eq!(request.state, RequestState::InProgress);
        assert_eq!(request.description, "Please bring a ladder");
        assert!(matches!(
            &request.details,
            RequestDetails::Plumbing { plumbing_type, .. } if plumbing_type == "Leak Detection & Repair"
        ));
        // the budget reprompt asked the model once; nothing else needed it
        assert_eq!(h.ai.call_count(), 1);
    }

    #[tokio::test]
    async fn rule_intent_replaces_flow_in_progress() {
        let h = Harness::new();
        h.customer("Lina", "lina@example.com").await;
        let handler = AskAssistantHandler::new(h.deps());

        ask(&handler, "create request for laundry", "lina@example.com").await;
        ask(&handler, "update my first name", "lina@example.com").await;

        assert_eq!(
            stored_step(&h, "lina@example.com").await.map(|s| s.name()),
            Some("awaiting_first_name")
        );
        let reply = ask(&handler, "Leena", "lina@example.com").await;
        assert_eq!(reply, "First name updated to Leena");
        assert_eq!(h.market.customers().await[0].first_name, "Leena");
    }

    #[tokio::test]
    async fn analytics_win_over_flow_in_progress() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;
        h.market.add_request(request(customer.id, "Drain Cleaning", april(2))).await;
        let handler = AskAssistantHandler::new(h.deps());

        ask(&handler, "create request", "lina@example.com").await;
        let reply = ask(&handler, "what was my last service", "lina@example.com").await;

        assert_eq!(reply, "Your last service was Drain Cleaning on Apr 2, 2025.");
        assert_eq!(
            stored_step(&h, "lina@example.com").await,
            Some(FlowStep::AwaitingCategory)
        );
    }

    #[tokio::test]
    async fn model_intent_starts_flow_when_no_rule_matches() {
        let h = Harness::new();
        h.customer("Lina", "lina@example.com").await;
        h.ai.push_response("create_request");
        let handler = AskAssistantHandler::new(h.deps());

        ask(&handler, "I'd like someone to fix my sink", "lina@example.com").await;

        assert_eq!(
            stored_step(&h, "lina@example.com").await,
            Some(FlowStep::AwaitingCategory)
        );
    }

    #[tokio::test]
    async fn provider_label_is_ignored_for_customers() {
        let h = Harness::new();
        h.customer("Lina", "lina@example.com").await;
        h.ai.push_response("submit_bid");
        h.ai.push_response("We can help with that.");
        let handler = AskAssistantHandler::new(h.deps());

        let reply = ask(&handler, "I'd like to offer a price", "lina@example.com").await;

        assert_eq!(reply, "We can help with that.");
        assert_eq!(h.store.len().await, 0);
    }

    #[tokio::test]
    async fn view_requests_label_lists_requests() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;
        h.market.add_request(request(customer.id, "Drain Cleaning", april(2))).await;
        h.ai.push_response("view_requests");
        let handler = AskAssistantHandler::new(h.deps());

        let reply = ask(&handler, "show me everything I booked", "lina@example.com").await;
        assert_eq!(
            reply,
            "Here are your requests:\n• Drain Cleaning on Apr 2, 2025 (in-progress)"
        );
    }

    #[tokio::test]
    async fn upstream_failure_leaves_state_alone() {
        let h = Harness::new();
        h.customer("Lina", "lina@example.com").await;
        let handler = AskAssistantHandler::new(h.deps());
        ask(&handler, "create request for plumbing", "lina@example.com").await;
        ask(&handler, "Drain Cleaning", "lina@example.com").await;
        let before = stored_step(&h, "lina@example.com").await;

        let deps = h.deps();
        let failing = MockAIProvider::new().with_error(MockError::Timeout);
        let handler = AskAssistantHandler::new(AssistantDeps {
            ai: Arc::new(failing),
            ..deps
        });
        let err = handler
            .handle(command("sometime next week", "lina@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AssistantError::Upstream(AIError::Timeout)));
        assert_eq!(stored_step(&h, "lina@example.com").await, before);
    }

    #[tokio::test]
    async fn general_question_falls_through_to_knowledge() {
        let h = Harness::new();
        h.provider("FixIt", "fixit@example.com").await;
        h.ai.push_response("ask_general_question");
        h.ai.push_response("Bids can be placed on open requests.");
        let handler = AskAssistantHandler::new(h.deps());

        let reply = ask(&handler, "how does bidding work?", "fixit@example.com").await;

        assert_eq!(reply, "Bids can be placed on open requests.");
        assert_eq!(h.ai.call_count(), 2);
    }
}
