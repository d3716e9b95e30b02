//! Language model backed intent classification and slot extraction.
//!
//! Every extractor tries a literal match against the candidates first and
//! only asks the model when that fails. Model replies are validated against
//! the candidate set; anything else counts as "nothing extracted".

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::assistant::prompts;
use crate::domain::assistant::slots::{find_mentioned, match_label, parse_amount, parse_future_date};
use crate::domain::assistant::{Intent, IntentLabel};
use crate::domain::marketplace::{CarType, Role};
use crate::ports::{AIError, AIProvider, CompletionPurpose, CompletionRequest, MessageRole};

pub struct IntentClassifier {
    ai: Arc<dyn AIProvider>,
}

impl IntentClassifier {
    pub fn new(ai: Arc<dyn AIProvider>) -> Self {
        Self { ai }
    }

    /// Intent the model assigns to `message`, if it names an action `role`
    /// may perform.
    pub async fn classify(&self, message: &str, role: Role) -> Result<Option<Intent>, AIError> {
        let prompt = prompts::classify_intent(message, &IntentLabel::labels());
        let reply = self.ask(CompletionPurpose::ClassifyIntent, prompt).await?;
        let label = IntentLabel::parse(&reply);
        debug!(reply = %reply.trim(), label = ?label, "intent classified");
        Ok(label.and_then(|l| l.to_intent(role)))
    }

    pub async fn category(
        &self,
        message: &str,
        categories: &[String],
    ) -> Result<Option<String>, AIError> {
        if let Some(found) = find_mentioned(message, categories) {
            return Ok(Some(found.to_string()));
        }
        let prompt = prompts::extract_category(message, categories);
        self.pick(prompt, categories).await
    }

    pub async fn car_type(&self, message: &str) -> Result<Option<CarType>, AIError> {
        let labels = CarType::labels();
        let picked = match find_mentioned(message, &labels) {
            Some(found) => Some(found.to_string()),
            None => {
                let prompt = prompts::extract_car_type(message, &labels);
                self.pick(prompt, &labels).await?
            }
        };
        Ok(picked.as_deref().and_then(CarType::from_label))
    }

    pub async fn service(
        &self,
        message: &str,
        category: &str,
        services: &[String],
    ) -> Result<Option<String>, AIError> {
        if let Some(found) = find_mentioned(message, services) {
            return Ok(Some(found.to_string()));
        }
        let prompt = prompts::extract_service(message, category, services);
        self.pick(prompt, services).await
    }

    /// A date strictly after `today`, parsed directly or extracted by the model.
    pub async fn future_date(
        &self,
        message: &str,
        today: NaiveDate,
    ) -> Result<Option<NaiveDate>, AIError> {
        if let Some(date) = parse_future_date(message, today) {
            return Ok(Some(date));
        }
        let prompt = prompts::extract_date(message, today);
        let reply = self.ask(CompletionPurpose::ExtractSlot, prompt).await?;
        Ok(parse_future_date(&reply, today))
    }

    /// A positive amount, parsed directly or extracted by the model.
    pub async fn budget(&self, message: &str) -> Result<Option<f64>, AIError> {
        if let Some(amount) = parse_amount(message) {
            return Ok(Some(amount));
        }
        let prompt = prompts::extract_budget(message);
        let reply = self.ask(CompletionPurpose::ExtractSlot, prompt).await?;
        Ok(parse_amount(&reply))
    }

    async fn pick(&self, prompt: String, candidates: &[String]) -> Result<Option<String>, AIError> {
        let reply = self.ask(CompletionPurpose::ExtractSlot, prompt).await?;
        Ok(match_label(&reply, candidates).map(str::to_string))
    }

    async fn ask(&self, purpose: CompletionPurpose, prompt: String) -> Result<String, AIError> {
        let request = CompletionRequest::new(purpose)
            .with_message(MessageRole::User, prompt)
            .with_temperature(0.0);
        let response = self.ai.complete(request).await?;
        Ok(response.content)
    }
}
