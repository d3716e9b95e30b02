//! Multi-turn flows: booking, bidding, messaging and profile edits.
//!
//! The engine extracts the slot the current step expects, runs the pure
//! transition table and executes the terminal effect. It never touches the
//! conversation store itself; the returned [`Turn`] says what should happen
//! to the stored state, so a failed effect leaves it as it was.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::classifier::IntentClassifier;
use super::deps::{AssistantDeps, MarketplacePorts};
use super::error::AssistantError;
use crate::domain::assistant::analytics::distinct;
use crate::domain::assistant::slots::{parse_amount, parse_coordinates, refers_to};
use crate::domain::assistant::{
    transition, BookingDraft, CustomerCandidate, FlowEffect, FlowStep, Intent, ProfileField,
    ProviderCandidate, ReplyFormatter, SlotKind, SlotValue, Transition, FALLBACK_REPLY,
};
use crate::domain::foundation::RequestId;
use crate::domain::marketplace::{
    categories, services_in, Bid, Customer, Identity, Message, NewServiceRequest, Provider,
    ServiceOffering, ServiceRequest, ASSISTANT_GREETING,
};
use crate::ports::Clock;

/// What should happen to the stored conversation after a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    Keep,
    Set(FlowStep),
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub reply: String,
    pub state: StateChange,
}

impl Turn {
    pub fn keep(reply: String) -> Self {
        Self {
            reply,
            state: StateChange::Keep,
        }
    }

    pub fn set(reply: String, step: FlowStep) -> Self {
        Self {
            reply,
            state: StateChange::Set(step),
        }
    }

    pub fn clear(reply: String) -> Self {
        Self {
            reply,
            state: StateChange::Clear,
        }
    }
}

pub struct DialogueEngine {
    marketplace: MarketplacePorts,
    classifier: Arc<IntentClassifier>,
    clock: Arc<dyn Clock>,
    replies: ReplyFormatter,
}

impl DialogueEngine {
    pub fn new(deps: &AssistantDeps, classifier: Arc<IntentClassifier>) -> Self {
        Self {
            marketplace: deps.marketplace.clone(),
            classifier,
            clock: deps.clock.clone(),
            replies: deps.replies.clone(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Entry
    // ════════════════════════════════════════════════════════════════════════

    /// Opens the flow for `intent`. When there is nothing to act on the reply
    /// says so and the stored state is left alone.
    pub async fn start(
        &self,
        identity: &Identity,
        intent: Intent,
        message: &str,
    ) -> Result<Turn, AssistantError> {
        match (intent, identity) {
            (Intent::CreateRequest, Identity::Customer(_)) => self.start_booking(message).await,
            (Intent::SubmitBid, Identity::Provider(_)) => self.start_bid().await,
            (Intent::MessageProvider, Identity::Customer(customer)) => {
                self.start_provider_message(customer).await
            }
            (Intent::MessageCustomer, Identity::Provider(provider)) => {
                self.start_customer_message(provider).await
            }
            (Intent::UpdateProfile(field), Identity::Customer(_)) => Ok(Turn::set(
                self.replies.profile_prompt(field),
                FlowStep::AwaitingProfileValue { field },
            )),
            (intent, identity) => {
                warn!(?intent, role = ?identity.role(), "no flow for intent and role");
                Ok(Turn::keep(FALLBACK_REPLY.to_string()))
            }
        }
    }

    async fn start_booking(&self, message: &str) -> Result<Turn, AssistantError> {
        let offerings = self.marketplace.catalog.list_offerings().await?;
        let category = self
            .classifier
            .category(message, &categories(&offerings))
            .await?;
        let step = FlowStep::start_booking(category);
        debug!(step = step.name(), "booking started");
        Ok(Turn::set(self.prompt_for(&step, &offerings), step))
    }

    async fn start_bid(&self) -> Result<Turn, AssistantError> {
        let Some(request) = self.marketplace.requests.oldest_open().await? else {
            return Ok(Turn::keep(self.replies.no_open_requests()));
        };
        Ok(Turn::set(
            self.replies.bid_prompt(&request),
            FlowStep::AwaitingBidAmount {
                request_id: request.id,
            },
        ))
    }

    async fn start_provider_message(&self, customer: &Customer) -> Result<Turn, AssistantError> {
        let requests = self
            .marketplace
            .requests
            .list_for_customer(&customer.id)
            .await?;

        let mut candidates = Vec::new();
        for id in distinct(requests.iter().filter_map(|r| r.provider_id)) {
            if let Some(provider) = self.marketplace.accounts.find_provider(&id).await? {
                candidates.push(ProviderCandidate {
                    id: provider.id,
                    name: provider.name,
                });
            }
        }

        if candidates.is_empty() {
            return Ok(Turn::keep(self.replies.no_providers_to_message()));
        }
        Ok(Turn::set(
            self.replies.provider_choice_prompt(&candidates),
            FlowStep::AwaitingProviderChoice { candidates },
        ))
    }

    async fn start_customer_message(&self, provider: &Provider) -> Result<Turn, AssistantError> {
        let requests = self
            .marketplace
            .requests
            .list_for_provider(&provider.id)
            .await?;

        let mut candidates = Vec::new();
        for id in distinct(requests.iter().map(|r| r.customer_id)) {
            let Some(customer) = self.marketplace.accounts.find_customer(&id).await? else {
                continue;
            };
            let services = distinct(
                requests
                    .iter()
                    .filter(|r| r.customer_id == id)
                    .map(|r| r.service.clone()),
            );
            candidates.push(CustomerCandidate {
                id,
                name: customer.display_name(),
                services,
            });
        }

        if candidates.is_empty() {
            return Ok(Turn::keep(self.replies.no_customers_to_message()));
        }
        Ok(Turn::set(
            self.replies.customer_choice_prompt(&candidates),
            FlowStep::AwaitingCustomerSelection { candidates },
        ))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Continuation
    // ════════════════════════════════════════════════════════════════════════

    pub async fn continue_flow(
        &self,
        identity: &Identity,
        step: &FlowStep,
        message: &str,
    ) -> Result<Turn, AssistantError> {
        let offerings = if needs_catalog(step) {
            self.marketplace.catalog.list_offerings().await?
        } else {
            Vec::new()
        };

        let slot = self.extract(step, message, &offerings).await?;
        debug!(step = step.name(), extracted = slot.is_some(), "slot extraction");

        match transition(step, slot) {
            Transition::Reprompt => Ok(Turn::keep(self.reprompt_for(step, &offerings))),
            Transition::Advance(next) => {
                debug!(from = step.name(), to = next.name(), "flow advanced");
                Ok(Turn::set(self.prompt_for(&next, &offerings), next))
            }
            Transition::Complete(effect) => {
                let reply = self.execute(identity, effect).await?;
                Ok(Turn::clear(reply))
            }
        }
    }

    async fn extract(
        &self,
        step: &FlowStep,
        message: &str,
        offerings: &[ServiceOffering],
    ) -> Result<Option<SlotValue>, AssistantError> {
        let slot = match step {
            FlowStep::AwaitingCategory => self
                .classifier
                .category(message, &categories(offerings))
                .await?
                .map(SlotValue::Category),
            FlowStep::AwaitingCarType { .. } => {
                self.classifier.car_type(message).await?.map(SlotValue::CarType)
            }
            FlowStep::AwaitingService { category, .. } => self
                .classifier
                .service(message, category, &services_in(offerings, category))
                .await?
                .map(SlotValue::Service),
            FlowStep::AwaitingDate { .. } => self
                .classifier
                .future_date(message, self.clock.today())
                .await?
                .map(SlotValue::Date),
            FlowStep::AwaitingBudget { .. } => {
                self.classifier.budget(message).await?.map(SlotValue::Amount)
            }
            FlowStep::AwaitingDescription { .. } => Some(SlotValue::Text(message.trim().to_string())),
            FlowStep::AwaitingLocation { .. } => parse_coordinates(message).ok().map(SlotValue::Location),
            FlowStep::AwaitingBidAmount { .. } => parse_amount(message).map(SlotValue::Amount),
            FlowStep::AwaitingProviderChoice { candidates } => candidates
                .iter()
                .find(|c| refers_to(message, &c.name))
                .cloned()
                .map(SlotValue::Provider),
            FlowStep::AwaitingCustomerSelection { candidates } => candidates
                .iter()
                .find(|c| {
                    refers_to(message, &c.name) || c.services.iter().any(|s| refers_to(message, s))
                })
                .cloned()
                .map(SlotValue::Customer),
            FlowStep::AwaitingProfileValue { .. } => Some(SlotValue::Text(message.to_string())),
        };
        Ok(slot)
    }

    fn prompt_for(&self, step: &FlowStep, offerings: &[ServiceOffering]) -> String {
        match step {
            FlowStep::AwaitingCategory => self.replies.category_prompt(&categories(offerings)),
            FlowStep::AwaitingCarType { .. } => self.replies.car_type_prompt(),
            FlowStep::AwaitingService { category, car_type } => self.replies.service_prompt(
                category,
                *car_type,
                &services_in(offerings, category),
            ),
            FlowStep::AwaitingDate { choice } => self.replies.date_prompt(&choice.service),
            FlowStep::AwaitingBudget { .. } => self.replies.budget_prompt(),
            FlowStep::AwaitingDescription { .. } => self.replies.description_prompt(),
            FlowStep::AwaitingLocation { .. } => self.replies.location_prompt(),
            FlowStep::AwaitingBidAmount { .. } => self.replies.bid_reprompt(),
            FlowStep::AwaitingProviderChoice { candidates } => {
                self.replies.provider_choice_prompt(candidates)
            }
            FlowStep::AwaitingCustomerSelection { candidates } => {
                self.replies.customer_choice_prompt(candidates)
            }
            FlowStep::AwaitingProfileValue { field } => self.replies.profile_prompt(*field),
        }
    }

    fn reprompt_for(&self, step: &FlowStep, offerings: &[ServiceOffering]) -> String {
        match step {
            FlowStep::AwaitingCategory => self.replies.category_reprompt(&categories(offerings)),
            FlowStep::AwaitingCarType { .. } => self.replies.car_type_reprompt(),
            FlowStep::AwaitingService { category, .. } => self
                .replies
                .service_reprompt(category, &services_in(offerings, category)),
            FlowStep::AwaitingDate { .. } => self.replies.date_reprompt(),
            FlowStep::AwaitingBudget { .. } => self.replies.budget_reprompt(),
            FlowStep::AwaitingDescription { .. } => self.replies.description_prompt(),
            FlowStep::AwaitingLocation { .. } => self.replies.location_reprompt(),
            FlowStep::AwaitingBidAmount { .. } => self.replies.bid_reprompt(),
            FlowStep::AwaitingProviderChoice { candidates } => {
                self.replies.provider_choice_reprompt(candidates)
            }
            FlowStep::AwaitingCustomerSelection { candidates } => {
                self.replies.customer_choice_reprompt(candidates)
            }
            FlowStep::AwaitingProfileValue { field } => self.replies.profile_reprompt(*field),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Effects
    // ════════════════════════════════════════════════════════════════════════

    async fn execute(
        &self,
        identity: &Identity,
        effect: FlowEffect,
    ) -> Result<String, AssistantError> {
        match (effect, identity) {
            (FlowEffect::CreateRequest(draft), Identity::Customer(customer)) => {
                self.create_request(customer, draft).await
            }
            (FlowEffect::PlaceBid { request_id, amount }, Identity::Provider(provider)) => {
                self.place_bid(provider, request_id, amount).await
            }
            (FlowEffect::MessageProvider(candidate), Identity::Customer(customer)) => {
                self.message_provider(customer, candidate).await
            }
            (FlowEffect::MessageCustomer(candidate), Identity::Provider(provider)) => {
                self.message_customer(provider, candidate).await
            }
            (FlowEffect::UpdateProfile { field, value }, Identity::Customer(customer)) => {
                self.update_profile(customer, field, &value).await
            }
            (effect, identity) => {
                warn!(?effect, role = ?identity.role(), "flow effect does not fit caller role");
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }

    async fn create_request(
        &self,
        customer: &Customer,
        draft: BookingDraft,
    ) -> Result<String, AssistantError> {
        let location = draft.location;
        let request = NewServiceRequest {
            customer_id: customer.id,
            category: draft.choice.category,
            car_type: draft.choice.car_type,
            service: draft.choice.service,
            description: draft.description,
            budget: draft.budget,
            date: draft.date,
            location,
        }
        .into_request(self.clock.now());

        self.marketplace.requests.save(&request).await?;
        info!(
            request_id = %request.id,
            customer_id = %customer.id,
            category = %request.category,
            "service request created"
        );
        Ok(self.replies.request_created(&request, location))
    }

    async fn place_bid(
        &self,
        provider: &Provider,
        request_id: RequestId,
        amount: f64,
    ) -> Result<String, AssistantError> {
        let request = self
            .marketplace
            .requests
            .find_by_id(&request_id)
            .await?
            .filter(ServiceRequest::is_open_for_bids);
        let Some(request) = request else {
            info!(request_id = %request_id, "bid target no longer open");
            return Ok(self.replies.request_unavailable());
        };

        let bid = Bid::via_assistant(provider.id, request.id, amount, self.clock.now());
        self.marketplace.bids.save(&bid).await?;
        info!(
            bid_id = %bid.id,
            request_id = %request.id,
            provider_id = %provider.id,
            amount,
            "bid placed"
        );
        Ok(self.replies.bid_placed(amount, &request))
    }

    async fn message_provider(
        &self,
        customer: &Customer,
        candidate: ProviderCandidate,
    ) -> Result<String, AssistantError> {
        let now = self.clock.now();
        let chat = self
            .marketplace
            .messaging
            .open_chat(&customer.id, &candidate.id, ASSISTANT_GREETING, now)
            .await?;
        let greeting = Message::text(
            chat.id,
            customer.id.into(),
            candidate.id.into(),
            ASSISTANT_GREETING,
            now,
        );
        self.marketplace.messaging.append(&greeting).await?;
        info!(chat_id = %chat.id, provider_id = %candidate.id, "greeting sent to provider");
        Ok(self.replies.message_sent_to_provider(&candidate.name))
    }

    async fn message_customer(
        &self,
        provider: &Provider,
        candidate: CustomerCandidate,
    ) -> Result<String, AssistantError> {
        let now = self.clock.now();
        let chat = self
            .marketplace
            .messaging
            .open_chat(&candidate.id, &provider.id, ASSISTANT_GREETING, now)
            .await?;
        let greeting = Message::text(
            chat.id,
            provider.id.into(),
            candidate.id.into(),
            ASSISTANT_GREETING,
            now,
        );
        self.marketplace.messaging.append(&greeting).await?;
        info!(chat_id = %chat.id, customer_id = %candidate.id, "greeting sent to customer");
        Ok(self.replies.message_sent_to_customer(&candidate.name))
    }

    async fn update_profile(
        &self,
        customer: &Customer,
        field: ProfileField,
        value: &str,
    ) -> Result<String, AssistantError> {
        let mut updated = self
            .marketplace
            .accounts
            .find_customer(&customer.id)
            .await?
            .unwrap_or_else(|| customer.clone());
        apply_profile_value(&mut updated, field, value);

        self.marketplace.accounts.update_customer(&updated).await?;
        info!(customer_id = %customer.id, ?field, "profile updated");
        Ok(self.replies.profile_updated(field, &updated))
    }
}

fn needs_catalog(step: &FlowStep) -> bool {
    matches!(
        step.expects(),
        SlotKind::Category | SlotKind::CarType | SlotKind::Service
    )
}

/// Full names split at the first space; an empty half keeps the old value.
fn apply_profile_value(customer: &mut Customer, field: ProfileField, value: &str) {
    match field {
        ProfileField::FirstName => customer.first_name = value.to_string(),
        ProfileField::LastName => customer.last_name = value.to_string(),
        ProfileField::Location => customer.location = Some(value.to_string()),
        ProfileField::FullName => {
            let (first, last) = value.split_once(' ').unwrap_or((value, ""));
            let (first, last) = (first.trim(), last.trim());
            if !first.is_empty() {
                customer.first_name = first.to_string();
            }
            if !last.is_empty() {
                customer.last_name = last.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::assistant::fixtures::{april, request, Harness};
    use crate::domain::assistant::ServiceChoice;
    use crate::domain::foundation::{CustomerId, ParticipantId};
    use crate::domain::marketplace::{CarType, GeoPoint, RequestState};

    fn engine(harness: &Harness) -> DialogueEngine {
        let deps = harness.deps();
        let classifier = Arc::new(IntentClassifier::new(deps.ai.clone()));
        DialogueEngine::new(&deps, classifier)
    }

    fn plumbing_choice() -> ServiceChoice {
        ServiceChoice {
            category: "Plumbing".to_string(),
            car_type: None,
            service: "Leak Detection & Repair".to_string(),
        }
    }

    #[tokio::test]
    async fn booking_skips_category_when_named() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;

        let turn = engine(&h)
            .start(
                &Identity::Customer(customer),
                Intent::CreateRequest,
                "create request for plumbing",
            )
            .await
            .unwrap();

        assert_eq!(
            turn.state,
            StateChange::Set(FlowStep::AwaitingService {
                category: "Plumbing".to_string(),
                car_type: None,
            })
        );
        assert!(turn.reply.contains("• Leak Detection & Repair"));
        assert_eq!(h.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn automotive_booking_asks_for_car_type() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;

        let turn = engine(&h)
            .start(
                &Identity::Customer(customer),
                Intent::CreateRequest,
                "new request, automotive please",
            )
            .await
            .unwrap();

        assert_eq!(
            turn.state,
            StateChange::Set(FlowStep::AwaitingCarType {
                category: "Automotive".to_string()
            })
        );
    }

    #[tokio::test]
    async fn booking_without_category_lists_categories() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;

        let turn = engine(&h)
            .start(&Identity::Customer(customer), Intent::CreateRequest, "create request")
            .await
            .unwrap();

        assert_eq!(turn.state, StateChange::Set(FlowStep::AwaitingCategory));
        assert!(turn.reply.contains("• Plumbing"));
        assert_eq!(h.ai.call_count(), 1);
    }

    #[tokio::test]
    async fn invalid_budget_keeps_the_step() {
        let h = Harness::new();
        h.ai.push_response("none");
        let customer = Identity::Customer(h.customer("Lina", "lina@example.com").await);
        let step = FlowStep::AwaitingBudget {
            choice: plumbing_choice(),
            date: april(20),
        };
        let engine = engine(&h);

        let turn = engine.continue_flow(&customer, &step, "-5").await.unwrap();
        assert_eq!(turn.state, StateChange::Keep);
        assert!(turn.reply.contains("valid amount"));

        let turn = engine.continue_flow(&customer, &step, "abc").await.unwrap();
        assert_eq!(turn.state, StateChange::Keep);
    }

    #[tokio::test]
    async fn past_date_is_reprompted() {
        let h = Harness::new();
        let customer = Identity::Customer(h.customer("Lina", "lina@example.com").await);
        let step = FlowStep::AwaitingDate {
            choice: plumbing_choice(),
        };

        let turn = engine(&h)
            .continue_flow(&customer, &step, "2025-04-01")
            .await
            .unwrap();

        assert_eq!(turn.state, StateChange::Keep);
        assert_eq!(turn.reply, ReplyFormatter::fixed().date_reprompt());
    }

    #[tokio::test]
    async fn location_completes_booking() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;
        let step = FlowStep::AwaitingLocation {
            choice: plumbing_choice(),
            date: april(20),
            budget: 200.0,
            description: "Under the sink".to_string(),
        };

        let engine = engine(&h);
        let identity = Identity::Customer(customer.clone());
        let turn = engine
            .continue_flow(&identity, &step, "somewhere nice")
            .await
            .unwrap();
        assert_eq!(turn.state, StateChange::Keep);
        assert!(h.market.requests().await.is_empty());

        let turn = engine
            .continue_flow(&identity, &step, "24.4539, 54.3773")
            .await
            .unwrap();
        assert_eq!(turn.state, StateChange::Clear);

        let saved = h.market.requests().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].customer_id, customer.id);
        assert_eq!(saved[0].budget, 200.0);
        assert_eq!(saved[0].state, RequestState::InProgress);
        assert_eq!(saved[0].location, Some(GeoPoint::new(24.4539, 54.3773).unwrap()));
        assert!(turn.reply.contains("Leak Detection & Repair"));
    }

    #[tokio::test]
    async fn car_type_advances_to_automotive_services() {
        let h = Harness::new();
        let customer = Identity::Customer(h.customer("Lina", "lina@example.com").await);
        let step = FlowStep::AwaitingCarType {
            category: "Automotive".to_string(),
        };

        let turn = engine(&h)
            .continue_flow(&customer, &step, "it's an SUV")
            .await
            .unwrap();

        assert_eq!(
            turn.state,
            StateChange::Set(FlowStep::AwaitingService {
                category: "Automotive".to_string(),
                car_type: Some(CarType::Suv),
            })
        );
        assert!(turn.reply.contains("Oil Change Service"));
    }

    #[tokio::test]
    async fn bid_without_open_requests_creates_no_flow() {
        let h = Harness::new();
        let provider = h.provider("FixIt", "fixit@example.com").await;

        let turn = engine(&h)
            .start(&Identity::Provider(provider), Intent::SubmitBid, "submit bid")
            .await
            .unwrap();

        assert_eq!(turn.state, StateChange::Keep);
        assert_eq!(turn.reply, ReplyFormatter::fixed().no_open_requests());
    }

    #[tokio::test]
    async fn bid_targets_oldest_open_request_and_is_saved() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;
        let provider = Identity::Provider(h.provider("FixIt", "fixit@example.com").await);
        let older = request(customer.id, "Drain Cleaning", april(1));
        let newer = request(customer.id, "Toilet Repair", april(5));
        h.market.add_request(newer).await;
        h.market.add_request(older.clone()).await;
        let engine = engine(&h);

        let turn = engine.start(&provider, Intent::SubmitBid, "place a bid").await.unwrap();
        let StateChange::Set(step) = turn.state else {
            panic!("expected a bid flow");
        };
        assert_eq!(step, FlowStep::AwaitingBidAmount { request_id: older.id });
        assert!(turn.reply.contains("Drain Cleaning"));

        let turn = engine.continue_flow(&provider, &step, "0").await.unwrap();
        assert_eq!(turn.state, StateChange::Keep);

        let turn = engine.continue_flow(&provider, &step, "AED 180").await.unwrap();
        assert_eq!(turn.state, StateChange::Clear);
        let bids = h.market.bids().await;
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].request_id, older.id);
        assert_eq!(bids[0].price, 180.0);
        assert_eq!(bids[0].description, "Bid placed via AI assistant");
    }

    #[tokio::test]
    async fn bid_on_vanished_request_is_refused() {
        let h = Harness::new();
        let provider = Identity::Provider(h.provider("FixIt", "fixit@example.com").await);
        let step = FlowStep::AwaitingBidAmount {
            request_id: RequestId::new(),
        };

        let turn = engine(&h).continue_flow(&provider, &step, "150").await.unwrap();

        assert_eq!(turn.state, StateChange::Clear);
        assert_eq!(turn.reply, ReplyFormatter::fixed().request_unavailable());
        assert!(h.market.bids().await.is_empty());
    }

    #[tokio::test]
    async fn customer_messages_assigned_provider() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;
        let provider = h.provider("FixIt Plumbing", "fixit@example.com").await;
        let mut assigned = request(customer.id, "Drain Cleaning", april(1));
        assigned.provider_id = Some(provider.id);
        h.market.add_request(assigned).await;
        let identity = Identity::Customer(customer.clone());
        let engine = engine(&h);

        let turn = engine
            .start(&identity, Intent::MessageProvider, "send message")
            .await
            .unwrap();
        let StateChange::Set(step) = turn.state else {
            panic!("expected a provider choice");
        };
        assert!(turn.reply.contains("• FixIt Plumbing"));

        let turn = engine.continue_flow(&identity, &step, "nobody").await.unwrap();
        assert_eq!(turn.state, StateChange::Keep);

        let turn = engine.continue_flow(&identity, &step, "fixit").await.unwrap();
        assert_eq!(turn.state, StateChange::Clear);
        assert_eq!(turn.reply, "Message sent to FixIt Plumbing ✅.");

        let chats = h.market.chats().await;
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].provider_id, provider.id);
        let messages = h.market.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, ASSISTANT_GREETING);
        assert_eq!(messages[0].sender_id, ParticipantId::from(customer.id));
    }

    #[tokio::test]
    async fn customer_without_providers_gets_no_flow() {
        let h = Harness::new();
        let customer = Identity::Customer(h.customer("Lina", "lina@example.com").await);

        let turn = engine(&h)
            .start(&customer, Intent::MessageProvider, "message provider")
            .await
            .unwrap();

        assert_eq!(turn.state, StateChange::Keep);
        assert_eq!(turn.reply, ReplyFormatter::fixed().no_providers_to_message());
    }

    #[tokio::test]
    async fn provider_picks_customer_by_service() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;
        let provider = h.provider("FixIt", "fixit@example.com").await;
        let mut job = request(customer.id, "Drain Cleaning", april(1));
        job.provider_id = Some(provider.id);
        h.market.add_request(job).await;
        let identity = Identity::Provider(provider);
        let engine = engine(&h);

        let turn = engine
            .start(&identity, Intent::MessageCustomer, "message customer")
            .await
            .unwrap();
        let StateChange::Set(step) = turn.state else {
            panic!("expected a customer choice");
        };
        assert!(turn.reply.contains("Lina - Drain Cleaning"));

        let turn = engine
            .continue_flow(&identity, &step, "drain cleaning")
            .await
            .unwrap();
        assert_eq!(turn.state, StateChange::Clear);
        assert_eq!(turn.reply, "✅ Message sent to Lina successfully.");
        assert_eq!(
            h.market.messages().await[0].receiver_id,
            ParticipantId::from(customer.id)
        );
    }

    #[tokio::test]
    async fn customer_choice_ignores_names_inside_the_reply() {
        let h = Harness::new();
        let ali = h.customer("Ali", "ali@example.com").await;
        let khalid = h.customer("Khalid", "khalid@example.com").await;
        let provider = h.provider("FixIt", "fixit@example.com").await;
        for (customer_id, day) in [(ali.id, 1), (khalid.id, 2)] {
            let mut job = request(customer_id, "Drain Cleaning", april(day));
            job.provider_id = Some(provider.id);
            h.market.add_request(job).await;
        }
        let identity = Identity::Provider(provider);
        let engine = engine(&h);

        let turn = engine
            .start(&identity, Intent::MessageCustomer, "message customer")
            .await
            .unwrap();
        let StateChange::Set(step) = turn.state else {
            panic!("expected a customer choice");
        };

        let turn = engine.continue_flow(&identity, &step, "Khalid").await.unwrap();
        assert_eq!(turn.state, StateChange::Clear);
        assert_eq!(turn.reply, "✅ Message sent to Khalid successfully.");
        let messages = h.market.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].receiver_id, ParticipantId::from(khalid.id));
    }

    #[tokio::test]
    async fn full_name_update_is_persisted() {
        let h = Harness::new();
        let customer = h.customer("Lina", "lina@example.com").await;
        let identity = Identity::Customer(customer.clone());
        let engine = engine(&h);

        let turn = engine
            .start(
                &identity,
                Intent::UpdateProfile(ProfileField::FullName),
                "update my name",
            )
            .await
            .unwrap();
        let StateChange::Set(step) = turn.state else {
            panic!("expected a profile flow");
        };

        let turn = engine
            .continue_flow(&identity, &step, "  Lina Mansour ")
            .await
            .unwrap();
        assert_eq!(turn.state, StateChange::Clear);
        assert_eq!(turn.reply, "Name updated to Lina Mansour");

        let stored = h.market.customers().await;
        assert_eq!(stored[0].first_name, "Lina");
        assert_eq!(stored[0].last_name, "Mansour");
    }

    #[test]
    fn single_word_full_name_keeps_last_name() {
        let mut customer = Customer {
            id: CustomerId::new(),
            email: "lina@example.com".to_string(),
            first_name: "Lina".to_string(),
            last_name: "Haddad".to_string(),
            phone: None,
            location: None,
        };
        apply_profile_value(&mut customer, ProfileField::FullName, "Leena");
        assert_eq!(customer.full_name(), "Leena Haddad");

        apply_profile_value(&mut customer, ProfileField::Location, "Abu Dhabi");
        assert_eq!(customer.location.as_deref(), Some("Abu Dhabi"));
    }
}
