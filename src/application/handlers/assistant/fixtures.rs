//! Shared setup for the assistant handler tests.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use super::deps::{AssistantDeps, MarketplacePorts};
use crate::adapters::ai::MockAIProvider;
use crate::adapters::clock::FixedClock;
use crate::adapters::memory::InMemoryMarketplace;
use crate::adapters::storage::InMemoryConversationStore;
use crate::domain::assistant::{KnowledgeBase, ReplyFormatter};
use crate::domain::foundation::{CustomerId, ProviderId, RequestId, Timestamp};
use crate::domain::marketplace::{
    Customer, Provider, RequestDetails, RequestState, ServiceRequest,
};

/// 2025-04-10, a Thursday.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
}

pub fn april(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
}

pub fn at(day: NaiveDate) -> Timestamp {
    Timestamp::from_datetime(Utc.from_utc_datetime(&day.and_hms_opt(9, 0, 0).unwrap()))
}

pub fn request(customer_id: CustomerId, service: &str, date: NaiveDate) -> ServiceRequest {
    ServiceRequest {
        id: RequestId::new(),
        customer_id,
        provider_id: None,
        category: "Plumbing".to_string(),
        service: service.to_string(),
        description: "Kitchen".to_string(),
        budget: 150.0,
        price: None,
        date,
        location: None,
        state: RequestState::InProgress,
        paid: false,
        review_id: None,
        details: RequestDetails::for_category("Plumbing", None, service),
        created_at: at(date),
    }
}

pub struct Harness {
    pub market: InMemoryMarketplace,
    pub ai: MockAIProvider,
    pub store: InMemoryConversationStore,
    pub clock: FixedClock,
    pub knowledge: KnowledgeBase,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            market: InMemoryMarketplace::new(),
            ai: MockAIProvider::new(),
            store: InMemoryConversationStore::new(),
            clock: FixedClock::new(at(today())),
            knowledge: KnowledgeBase::default(),
        }
    }

    pub fn deps(&self) -> AssistantDeps {
        AssistantDeps {
            marketplace: MarketplacePorts::shared(Arc::new(self.market.clone())),
            ai: Arc::new(self.ai.clone()),
            conversations: Arc::new(self.store.clone()),
            knowledge: Arc::new(self.knowledge.clone()),
            clock: Arc::new(self.clock.clone()),
            replies: ReplyFormatter::fixed(),
        }
    }

    pub async fn customer(&self, first_name: &str, email: &str) -> Customer {
        let customer = Customer {
            id: CustomerId::new(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: "Haddad".to_string(),
            phone: Some("+971501111111".to_string()),
            location: None,
        };
        self.market.add_customer(customer.clone()).await;
        customer
    }

    pub async fn provider(&self, name: &str, email: &str) -> Provider {
        let provider = Provider {
            id: ProviderId::new(),
            email: email.to_string(),
            name: name.to_string(),
            phone: Some("+971502222222".to_string()),
            rating: Some(4.5),
        };
        self.market.add_provider(provider.clone()).await;
        provider
    }
}
