//! In-memory marketplace.
//!
//! Implements every marketplace repository port over one shared store. Used
//! when no database is configured and throughout the tests. Seed helpers
//! populate fixtures; failure switches let tests exercise the compensation
//! paths of multi-record writes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    ChatId, CustomerId, DomainError, ErrorCode, ParticipantId, ProviderId, RequestId, ReviewId,
    Timestamp,
};
use crate::domain::marketplace::{
    normalize_email, Bid, Chat, Customer, Message, MessageKind, Provider, Review, ServiceOffering,
    ServiceRequest, Transaction, DEFAULT_CATALOG,
};
use crate::ports::{
    AccountRepository, BidRepository, MessagingRepository, RequestRepository, ReviewRepository,
    ServiceCatalog, TransactionRepository,
};

#[derive(Debug, Default)]
struct Store {
    customers: Vec<Customer>,
    providers: Vec<Provider>,
    requests: Vec<ServiceRequest>,
    bids: Vec<Bid>,
    chats: Vec<Chat>,
    messages: Vec<Message>,
    reviews: Vec<Review>,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
struct FailureSwitches {
    request_reads: AtomicBool,
    request_updates: AtomicBool,
    review_deletes: AtomicBool,
}

/// Thread-safe in-memory marketplace. Clones share the same data.
#[derive(Debug, Clone)]
pub struct InMemoryMarketplace {
    store: Arc<RwLock<Store>>,
    catalog: Arc<Vec<ServiceOffering>>,
    failures: Arc<FailureSwitches>,
}

impl Default for InMemoryMarketplace {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMarketplace {
    /// Empty marketplace with the default services catalog.
    pub fn new() -> Self {
        Self::with_catalog(DEFAULT_CATALOG.clone())
    }

    pub fn with_catalog(catalog: Vec<ServiceOffering>) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            catalog: Arc::new(catalog),
            failures: Arc::new(FailureSwitches::default()),
        }
    }

    // Seeding

    pub async fn add_customer(&self, customer: Customer) {
        self.store.write().await.customers.push(customer);
    }

    pub async fn add_provider(&self, provider: Provider) {
        self.store.write().await.providers.push(provider);
    }

    pub async fn add_request(&self, request: ServiceRequest) {
        self.store.write().await.requests.push(request);
    }

    pub async fn add_review(&self, review: Review) {
        self.store.write().await.reviews.push(review);
    }

    pub async fn add_transaction(&self, transaction: Transaction) {
        self.store.write().await.transactions.push(transaction);
    }

    pub async fn add_chat(&self, chat: Chat) {
        self.store.write().await.chats.push(chat);
    }

    pub async fn add_message(&self, message: Message) {
        self.store.write().await.messages.push(message);
    }

    // Inspection

    pub async fn requests(&self) -> Vec<ServiceRequest> {
        self.store.read().await.requests.clone()
    }

    pub async fn bids(&self) -> Vec<Bid> {
        self.store.read().await.bids.clone()
    }

    pub async fn chats(&self) -> Vec<Chat> {
        self.store.read().await.chats.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.store.read().await.messages.clone()
    }

    pub async fn reviews(&self) -> Vec<Review> {
        self.store.read().await.reviews.clone()
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.store.read().await.transactions.clone()
    }

    pub async fn customers(&self) -> Vec<Customer> {
        self.store.read().await.customers.clone()
    }

    // Failure injection

    /// Make `RequestRepository::find_by_id` fail until switched off.
    pub fn fail_request_reads(&self, fail: bool) {
        self.failures.request_reads.store(fail, Ordering::SeqCst);
    }

    /// Make `RequestRepository::update` fail until switched off.
    pub fn fail_request_updates(&self, fail: bool) {
        self.failures.request_updates.store(fail, Ordering::SeqCst);
    }

    /// Make `ReviewRepository::delete` fail until switched off.
    pub fn fail_review_deletes(&self, fail: bool) {
        self.failures.review_deletes.store(fail, Ordering::SeqCst);
    }
}

fn sorted_oldest_first(mut requests: Vec<ServiceRequest>) -> Vec<ServiceRequest> {
    requests.sort_by_key(|r| r.created_at);
    requests
}

#[async_trait]
impl AccountRepository for InMemoryMarketplace {
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError> {
        let email = normalize_email(email);
        let store = self.store.read().await;
        Ok(store
            .customers
            .iter()
            .find(|c| normalize_email(&c.email) == email)
            .cloned())
    }

    async fn find_provider_by_email(&self, email: &str) -> Result<Option<Provider>, DomainError> {
        let email = normalize_email(email);
        let store = self.store.read().await;
        Ok(store
            .providers
            .iter()
            .find(|p| normalize_email(&p.email) == email)
            .cloned())
    }

    async fn find_customer(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError> {
        let store = self.store.read().await;
        Ok(store.customers.iter().find(|c| &c.id == id).cloned())
    }

    async fn find_provider(&self, id: &ProviderId) -> Result<Option<Provider>, DomainError> {
        let store = self.store.read().await;
        Ok(store.providers.iter().find(|p| &p.id == id).cloned())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        let slot = store
            .customers
            .iter_mut()
            .find(|c| c.id == customer.id)
            .ok_or_else(|| DomainError::new(ErrorCode::CustomerNotFound, "Customer not found"))?;
        *slot = customer.clone();
        Ok(())
    }
}

#[async_trait]
impl RequestRepository for InMemoryMarketplace {
    async fn save(&self, request: &ServiceRequest) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        if store.requests.iter().any(|r| r.id == request.id) {
            return Err(DomainError::new(
                ErrorCode::DuplicateRecord,
                "Request already exists",
            ));
        }
        store.requests.push(request.clone());
        Ok(())
    }

    async fn update(&self, request: &ServiceRequest) -> Result<(), DomainError> {
        if self.failures.request_updates.load(Ordering::SeqCst) {
            return Err(DomainError::database("request update failed"));
        }
        let mut store = self.store.write().await;
        let slot = store
            .requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or_else(|| DomainError::new(ErrorCode::RequestNotFound, "Request not found"))?;
        *slot = request.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<ServiceRequest>, DomainError> {
        if self.failures.request_reads.load(Ordering::SeqCst) {
            return Err(DomainError::database("request read failed"));
        }
        let store = self.store.read().await;
        Ok(store.requests.iter().find(|r| &r.id == id).cloned())
    }

    async fn delete(&self, id: &RequestId) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        let before = store.requests.len();
        store.requests.retain(|r| &r.id != id);
        if store.requests.len() == before {
            return Err(DomainError::new(ErrorCode::RequestNotFound, "Request not found"));
        }
        Ok(())
    }

    async fn list_for_customer(&self, id: &CustomerId) -> Result<Vec<ServiceRequest>, DomainError> {
        let store = self.store.read().await;
        Ok(sorted_oldest_first(
            store
                .requests
                .iter()
                .filter(|r| &r.customer_id == id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_provider(&self, id: &ProviderId) -> Result<Vec<ServiceRequest>, DomainError> {
        let store = self.store.read().await;
        Ok(sorted_oldest_first(
            store
                .requests
                .iter()
                .filter(|r| r.provider_id.as_ref() == Some(id))
                .cloned()
                .collect(),
        ))
    }

    async fn oldest_open(&self) -> Result<Option<ServiceRequest>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .requests
            .iter()
            .filter(|r| r.is_open_for_bids())
            .min_by_key(|r| r.created_at)
            .cloned())
    }
}

#[async_trait]
impl BidRepository for InMemoryMarketplace {
    async fn save(&self, bid: &Bid) -> Result<(), DomainError> {
        self.store.write().await.bids.push(bid.clone());
        Ok(())
    }

    async fn list_for_request(&self, id: &RequestId) -> Result<Vec<Bid>, DomainError> {
        let store = self.store.read().await;
        let mut bids: Vec<Bid> = store
            .bids
            .iter()
            .filter(|b| &b.request_id == id)
            .cloned()
            .collect();
        bids.sort_by_key(|b| b.created_at);
        Ok(bids)
    }
}

#[async_trait]
impl MessagingRepository for InMemoryMarketplace {
    async fn open_chat(
        &self,
        customer_id: &CustomerId,
        provider_id: &ProviderId,
        last_message: &str,
        at: Timestamp,
    ) -> Result<Chat, DomainError> {
        let mut store = self.store.write().await;
        if let Some(chat) = store
            .chats
            .iter_mut()
            .find(|c| &c.customer_id == customer_id && &c.provider_id == provider_id)
        {
            chat.last_message = last_message.to_string();
            chat.updated_at = at;
            return Ok(chat.clone());
        }

        let chat = Chat {
            id: ChatId::new(),
            customer_id: *customer_id,
            provider_id: *provider_id,
            last_message: last_message.to_string(),
            updated_at: at,
        };
        store.chats.push(chat.clone());
        Ok(chat)
    }

    async fn append(&self, message: &Message) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        if !store.chats.iter().any(|c| c.id == message.chat_id) {
            return Err(DomainError::new(ErrorCode::ChatNotFound, "Chat not found"));
        }
        store.messages.push(message.clone());
        Ok(())
    }

    async fn count_unseen(&self, receiver: &ParticipantId) -> Result<u64, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .messages
            .iter()
            .filter(|m| &m.receiver_id == receiver && !m.seen)
            .count() as u64)
    }

    async fn mark_all_seen(&self, receiver: &ParticipantId) -> Result<u64, DomainError> {
        let mut store = self.store.write().await;
        let mut changed = 0;
        for message in store
            .messages
            .iter_mut()
            .filter(|m| &m.receiver_id == receiver && !m.seen)
        {
            message.seen = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn latest_received(
        &self,
        receiver: &ParticipantId,
    ) -> Result<Option<Message>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .messages
            .iter()
            .filter(|m| &m.receiver_id == receiver)
            .max_by_key(|m| m.created_at)
            .cloned())
    }

    async fn count_sent(&self, sender: &ParticipantId) -> Result<u64, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .messages
            .iter()
            .filter(|m| &m.sender_id == sender)
            .count() as u64)
    }

    async fn latest_file_sent(
        &self,
        sender: &ParticipantId,
    ) -> Result<Option<Message>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .messages
            .iter()
            .filter(|m| &m.sender_id == sender && m.kind != MessageKind::Text)
            .max_by_key(|m| m.created_at)
            .cloned())
    }
}

#[async_trait]
impl ReviewRepository for InMemoryMarketplace {
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, DomainError> {
        let store = self.store.read().await;
        Ok(store.reviews.iter().find(|r| &r.id == id).cloned())
    }

    async fn delete(&self, id: &ReviewId) -> Result<(), DomainError> {
        if self.failures.review_deletes.load(Ordering::SeqCst) {
            return Err(DomainError::database("review delete failed"));
        }
        let mut store = self.store.write().await;
        let before = store.reviews.len();
        store.reviews.retain(|r| &r.id != id);
        if store.reviews.len() == before {
            return Err(DomainError::new(ErrorCode::ReviewNotFound, "Review not found"));
        }
        Ok(())
    }

    async fn count_for_provider_between(
        &self,
        id: &ProviderId,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<u64, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .reviews
            .iter()
            .filter(|r| &r.provider_id == id)
            .filter(|r| !r.created_at.is_before(&from) && r.created_at.is_before(&until))
            .count() as u64)
    }
}

#[async_trait]
impl TransactionRepository for InMemoryMarketplace {
    async fn latest_for_customer(
        &self,
        id: &CustomerId,
    ) -> Result<Option<Transaction>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .transactions
            .iter()
            .filter(|t| &t.customer_id == id)
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn update(&self, transaction: &Transaction) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        let slot = store
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction.id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::TransactionNotFound, "Transaction not found")
            })?;
        *slot = transaction.clone();
        Ok(())
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryMarketplace {
    async fn list_offerings(&self) -> Result<Vec<ServiceOffering>, DomainError> {
        Ok(self.catalog.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TransactionId;
    use crate::domain::marketplace::{
        GeoPoint, NewServiceRequest, RequestState, TransactionStatus, ASSISTANT_GREETING,
    };
    use chrono::{NaiveDate, TimeZone, Utc};

    fn customer(email: &str) -> Customer {
        Customer {
            id: CustomerId::new(),
            email: email.to_string(),
            first_name: "Amal".to_string(),
            last_name: "Haddad".to_string(),
            phone: None,
            location: None,
        }
    }

    fn ts(day: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap())
    }

    fn request(customer_id: CustomerId, created_day: u32) -> ServiceRequest {
        NewServiceRequest {
            customer_id,
            category: "Plumbing".to_string(),
            car_type: None,
            service: "Drain Cleaning".to_string(),
            description: "slow drain".to_string(),
            budget: 150.0,
            date: NaiveDate::from_ymd_opt(2025, 4, 20).unwrap(),
            location: GeoPoint::new(25.2, 55.27).unwrap(),
        }
        .into_request(ts(created_day))
    }

    #[tokio::test]
    async fn email_lookup_is_case_insensitive() {
        let market = InMemoryMarketplace::new();
        market.add_customer(customer("Amal@ServiBid.tech")).await;

        let found = market
            .find_customer_by_email("  amal@servibid.TECH ")
            .await
            .unwrap();
        assert!(found.is_some());
        assert!(market
            .find_provider_by_email("amal@servibid.tech")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn oldest_open_skips_assigned_and_done() {
        let market = InMemoryMarketplace::new();
        let owner = CustomerId::new();

        let mut assigned = request(owner, 1);
        assigned.provider_id = Some(ProviderId::new());
        let mut done = request(owner, 2);
        done.state = RequestState::Done;
        let newer_open = request(owner, 5);
        let older_open = request(owner, 3);

        for r in [assigned, done, newer_open, older_open.clone()] {
            market.add_request(r).await;
        }

        let found = market.oldest_open().await.unwrap().unwrap();
        assert_eq!(found.id, older_open.id);
    }

    #[tokio::test]
    async fn open_chat_reuses_existing_pair() {
        let market = InMemoryMarketplace::new();
        let (c, p) = (CustomerId::new(), ProviderId::new());

        let first = market.open_chat(&c, &p, ASSISTANT_GREETING, ts(1)).await.unwrap();
        let second = market.open_chat(&c, &p, "again", ts(2)).await.unwrap();

        assert_eq!(first.id, second.id);
        let chats = market.chats().await;
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].last_message, "again");
    }

    #[tokio::test]
    async fn append_requires_chat() {
        let market = InMemoryMarketplace::new();
        let message = Message::text(
            ChatId::new(),
            CustomerId::new().into(),
            ProviderId::new().into(),
            "hi",
            ts(1),
        );
        let err = market.append(&message).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ChatNotFound);
    }

    #[tokio::test]
    async fn mark_all_seen_reports_changes() {
        let market = InMemoryMarketplace::new();
        let (c, p) = (CustomerId::new(), ProviderId::new());
        let chat = market.open_chat(&c, &p, "x", ts(1)).await.unwrap();
        for day in 1..=3 {
            market
                .append(&Message::text(chat.id, p.into(), c.into(), "ping", ts(day)))
                .await
                .unwrap();
        }

        let receiver: ParticipantId = c.into();
        assert_eq!(market.count_unseen(&receiver).await.unwrap(), 3);
        assert_eq!(market.mark_all_seen(&receiver).await.unwrap(), 3);
        assert_eq!(market.mark_all_seen(&receiver).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn latest_transaction_by_creation_time() {
        let market = InMemoryMarketplace::new();
        let c = CustomerId::new();
        let older = Transaction {
            id: TransactionId::new(),
            customer_id: c,
            request_id: RequestId::new(),
            amount: 100.0,
            status: TransactionStatus::Pending,
            created_at: ts(1),
        };
        let newer = Transaction {
            id: TransactionId::new(),
            created_at: ts(2),
            ..older.clone()
        };
        market.add_transaction(newer.clone()).await;
        market.add_transaction(older).await;

        let latest = market.latest_for_customer(&c).await.unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
    }

    #[tokio::test]
    async fn review_window_is_half_open() {
        let market = InMemoryMarketplace::new();
        let p = ProviderId::new();
        for day in [1, 15, 31] {
            market
                .add_review(Review {
                    id: ReviewId::new(),
                    provider_id: p,
                    customer_id: CustomerId::new(),
                    request_id: RequestId::new(),
                    rating: 5,
                    comment: String::new(),
                    created_at: ts(day),
                })
                .await;
        }

        let count = market
            .count_for_provider_between(&p, ts(1), ts(31))
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn failure_switches() {
        let market = InMemoryMarketplace::new();
        let r = request(CustomerId::new(), 1);
        RequestRepository::save(&market, &r).await.unwrap();

        market.fail_request_updates(true);
        assert!(RequestRepository::update(&market, &r).await.is_err());
        market.fail_request_updates(false);
        assert!(RequestRepository::update(&market, &r).await.is_ok());

        market.fail_request_reads(true);
        assert!(RequestRepository::find_by_id(&market, &r.id).await.is_err());
        market.fail_request_reads(false);
        assert!(RequestRepository::find_by_id(&market, &r.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn catalog_defaults_to_builtin_offerings() {
        let market = InMemoryMarketplace::new();
        let offerings = market.list_offerings().await.unwrap();
        assert!(offerings.iter().any(|o| o.category == "Plumbing"));
    }
}
