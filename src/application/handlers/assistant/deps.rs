//! Collaborators shared by the assistant handlers.

use std::sync::Arc;

use crate::domain::assistant::{KnowledgeBase, ReplyFormatter};
use crate::ports::{
    AIProvider, AccountRepository, BidRepository, Clock, ConversationStore,
    MessagingRepository, RequestRepository, ReviewRepository, ServiceCatalog,
    TransactionRepository,
};

/// Marketplace repositories the assistant reads and writes.
#[derive(Clone)]
pub struct MarketplacePorts {
    pub accounts: Arc<dyn AccountRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub bids: Arc<dyn BidRepository>,
    pub messaging: Arc<dyn MessagingRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub catalog: Arc<dyn ServiceCatalog>,
}

impl MarketplacePorts {
    /// Every port backed by the same store.
    pub fn shared<T>(store: Arc<T>) -> Self
    where
        T: AccountRepository
            + RequestRepository
            + BidRepository
            + MessagingRepository
            + ReviewRepository
            + TransactionRepository
            + ServiceCatalog
            + 'static,
    {
        Self {
            accounts: store.clone(),
            requests: store.clone(),
            bids: store.clone(),
            messaging: store.clone(),
            reviews: store.clone(),
            transactions: store.clone(),
            catalog: store,
        }
    }
}

/// Everything [`super::AskAssistantHandler`] needs, assembled once at startup.
#[derive(Clone)]
pub struct AssistantDeps {
    pub marketplace: MarketplacePorts,
    pub ai: Arc<dyn AIProvider>,
    pub conversations: Arc<dyn ConversationStore>,
    pub knowledge: Arc<KnowledgeBase>,
    pub clock: Arc<dyn Clock>,
    pub replies: ReplyFormatter,
}
