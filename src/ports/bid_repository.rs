use async_trait::async_trait;

use crate::domain::foundation::{DomainError, RequestId};
use crate::domain::marketplace::Bid;

#[async_trait]
pub trait BidRepository: Send + Sync {
    async fn save(&self, bid: &Bid) -> Result<(), DomainError>;

    /// Bids on a request, oldest first.
    async fn list_for_request(&self, id: &RequestId) -> Result<Vec<Bid>, DomainError>;
}
