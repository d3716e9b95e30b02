use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProviderId, ReviewId, Timestamp};
use crate::domain::marketplace::Review;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, DomainError>;

    /// # Errors
    ///
    /// - `ReviewNotFound` if the review does not exist
    async fn delete(&self, id: &ReviewId) -> Result<(), DomainError>;

    /// Reviews of the provider created in `[from, until)`.
    async fn count_for_provider_between(
        &self,
        id: &ProviderId,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<u64, DomainError>;
}
