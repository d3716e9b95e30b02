//! Service request persistence.

use async_trait::async_trait;

use crate::domain::foundation::{CustomerId, DomainError, ProviderId, RequestId};
use crate::domain::marketplace::ServiceRequest;

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn save(&self, request: &ServiceRequest) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `RequestNotFound` if the request does not exist
    async fn update(&self, request: &ServiceRequest) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<ServiceRequest>, DomainError>;

    /// # Errors
    ///
    /// - `RequestNotFound` if the request does not exist
    async fn delete(&self, id: &RequestId) -> Result<(), DomainError>;

    /// All requests posted by the customer, oldest first.
    async fn list_for_customer(&self, id: &CustomerId) -> Result<Vec<ServiceRequest>, DomainError>;

    /// All requests assigned to the provider, oldest first.
    async fn list_for_provider(&self, id: &ProviderId) -> Result<Vec<ServiceRequest>, DomainError>;

    /// Oldest in-progress request without a provider.
    async fn oldest_open(&self) -> Result<Option<ServiceRequest>, DomainError>;
}
