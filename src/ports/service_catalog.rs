use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::marketplace::ServiceOffering;

/// Read access to the services catalog.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Every offering, in display order.
    async fn list_offerings(&self) -> Result<Vec<ServiceOffering>, DomainError>;
}
