//! Customer and provider account lookups.
//!
//! Emails are stored normalized (see `normalize_email`); callers pass the
//! normalized form.

use async_trait::async_trait;

use crate::domain::foundation::{CustomerId, DomainError, ProviderId};
use crate::domain::marketplace::{Customer, Provider};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError>;

    async fn find_provider_by_email(&self, email: &str) -> Result<Option<Provider>, DomainError>;

    async fn find_customer(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError>;

    async fn find_provider(&self, id: &ProviderId) -> Result<Option<Provider>, DomainError>;

    /// Persist profile changes.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound` if the customer does not exist
    async fn update_customer(&self, customer: &Customer) -> Result<(), DomainError>;
}
