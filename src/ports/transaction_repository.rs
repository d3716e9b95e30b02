use async_trait::async_trait;

use crate::domain::foundation::{CustomerId, DomainError};
use crate::domain::marketplace::Transaction;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Most recently created transaction of the customer.
    async fn latest_for_customer(&self, id: &CustomerId)
        -> Result<Option<Transaction>, DomainError>;

    /// # Errors
    ///
    /// - `TransactionNotFound` if the transaction does not exist
    async fn update(&self, transaction: &Transaction) -> Result<(), DomainError>;
}
