//! Resolves the caller's account from an email address.

use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::DomainError;
use crate::domain::marketplace::{normalize_email, Identity};
use crate::ports::AccountRepository;

pub struct IdentityResolver {
    accounts: Arc<dyn AccountRepository>,
}

impl IdentityResolver {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Looks the email up as customer and provider concurrently. An email
    /// registered as both resolves to the customer.
    pub async fn resolve(&self, email: &str) -> Result<Option<Identity>, DomainError> {
        let email = normalize_email(email);
        let (customer, provider) = futures::try_join!(
            self.accounts.find_customer_by_email(&email),
            self.accounts.find_provider_by_email(&email),
        )?;

        Ok(match (customer, provider) {
            (Some(customer), Some(_)) => {
                warn!(email = %email, "email registered as customer and provider, using customer");
                Some(Identity::Customer(customer))
            }
            (Some(customer), None) => Some(Identity::Customer(customer)),
            (None, Some(provider)) => Some(Identity::Provider(provider)),
            (None, None) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMarketplace;
    use crate::domain::foundation::{CustomerId, ProviderId};
    use crate::domain::marketplace::{Customer, Provider, Role};

    fn customer(email: &str) -> Customer {
        Customer {
            id: CustomerId::new(),
            email: email.to_string(),
            first_name: "Lina".to_string(),
            last_name: "Haddad".to_string(),
            phone: None,
            location: None,
        }
    }

    fn provider(email: &str) -> Provider {
        Provider {
            id: ProviderId::new(),
            email: email.to_string(),
            name: "FixIt".to_string(),
            phone: Some("+971500000000".to_string()),
            rating: Some(4.5),
        }
    }

    #[tokio::test]
    async fn resolves_customer_with_normalized_email() {
        let market = InMemoryMarketplace::new();
        market.add_customer(customer("lina@example.com")).await;
        let resolver = IdentityResolver::new(Arc::new(market));

        let identity = resolver.resolve("  LINA@example.com ").await.unwrap();
        assert_eq!(identity.map(|i| i.role()), Some(Role::Customer));
    }

    #[tokio::test]
    async fn resolves_provider() {
        let market = InMemoryMarketplace::new();
        market.add_provider(provider("fixit@example.com")).await;
        let resolver = IdentityResolver::new(Arc::new(market));

        let identity = resolver.resolve("fixit@example.com").await.unwrap();
        assert_eq!(identity.map(|i| i.role()), Some(Role::Provider));
    }

    #[tokio::test]
    async fn customer_wins_on_dual_role() {
        let market = InMemoryMarketplace::new();
        market.add_customer(customer("both@example.com")).await;
        market.add_provider(provider("both@example.com")).await;
        let resolver = IdentityResolver::new(Arc::new(market));

        let identity = resolver.resolve("both@example.com").await.unwrap();
        assert_eq!(identity.map(|i| i.role()), Some(Role::Customer));
    }

    #[tokio::test]
    async fn unknown_email_resolves_to_none() {
        let resolver = IdentityResolver::new(Arc::new(InMemoryMarketplace::new()));
        assert!(resolver.resolve("ghost@example.com").await.unwrap().is_none());
    }
}
