//! Customer and provider accounts, and the identity resolved for a caller.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CustomerId, ParticipantId, ProviderId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
}

impl Customer {
    /// First name, else the email local part, else "Customer".
    pub fn display_name(&self) -> String {
        let first = self.first_name.trim();
        if !first.is_empty() {
            return first.to_string();
        }
        match self.email.split('@').next() {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => "Customer".to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    /// Average review score out of 5
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Provider,
}

/// The account behind an inbound message. Resolved once per request.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Customer(Customer),
    Provider(Provider),
}

impl Identity {
    pub fn role(&self) -> Role {
        match self {
            Identity::Customer(_) => Role::Customer,
            Identity::Provider(_) => Role::Provider,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Identity::Customer(c) => &c.email,
            Identity::Provider(p) => &p.email,
        }
    }

    pub fn participant_id(&self) -> ParticipantId {
        match self {
            Identity::Customer(c) => c.id.into(),
            Identity::Provider(p) => p.id.into(),
        }
    }
}

/// Lowercased and trimmed; the form accounts are stored and looked up under.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(first: &str, email: &str) -> Customer {
        Customer {
            id: CustomerId::new(),
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: "Haddad".to_string(),
            phone: None,
            location: None,
        }
    }

    #[test]
    fn display_name_falls_back_to_email_prefix() {
        assert_eq!(customer("Lina", "lina@example.com").display_name(), "Lina");
        assert_eq!(customer("  ", "lina.h@example.com").display_name(), "lina.h");
        assert_eq!(customer("", "@example.com").display_name(), "Customer");
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Lina@Example.COM "), "lina@example.com");
    }

    #[test]
    fn identity_exposes_role_and_participant() {
        let c = customer("Lina", "lina@example.com");
        let id = c.id;
        let identity = Identity::Customer(c);
        assert_eq!(identity.role(), Role::Customer);
        assert_eq!(identity.participant_id(), ParticipantId::from(id));
        assert_eq!(identity.email(), "lina@example.com");
    }
}
