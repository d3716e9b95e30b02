//! Strongly-typed identifiers for marketplace records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(
    /// A customer account.
    CustomerId
);
define_id!(
    /// A service provider account.
    ProviderId
);
define_id!(
    /// A service request posted by a customer.
    RequestId
);
define_id!(BidId);
define_id!(ChatId);
define_id!(MessageId);
define_id!(ReviewId);
define_id!(TransactionId);
define_id!(
    /// Either side of a chat. Shares the UUID of the customer or provider it
    /// stands for.
    ParticipantId
);

impl From<CustomerId> for ParticipantId {
    fn from(id: CustomerId) -> Self {
        Self(id.0)
    }
}

impl From<ProviderId> for ParticipantId {
    fn from(id: ProviderId) -> Self {
        Self(id.0)
    }
}
