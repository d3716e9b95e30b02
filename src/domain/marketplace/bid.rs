use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BidId, ProviderId, RequestId, Timestamp};

/// Note attached to bids submitted through the assistant.
pub const ASSISTANT_BID_NOTE: &str = "Bid placed via AI assistant";

/// A provider's offer on an open request. Immutable once placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub provider_id: ProviderId,
    pub request_id: RequestId,
    pub price: f64,
    pub description: String,
    pub created_at: Timestamp,
}

impl Bid {
    pub fn via_assistant(
        provider_id: ProviderId,
        request_id: RequestId,
        price: f64,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: BidId::new(),
            provider_id,
            request_id,
            price,
            description: ASSISTANT_BID_NOTE.to_string(),
            created_at,
        }
    }
}
