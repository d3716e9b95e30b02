use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CustomerId, ProviderId, RequestId, ReviewId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub provider_id: ProviderId,
    pub customer_id: CustomerId,
    pub request_id: RequestId,
    /// 1 to 5
    pub rating: u8,
    pub comment: String,
    pub created_at: Timestamp,
}
