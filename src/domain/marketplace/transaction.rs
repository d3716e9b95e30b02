use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CustomerId, RequestId, Timestamp, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Complete,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Complete => "complete",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(TransactionStatus::Pending),
            "complete" => Some(TransactionStatus::Complete),
            _ => None,
        }
    }
}

/// Payment of a customer for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    pub request_id: RequestId,
    pub amount: f64,
    pub status: TransactionStatus,
    pub created_at: Timestamp,
}
