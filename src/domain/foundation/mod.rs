//! Shared domain primitives: identifiers, timestamps and error types.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    BidId, ChatId, CustomerId, MessageId, ParticipantId, ProviderId, RequestId, ReviewId,
    TransactionId,
};
pub use timestamp::Timestamp;
