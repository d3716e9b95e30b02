//! Marketplace records the assistant reads and writes: accounts, the services
//! catalog, requests, bids, chats, reviews and payments.

mod account;
mod bid;
mod catalog;
mod chat;
mod request;
mod review;
mod transaction;

pub use account::{normalize_email, Customer, Identity, Provider, Role};
pub use bid::{Bid, ASSISTANT_BID_NOTE};
pub use catalog::{
    categories, services_in, CarType, CategoryKind, ServiceOffering, DEFAULT_CATALOG,
};
pub use chat::{Chat, Message, MessageKind, ASSISTANT_GREETING};
pub use request::{
    GeoPoint, LaundryItems, NewServiceRequest, RequestDetails, RequestState, ServiceRequest,
};
pub use review::Review;
pub use transaction::{Transaction, TransactionStatus};
