//! Domain layer.
//!
//! - `foundation` - identifiers, timestamps and error types
//! - `marketplace` - accounts, catalog, requests, bids, chats, reviews, payments
//! - `assistant` - conversation flows, intents, analytics and retrieval

pub mod assistant;
pub mod foundation;
pub mod marketplace;
