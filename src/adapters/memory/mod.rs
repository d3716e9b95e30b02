//! In-memory marketplace adapter.

mod marketplace;

pub use marketplace::InMemoryMarketplace;
