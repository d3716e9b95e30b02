//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI-compatible completions client and a scripted mock
//! - `clock` - system and fixed clocks
//! - `http` - axum routes
//! - `knowledge` - corpus loading
//! - `memory` - in-memory marketplace
//! - `postgres` - PostgreSQL repositories
//! - `storage` - conversation state (in-memory, Redis)

pub mod ai;
pub mod clock;
pub mod http;
pub mod knowledge;
pub mod memory;
pub mod postgres;
pub mod storage;

pub use clock::{FixedClock, SystemClock};
