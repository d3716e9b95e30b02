//! ServiBid assistant
//!
//! Conversational assistant for the ServiBid service marketplace. Customers
//! and providers send free-text messages; the assistant answers account
//! questions, runs multi-turn booking, bidding, messaging and profile flows,
//! performs one-shot account actions, and falls back to answers grounded in
//! a knowledge corpus.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
