//! Shared domain types for chatrelay.
//!
//! This crate contains the types passed between the relay's layers:
//! chat messages, the error taxonomy, and configuration.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod message;
