//! Infrastructure layer for chatrelay.
//!
//! Contains implementations of the port traits defined in `chatrelay-core`:
//! the SQLite message store and the OpenAI-compatible completion gateway,
//! plus configuration loading.

pub mod config;
pub mod llm;
pub mod sqlite;
