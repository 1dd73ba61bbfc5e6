//! Chat message persistence and orchestration.
//!
//! `MessageRepository` is the append-only store port; `ConversationService`
//! drives one user submission through store and gateway.

pub mod repository;
pub mod service;
