//! Conversation orchestration and port trait definitions for chatrelay.
//!
//! This crate defines the "ports" (message store and completion gateway
//! traits) that the infrastructure layer implements, and the service that
//! sequences them. It depends only on `chatrelay-types` -- never on
//! `chatrelay-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
