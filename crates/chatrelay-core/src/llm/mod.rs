//! Completion gateway abstraction.

pub mod gateway;
