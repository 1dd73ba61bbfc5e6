//! HTTP transport for chatrelay.
//!
//! Axum-based API at `/api/messages` with plain JSON bodies (no envelope),
//! permissive CORS, and a JSON 500 for handler panics.

pub mod error;
pub mod handlers;
pub mod router;
