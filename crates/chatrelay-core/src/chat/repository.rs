//! MessageRepository trait definition.
//!
//! The store owns message identity: callers hand over content and sender,
//! the store assigns `id` and `created_at`.

use chatrelay_types::error::StorageError;
use chatrelay_types::message::{Message, Sender};

/// Append-only persistence for chat messages.
///
/// Implementations live in chatrelay-infra (e.g., `SqliteMessageRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
///
/// Concurrent `append` calls must never hand out the same id, and ids must
/// increase in the order records become visible to `list_all`.
pub trait MessageRepository: Send + Sync {
    /// Persist a new message and return it with its assigned id and timestamp.
    ///
    /// The record is durable once this resolves.
    fn append(
        &self,
        content: &str,
        sender: Sender,
    ) -> impl std::future::Future<Output = Result<Message, StorageError>> + Send;

    /// All messages, ordered by created_at ASC then id ASC.
    fn list_all(&self) -> impl std::future::Future<Output = Result<Vec<Message>, StorageError>> + Send;

    /// Total number of stored messages.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, StorageError>> + Send;
}
