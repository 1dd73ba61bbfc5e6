//! SQLite message repository implementation.
//!
//! Implements `MessageRepository` from `chatrelay-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, appends on the single
//! writer connection and reads on the reader pool.

use chatrelay_core::chat::repository::MessageRepository;
use chatrelay_types::error::StorageError;
use chatrelay_types::message::{Message, Sender};
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// The underlying pool (for shutdown).
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct MessageRow {
    id: i64,
    content: String,
    sender: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            content: row.try_get("content")?,
            sender: row.try_get("sender")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, StorageError> {
        let sender: Sender = self.sender.parse().map_err(StorageError::InvalidRow)?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(Message {
            id: self.id,
            content: self.content,
            sender,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidRow(format!("invalid datetime '{s}': {e}")))
}

fn map_sqlx_error(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            StorageError::Connection(e.to_string())
        }
        other => StorageError::Query(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// MessageRepository implementation
// ---------------------------------------------------------------------------

impl MessageRepository for SqliteMessageRepository {
    async fn append(&self, content: &str, sender: Sender) -> Result<Message, StorageError> {
        // Timestamp is taken inside the statement so it is ordered with the id.
        let row = sqlx::query(
            r#"INSERT INTO messages (content, sender, created_at)
               VALUES (?, ?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
               RETURNING id, content, sender, created_at"#,
        )
        .bind(content)
        .bind(sender.to_string())
        .fetch_one(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        MessageRow::from_row(&row)
            .map_err(map_sqlx_error)?
            .into_message()
    }

    async fn list_all(&self) -> Result<Vec<Message>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, content, sender, created_at FROM messages ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = MessageRow::from_row(row).map_err(map_sqlx_error)?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM messages")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx_error)?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_types::config::BootstrapPolicy;
    use std::sync::Arc;

    async fn test_repo() -> SqliteMessageRepository {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        let pool = DatabasePool::new(&url, BootstrapPolicy::Persistent).await.unwrap();
        SqliteMessageRepository::new(pool)
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let repo = test_repo().await;

        let first = repo.append("hello", Sender::User).await.unwrap();
        let second = repo.append("hi there", Sender::Assistant).await.unwrap();

        assert_eq!(first.content, "hello");
        assert_eq!(first.sender, Sender::User);
        assert_eq!(second.sender, Sender::Assistant);
        assert!(second.id > first.id);
        assert!(second.created_at >= first.created_at);
    }

    #[tokio::test]
    async fn test_list_all_empty() {
        let repo = test_repo().await;
        assert!(repo.list_all().await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_all_contains_each_append_once_in_order() {
        let repo = test_repo().await;

        let mut appended = Vec::new();
        for i in 0..5 {
            let sender = if i % 2 == 0 { Sender::User } else { Sender::Assistant };
            appended.push(repo.append(&format!("message {i}"), sender).await.unwrap());
        }

        let listed = repo.list_all().await.unwrap();
        assert_eq!(listed, appended);
        assert_eq!(repo.count().await.unwrap(), 5);

        // Repeated reads with no writes in between are identical.
        let again = repo.list_all().await.unwrap();
        assert_eq!(listed, again);
    }

    #[tokio::test]
    async fn test_content_preserved_verbatim() {
        let repo = test_repo().await;

        let msg = repo.append("  padded \u{1F600}\n", Sender::User).await.unwrap();
        let listed = repo.list_all().await.unwrap();
        assert_eq!(listed[0].content, "  padded \u{1F600}\n");
        assert_eq!(listed[0].id, msg.id);
    }

    #[tokio::test]
    async fn test_blank_content_rejected_by_schema() {
        let repo = test_repo().await;

        let err = repo.append("   ", Sender::User).await.unwrap_err();
        assert!(matches!(err, StorageError::Query(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_never_collide() {
        let repo = Arc::new(test_repo().await);

        let mut handles = Vec::new();
        for i in 0..50 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.append(&format!("concurrent {i}"), Sender::User).await.unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);

        let listed = repo.list_all().await.unwrap();
        assert_eq!(listed.len(), 50);
        assert!(listed.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_error() {
        let repo = test_repo().await;
        repo.pool().close().await;

        let err = repo.append("too late", Sender::User).await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
    }
}
