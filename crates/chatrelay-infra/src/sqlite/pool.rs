//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. This module provides a `DatabasePool`
//! with a multi-connection reader pool for concurrent reads and a single-connection
//! writer pool for serialized writes. The single writer is what makes message id
//! allocation unique and monotonic under concurrent appends.

use std::path::Path;
use std::str::FromStr;

use chatrelay_types::config::BootstrapPolicy;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERTs.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Create a new DatabasePool with split reader/writer connections.
    ///
    /// Runs migrations on the writer pool, then applies the bootstrap policy.
    /// Both pools use WAL journal mode and a 5-second busy timeout.
    pub async fn new(database_url: &str, bootstrap: BootstrapPolicy) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        // Run migrations on writer before opening reader pool
        sqlx::migrate!("../../migrations").run(&writer).await?;

        if bootstrap == BootstrapPolicy::Fresh {
            reset_messages(&writer).await?;
        }

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        Ok(Self { reader, writer })
    }

    /// Close both pools, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.writer.close().await;
        self.reader.close().await;
    }
}

/// Drop every stored message and restart id allocation at 1.
async fn reset_messages(writer: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = writer.begin().await?;
    let removed = sqlx::query("DELETE FROM messages")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'messages'")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(removed, "Fresh bootstrap: message history cleared");
    Ok(())
}

/// Build the SQLite URL for the message database inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("chat.db").display())
}
