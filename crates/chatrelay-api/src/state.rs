//! Application state wiring the store, gateway, and conversation service.
//!
//! AppState holds the concrete service used by both CLI commands and HTTP
//! handlers. The service is generic over its ports; AppState pins it to the
//! SQLite store and the OpenAI-compatible gateway.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chatrelay_core::chat::service::ConversationService;
use chatrelay_infra::llm::openai_compat::OpenAiCompletionGateway;
use chatrelay_infra::llm::openai_compat::config::OpenAiCompatConfig;
use chatrelay_infra::sqlite::message::SqliteMessageRepository;
use chatrelay_infra::sqlite::pool::{DatabasePool, database_url};
use chatrelay_types::config::RelayConfig;
use secrecy::SecretString;
use tracing::info;

/// Concrete service type pinned to infra implementations.
pub type ConcreteConversationService =
    ConversationService<SqliteMessageRepository, OpenAiCompletionGateway>;

/// Shared application state.
///
/// Opened once before the first request and closed explicitly on shutdown.
#[derive(Clone)]
pub struct AppState {
    pub conversation: Arc<ConcreteConversationService>,
    pub config: Arc<RelayConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: open the database, wire the service.
    ///
    /// A missing API key is not an error; the gateway reports itself
    /// unavailable and submissions degrade to "no reply".
    pub async fn init(
        config: RelayConfig,
        data_dir: PathBuf,
        api_key: Option<SecretString>,
    ) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let db_pool = DatabasePool::new(&database_url(&data_dir), config.bootstrap)
            .await
            .context("Failed to open message database")?;

        let has_key = api_key.is_some();
        let gateway =
            OpenAiCompletionGateway::new(OpenAiCompatConfig::from_settings(&config.completion, api_key));
        let repo = SqliteMessageRepository::new(db_pool.clone());

        info!(
            data_dir = %data_dir.display(),
            bootstrap = %config.bootstrap,
            model = %config.completion.model,
            api_key_set = has_key,
            "Application state initialized"
        );

        Ok(Self {
            conversation: Arc::new(ConversationService::new(repo, gateway)),
            config: Arc::new(config),
            data_dir,
            db_pool,
        })
    }

    /// Close the database pools.
    pub async fn shutdown(&self) {
        self.db_pool.close().await;
        info!("Database closed");
    }
}
