use thiserror::Error;

/// Errors from message store operations (used by trait definitions in chatrelay-core).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("invalid stored row: {0}")]
    InvalidRow(String),
}

/// Errors from the completion gateway.
///
/// None of these abort a chat submission; the conversation service absorbs
/// them and returns the user message without a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("completion gateway unavailable: no API key configured")]
    Unavailable,

    #[error("completion request failed: {0}")]
    RequestFailed(String),

    #[error("completion returned no usable text")]
    EmptyResponse,
}

/// Errors surfaced by the conversation service.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
