//! Message HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/messages - Full transcript, oldest first
//! - POST /api/messages - `{content, isSent}`; `isSent: true` runs the
//!   completion round trip, `isSent: false` stores assistant content directly

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use chatrelay_types::message::{Message, is_valid_content};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for POST /api/messages.
#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub content: String,
    #[serde(rename = "isSent")]
    pub is_sent: bool,
}

/// 201 body for a user submission. `aiMessage` is omitted when no reply
/// could be generated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
    pub user_message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_message: Option<Message>,
}

/// GET /api/messages - List all messages in display order.
pub async fn list_messages(State(state): State<AppState>) -> Result<Json<Vec<Message>>, AppError> {
    let messages = state.conversation.list_history().await?;
    debug!(count = messages.len(), "Listed messages");
    Ok(Json(messages))
}

/// POST /api/messages - Store a message, generating a reply for user messages.
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request_id = Uuid::now_v7();

    let Json(request) = payload.map_err(|rejection| {
        debug!(%request_id, reason = %rejection.body_text(), "Rejected message body");
        AppError::InvalidBody
    })?;

    if !is_valid_content(&request.content) {
        debug!(%request_id, "Rejected empty message content");
        return Err(AppError::InvalidBody);
    }

    if !request.is_sent {
        let message = state
            .conversation
            .insert_assistant_message(&request.content)
            .await?;
        info!(%request_id, message_id = message.id, "Assistant message inserted");
        return Ok((StatusCode::CREATED, Json(message)).into_response());
    }

    let outcome = state
        .conversation
        .submit_user_message(&request.content)
        .await?;

    info!(
        %request_id,
        user_message_id = outcome.user_message.id,
        ai_message_id = outcome.assistant_message.as_ref().map(|m| m.id),
        degraded = outcome.is_degraded(),
        "Message exchange handled"
    );

    let body = ExchangeResponse {
        user_message: outcome.user_message,
        ai_message: outcome.assistant_message,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}
