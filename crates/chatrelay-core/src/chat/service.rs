//! Conversation service sequencing persistence and generation.
//!
//! One user submission runs through:
//! `Validating -> Persisting(user) -> Generating -> Persisting(assistant) -> Done`,
//! or ends early in `DoneWithoutReply` when the gateway fails, or `Failed`
//! on invalid input or any storage error. Nothing is rolled back: a failed
//! generation leaves the user message in place.

use chatrelay_types::error::{ChatError, GatewayError};
use chatrelay_types::message::{is_valid_content, Message, Sender};
use tracing::{debug, info, warn};

use crate::chat::repository::MessageRepository;
use crate::llm::gateway::CompletionGateway;

/// Result of a user submission.
///
/// `assistant_message` is `None` when generation failed; that is a normal
/// outcome (a degraded response), not an error.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub user_message: Message,
    pub assistant_message: Option<Message>,
    /// Why no reply was produced. Server-side only.
    pub generation_error: Option<GatewayError>,
}

impl SubmitOutcome {
    /// True when the user message was saved but no reply was generated.
    pub fn is_degraded(&self) -> bool {
        self.assistant_message.is_none()
    }
}

/// Orchestrates message persistence and the completion round trip.
///
/// Generic over `MessageRepository` and `CompletionGateway` to maintain
/// clean architecture (chatrelay-core never depends on chatrelay-infra).
pub struct ConversationService<R: MessageRepository, G: CompletionGateway> {
    repo: R,
    gateway: G,
}

impl<R: MessageRepository, G: CompletionGateway> ConversationService<R, G> {
    /// Create a new service over the given store and gateway.
    pub fn new(repo: R, gateway: G) -> Self {
        Self { repo, gateway }
    }

    /// Access the message repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Access the completion gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Persist a user message, ask the gateway for a reply, persist the reply.
    ///
    /// Gateway failures are absorbed into a degraded [`SubmitOutcome`].
    /// Storage failures abort with [`ChatError::Storage`]; if the second
    /// append fails the user message stays stored and the reply is lost.
    pub async fn submit_user_message(&self, content: &str) -> Result<SubmitOutcome, ChatError> {
        if !is_valid_content(content) {
            return Err(ChatError::InvalidInput("content must not be empty".to_string()));
        }

        let user_message = self.repo.append(content, Sender::User).await?;
        debug!(message_id = user_message.id, "User message stored");

        let reply = match self.gateway.complete(content).await {
            Ok(text) if is_valid_content(&text) => text,
            Ok(_) => {
                return Ok(self.without_reply(user_message, GatewayError::EmptyResponse));
            }
            Err(e) => return Ok(self.without_reply(user_message, e)),
        };

        let assistant_message = self.repo.append(reply.trim(), Sender::Assistant).await?;
        info!(
            user_message_id = user_message.id,
            assistant_message_id = assistant_message.id,
            "Exchange stored"
        );

        Ok(SubmitOutcome {
            user_message,
            assistant_message: Some(assistant_message),
            generation_error: None,
        })
    }

    /// Store assistant-authored content directly. Never calls the gateway.
    pub async fn insert_assistant_message(&self, content: &str) -> Result<Message, ChatError> {
        if !is_valid_content(content) {
            return Err(ChatError::InvalidInput("content must not be empty".to_string()));
        }

        let message = self.repo.append(content, Sender::Assistant).await?;
        debug!(message_id = message.id, "Assistant message inserted directly");
        Ok(message)
    }

    /// Full transcript in display order.
    pub async fn list_history(&self) -> Result<Vec<Message>, ChatError> {
        Ok(self.repo.list_all().await?)
    }

    fn without_reply(&self, user_message: Message, error: GatewayError) -> SubmitOutcome {
        warn!(
            message_id = user_message.id,
            gateway = self.gateway.name(),
            error = %error,
            "No assistant reply; returning degraded response"
        );
        SubmitOutcome {
            user_message,
            assistant_message: None,
            generation_error: Some(error),
        }
    }
}
