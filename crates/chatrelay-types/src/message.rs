//! Chat message types for chatrelay.
//!
//! A [`Message`] is one immutable entry in the transcript. Identity and
//! timestamps are assigned by the message store, never by callers.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use std::fmt;
use std::str::FromStr;

/// Which side of the conversation authored a message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (sender IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Whether the message was sent by the local user (the browser's "sent" bubble).
    pub fn is_sent(self) -> bool {
        matches!(self, Sender::User)
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "assistant" => Ok(Sender::Assistant),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A single persisted chat message.
///
/// Messages are ordered by `created_at`, then by `id`.
/// Serializes with a derived `is_sent` flag for the browser client, as the
/// integer `1` (user) or `0` (assistant), which is how the client compares it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Store-assigned, monotonically increasing identifier.
    pub id: i64,
    pub content: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Message", 5)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("sender", &self.sender)?;
        state.serialize_field("is_sent", &u8::from(self.sender.is_sent()))?;
        state.serialize_field("created_at", &self.created_at)?;
        state.end()
    }
}

/// Returns `true` if `content` has at least one non-whitespace character.
pub fn is_valid_content(content: &str) -> bool {
    !content.trim().is_empty()
}
