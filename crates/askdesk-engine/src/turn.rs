//! Turn types for the chat history.
//!
//! A turn is one message in the conversation. Bot turns start out pending
//! (answer not yet computed) and are finalized exactly once by the
//! controller; user turns are always finalized text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person asking questions.
    User,
    /// The assistant.
    Bot,
}

/// The content of a turn.
///
/// `Pending` is the placeholder state: it renders as a typing indicator,
/// never as literal text, and is replaced in place once the pipeline
/// produces an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "text", rename_all = "lowercase")]
pub enum TurnBody {
    /// Answer not yet computed.
    Pending,
    /// Finalized content.
    Text(String),
}

impl TurnBody {
    /// Whether this body is still awaiting an answer.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Finalized text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Text(t) => Some(t),
        }
    }
}

/// A single message in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Author of the turn.
    pub sender: Sender,
    /// Content, pending or finalized.
    pub body: TurnBody,
    /// When the turn was committed to the history.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a finalized user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            body: TurnBody::Text(content.into()),
            timestamp: Utc::now(),
        }
    }

    /// Create a finalized bot turn.
    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            body: TurnBody::Text(content.into()),
            timestamp: Utc::now(),
        }
    }

    /// Create a pending bot turn (the thinking placeholder).
    pub fn bot_pending() -> Self {
        Self {
            sender: Sender::Bot,
            body: TurnBody::Pending,
            timestamp: Utc::now(),
        }
    }

    /// Whether this turn is an unresolved placeholder.
    pub fn is_pending(&self) -> bool {
        self.body.is_pending()
    }
}
