//! Conversation turns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The system instruction seeded at conversation creation.
    System,
    /// Caller input.
    User,
    /// Backend output.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single role-tagged turn. Serializes in the chat-completions shape.
///
/// # Examples
///
/// ```
/// use codex_mcp::Message;
///
/// let json = serde_json::to_value(Message::user("hi")).unwrap();
/// assert_eq!(json["role"], "user");
/// assert_eq!(json["content"], "hi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the turn.
    pub role: Role,
    /// Turn text.
    pub content: String,
}

impl Message {
    /// Creates a turn.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One entry of `codex_conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation token.
    pub conversation_id: String,
    /// Number of turns, system turn included.
    pub message_count: usize,
    /// Preview of the latest user turn, empty if there is none.
    pub last_user_msg: String,
}
