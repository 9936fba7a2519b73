//! Message types for tsugi's uniform chat contract.
//!
//! Provides the [`Message`] and [`Role`] types shared by every provider
//! backend. These are tsugi's internal types, converted to provider-specific
//! wire formats (rig-core messages or chat-completions JSON) at the backend
//! boundary.

use serde::{Deserialize, Serialize};

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The role of a message sender in the conversation.
///
/// System instructions are not a message role here; they travel as a separate
/// field on the request so each backend can place them where its provider
/// expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl Role {
    /// Wire-format role tag (`"user"` or `"assistant"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
