//! Chat messages and the message store contract
//!
//! A [`Message`] is one entry in a session's history. Its body is a list of
//! [`ContentPart`]s; the conversation core only reads the text variant and
//! passes every other part through untouched.

mod store;

pub use store::{InMemoryMessageStore, MessageLister};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a message body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text
    Text { text: String },

    /// Model reasoning emitted before the answer
    Reasoning { thinking: String },

    /// A tool invocation requested by the assistant
    ToolCall {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// Output of a tool invocation
    ToolResult {
        tool_call_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },

    /// Why the assistant stopped generating
    Finish { reason: String },
}

impl ContentPart {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Text of this part, if it is a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A message in a session's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Session this message belongs to
    #[serde(default)]
    pub session_id: String,

    /// Author role
    pub role: MessageRole,

    /// Ordered content parts
    #[serde(default)]
    pub parts: Vec<ContentPart>,

    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message with a fresh ID and the given parts
    pub fn new(role: MessageRole, parts: Vec<ContentPart>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: String::new(),
            role,
            parts,
            created_at: Utc::now(),
        }
    }

    /// Create a message holding a single text part
    pub fn text(role: MessageRole, text: impl Into<String>) -> Self {
        Self::new(role, vec![ContentPart::text(text)])
    }

    /// Create a user text message
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(MessageRole::User, text)
    }

    /// Create an assistant text message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(MessageRole::Assistant, text)
    }

    /// Set the message ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the owning session
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// True when the message has no content parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Concatenated text of all text parts; other parts are skipped
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}
