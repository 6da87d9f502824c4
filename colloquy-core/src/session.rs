//! Session record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted chat session, as seen by the conversation core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session ID
    pub id: String,

    /// Human-readable title (empty until generated)
    #[serde(default)]
    pub title: String,

    /// Message that holds the compacted summary of everything before it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_message_id: Option<String>,

    /// Number of messages in the session
    #[serde(default)]
    pub message_count: usize,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session was last updated
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session without a summary
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: String::new(),
            summary_message_id: None,
            message_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark `message_id` as the summary boundary
    pub fn with_summary(mut self, message_id: impl Into<String>) -> Self {
        self.summary_message_id = Some(message_id.into());
        self
    }

    /// Summary boundary, treating an empty ID as absent
    pub fn summary_id(&self) -> Option<&str> {
        self.summary_message_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// Set the title and bump `updated_at`
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    /// Whether a title still needs to be generated
    pub fn needs_title(&self) -> bool {
        self.title.trim().is_empty()
    }
}
