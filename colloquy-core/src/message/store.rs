//! Message listing contract and an in-memory store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::Message;
use crate::error::{ColloquyError, Result};

/// Source of a session's message history.
///
/// Implementations must return messages in chronological order. Errors are
/// handed to callers as-is.
#[async_trait]
pub trait MessageLister: Send + Sync {
    /// List every message of a session, oldest first
    async fn list(&self, session_id: &str) -> Result<Vec<Message>>;
}

/// In-memory message store for testing and lightweight use
pub struct InMemoryMessageStore {
    messages: RwLock<HashMap<String, Vec<Message>>>,
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(HashMap::new()),
        }
    }

    /// Append a message to its session's history.
    ///
    /// The message is filed under `message.session_id`.
    pub fn push(&self, message: Message) -> Result<()> {
        let mut messages = self
            .messages
            .write()
            .map_err(|e| ColloquyError::Store(format!("lock poisoned: {}", e)))?;
        messages
            .entry(message.session_id.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    /// Append several messages in order
    pub fn extend(&self, batch: impl IntoIterator<Item = Message>) -> Result<()> {
        for message in batch {
            self.push(message)?;
        }
        Ok(())
    }

    /// Number of messages stored for a session
    pub fn count(&self, session_id: &str) -> usize {
        self.messages
            .read()
            .map(|m| m.get(session_id).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Remove all messages of a session
    pub fn clear_session(&self, session_id: &str) {
        if let Ok(mut messages) = self.messages.write() {
            messages.remove(session_id);
        }
    }
}

#[async_trait]
impl MessageLister for InMemoryMessageStore {
    async fn list(&self, session_id: &str) -> Result<Vec<Message>> {
        let messages = self
            .messages
            .read()
            .map_err(|e| ColloquyError::Store(format!("lock poisoned: {}", e)))?;
        Ok(messages.get(session_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = InMemoryMessageStore::new();
        store
            .extend([
                Message::user("first").with_session("s1"),
                Message::assistant("second").with_session("s1"),
                Message::user("elsewhere").with_session("s2"),
            ])
            .unwrap();

        let listed = store.list("s1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].text_content(), "first");
        assert_eq!(listed[1].text_content(), "second");
        assert_eq!(store.count("s2"), 1);
    }

    #[tokio::test]
    async fn test_unknown_session_is_empty() {
        let store = InMemoryMessageStore::new();
        assert!(store.list("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_session() {
        let store = InMemoryMessageStore::new();
        store.push(Message::user("hi").with_session("s1")).unwrap();
        store.clear_session("s1");
        assert_eq!(store.count("s1"), 0);
    }
}
