//! Ordered conversation log

use crate::error::{ColloquyError, Result};
use crate::message::{Message, MessageRole};

/// An ordered log of chat turns.
///
/// Turns are kept in insertion order. Every accessor hands out owned copies,
/// and the filtering operations build a new `Conversation` instead of
/// touching the receiver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<Message>,
}

impl Conversation {
    /// Create a conversation from an owned sequence of messages
    pub fn new(turns: impl IntoIterator<Item = Message>) -> Self {
        Self {
            turns: turns.into_iter().collect(),
        }
    }

    /// Create a conversation by copying a slice of messages
    pub fn from_slice(turns: &[Message]) -> Self {
        Self {
            turns: turns.to_vec(),
        }
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if the conversation has no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Copy of all turns, oldest first
    pub fn messages(&self) -> Vec<Message> {
        self.turns.clone()
    }

    /// Iterate over turns without copying
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.turns.iter()
    }

    /// Append a message and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::EmptyMessage`] if the message has no content
    /// parts; the conversation is left unchanged.
    pub fn add(&mut self, message: Message) -> Result<usize> {
        if message.is_empty() {
            return Err(ColloquyError::EmptyMessage);
        }
        self.turns.push(message);
        Ok(self.turns.len() - 1)
    }

    /// Turns authored by `role`, in their original order
    pub fn with_role(&self, role: MessageRole) -> Conversation {
        self.turns
            .iter()
            .filter(|m| m.role == role)
            .cloned()
            .collect()
    }

    /// At most the first `n` turns
    pub fn first(&self, n: usize) -> Conversation {
        let end = n.min(self.turns.len());
        Self::from_slice(&self.turns[..end])
    }

    /// At most the last `n` turns
    pub fn last(&self, n: usize) -> Conversation {
        let start = self.turns.len().saturating_sub(n);
        Self::from_slice(&self.turns[start..])
    }
}

impl FromIterator<Message> for Conversation {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ContentPart;

    fn sample() -> Vec<Message> {
        vec![
            Message::text(MessageRole::System, "be brief").with_id("0"),
            Message::user("hello").with_id("1"),
            Message::assistant("world").with_id("2"),
            Message::user("again").with_id("3"),
            Message::assistant("sure").with_id("4"),
        ]
    }

    fn ids(conv: &Conversation) -> Vec<&str> {
        conv.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_new_preserves_order() {
        let source = sample();
        let conv = Conversation::from_slice(&source);
        assert_eq!(conv.len(), 5);
        assert_eq!(conv.messages(), source);
    }

    #[test]
    fn test_empty_conversation() {
        let conv = Conversation::new(Vec::new());
        assert!(conv.is_empty());
        assert!(conv.messages().is_empty());
        assert_eq!(conv, Conversation::default());
    }

    #[test]
    fn test_source_mutation_does_not_leak_in() {
        let mut source = sample();
        let conv = Conversation::from_slice(&source);

        source[0].role = MessageRole::Tool;
        source.truncate(1);

        assert_eq!(conv.len(), 5);
        assert_eq!(conv.messages()[0].role, MessageRole::System);
    }

    #[test]
    fn test_returned_messages_are_copies() {
        let conv = Conversation::new(sample());

        let mut copy = conv.messages();
        copy[1].parts = vec![ContentPart::text("changed")];
        copy.clear();

        let fresh = conv.messages();
        assert_eq!(fresh.len(), 5);
        assert_eq!(fresh[1].text_content(), "hello");
    }

    #[test]
    fn test_add_returns_index() {
        let mut conv = Conversation::default();
        assert_eq!(conv.add(Message::user("one")).unwrap(), 0);
        assert_eq!(conv.add(Message::assistant("two")).unwrap(), 1);
        assert_eq!(conv.len(), 2);
    }

    #[test]
    fn test_add_rejects_empty_message() {
        let mut conv = Conversation::new(sample());
        let before = conv.clone();

        let result = conv.add(Message::new(MessageRole::User, Vec::new()));
        assert_eq!(result, Err(ColloquyError::EmptyMessage));
        assert_eq!(conv.len(), 5);
        assert_eq!(conv, before);
    }

    #[test]
    fn test_add_does_not_affect_snapshot() {
        let mut conv = Conversation::new(sample());
        let snapshot = conv.messages();
        conv.add(Message::user("later")).unwrap();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(conv.len(), 6);
    }

    #[test]
    fn test_with_role_filters_in_order() {
        let conv = Conversation::new(sample());

        let users = conv.with_role(MessageRole::User);
        assert_eq!(ids(&users), vec!["1", "3"]);
        assert!(users.iter().all(|m| m.role == MessageRole::User));

        let assistants = conv.with_role(MessageRole::Assistant);
        assert_eq!(ids(&assistants), vec!["2", "4"]);

        assert!(conv.with_role(MessageRole::Tool).is_empty());
        // receiver untouched
        assert_eq!(conv.len(), 5);
    }

    #[test]
    fn test_first() {
        let conv = Conversation::new(sample());

        assert!(conv.first(0).is_empty());
        assert_eq!(ids(&conv.first(2)), vec!["0", "1"]);
        assert_eq!(conv.first(5), conv);
        assert_eq!(conv.first(100), conv);
        assert!(Conversation::default().first(3).is_empty());
    }

    #[test]
    fn test_last() {
        let conv = Conversation::new(sample());

        assert!(conv.last(0).is_empty());
        assert_eq!(ids(&conv.last(2)), vec!["3", "4"]);
        assert_eq!(conv.last(50), conv);
    }

    #[test]
    fn test_first_user_turn() {
        let conv = Conversation::new(sample());
        let first_user = conv.with_role(MessageRole::User).first(1);
        assert_eq!(first_user.len(), 1);
        assert_eq!(first_user.messages()[0].text_content(), "hello");
    }

    #[test]
    fn test_collect_into_conversation() {
        let conv: Conversation = sample().into_iter().skip(3).collect();
        assert_eq!(ids(&conv), vec!["3", "4"]);
    }
}
