//! Rebuild a conversation from a stored session

use tracing::{debug, warn};

use super::history::Conversation;
use crate::error::Result;
use crate::message::{Message, MessageLister, MessageRole};
use crate::session::Session;

/// Load the conversation of `session` from `lister`.
///
/// Without a summary marker the whole history is returned. With one, only the
/// summary message is kept, as a user turn carrying the compacted context;
/// every other message is dropped.
///
/// A summary ID that matches no message yields an empty conversation.
///
/// # Errors
///
/// Errors from the lister are returned unchanged.
pub async fn load_from_session(
    session: &Session,
    lister: &dyn MessageLister,
) -> Result<Conversation> {
    let messages = lister.list(&session.id).await?;
    let total = messages.len();

    let turns = summary_boundary(messages, session.summary_id());

    if session.summary_id().is_some() && turns.is_empty() && total > 0 {
        warn!(
            session_id = %session.id,
            summary_message_id = ?session.summary_id(),
            "Summary message not found in session history"
        );
    }

    debug!(
        session_id = %session.id,
        listed = total,
        kept = turns.len(),
        "Loaded conversation from session"
    );

    Ok(Conversation::new(turns))
}

fn summary_boundary(messages: Vec<Message>, summary_id: Option<&str>) -> Vec<Message> {
    let Some(summary_id) = summary_id else {
        return messages;
    };

    messages
        .into_iter()
        .filter(|msg| msg.id == summary_id)
        .map(|mut msg| {
            msg.role = MessageRole::User;
            msg
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ColloquyError;
    use async_trait::async_trait;

    struct FixedLister(Vec<Message>);

    #[async_trait]
    impl MessageLister for FixedLister {
        async fn list(&self, _session_id: &str) -> Result<Vec<Message>> {
            Ok(self.0.clone())
        }
    }

    struct FailingLister;

    #[async_trait]
    impl MessageLister for FailingLister {
        async fn list(&self, _session_id: &str) -> Result<Vec<Message>> {
            Err(ColloquyError::Other("bork".to_string()))
        }
    }

    fn two_messages() -> FixedLister {
        FixedLister(vec![
            Message::user("hello").with_id("1"),
            Message::assistant("world").with_id("2"),
        ])
    }

    fn roles(conv: &Conversation) -> Vec<MessageRole> {
        conv.iter().map(|m| m.role).collect()
    }

    fn texts(conv: &Conversation) -> Vec<String> {
        conv.iter().map(|m| m.text_content()).collect()
    }

    #[tokio::test]
    async fn test_loads_full_history_without_summary() {
        let session = Session::new("test-session");

        let conv = load_from_session(&session, &two_messages()).await.unwrap();
        assert_eq!(conv.len(), 2);
        assert_eq!(roles(&conv), vec![MessageRole::User, MessageRole::Assistant]);
        assert_eq!(texts(&conv), vec!["hello", "world"]);
    }

    #[tokio::test]
    async fn test_empty_summary_id_keeps_everything() {
        let session = Session::new("test-session").with_summary("");

        let conv = load_from_session(&session, &two_messages()).await.unwrap();
        assert_eq!(conv.len(), 2);
    }

    #[tokio::test]
    async fn test_propagates_lister_error() {
        let session = Session::new("test-session");

        let err = load_from_session(&session, &FailingLister)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "bork");
        assert_eq!(err, ColloquyError::Other("bork".to_string()));
    }

    #[tokio::test]
    async fn test_summary_keeps_only_summary_message() {
        let session = Session::new("test-session").with_summary("1");

        let conv = load_from_session(&session, &two_messages()).await.unwrap();
        assert_eq!(conv.len(), 1);
        assert_eq!(roles(&conv), vec![MessageRole::User]);
        assert_eq!(texts(&conv), vec!["hello"]);
        assert_eq!(conv.messages()[0].id, "1");
    }

    #[tokio::test]
    async fn test_drops_messages_around_summary() {
        let lister = FixedLister(vec![
            Message::user("old question").with_id("1"),
            Message::assistant("old answer").with_id("2"),
            Message::assistant("summary of the above").with_id("3"),
            Message::user("new question").with_id("4"),
            Message::assistant("new answer").with_id("5"),
        ]);
        let session = Session::new("test-session").with_summary("3");

        let conv = load_from_session(&session, &lister).await.unwrap();
        assert_eq!(roles(&conv), vec![MessageRole::User]);
        assert_eq!(texts(&conv), vec!["summary of the above"]);
    }

    #[tokio::test]
    async fn test_summary_on_first_message_forces_user_role() {
        let lister = FixedLister(vec![
            Message::assistant("summary").with_id("1"),
            Message::assistant("world").with_id("2"),
        ]);
        let session = Session::new("test-session").with_summary("1");

        let conv = load_from_session(&session, &lister).await.unwrap();
        assert_eq!(roles(&conv), vec![MessageRole::User]);
        assert_eq!(texts(&conv), vec!["summary"]);
    }

    #[tokio::test]
    async fn test_unmatched_summary_yields_empty_conversation() {
        let session = Session::new("test-session").with_summary("missing");

        let conv = load_from_session(&session, &two_messages()).await.unwrap();
        assert!(conv.is_empty());
    }

    #[tokio::test]
    async fn test_preserves_non_text_parts() {
        use crate::message::ContentPart;

        let call = ContentPart::ToolCall {
            id: "call_1".to_string(),
            name: "grep".to_string(),
            input: serde_json::json!({"pattern": "todo"}),
        };
        let lister = FixedLister(vec![
            Message::new(MessageRole::Assistant, vec![ContentPart::text("x"), call.clone()])
                .with_id("1"),
        ]);

        let conv = load_from_session(&Session::new("s"), &lister).await.unwrap();
        assert_eq!(conv.messages()[0].parts[1], call);

        let conv = load_from_session(&Session::new("s").with_summary("1"), &lister)
            .await
            .unwrap();
        assert_eq!(conv.messages()[0].role, MessageRole::User);
        assert_eq!(conv.messages()[0].parts[1], call);
    }
}
