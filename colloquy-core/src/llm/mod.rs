//! Streaming LLM provider capability
//!
//! Providers turn a batch of [`Message`]s into a stream of
//! [`ProviderEvent`]s. The stream is ordered and closes once generation is
//! finished; a response event carries the full content produced so far, so a
//! later response replaces an earlier one.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::{ColloquyError, Result};
use crate::message::Message;

pub mod factory;
pub mod providers;
mod stub;

pub use factory::LLMProviderFactory;
pub use stub::{StubCall, StubProvider};

/// A tool the model may call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool input
    pub parameters: serde_json::Value,
}

/// Token usage information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Response from an LLM provider
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderResponse {
    /// Generated content
    pub content: String,

    /// Why generation stopped, if the provider reported it
    pub finish_reason: Option<String>,

    /// Token usage information
    pub usage: Option<TokenUsage>,
}

impl ProviderResponse {
    /// Response holding only content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// One event of a provider response stream
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// The model started emitting content
    ContentStart,

    /// A fragment of content
    ContentDelta(String),

    /// Content produced so far; later responses overwrite earlier ones
    Complete(ProviderResponse),

    /// The provider failed; no further events follow
    Error(ColloquyError),
}

impl ProviderEvent {
    /// Response payload, if this event carries one
    pub fn response(&self) -> Option<&ProviderResponse> {
        match self {
            ProviderEvent::Complete(response) => Some(response),
            _ => None,
        }
    }

    /// Error payload, if this event carries one
    pub fn error(&self) -> Option<&ColloquyError> {
        match self {
            ProviderEvent::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Ordered stream of provider events
pub type ProviderEventStream = Pin<Box<dyn Stream<Item = ProviderEvent> + Send>>;

/// Model information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub provider: String,
    pub model_name: String,
}

/// Trait for LLM provider implementations.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Stream a response to `messages`.
    ///
    /// `tools` lists the tools offered to the model; pass an empty slice to
    /// offer none.
    fn stream_response(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> ProviderEventStream;

    /// Generate a complete response without streaming.
    ///
    /// The default implementation drains [`LLMProvider::stream_response`].
    async fn send_messages(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ProviderResponse> {
        final_response(self.stream_response(messages, tools))
            .await?
            .ok_or_else(|| {
                ColloquyError::Provider("stream ended without a response".to_string())
            })
    }

    /// Get model information
    fn model(&self) -> ModelInfo {
        ModelInfo {
            provider: "unknown".to_string(),
            model_name: "unknown".to_string(),
        }
    }
}

/// Drain a provider stream and keep the last response.
///
/// Returns the first error carried by the stream, or `None` when the stream
/// closed without ever carrying a response.
pub async fn final_response(mut stream: ProviderEventStream) -> Result<Option<ProviderResponse>> {
    let mut last = None;
    while let Some(event) = stream.next().await {
        match event {
            ProviderEvent::Error(err) => return Err(err),
            ProviderEvent::Complete(response) => last = Some(response),
            ProviderEvent::ContentStart | ProviderEvent::ContentDelta(_) => {}
        }
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn boxed(events: Vec<ProviderEvent>) -> ProviderEventStream {
        Box::pin(stream::iter(events))
    }

    #[tokio::test]
    async fn test_final_response_keeps_last() {
        let events = vec![
            ProviderEvent::ContentStart,
            ProviderEvent::Complete(ProviderResponse::new("draft")),
            ProviderEvent::ContentDelta("ignored".to_string()),
            ProviderEvent::Complete(ProviderResponse::new("final")),
        ];

        let response = final_response(boxed(events)).await.unwrap();
        assert_eq!(response.unwrap().content, "final");
    }

    #[tokio::test]
    async fn test_final_response_stops_at_error() {
        let events = vec![
            ProviderEvent::Complete(ProviderResponse::new("draft")),
            ProviderEvent::Error(ColloquyError::Provider("boom".to_string())),
            ProviderEvent::Complete(ProviderResponse::new("never seen")),
        ];

        let err = final_response(boxed(events)).await.unwrap_err();
        assert_eq!(err, ColloquyError::Provider("boom".to_string()));
    }

    #[tokio::test]
    async fn test_final_response_empty_stream() {
        assert_eq!(final_response(boxed(Vec::new())).await.unwrap(), None);
    }

    #[test]
    fn test_event_accessors() {
        let event = ProviderEvent::Complete(ProviderResponse::new("x"));
        assert_eq!(event.response().map(|r| r.content.as_str()), Some("x"));
        assert!(event.error().is_none());

        let event = ProviderEvent::Error(ColloquyError::Cancelled);
        assert!(event.response().is_none());
        assert_eq!(event.error(), Some(&ColloquyError::Cancelled));
    }
}
