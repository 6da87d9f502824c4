//! Scripted provider for deterministic tests and offline use

use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;

use super::{
    LLMProvider, ModelInfo, ProviderEvent, ProviderEventStream, ProviderResponse, ToolDefinition,
};
use crate::error::ColloquyError;
use crate::message::Message;

/// A request received by a [`StubProvider`]
#[derive(Debug, Clone, PartialEq)]
pub struct StubCall {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
}

/// Provider that replays a fixed list of events on every call
pub struct StubProvider {
    events: Vec<ProviderEvent>,
    hang: bool,
    calls: Mutex<Vec<StubCall>>,
}

impl StubProvider {
    /// Replay `events` in order, then close the stream
    pub fn new(events: Vec<ProviderEvent>) -> Self {
        Self {
            events,
            hang: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Stream a single response with `content`
    pub fn with_response(content: impl Into<String>) -> Self {
        Self::new(vec![
            ProviderEvent::ContentStart,
            ProviderEvent::Complete(ProviderResponse::new(content)),
        ])
    }

    /// Stream a single error
    pub fn with_error(err: ColloquyError) -> Self {
        Self::new(vec![ProviderEvent::Error(err)])
    }

    /// Replay `events` and then keep the stream open forever
    pub fn hanging(events: Vec<ProviderEvent>) -> Self {
        Self {
            hang: true,
            ..Self::new(events)
        }
    }

    /// Requests received so far
    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn record(&self, messages: &[Message], tools: &[ToolDefinition]) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(StubCall {
                messages: messages.to_vec(),
                tools: tools.to_vec(),
            });
        }
    }
}

#[async_trait]
impl LLMProvider for StubProvider {
    fn stream_response(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> ProviderEventStream {
        self.record(messages, tools);

        let replay = stream::iter(self.events.clone());
        if self.hang {
            return Box::pin(futures::StreamExt::chain(replay, stream::pending()));
        }
        Box::pin(replay)
    }

    fn model(&self) -> ModelInfo {
        ModelInfo {
            provider: "stub".to_string(),
            model_name: "none".to_string(),
        }
    }
}
