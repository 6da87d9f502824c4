//! OpenAI-compatible chat completions provider

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncBufReadExt;
use tokio_stream::wrappers::LinesStream;
use tracing::debug;

use crate::error::{ColloquyError, Result};
use crate::llm::{
    LLMProvider, ModelInfo, ProviderEvent, ProviderEventStream, ProviderResponse, TokenUsage,
    ToolDefinition,
};
use crate::message::{ContentPart, Message, MessageRole};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Provider for OpenAI and API-compatible endpoints.
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `model` - Model name (e.g., "gpt-4o", "gpt-4o-mini")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Create with a custom base URL (for Azure OpenAI or compatible APIs).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment variables.
    ///
    /// Reads from:
    /// - `OPENAI_API_KEY` - API key (required)
    /// - `OPENAI_MODEL` - Model name (optional, defaults to "gpt-4o-mini")
    /// - `OPENAI_BASE_URL` - Custom base URL (optional)
    ///
    /// # Errors
    ///
    /// Returns an error if OPENAI_API_KEY is not set.
    pub fn from_env(model: Option<impl Into<String>>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ColloquyError::Configuration("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let model = model
            .map(|m| m.into())
            .or_else(|| std::env::var("OPENAI_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self::with_base_url(api_key, model, base_url))
    }

    /// Get the model name.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        stream: bool,
    ) -> OpenAIRequest {
        OpenAIRequest {
            model: self.model.clone(),
            messages: convert_messages(messages),
            tools: tools.iter().map(OpenAITool::from).collect(),
            stream,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAITool>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

impl From<&ToolDefinition> for OpenAITool {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            kind: "function",
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        }
    }
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessageResponse>,
    delta: Option<OpenAIDelta>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

impl From<OpenAIUsage> for TokenUsage {
    fn from(u: OpenAIUsage) -> Self {
        TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

#[derive(Deserialize)]
struct OpenAIStreamChunk {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Only text is sent for chat turns; tool turns become one message per result.
fn convert_messages(messages: &[Message]) -> Vec<OpenAIMessage> {
    messages
        .iter()
        .flat_map(|m| match m.role {
            MessageRole::Tool => m
                .parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::ToolResult {
                        tool_call_id,
                        content,
                        ..
                    } => Some(OpenAIMessage {
                        role: "tool",
                        content: content.clone(),
                        tool_call_id: Some(tool_call_id.clone()),
                    }),
                    _ => None,
                })
                .collect::<Vec<_>>(),
            role => {
                let content = m.text_content();
                if content.is_empty() {
                    Vec::new()
                } else {
                    vec![OpenAIMessage {
                        role: role.as_str(),
                        content,
                        tool_call_id: None,
                    }]
                }
            }
        })
        .collect()
}

async fn api_error(response: reqwest::Response) -> ColloquyError {
    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    if let Ok(error) = serde_json::from_str::<OpenAIError>(&text) {
        return ColloquyError::Provider(format!(
            "OpenAI API error ({}): {}",
            error.error.error_type.unwrap_or_else(|| status.to_string()),
            error.error.message
        ));
    }

    ColloquyError::Provider(format!("OpenAI API error ({}): {}", status, text))
}

async fn post(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &OpenAIRequest,
) -> Result<reqwest::Response> {
    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| ColloquyError::Provider(format!("Failed to send request to OpenAI: {}", e)))?;

    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    Ok(response)
}

async fn open_event_stream(
    client: reqwest::Client,
    url: String,
    api_key: String,
    body: OpenAIRequest,
) -> Result<ProviderEventStream> {
    let response = post(&client, &url, &api_key, &body).await?;
    debug!(model = %body.model, "OpenAI stream opened");

    let reader = tokio_util::io::StreamReader::new(
        response.bytes_stream().map_err(std::io::Error::other),
    );
    let lines = LinesStream::new(tokio::io::BufReader::new(reader).lines());

    let events = lines
        .map(Some)
        .chain(stream::once(async { None::<std::io::Result<String>> }))
        .scan(StreamAccumulator::default(), |acc, line| {
            let events = if acc.done {
                None
            } else {
                Some(acc.on_line(line))
            };
            futures::future::ready(events)
        })
        .flat_map(stream::iter);

    Ok(Box::pin(events))
}

fn error_stream(err: ColloquyError) -> ProviderEventStream {
    Box::pin(stream::iter(vec![ProviderEvent::Error(err)]))
}

/// Folds SSE lines into provider events.
///
/// Deltas are appended to the running content; the closing event carries
/// everything received.
#[derive(Default)]
struct StreamAccumulator {
    content: String,
    finish_reason: Option<String>,
    usage: Option<TokenUsage>,
    started: bool,
    done: bool,
}

impl StreamAccumulator {
    /// `None` marks the end of the underlying byte stream
    fn on_line(&mut self, line: Option<std::io::Result<String>>) -> Vec<ProviderEvent> {
        let line = match line {
            None => return self.complete(),
            Some(Err(e)) => return self.fail(format!("Stream read error: {}", e)),
            Some(Ok(line)) => line,
        };

        let Some(data) = line.strip_prefix("data:").map(str::trim) else {
            return Vec::new();
        };
        if data == "[DONE]" {
            return self.complete();
        }

        match serde_json::from_str::<OpenAIStreamChunk>(data) {
            Ok(chunk) => self.on_chunk(chunk),
            Err(e) => self.fail(format!("Failed to parse stream chunk: {}", e)),
        }
    }

    fn on_chunk(&mut self, chunk: OpenAIStreamChunk) -> Vec<ProviderEvent> {
        let mut events = Vec::new();
        if let Some(usage) = chunk.usage {
            self.usage = Some(usage.into());
        }

        let Some(choice) = chunk.choices.into_iter().next() else {
            return events;
        };
        if let Some(reason) = choice.finish_reason {
            self.finish_reason = Some(reason);
        }
        if let Some(delta) = choice.delta.and_then(|d| d.content) {
            if !delta.is_empty() {
                if !self.started {
                    self.started = true;
                    events.push(ProviderEvent::ContentStart);
                }
                self.content.push_str(&delta);
                events.push(ProviderEvent::ContentDelta(delta));
            }
        }
        events
    }

    fn complete(&mut self) -> Vec<ProviderEvent> {
        if self.done {
            return Vec::new();
        }
        self.done = true;
        vec![ProviderEvent::Complete(ProviderResponse {
            content: std::mem::take(&mut self.content),
            finish_reason: self.finish_reason.take(),
            usage: self.usage.take(),
        })]
    }

    fn fail(&mut self, message: String) -> Vec<ProviderEvent> {
        self.done = true;
        vec![ProviderEvent::Error(ColloquyError::Provider(message))]
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn stream_response(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> ProviderEventStream {
        let opened = open_event_stream(
            self.client.clone(),
            self.completions_url(),
            self.api_key.clone(),
            self.build_request(messages, tools, true),
        );

        Box::pin(stream::once(opened).flat_map(|result| match result {
            Ok(events) => events,
            Err(err) => error_stream(err),
        }))
    }

    async fn send_messages(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ProviderResponse> {
        let body = self.build_request(messages, tools, false);
        let response = post(&self.client, &self.completions_url(), &self.api_key, &body).await?;

        let parsed: OpenAIResponse = response.json().await.map_err(|e| {
            ColloquyError::Provider(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let Some(choice) = parsed.choices.into_iter().next() else {
            return Err(ColloquyError::Provider(
                "OpenAI API returned no choices".to_string(),
            ));
        };

        Ok(ProviderResponse {
            content: choice.message.and_then(|m| m.content).unwrap_or_default(),
            finish_reason: choice.finish_reason,
            usage: parsed.usage.map(TokenUsage::from),
        })
    }

    fn model(&self) -> ModelInfo {
        ModelInfo {
            provider: "openai".to_string(),
            model_name: self.model.clone(),
        }
    }
}
