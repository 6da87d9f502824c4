//! Conversation title generation
//!
//! A title is derived from the first user turn of a conversation with a
//! single streaming request to an [`LLMProvider`]. Titles are best-effort: a
//! conversation without a user turn gets an empty title and no error.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::conversation::Conversation;
use crate::error::{ColloquyError, Result};
use crate::llm::{LLMProvider, final_response};
use crate::message::MessageRole;

/// Produces a short title for a conversation
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a title, or an empty string when there is nothing to title
    async fn generate(&self, conversation: &Conversation) -> Result<String>;
}

/// [`Generator`] backed by a streaming LLM provider
pub struct TitleGenerator {
    provider: Arc<dyn LLMProvider>,
    cancel: Option<CancellationToken>,
}

impl TitleGenerator {
    /// Create a generator that streams from `provider`
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            cancel: None,
        }
    }

    /// Stop waiting on the provider once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

#[async_trait]
impl Generator for TitleGenerator {
    async fn generate(&self, conversation: &Conversation) -> Result<String> {
        let seed = conversation.with_role(MessageRole::User).first(1).messages();
        if seed.is_empty() {
            debug!("No user message to title");
            return Ok(String::new());
        }

        let stream = self.provider.stream_response(&seed, &[]);
        let outcome = match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(ColloquyError::Cancelled),
                outcome = final_response(stream) => outcome,
            },
            None => final_response(stream).await,
        };

        let response = outcome.inspect_err(|e| warn!(error = %e, "Title generation failed"))?;
        let title = clean_title(response.map(|r| r.content).unwrap_or_default());

        debug!(
            model = %self.provider.model().model_name,
            title = %title,
            "Generated conversation title"
        );
        Ok(title)
    }
}

/// Flatten a title onto one line and trim it
fn clean_title(raw: String) -> String {
    raw.replace('\n', " ").trim().to_string()
}
