//! # Colloquy - conversation core for LLM assistants
//!
//! Colloquy holds the in-memory view of a chat:
//! - An ordered, copy-on-read log of turns ([`conversation::Conversation`])
//! - A loader that rebuilds that log from a stored session, honoring the
//!   summary boundary left behind by compaction
//! - Title generation from the first user turn over a streaming LLM provider
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use colloquy_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = InMemoryMessageStore::new();
//!     store.push(Message::user("How do I profile a Rust binary?").with_session("s1"))?;
//!
//!     let session = Session::new("s1");
//!     let conversation = load_from_session(&session, &store).await?;
//!
//!     let generator = TitleGenerator::new(Arc::new(StubProvider::with_response("Profiling Rust")));
//!     let title = generator.generate(&conversation).await?;
//!     assert_eq!(title, "Profiling Rust");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `llm-openai`: OpenAI-compatible streaming provider

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod message;
pub mod session;
pub mod title;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        ColloquyConfig, LLMProvider as LLMProviderType, LLMProviderConfig, TitleConfig,
    };
    pub use crate::conversation::{Conversation, load_from_session};
    pub use crate::error::{ColloquyError, Result};
    pub use crate::llm::{
        LLMProvider, LLMProviderFactory, ModelInfo, ProviderEvent, ProviderEventStream,
        ProviderResponse, StubProvider, TokenUsage, ToolDefinition,
    };
    pub use crate::message::{
        ContentPart, InMemoryMessageStore, Message, MessageLister, MessageRole,
    };
    pub use crate::session::Session;
    pub use crate::title::{Generator, TitleGenerator};

    #[cfg(feature = "llm-openai")]
    pub use crate::llm::providers::OpenAIProvider;
}
