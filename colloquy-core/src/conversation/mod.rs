//! Conversation log
//!
//! An ordered, copy-on-read log of chat turns and a loader that rebuilds it
//! from a stored session.
//!
//! # Example
//!
//! ```rust,ignore
//! use colloquy_core::conversation::{load_from_session, Conversation};
//! use colloquy_core::message::{Message, MessageRole};
//!
//! let mut conv = Conversation::default();
//! conv.add(Message::user("Hello!"))?;
//! conv.add(Message::assistant("Hi there! How can I help?"))?;
//!
//! let seed = conv.with_role(MessageRole::User).first(1);
//!
//! let restored = load_from_session(&session, &store).await?;
//! ```

mod history;
mod loader;

pub use history::Conversation;
pub use loader::load_from_session;
