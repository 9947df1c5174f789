//! Data models for Copilot chat history.
//!
//! - [`ChatMessage`] - A user prompt, an assistant reply, or a synthesized read error
//! - [`ChatHistorySummary`] - One history file and its first message, used for listings
//!
//! Both derive serde traits so the CLI can emit them as JSON.

pub mod message;
pub mod summary;

pub use message::{ChatMessage, MessageKind};
pub use summary::ChatHistorySummary;
