use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
    /// Synthesized by the session layer when a history file cannot be read
    Error,
}

impl MessageKind {
    pub fn icon(self) -> &'static str {
        match self {
            MessageKind::User => "🧑‍💻",
            MessageKind::Assistant => "🤖",
            MessageKind::Error => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self { kind: MessageKind::User, content: content.into(), timestamp }
    }

    pub fn assistant(content: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self { kind: MessageKind::Assistant, content: content.into(), timestamp }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self { kind: MessageKind::Error, content: content.into(), timestamp: None }
    }
}
