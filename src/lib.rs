//! Copilot History Explorer - Browse and search GitHub Copilot Chat history
//!
//! VS Code stores each Copilot chat session as one JSON document. Those documents can grow
//! very large, mostly because of metadata attached to every request. This library reads
//! them as a stream and pulls out only the conversation:
//!
//! - Streaming extraction of user prompts and assistant replies from a session file
//! - Discovery of session files under the VS Code user directory
//! - History summaries, keyword search and paged reading of one session
//!
//! # Example
//!
//! ```no_run
//! use copilot_history_explorer::JsonHistoryParser;
//!
//! let parser = JsonHistoryParser::open("/path/to/chatSessions/session.json")?;
//! for message in parser.read_all() {
//!     let message = message?;
//!     println!("{:?}: {}", message.kind, message.content);
//! }
//! # Ok::<(), copilot_history_explorer::ParseError>(())
//! ```

pub mod cli;
pub mod models;
pub mod parsers;
pub mod sessions;
pub mod utils;

// Re-export commonly used types
pub use models::{ChatHistorySummary, ChatMessage, MessageKind};
pub use parsers::{JsonHistoryParser, ParseError};
pub use sessions::{discover_history_files, list_histories, search_histories};
pub use utils::format_path_with_tilde;
