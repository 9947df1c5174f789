//! Chat history files on disk: discovery, summaries, search and paged reading
//!
//! Everything in this module goes through the public read contract of
//! [`JsonHistoryParser`](crate::parsers::JsonHistoryParser); none of it looks inside the
//! JSON itself.

pub mod discovery;
pub mod service;

pub use discovery::discover_history_files;
pub use service::{
    HistorySession, list_histories, search_histories, summarize_history, try_read_message,
};
