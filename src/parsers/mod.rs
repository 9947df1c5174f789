//! Streaming parser for Copilot chat session files
//!
//! # Error Handling Strategy
//!
//! The parser sits below the CLI's graceful-degradation layer and keeps its own policy simple:
//!
//! - **Construction errors**: an empty path or a missing file fail immediately with a
//!   distinct [`ParseError`] variant, before any bytes are read.
//!
//! - **Malformed JSON**: tokenizer errors are returned unchanged from `read_next`. There is no
//!   attempt to recover inside a corrupt request object; the session layer decides how to
//!   present the failure (see [`crate::sessions::try_read_message`]).
//!
//! - **Truncation**: a stream that ends early is not an error. Messages decoded before the
//!   cut are returned, then the parser reports end of data.
//!
//! - **Typed errors**: unlike the `anyhow`-based layers above it, this module uses a
//!   `thiserror` enum so callers can tell construction failures apart.

pub mod error;
pub mod history;
mod request;
pub mod tokenizer;

pub use error::ParseError;
pub use history::{JsonHistoryParser, Messages};
