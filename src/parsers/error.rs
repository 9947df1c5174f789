use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`JsonHistoryParser`](crate::parsers::JsonHistoryParser)
///
/// Construction errors (`InvalidPath`, `NotFound`, `Open`) happen before any parsing.
/// `Io` and `Syntax` come from the tokenizer and are passed through `read_next` unchanged.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("File path must not be empty")]
    InvalidPath,

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read chat history: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid JSON at byte {offset}: {reason}")]
    Syntax { offset: u64, reason: String },
}

pub type Result<T> = std::result::Result<T, ParseError>;
