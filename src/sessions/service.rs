//! History listing, keyword search and paged session reading.
//!
//! # Error Handling Strategy
//!
//! - **Unreadable files**: a history file that cannot be opened is logged as a warning and
//!   left out of listings and search results.
//! - **Corrupt content**: a parse error while reading messages becomes a
//!   [`MessageKind::Error`] message in place of the chat message, so callers can show what went
//!   wrong inline. The parser is finished after an error, so at most one error message is
//!   produced per file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::models::{ChatHistorySummary, ChatMessage, MessageKind};
use crate::parsers::JsonHistoryParser;

type FileParser = JsonHistoryParser<BufReader<File>>;

/// Read the next message, turning a parse failure into an error message
pub fn try_read_message<R: BufRead>(parser: &JsonHistoryParser<R>) -> Option<ChatMessage> {
    match parser.read_next() {
        Ok(message) => message,
        Err(e) => Some(ChatMessage::error(format!("Could not load this history: {}", e))),
    }
}

fn open_parser(path: &Path) -> Result<FileParser> {
    JsonHistoryParser::open(path)
        .with_context(|| format!("Failed to open chat history {}", path.display()))
}

/// Build the summary of one history file from its first message
///
/// Returns `Ok(None)` for files without any message.
pub fn summarize_history(path: &Path) -> Result<Option<ChatHistorySummary>> {
    let parser = open_parser(path)?;
    Ok(try_read_message(&parser).map(|message| ChatHistorySummary {
        file_path: path.to_path_buf(),
        first_message: message.content,
        timestamp: message.timestamp,
    }))
}

/// Summarize every file, newest first
///
/// Files without messages are omitted; files that cannot be opened are skipped with a warning.
pub fn list_histories(files: &[PathBuf]) -> Vec<ChatHistorySummary> {
    let mut summaries: Vec<ChatHistorySummary> =
        files.par_iter().filter_map(|path| summary_or_warn(path)).collect();
    sort_newest_first(&mut summaries);
    summaries
}

/// Summaries of the files containing `keyword` in any user or assistant message
///
/// Matching ignores case. Files are scanned in parallel and each scan stops at the first hit.
pub fn search_histories(files: &[PathBuf], keyword: &str) -> Vec<ChatHistorySummary> {
    let needle = keyword.to_lowercase();
    let mut summaries: Vec<ChatHistorySummary> = files
        .par_iter()
        .filter(|path| match contains_keyword(path, &needle) {
            Ok(found) => found,
            Err(e) => {
                eprintln!("Warning: Skipping {}: {:#}", path.display(), e);
                false
            }
        })
        .filter_map(|path| summary_or_warn(path))
        .collect();

    sort_newest_first(&mut summaries);
    eprintln!("Searched {} files: {} matched", files.len(), summaries.len());
    summaries
}

fn contains_keyword(path: &Path, needle: &str) -> Result<bool> {
    let parser = open_parser(path)?;
    while let Some(message) = try_read_message(&parser) {
        if message.kind != MessageKind::Error && message.content.to_lowercase().contains(needle) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn summary_or_warn(path: &Path) -> Option<ChatHistorySummary> {
    match summarize_history(path) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Warning: Skipping {}: {:#}", path.display(), e);
            None
        }
    }
}

// Entries without a timestamp sort last
fn sort_newest_first(summaries: &mut [ChatHistorySummary]) {
    summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// A chat session read page by page
///
/// Holds at most one open history file. Opening another one closes the previous parser
/// first. Calls are serialized by an internal mutex.
#[derive(Default)]
pub struct HistorySession {
    current: Mutex<Option<FileParser>>,
}

impl HistorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `path` and return up to `count` messages from its start
    pub fn open(&self, path: &Path, count: usize) -> Result<Vec<ChatMessage>> {
        let mut current = self.lock();
        if let Some(previous) = current.take() {
            previous.close();
        }
        let parser = open_parser(path)?;
        let messages = read_batch(&parser, count);
        *current = Some(parser);
        Ok(messages)
    }

    /// Return up to `count` further messages; empty when nothing is open or the file is exhausted
    pub fn load_next(&self, count: usize) -> Vec<ChatMessage> {
        match self.lock().as_ref() {
            Some(parser) => read_batch(parser, count),
            None => Vec::new(),
        }
    }

    pub fn close(&self) {
        if let Some(parser) = self.lock().take() {
            parser.close();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<FileParser>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_batch<R: BufRead>(parser: &JsonHistoryParser<R>, count: usize) -> Vec<ChatMessage> {
    std::iter::from_fn(|| try_read_message(parser)).take(count).collect()
}
