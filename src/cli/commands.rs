use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::models::{ChatHistorySummary, ChatMessage};
use crate::sessions::{HistorySession, discover_history_files, list_histories, search_histories};
use crate::utils::{
    format_path_with_tilde, get_vscode_user_dir, sanitize_for_terminal, truncate_chars,
};

/// Messages fetched per page when printing a session
const PAGE_SIZE: usize = 10;

/// Longest first-message preview shown in listings
const PREVIEW_CHARS: usize = 80;

#[derive(Parser)]
#[command(name = "copilot-history-explorer")]
#[command(version = "0.1.0")]
#[command(about = "Browse and search GitHub Copilot Chat history", long_about = None)]
pub struct Cli {
    /// VS Code user directory (defaults to $COPILOT_HISTORY_USER_DIR, then <config dir>/Code/User)
    #[arg(long, global = true, value_name = "DIR")]
    pub user_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List chat sessions, newest first
    List,
    /// List chat sessions containing a keyword (case-insensitive)
    Search { keyword: String },
    /// Print the messages of one chat session file
    Show {
        file: PathBuf,
        /// Print at most this many messages
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
        /// Print one JSON object per message
        #[arg(long)]
        json: bool,
    },
    /// Show statistics about the history
    Stats,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::List) => {
            let files = discover(cli.user_dir.as_deref())?;
            print_summaries(&list_histories(&files))?;
        }
        Some(Commands::Search { keyword }) => {
            if keyword.trim().is_empty() {
                bail!("Search keyword must not be empty");
            }
            let files = discover(cli.user_dir.as_deref())?;
            print_summaries(&search_histories(&files, keyword))?;
        }
        Some(Commands::Show { file, count, json }) => {
            show_messages(file, *count, *json)?;
        }
        Some(Commands::Stats) => {
            show_stats(cli.user_dir.as_deref())?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn resolve_user_dir(user_dir: Option<&Path>) -> Result<PathBuf> {
    match user_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => get_vscode_user_dir(),
    }
}

fn discover(user_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let user_dir = resolve_user_dir(user_dir)?;
    discover_history_files(&user_dir).with_context(|| {
        format!("Failed to discover chat history in {}", format_path_with_tilde(&user_dir))
    })
}

fn print_summaries(summaries: &[ChatHistorySummary]) -> Result<()> {
    let mut out = io::stdout().lock();
    if summaries.is_empty() {
        writeln!(out, "No chat history found")?;
        return Ok(());
    }
    for summary in summaries {
        let preview =
            truncate_chars(&sanitize_for_terminal(&summary.first_message_display()), PREVIEW_CHARS);
        let timestamp = summary.timestamp_display();
        let timestamp = if timestamp.is_empty() { "-".to_string() } else { timestamp };
        writeln!(out, "{:<19}  {}", timestamp, preview)?;
        writeln!(out, "{:<19}  {}", "", format_path_with_tilde(&summary.file_path))?;
    }
    Ok(())
}

/// Stream a session to stdout page by page so large files are never fully loaded
fn show_messages(file: &Path, count: Option<u64>, json: bool) -> Result<()> {
    let limit = count.map_or(usize::MAX, |c| usize::try_from(c).unwrap_or(usize::MAX));
    let session = HistorySession::new();
    let mut out = io::stdout().lock();

    let mut printed = 0;
    let mut page = session.open(file, PAGE_SIZE.min(limit))?;
    while !page.is_empty() {
        for message in &page {
            write_message(&mut out, message, json)?;
        }
        printed += page.len();
        if printed >= limit {
            break;
        }
        page = session.load_next(PAGE_SIZE.min(limit - printed));
    }
    session.close();

    if printed == 0 && !json {
        writeln!(out, "No messages in {}", format_path_with_tilde(file))?;
    }
    Ok(())
}

fn write_message(out: &mut impl Write, message: &ChatMessage, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(message).context("Failed to serialize message")?;
        writeln!(out, "{}", line)?;
        return Ok(());
    }

    let timestamp = message
        .timestamp
        .map(|ts| ts.with_timezone(&chrono::Local).format("%Y/%m/%d %H:%M:%S").to_string())
        .unwrap_or_default();
    writeln!(out, "{} {:?} {}", message.kind.icon(), message.kind, timestamp)?;
    writeln!(out, "{}", sanitize_for_terminal(&message.content))?;
    writeln!(out)?;
    Ok(())
}

fn show_stats(user_dir: Option<&Path>) -> Result<()> {
    let user_dir = resolve_user_dir(user_dir)?;
    let files = discover(Some(&user_dir))?;
    let summaries = list_histories(&files);

    println!("Copilot Chat History Statistics");
    println!("================================");
    println!("History files: {}", files.len());
    println!("  With messages: {}", summaries.len());
    println!();
    println!("VS Code user directory: {}", format_path_with_tilde(&user_dir));

    if let Some(newest) = summaries.iter().find_map(|s| s.timestamp) {
        println!("Newest session: {}", newest.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(oldest) = summaries.iter().rev().find_map(|s| s.timestamp) {
        println!("Oldest session: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
    }

    Ok(())
}
