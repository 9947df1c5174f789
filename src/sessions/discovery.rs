use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use walkdir::WalkDir;

use crate::utils::paths::has_json_extension;

const WORKSPACE_STORAGE_DIR: &str = "workspaceStorage";
const CHAT_SESSIONS_DIR: &str = "chatSessions";
const GLOBAL_STORAGE_DIR: &str = "globalStorage";
const EMPTY_WINDOW_SESSIONS_DIR: &str = "emptyWindowChatSessions";

/// `<workspace-id>/chatSessions/<file>` below `workspaceStorage`
const WORKSPACE_SESSION_DEPTH: usize = 3;

/// Maximum number of history files to collect (security: prevent resource exhaustion)
const MAX_HISTORY_FILES: usize = 10_000;

/// Discover all Copilot chat session files under a VS Code user directory
///
/// Looks in two places:
///
/// - `workspaceStorage/<workspace-id>/chatSessions/*.json` (sessions opened in a workspace)
/// - `globalStorage/emptyWindowChatSessions/*.json` (sessions from windows without a folder)
///
/// Only the top level of each sessions directory is scanned, and symlinks are not followed.
/// Missing directories simply contribute no files. The result is sorted by path.
///
/// # Errors
///
/// Returns an error if more than [`MAX_HISTORY_FILES`] files are found. Unreadable
/// directory entries are logged as warnings and skipped.
pub fn discover_history_files(user_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let workspace_storage = user_dir.join(WORKSPACE_STORAGE_DIR);
    if workspace_storage.is_dir() {
        // min_depth hides shallower entries from filter_entry, so walk from depth 1
        let walker = WalkDir::new(&workspace_storage)
            .min_depth(1)
            .max_depth(WORKSPACE_SESSION_DEPTH)
            .into_iter()
            .filter_entry(|entry| entry.depth() != 2 || entry.file_name() == CHAT_SESSIONS_DIR);
        collect_json_files(walker, WORKSPACE_SESSION_DEPTH, &mut files)?;
    }

    let empty_window_sessions = user_dir.join(GLOBAL_STORAGE_DIR).join(EMPTY_WINDOW_SESSIONS_DIR);
    if empty_window_sessions.is_dir() {
        let walker = WalkDir::new(&empty_window_sessions).min_depth(1).max_depth(1).into_iter();
        collect_json_files(walker, 1, &mut files)?;
    }

    files.sort();
    Ok(files)
}

/// Collects regular `.json` files found exactly `depth` levels below the walk root
fn collect_json_files(
    entries: impl Iterator<Item = walkdir::Result<walkdir::DirEntry>>,
    depth: usize,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("Warning: Skipping unreadable directory entry: {}", e);
                continue;
            }
        };

        if entry.depth() != depth
            || !entry.file_type().is_file()
            || !has_json_extension(entry.path())
        {
            continue;
        }

        if files.len() >= MAX_HISTORY_FILES {
            bail!(
                "Resource limit exceeded: Found more than {} chat history files",
                MAX_HISTORY_FILES
            );
        }
        files.push(entry.into_path());
    }
    Ok(())
}
