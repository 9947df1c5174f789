use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable overriding the VS Code user directory
pub const USER_DIR_ENV: &str = "COPILOT_HISTORY_USER_DIR";

/// Get the VS Code user directory that holds chat sessions
///
/// Uses `COPILOT_HISTORY_USER_DIR` when set and non-empty, otherwise `<config dir>/Code/User`
/// (`%APPDATA%\Code\User` on Windows, `~/Library/Application Support/Code/User` on macOS,
/// `$XDG_CONFIG_HOME/Code/User` on Linux).
pub fn get_vscode_user_dir() -> Result<PathBuf> {
    resolve_user_dir(env::var_os(USER_DIR_ENV).map(PathBuf::from), dirs::config_dir())
}

fn resolve_user_dir(overridden: Option<PathBuf>, config_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = overridden.filter(|dir| !dir.as_os_str().is_empty()) {
        return Ok(dir);
    }
    let config_dir = config_dir.context("Failed to get platform config directory")?;
    Ok(config_dir.join("Code").join("User"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_takes_precedence() {
        let dir = resolve_user_dir(
            Some(PathBuf::from("/custom/User")),
            Some(PathBuf::from("/home/testuser/.config")),
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/custom/User"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let dir =
            resolve_user_dir(Some(PathBuf::new()), Some(PathBuf::from("/home/testuser/.config")))
                .unwrap();
        assert_eq!(dir, PathBuf::from("/home/testuser/.config/Code/User"));
    }

    #[test]
    fn test_missing_config_dir() {
        let result = resolve_user_dir(None, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to get platform config directory"));
    }
}
