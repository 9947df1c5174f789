pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{USER_DIR_ENV, get_vscode_user_dir};
pub use paths::format_path_with_tilde;
pub use terminal::{sanitize_for_terminal, truncate_chars};
