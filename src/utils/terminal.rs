//! Terminal output sanitization
//!
//! Chat content is user- and model-controlled. Before it is printed, ANSI CSI sequences and
//! control characters are removed so a transcript cannot move the cursor, clear the screen or
//! recolor the terminal.

/// Removes ANSI CSI sequences and control characters other than tab, newline and carriage return
///
/// # Examples
///
/// ```
/// use copilot_history_explorer::utils::terminal::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("\x1b[31mred\x1b[0m"), "red");
/// ```
pub fn sanitize_for_terminal(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // CSI ends at the first letter
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        if ch.is_control() && !matches!(ch, '\t' | '\n' | '\r') {
            continue;
        }
        result.push(ch);
    }

    result
}

/// Shortens `text` to at most `max_chars` characters, marking the cut with an ellipsis
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) if max_chars > 0 => format!("{}…", &text[..cut]),
        Some(_) => String::new(),
        None => text.to_string(),
    }
}
