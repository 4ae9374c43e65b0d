//! String utility functions

/// Truncate text to at most `max_len` characters, ending in "..." when cut
pub fn truncate_cell(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    if max_len <= 3 {
        return text.chars().take(max_len).collect();
    }
    format!("{}...", text.chars().take(max_len - 3).collect::<String>())
}

/// Pad `text` with spaces to `width` characters (counted as chars, not bytes)
pub fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}
