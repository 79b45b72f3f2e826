//! Formatting utilities

use chrono::{DateTime, Local};

/// Format a timestamp as HH:MM:SS
pub fn time(dt: DateTime<Local>) -> String {
    dt.format("%H:%M:%S").to_string()
}

/// Countdown label, e.g. "29s"
pub fn countdown(seconds: u64) -> String {
    format!("{}s", seconds)
}

/// Split a code in half for reading aloud ("123456" -> "123 456")
pub fn code(code: &str) -> String {
    if code.len() <= 4 || !code.is_ascii() {
        return code.to_string();
    }
    let mid = code.len() / 2;
    format!("{} {}", &code[..mid], &code[mid..])
}

/// Hide a password behind a fixed-width mask
pub fn mask(password: &str) -> String {
    if password.is_empty() {
        String::new()
    } else {
        "*".repeat(8)
    }
}

/// Truncate a string to max length (in characters) with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
