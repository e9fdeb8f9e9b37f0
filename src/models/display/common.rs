//! Common display utilities and helpers

use chrono::NaiveDateTime;

/// Placeholder for shots whose name carries no capture time
pub const NO_TIMESTAMP: &str = "(no timestamp)";

/// Truncate string to max length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a capture time for display (`YYYY-MM-DD HH:MM:SS`).
pub fn format_capture_time(datetime: Option<NaiveDateTime>) -> String {
    datetime
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| NO_TIMESTAMP.to_string())
}
