//! Shared formatting utilities used by both CLI and TUI
//!
//! This module consolidates the display-oriented text transforms: string
//! truncation, query-text whitespace normalization, and the small number
//! formatters the renderers share.

use chrono::{DateTime, Local, Utc};

/// Maximum characters of query text shown in list rows and the detail view.
pub const QUERY_SNIPPET_MAX_LEN: usize = 300;

/// Truncate a string to a maximum length (in characters), adding "..." at the end if truncated.
///
/// This function is Unicode-safe and counts characters, not bytes.
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        // Edge case: if max_len is very small, just truncate without ellipsis
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Normalize query text for display.
///
/// Strips the minimum common leading whitespace across non-blank lines, trims
/// trailing whitespace per line, drops blank lines, and truncates the result
/// to `max_len` characters. Lines count characters, not bytes, so indented
/// multi-byte text normalizes correctly.
#[must_use]
pub fn strip_query_text_whitespace(query_text: &str, max_len: usize) -> String {
    let lines: Vec<&str> = query_text.split('\n').collect();

    let mut min_leading: Option<usize> = None;
    for line in &lines {
        if line.trim().is_empty() {
            continue;
        }
        let leading = line.chars().take_while(|c| c.is_whitespace()).count();
        if min_leading.is_none_or(|min| leading < min) {
            min_leading = Some(leading);
        }
        if min_leading == Some(0) {
            break;
        }
    }
    let min_leading = min_leading.unwrap_or(0);

    let mut formatted = String::new();
    for (i, line) in lines.iter().enumerate() {
        let stripped: String = line.chars().skip(min_leading).collect();
        let trimmed = stripped.trim_end();

        if !trimmed.is_empty() {
            formatted.push_str(trimmed);
            if i < lines.len() - 1 {
                formatted.push('\n');
            }
        }
    }

    truncate_string(&formatted, max_len)
}

/// Format a timestamp compactly in local time, for list rows.
#[must_use]
pub fn format_short_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Format a count with thousands grouping ("1,234,567").
#[must_use]
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
