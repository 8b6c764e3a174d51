//! Parsing for the coordinator's human-readable duration and size strings.
//!
//! The coordinator reports statistics like elapsed time and memory
//! reservation as formatted strings ("3.42s", "1.5GB"). Sorting needs them in
//! canonical numeric units: milliseconds for durations, bytes for sizes.
//! Both parsers are total over their inputs via `Option`; sort-key callers
//! substitute 0.0 for values that fail to parse so one malformed field can
//! never abort a refresh cycle.

/// Data size multipliers (binary, matching the coordinator's formatting)
pub mod size {
    pub const KB: f64 = 1024.0;
    pub const MB: f64 = KB * 1024.0;
    pub const GB: f64 = MB * 1024.0;
    pub const TB: f64 = GB * 1024.0;
    pub const PB: f64 = TB * 1024.0;
}

/// Split a value string like "3.42ms" into its numeric part and unit suffix.
///
/// Accepts surrounding whitespace and whitespace between number and unit.
fn split_value_unit(value: &str) -> Option<(f64, &str)> {
    let trimmed = value.trim();
    let unit_start = trimmed.find(|c: char| c.is_ascii_alphabetic())?;
    let (number_part, unit) = trimmed.split_at(unit_start);
    let number: f64 = number_part.trim().parse().ok()?;
    if !unit.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some((number, unit))
}

/// Parse a duration string to milliseconds.
///
/// Recognized units: ns, us, ms, s, m, h, d. Returns `None` for anything
/// else, including bare numbers without a unit.
#[must_use]
pub fn parse_duration(value: &str) -> Option<f64> {
    let (number, unit) = split_value_unit(value)?;
    let millis = match unit {
        "ns" => number / 1_000_000.0,
        "us" => number / 1_000.0,
        "ms" => number,
        "s" => number * 1_000.0,
        "m" => number * 60_000.0,
        "h" => number * 3_600_000.0,
        "d" => number * 86_400_000.0,
        _ => return None,
    };
    Some(millis)
}

/// Parse a data size string to bytes.
///
/// Recognized units: B, kB, MB, GB, TB, PB with binary multipliers, matching
/// the inverse of [`format_data_size`].
#[must_use]
pub fn parse_data_size(value: &str) -> Option<f64> {
    let (number, unit) = split_value_unit(value)?;
    let bytes = match unit {
        "B" => number,
        "kB" => number * size::KB,
        "MB" => number * size::MB,
        "GB" => number * size::GB,
        "TB" => number * size::TB,
        "PB" => number * size::PB,
        _ => return None,
    };
    Some(bytes)
}

/// Format milliseconds with the largest unit that keeps the value >= 1.
///
/// Inverse of [`parse_duration`] up to rounding; used by the renderers when a
/// stat is only available numerically.
#[must_use]
pub fn format_duration(millis: f64) -> String {
    let (value, unit) = if millis >= 86_400_000.0 {
        (millis / 86_400_000.0, "d")
    } else if millis >= 3_600_000.0 {
        (millis / 3_600_000.0, "h")
    } else if millis >= 60_000.0 {
        (millis / 60_000.0, "m")
    } else if millis >= 1_000.0 {
        (millis / 1_000.0, "s")
    } else {
        (millis, "ms")
    };
    format!("{:.2}{}", value, unit)
}

/// Format bytes with the largest binary unit that keeps the value >= 1.
///
/// Inverse of [`parse_data_size`] up to rounding.
#[must_use]
pub fn format_data_size(bytes: f64) -> String {
    use size::{GB, KB, MB, PB, TB};

    let (value, unit) = if bytes >= PB {
        (bytes / PB, "PB")
    } else if bytes >= TB {
        (bytes / TB, "TB")
    } else if bytes >= GB {
        (bytes / GB, "GB")
    } else if bytes >= MB {
        (bytes / MB, "MB")
    } else if bytes >= KB {
        (bytes / KB, "kB")
    } else {
        (bytes, "B")
    };
    format!("{:.2}{}", value, unit)
}
