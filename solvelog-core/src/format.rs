//! Formatting helpers shared across output formats.

use chrono::{DateTime, Utc};

use crate::analytics::Ratio;

/// Cell text for a value that has no defined value.
pub const UNDEFINED_CELL: &str = "—";

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d").to_string()
    }
}

/// English ordinal suffix: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st.
pub fn ordinal(n: u64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// "1 day" / "12 days".
pub fn format_days(days: u64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}

/// Compact duration ("45m", "5h", "3d 4h").
pub fn format_duration_secs(secs: i64) -> String {
    let secs = secs.max(0);
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 && hours > 0 {
        format!("{}d {}h", days, hours)
    } else if days > 0 {
        format!("{}d", days)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", minutes)
    }
}

/// Ratio as a table cell with fixed decimals, `—` when undefined.
pub fn format_ratio(ratio: Ratio, decimals: usize) -> String {
    match ratio {
        Ratio::Defined(v) => format!("{:.*}", decimals, v),
        Ratio::Undefined => UNDEFINED_CELL.to_string(),
    }
}

/// Percentage cell ("42.5%"), `—` when undefined.
pub fn format_percent(ratio: Ratio) -> String {
    match ratio {
        Ratio::Defined(v) => format!("{:.1}%", v),
        Ratio::Undefined => UNDEFINED_CELL.to_string(),
    }
}
