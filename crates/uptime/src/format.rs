//! Display helpers shared by command handlers and live views.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// `N/A` when unknown, whole milliseconds below one second, otherwise
/// seconds with two decimals.
pub fn response_time(ms: Option<f64>) -> String {
    match ms {
        None => "N/A".into(),
        Some(ms) if ms < 1000.0 => format!("{}ms", ms.round()),
        Some(ms) => format!("{:.2}s", ms / 1000.0),
    }
}

/// Uptime percentage with two decimals.
pub fn uptime(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

/// Check interval in minutes as `45m`, `2h` or `1h 30m`.
pub fn check_interval(minutes: u32) -> String {
    let (hours, rest) = (minutes / 60, minutes % 60);
    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// How long ago `at` was, to whole seconds (e.g. `1m 5s ago`).
pub fn age(at: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = u64::try_from((now - *at).num_seconds()).unwrap_or(0);
    format!("{} ago", humantime::format_duration(Duration::from_secs(secs)))
}

pub fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.into()
}
