//! Display formatting shared by the view models

use chrono::{DateTime, Local, Utc};

/// Local wall-clock time, minute precision
pub fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// `opened → expires` window for a session
pub fn time_window(created_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> String {
    let opened = local_time(created_at);
    match expires_at {
        Some(expires) => format!("{opened} → {}", expires.with_timezone(&Local).format("%H:%M")),
        None => format!("{opened} → no expiry"),
    }
}

/// Coarse "how long ago" for activity feeds
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else {
        plural(days, "day")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
