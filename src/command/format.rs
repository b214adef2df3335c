//! Output formatting for command results

use chrono::{DateTime, Local, Utc};
use std::time::Duration;

/// Format of topic timestamps, e.g. `14:03:59, 19. Oct. 26`
pub const TOPIC_TIME_FORMAT: &str = "%H:%M:%S, %d. %b. %y";

/// Format bytes to human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format speed to human readable string
pub fn format_speed(bytes_per_sec: u64) -> String {
    format!("{}/s", format_bytes(bytes_per_sec))
}

/// Format duration to human readable string
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Time elapsed since `since`, formatted; zero if `since` is in the future
pub fn format_elapsed(since: DateTime<Utc>) -> String {
    let elapsed = (Utc::now() - since).to_std().unwrap_or_default();
    format_duration(elapsed)
}

/// Topic timestamp in local time
pub fn format_topic_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format(TOPIC_TIME_FORMAT).to_string()
}
