//! Human-readable duration formatting
//!
//! Provides consistent track-length display across chat replies.

/// Text shown for durations that are zero, negative, or otherwise unknown
pub const UNKNOWN_DURATION: &str = "unknown";

/// Text shown for live streams with no end
pub const LIVE_DURATION: &str = "LIVE";

const MS_PER_SECOND: i64 = 1000;
const SECONDS_PER_MINUTE: i64 = 60;
const MINUTES_PER_HOUR: i64 = 60;

/// Format a duration in milliseconds for display.
///
/// Format selection:
/// - `H:MM:SS` when the duration is at least one hour
/// - `M:SS` otherwise
/// - [`UNKNOWN_DURATION`] for zero or negative input
///
/// Sub-second remainders are truncated.
///
/// # Examples
///
/// ```
/// use jukebox_common::human_time::format_duration;
///
/// assert_eq!(format_duration(30_000), "0:30");
/// assert_eq!(format_duration(225_000), "3:45");
/// assert_eq!(format_duration(5_025_000), "1:23:45");
/// assert_eq!(format_duration(0), "unknown");
/// ```
pub fn format_duration(ms: i64) -> String {
    if ms <= 0 {
        return UNKNOWN_DURATION.to_string();
    }

    let total_seconds = ms / MS_PER_SECOND;
    let total_minutes = total_seconds / SECONDS_PER_MINUTE;
    let hours = total_minutes / MINUTES_PER_HOUR;

    let seconds = total_seconds % SECONDS_PER_MINUTE;
    let minutes = total_minutes % MINUTES_PER_HOUR;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Format an unsigned millisecond count, saturating values that do not fit in `i64`.
pub fn format_duration_u64(ms: u64) -> String {
    format_duration(i64::try_from(ms).unwrap_or(i64::MAX))
}
