//! Coarse human-readable ages ("3 hours ago", "in a minute").
//!
//! Buckets and thresholds follow the conventional relative-time scheme used
//! by most web UIs: each unit is rounded, and a unit is only used once the
//! smaller unit crosses its threshold.

use chrono::{DateTime, Utc};

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;
/// Average Gregorian month (146097 days per 400 years / 4800 months).
const MS_PER_MONTH: f64 = MS_PER_DAY * 146_097.0 / 4_800.0;

/// Describe how long ago `then` was, relative to `now`.
///
/// Future instants are phrased as "in ...".
pub fn humanize_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta_ms = (now - then).num_milliseconds();
    let phrase = relative_phrase(delta_ms.unsigned_abs() as f64);

    if delta_ms < 0 {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

fn relative_phrase(ms: f64) -> String {
    let seconds = (ms / MS_PER_SECOND).round();
    let minutes = (ms / MS_PER_MINUTE).round();
    let hours = (ms / MS_PER_HOUR).round();
    let days = (ms / MS_PER_DAY).round();
    let months = (ms / MS_PER_MONTH).round();
    let years = (ms / (MS_PER_MONTH * 12.0)).round();

    if seconds < 45.0 {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{minutes} minutes")
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{hours} hours")
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{days} days")
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < 11.0 {
        format!("{months} months")
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{years} years")
    }
}
