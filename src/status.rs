//! Human-readable scheduling status for the header indicator.
//!
//! Missing or unparsable inputs show as `unknown`; they are never errors.

use crate::scheduler::{interval, timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;
use trendwatch_api::{AnalysisResult, AppConfig};

/// Label used whenever scheduling information is insufficient.
pub const UNKNOWN: &str = "unknown";

/// Snapshot of what the header shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    /// Tracked language, if the service reported one.
    pub language: Option<String>,
    /// Interval label, e.g. `10 minutes`.
    pub interval: String,
    /// Instant of the newest analysis.
    pub last_updated: Option<DateTime<Utc>>,
    /// Age label, e.g. `3 minutes ago`.
    pub last_updated_label: String,
    /// When the next poll is due.
    pub next_update: Option<DateTime<Utc>>,
    /// `HH:MM UTC` of the next poll.
    pub next_update_label: String,
}

impl StatusSummary {
    /// Build the summary from store contents at `now`.
    pub fn from_store(
        config: Option<&AppConfig>,
        results: &[AnalysisResult],
        now: DateTime<Utc>,
    ) -> Self {
        let raw_interval = config.and_then(|c| c.schedule_interval_minutes.as_deref());
        let last_updated =
            timestamp::parse(results.first().map(|r| r.analysis_timestamp.as_str()));
        let next_update = last_updated
            .zip(interval::resolve(raw_interval))
            .and_then(|(last, step)| {
                chrono::Duration::from_std(step)
                    .ok()
                    .and_then(|step| last.checked_add_signed(step))
            });

        Self {
            language: config.and_then(|c| c.trending_language.clone()),
            interval: format_interval(raw_interval),
            last_updated,
            last_updated_label: last_updated
                .map(|at| format_age((now - at).num_seconds()))
                .unwrap_or_else(|| UNKNOWN.to_owned()),
            next_update,
            next_update_label: next_update
                .map(|at| at.format("%H:%M UTC").to_string())
                .unwrap_or_else(|| UNKNOWN.to_owned()),
        }
    }
}

/// Relative age of something `seconds` old.
pub fn format_age(seconds: i64) -> String {
    if seconds < 5 {
        return "just now".to_owned();
    }
    if seconds < 60 {
        return format!("{seconds} seconds ago");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute") + " ago";
    }
    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour") + " ago";
    }
    plural(hours / 24, "day") + " ago"
}

/// Interval label: minutes below an hour, otherwise hours to one decimal.
pub fn format_interval(raw: Option<&str>) -> String {
    let Some(minutes) = interval::resolve(raw).map(|d| d.as_secs() / 60) else {
        return UNKNOWN.to_owned();
    };
    if minutes < 60 {
        return plural(minutes as i64, "minute");
    }
    // Tenths of an hour, rounded half up.
    let tenths = (minutes * 10 + 30) / 60;
    if tenths % 10 == 0 {
        plural((tenths / 10) as i64, "hour")
    } else {
        format!("{}.{} hours", tenths / 10, tenths % 10)
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_config, sample_result};
    use chrono::TimeZone;

    #[test]
    fn age_buckets() {
        assert_eq!(format_age(-20), "just now");
        assert_eq!(format_age(4), "just now");
        assert_eq!(format_age(42), "42 seconds ago");
        assert_eq!(format_age(60), "1 minute ago");
        assert_eq!(format_age(59 * 60), "59 minutes ago");
        assert_eq!(format_age(3 * 3600), "3 hours ago");
        assert_eq!(format_age(50 * 3600), "2 days ago");
    }

    #[test]
    fn interval_labels() {
        assert_eq!(format_interval(Some("10")), "10 minutes");
        assert_eq!(format_interval(Some("1")), "1 minute");
        assert_eq!(format_interval(Some("60")), "1 hour");
        assert_eq!(format_interval(Some("120")), "2 hours");
        assert_eq!(format_interval(Some("90")), "1.5 hours");
        assert_eq!(format_interval(Some("100")), "1.7 hours");
        assert_eq!(format_interval(Some("61")), "1 hour");
    }

    #[test]
    fn invalid_interval_is_unknown() {
        for raw in [None, Some(""), Some("0"), Some("-5"), Some("abc")] {
            assert_eq!(format_interval(raw), UNKNOWN);
        }
    }

    #[test]
    fn summary_for_loaded_store() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        let summary = StatusSummary::from_store(
            Some(&sample_config("60")),
            &[sample_result(1, "2024-03-01 10:00:00")],
            now,
        );

        assert_eq!(summary.language.as_deref(), Some("python"));
        assert_eq!(summary.interval, "1 hour");
        assert_eq!(summary.last_updated_label, "30 minutes ago");
        assert_eq!(summary.next_update_label, "11:00 UTC");
    }

    #[test]
    fn summary_without_data_is_unknown() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        let summary = StatusSummary::from_store(None, &[], now);

        assert_eq!(summary.interval, UNKNOWN);
        assert_eq!(summary.last_updated_label, UNKNOWN);
        assert_eq!(summary.next_update_label, UNKNOWN);
        assert!(summary.next_update.is_none());
    }

    #[test]
    fn unparsable_timestamp_is_unknown() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        let summary = StatusSummary::from_store(
            Some(&sample_config("60")),
            &[sample_result(1, "whenever")],
            now,
        );
        assert_eq!(summary.last_updated_label, UNKNOWN);
        assert_eq!(summary.next_update_label, UNKNOWN);
        assert_eq!(summary.interval, "1 hour");
    }
}
