//! Temporal filtering of the enriched event table.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::EnrichedEvent;

/// Which time window the final table is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalPolicy {
    /// Pass the dataset through unchanged.
    Full,
    /// Yesterday through today, by calendar date, inclusive on both ends.
    RecentWindow,
}

/// Timestamp formats seen in bulletins, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y.%m.%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse a bulletin timestamp, trying known formats and falling back to a
/// bare date at midnight. `None` when nothing matches.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    for format in &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// General bounded filter: keep events whose parsed timestamp falls within
/// the optional start/end bounds, inclusive. An `None` bound is open.
///
/// Events with unparseable timestamps are excluded whenever at least one
/// bound is set, and retained when both bounds are open.
pub fn filter_by_time(
    events: &[EnrichedEvent],
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Vec<EnrichedEvent> {
    if start.is_none() && end.is_none() {
        return events.to_vec();
    }

    events
        .iter()
        .filter(|e| match parse_timestamp(&e.event.timestamp) {
            Some(ts) => {
                start.map_or(true, |s| ts >= s) && end.map_or(true, |b| ts <= b)
            }
            None => false,
        })
        .cloned()
        .collect()
}

/// Bounded filter over calendar dates, inclusive: the end date covers its
/// whole day.
pub fn filter_by_dates(events: &[EnrichedEvent], start: NaiveDate, end: NaiveDate) -> Vec<EnrichedEvent> {
    let start_ts = start.and_hms_opt(0, 0, 0);
    let end_ts = end.and_hms_opt(23, 59, 59);
    filter_by_time(events, start_ts, end_ts)
}

/// Apply the configured interval policy. `today` is passed in so bounded
/// windows are reproducible in tests.
pub fn apply_interval_policy(
    events: Vec<EnrichedEvent>,
    policy: IntervalPolicy,
    today: NaiveDate,
) -> Vec<EnrichedEvent> {
    match policy {
        IntervalPolicy::Full => events,
        IntervalPolicy::RecentWindow => {
            let yesterday = today - Duration::days(1);
            let filtered = filter_by_dates(&events, yesterday, today);
            tracing::info!(
                before = events.len(),
                after = filtered.len(),
                %yesterday,
                %today,
                "applied recent-window interval"
            );
            filtered
        }
    }
}
