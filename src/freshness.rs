//! Conditional-request handling
//!
//! Every snapshot carries a whole-second build stamp. Clients echo the last
//! `Last-Modified` value they saw in `If-Modified-Since`; when that is at
//! least as new as the active snapshot the response is `304 Not Modified`.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::models::Timestamp;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Outcome of comparing a client's cached timestamp against the active snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    /// The client needs a full response
    Fresh,
    /// The client's copy is at least as new as the active snapshot
    NotModified,
}

pub fn check_freshness(built_at: Timestamp, client_ts: Option<Timestamp>) -> Freshness {
    match client_ts {
        Some(client_ts) if client_ts >= built_at => Freshness::NotModified,
        _ => Freshness::Fresh,
    }
}

/// Drop sub-second precision
pub fn truncate_to_seconds(ts: Timestamp) -> Timestamp {
    DateTime::from_timestamp(ts.timestamp(), 0).unwrap_or(ts)
}

/// Stamp for the next published snapshot
///
/// Whole seconds, and strictly greater than `previous` even when two builds
/// finish within the same second.
pub fn next_stamp(previous: Timestamp, now: Timestamp) -> Timestamp {
    let now = truncate_to_seconds(now);
    let floor = truncate_to_seconds(previous) + TimeDelta::seconds(1);
    if now >= floor {
        now
    } else {
        floor
    }
}

/// Format a timestamp as an IMF-fixdate, e.g. `Wed, 01 May 2024 12:00:00 GMT`
pub fn format_http_date(ts: Timestamp) -> String {
    ts.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an `If-Modified-Since` value; `None` when it is not a valid date
pub fn parse_http_date(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT) {
        return Some(parsed.and_utc());
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
