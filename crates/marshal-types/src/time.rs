//! RFC 3339 UTC timestamp formatting.
//!
//! Two precisions are in use: millisecond timestamps for index entries
//! and blob filenames, and second-precision timestamps for the `ts`
//! field embedded in pose responses.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current instant as RFC 3339 UTC with millisecond precision,
/// e.g. `2025-09-12T14:59:01.234Z`.
pub fn iso8601_now_ms() -> String {
    format_iso8601_ms(Utc::now())
}

/// Format an instant as RFC 3339 UTC with millisecond precision.
///
/// Milliseconds are always present and zero-padded so lexicographic
/// order over the strings matches temporal order.
pub fn format_iso8601_ms(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current instant as RFC 3339 UTC with second precision,
/// e.g. `2025-09-12T14:59:01Z`.
pub fn iso8601_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
