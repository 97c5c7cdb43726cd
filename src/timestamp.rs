//! Textual and epoch representations of event timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Output format: `2014-01-07 00:00:00+00:00`, with fractional seconds only when present.
const WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Convert epoch seconds to a UTC timestamp. `None` if out of range.
pub fn from_epoch_seconds(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Render a timestamp the way the tabular store writes it.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.format(WRITE_FORMAT).to_string()
}

/// Parse a timestamp cell.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]±HH:MM`, naive date-times (taken as UTC),
/// bare dates (midnight UTC) and integer epoch seconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(s, fmt) {
            return Some(t.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
    }
    s.parse::<i64>().ok().and_then(from_epoch_seconds)
}
