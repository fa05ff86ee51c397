//! Date parsing helpers for the loosely formatted values found in SEMD
//! payloads and register exports.

use chrono::NaiveDate;

/// Parse a compact CDA timestamp (`YYYYMMDD` with an optional `hhmm…` tail)
/// into a calendar date. Returns `None` for anything shorter than eight
/// characters or with non-numeric date segments.
#[must_use]
pub fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    let year = value.get(0..4)?.parse().ok()?;
    let month = value.get(4..6)?.parse().ok()?;
    let day = value.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a compact CDA timestamp (`YYYYMMDD[hhmm…]`) into a datetime;
/// a missing time-of-day tail means midnight.
#[must_use]
pub fn parse_compact_datetime(value: &str) -> Option<chrono::NaiveDateTime> {
    let date = parse_compact_date(value)?;
    let hour = value.get(8..10).and_then(|v| v.parse().ok()).unwrap_or(0);
    let minute = value.get(10..12).and_then(|v| v.parse().ok()).unwrap_or(0);
    date.and_hms_opt(hour, minute, 0)
}

/// Parse an ISO `YYYY-MM-DD` date.
#[must_use]
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parse an ISO-like date, repairing oversized segments the way register
/// exports sometimes produce them (`20211-033-055` and friends): each
/// segment is truncated to its nominal width before parsing.
#[must_use]
pub fn parse_loose_date(value: &str) -> Option<NaiveDate> {
    if let Some(date) = parse_iso_date(value) {
        return Some(date);
    }
    let segments: Vec<&str> = value.split('-').collect();
    if segments.len() != 3 {
        return None;
    }
    let year = segments[0].get(0..4).unwrap_or(segments[0]);
    let month = segments[1].get(0..2).unwrap_or(segments[1]);
    let day = segments[2].get(0..2).unwrap_or(segments[2]);
    parse_iso_date(&format!("{year}-{month}-{day}"))
}

/// Whether two dates lie within `days` of each other (inclusive).
#[must_use]
pub fn within_days(a: NaiveDate, b: NaiveDate, days: i64) -> bool {
    (a - b).num_days().abs() <= days
}

/// Truncate a string to at most `max` characters, the way register ingest
/// caps over-long staging attributes.
#[must_use]
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_date_with_time_tail() {
        assert_eq!(
            parse_compact_date("20230415 1230"),
            NaiveDate::from_ymd_opt(2023, 4, 15)
        );
        assert_eq!(
            parse_compact_date("202304151230"),
            NaiveDate::from_ymd_opt(2023, 4, 15)
        );
        assert_eq!(parse_compact_date("2023"), None);
        assert_eq!(parse_compact_date("2023-04-15"), None);
    }

    #[test]
    fn loose_date_repairs_segments() {
        assert_eq!(
            parse_loose_date("2021-03-05"),
            NaiveDate::from_ymd_opt(2021, 3, 5)
        );
        assert_eq!(
            parse_loose_date("20215-033-055"),
            NaiveDate::from_ymd_opt(2021, 3, 5)
        );
        assert_eq!(parse_loose_date("garbage"), None);
    }

    #[test]
    fn within_days_is_inclusive() {
        let a = NaiveDate::from_ymd_opt(2023, 4, 15).unwrap();
        let b = NaiveDate::from_ymd_opt(2023, 4, 16).unwrap();
        let c = NaiveDate::from_ymd_opt(2023, 4, 17).unwrap();
        assert!(within_days(a, b, 1));
        assert!(within_days(b, a, 1));
        assert!(!within_days(a, c, 1));
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("Злокачественное", 5), "Злока");
        assert_eq!(truncate_chars("C50", 10), "C50");
    }
}
