use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a front matter date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` and
/// `YYYY/MM/DD`; the time of day is discarded.
#[must_use]
pub fn parse_note_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(trimmed, "%Y/%m/%d").ok()
}

/// Strict `YYYY-MM-DD` check used by validation: zero padded and a real calendar day.
#[must_use]
pub fn is_valid_ymd(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(idx, b)| idx == 4 || idx == 7 || b.is_ascii_digit());
    shape_ok && NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}
