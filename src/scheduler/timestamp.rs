//! Timestamp normalisation.
//!
//! The analysis service writes naive timestamps (`2024-03-01 10:00:00.123456`)
//! whose clock reading is UTC. Naive input is always read as UTC here, never
//! as local time.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts tried after a space or `T` separator, most specific first.
const NAIVE_SPACE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];
const NAIVE_T_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a service timestamp into an absolute instant.
///
/// Returns `None` for absent or unparsable input; callers treat that as
/// "no scheduling information", never as an error.
pub fn parse(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.contains('T') && has_zone_designator(raw) {
        if let Some(instant) = parse_rfc3339(raw) {
            return Some(instant);
        }
    } else if raw.contains(' ') && !has_zone_designator(raw) {
        if let Some(instant) = parse_naive_utc(raw, NAIVE_SPACE_FORMATS) {
            return Some(instant);
        }
    }

    parse_generic(raw)
}

/// `Z` or a trailing numeric offset (`+08:00`, `-0500`).
fn has_zone_designator(raw: &str) -> bool {
    if raw.ends_with('Z') || raw.ends_with('z') {
        return true;
    }
    let bytes = raw.as_bytes();
    let tail_offset = |len: usize| {
        bytes.len() > len
            && matches!(bytes[bytes.len() - len], b'+' | b'-')
            && bytes[bytes.len() - len + 1..]
                .iter()
                .all(|b| b.is_ascii_digit() || *b == b':')
    };
    // Only look past the time part so the date's dashes never count.
    raw.contains(':') && (tail_offset(6) || tail_offset(5))
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive_utc(raw: &str, formats: &[&str]) -> Option<DateTime<Utc>> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Best-effort fallback for anything the two fast paths did not accept.
fn parse_generic(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(instant) = parse_rfc3339(raw) {
        return Some(instant);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(instant) = parse_naive_utc(raw, NAIVE_T_FORMATS) {
        return Some(instant);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
