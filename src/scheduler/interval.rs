//! Schedule interval policy.

use std::time::Duration;

/// Resolve the string-encoded `schedule_interval_minutes` into a duration.
///
/// Only the leading integer is read (`"15"`, `" 15 "`, `"15min"` are all
/// 15). Anything that does not start
/// with an integer, or whose integer is below 1, means "no schedule".
pub fn resolve(raw: Option<&str>) -> Option<Duration> {
    let minutes = leading_integer(raw?)?;
    if minutes < 1 {
        return None;
    }
    let minutes = u64::try_from(minutes).ok()?;
    minutes.checked_mul(60).map(Duration::from_secs)
}

/// Optional sign followed by decimal digits, after leading whitespace.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_minutes() {
        assert_eq!(resolve(Some("10")), Some(Duration::from_secs(600)));
        assert_eq!(resolve(Some("1")), Some(Duration::from_secs(60)));
        assert_eq!(resolve(Some(" 60 ")), Some(Duration::from_secs(3600)));
        assert_eq!(resolve(Some("+5")), Some(Duration::from_secs(300)));
    }

    #[test]
    fn leading_integer_wins() {
        assert_eq!(resolve(Some("15min")), Some(Duration::from_secs(900)));
        assert_eq!(resolve(Some("1.5")), Some(Duration::from_secs(60)));
    }

    #[test]
    fn invalid_values_mean_no_schedule() {
        for raw in [None, Some(""), Some("0"), Some("-5"), Some("abc"), Some("-"), Some("  ")] {
            assert_eq!(resolve(raw), None, "raw = {raw:?}");
        }
    }

    #[test]
    fn overflow_means_no_schedule() {
        assert_eq!(resolve(Some("99999999999999999999")), None);
        assert_eq!(resolve(Some(&i64::MAX.to_string())), None);
    }
}
