//! Field-level normalization shared by provider implementations.
//!
//! Every helper returns `None` rather than a guessed default when the
//! source value is missing or unreadable.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Decimal from a JSON number or numeric string.
pub(crate) fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            Decimal::from_str(&n.to_string()).ok().or_else(|| n.as_f64().and_then(decimal_from_f64))
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Decimal from a float, rounding away binary noise (`199.99` stays `199.99`).
pub(crate) fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64(value).map(|d| d.normalize())
    } else {
        None
    }
}

/// Non-negative integer from a JSON number or numeric string.
pub(crate) fn u32_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Departure timestamp in local airport time.
///
/// Accepts RFC 3339 (offset dropped, wall-clock time kept) and the common
/// naive ISO forms. A bare date is not a departure time and yields `None`.
pub(crate) fn parse_departure(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Travel time in minutes from a number of minutes or an ISO-8601
/// duration such as `PT13H5M` or `P1DT2H`.
pub(crate) fn parse_duration_minutes(value: &Value) -> Option<u32> {
    match value {
        Value::String(s) if s.trim_start().starts_with('P') => parse_iso_duration(s.trim()),
        other => u32_from_value(other),
    }
}

fn parse_iso_duration(raw: &str) -> Option<u32> {
    let body = raw.strip_prefix('P')?;
    let (date_part, time_part) = match body.split_once('T') {
        Some((d, t)) => (d, t),
        None => (body, ""),
    };

    let mut minutes: u32 = 0;
    for (part, units) in [
        (date_part, &[('D', 24 * 60)][..]),
        (time_part, &[('H', 60), ('M', 1), ('S', 0)][..]),
    ] {
        let mut digits = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let factor = units.iter().find(|(u, _)| *u == c)?.1;
            let amount: u32 = digits.parse().ok()?;
            minutes = minutes.checked_add(amount.checked_mul(factor)?)?;
            digits.clear();
        }
        if !digits.is_empty() {
            return None;
        }
    }

    Some(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_decimal_from_number_and_string() {
        assert_eq!(decimal_from_value(&json!(240)), Some(dec!(240)));
        assert_eq!(decimal_from_value(&json!(199.99)), Some(dec!(199.99)));
        assert_eq!(decimal_from_value(&json!("312.40")), Some(dec!(312.40)));
        assert_eq!(decimal_from_value(&json!("n/a")), None);
        assert_eq!(decimal_from_value(&json!(null)), None);
    }

    #[test]
    fn test_decimal_from_f64_drops_binary_noise() {
        assert_eq!(decimal_from_f64(199.99), Some(dec!(199.99)));
        assert_eq!(decimal_from_f64(f64::NAN), None);
    }

    #[test]
    fn test_u32_from_value() {
        assert_eq!(u32_from_value(&json!(0)), Some(0));
        assert_eq!(u32_from_value(&json!("2")), Some(2));
        assert_eq!(u32_from_value(&json!(-1)), None);
        assert_eq!(u32_from_value(&json!(1.5)), None);
    }

    #[test]
    fn test_parse_departure_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        assert_eq!(parse_departure("2025-03-05T10:30:00+01:00"), Some(expected));
        assert_eq!(parse_departure("2025-03-05T10:30:00"), Some(expected));
        assert_eq!(parse_departure("2025-03-05T10:30"), Some(expected));
        assert_eq!(parse_departure("2025-03-05 10:30:00"), Some(expected));
        assert_eq!(parse_departure("2025-03-05"), None);
        assert_eq!(parse_departure("soon"), None);
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration_minutes(&json!(785)), Some(785));
        assert_eq!(parse_duration_minutes(&json!("785")), Some(785));
        assert_eq!(parse_duration_minutes(&json!("PT13H5M")), Some(785));
        assert_eq!(parse_duration_minutes(&json!("PT45M")), Some(45));
        assert_eq!(parse_duration_minutes(&json!("P1DT2H")), Some(26 * 60));
        assert_eq!(parse_duration_minutes(&json!("PT13X")), None);
        assert_eq!(parse_duration_minutes(&json!(null)), None);
    }
}
