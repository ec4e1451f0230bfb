//! Format predicates used by the type checks.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Structural check: something before `@`, and a dotted domain after it. Not RFC 5322.
pub fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Parse the date shapes clients send: RFC 3339, `YYYY-MM-DD`, and naive date-times.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Numbers are epoch milliseconds; strings go through [`parse_date`].
pub fn is_date(v: &Value) -> bool {
    match v {
        Value::String(s) => parse_date(s).is_some(),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis)
            .is_some(),
        _ => false,
    }
}

/// Numeric view of a value: JSON numbers, or strings holding a finite number.
pub fn coerce_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                return None;
            }
            t.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

pub fn is_boolean(v: &Value) -> bool {
    matches!(v, Value::Bool(_)) || matches!(v.as_str(), Some("true") | Some("false"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_heuristic() {
        assert!(is_email("a@b.com"));
        assert!(is_email("first.last+tag@clinic.example.org"));
        assert!(!is_email("not-an-email"));
        assert!(!is_email("a@b"));
        assert!(!is_email("a b@c.com"));
        assert!(!is_email("@b.com"));
    }

    #[test]
    fn dates_in_common_shapes() {
        assert!(parse_date("2024-02-29").is_some());
        assert!(parse_date("2024-03-01T10:30:00Z").is_some());
        assert!(parse_date("2024-03-01T10:30:00.123").is_some());
        assert!(parse_date("2024-03-01 10:30:00").is_some());
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("yesterday").is_none());
        assert!(is_date(&json!(1_700_000_000_000i64)));
        assert!(!is_date(&json!(true)));
    }

    #[test]
    fn number_coercion() {
        assert_eq!(coerce_number(&json!(3)), Some(3.0));
        assert_eq!(coerce_number(&json!(" 4.5 ")), Some(4.5));
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&json!(true)), None);
    }

    #[test]
    fn boolean_literals() {
        assert!(is_boolean(&json!(false)));
        assert!(is_boolean(&json!("true")));
        assert!(!is_boolean(&json!("yes")));
        assert!(!is_boolean(&json!(1)));
    }
}
