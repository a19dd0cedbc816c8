//! Lenient numeric parsing for loosely typed payloads.
//!
//! Upstream JSON and hand-edited fixtures carry prices either as numbers or
//! as strings such as `"12.50"` or `" 7 USD"`. Strings are read up to the end
//! of their leading numeric prefix; anything without one is not a number.

use serde_json::Value;

/// Parse the leading floating-point prefix of `input`.
///
/// Leading whitespace is skipped, an optional sign, digits with an optional
/// fraction and an optional exponent are accepted, and the rest of the
/// string is ignored. `"Infinity"` is recognised so that callers can reject
/// it with an `is_finite` check rather than mistaking it for garbage.
pub fn parse_leading_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();

    let mut end = 0;
    let negative = matches!(bytes.first(), Some(b'-'));
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let mut j = end + 1;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        mantissa_digits += j - (end + 1);
        if mantissa_digits > 0 {
            end = j;
        }
    }

    if mantissa_digits == 0 {
        return None;
    }

    if end < len && matches!(bytes[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < len && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Read a price out of a JSON value that may be a number or a numeric string.
///
/// Returns `None` for anything else, including `false`, `null` and
/// non-finite values.
pub fn parse_price_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    };
    parsed.filter(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_leading_float("10"), Some(10.0));
        assert_eq!(parse_leading_float("12.5"), Some(12.5));
        assert_eq!(parse_leading_float("-3.25"), Some(-3.25));
        assert_eq!(parse_leading_float("+4"), Some(4.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("5."), Some(5.0));
        assert_eq!(parse_leading_float("1e3"), Some(1000.0));
    }

    #[test]
    fn test_leading_prefix_only() {
        assert_eq!(parse_leading_float("  7 USD"), Some(7.0));
        assert_eq!(parse_leading_float("12abc"), Some(12.0));
        assert_eq!(parse_leading_float("3e"), Some(3.0));
        assert_eq!(parse_leading_float("1.2.3"), Some(1.2));
    }

    #[test]
    fn test_not_a_number() {
        assert_eq!(parse_leading_float(""), None);
        assert_eq!(parse_leading_float("x"), None);
        assert_eq!(parse_leading_float("bad"), None);
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float("-"), None);
        assert_eq!(parse_leading_float("N/D"), None);
    }

    #[test]
    fn test_infinity_is_recognised() {
        assert_eq!(parse_leading_float("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_leading_float("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_price_value_shapes() {
        assert_eq!(parse_price_value(&json!(123.45)), Some(123.45));
        assert_eq!(parse_price_value(&json!("99.5")), Some(99.5));
        assert_eq!(parse_price_value(&json!(false)), None);
        assert_eq!(parse_price_value(&json!(null)), None);
        assert_eq!(parse_price_value(&json!("oops")), None);
        assert_eq!(parse_price_value(&json!("Infinity")), None);
    }
}
