//! Loose numeric interpretation of property values.
//!
//! Property values arrive as arbitrary JSON. Numbers pass through; strings
//! are read with a leading-number parse so `"12.5m"` yields `12.5`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn leading_number() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?))").unwrap()
    })
}

/// Parses the numeric prefix of a string, `None` if there is none.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let caps = leading_number().captures(text)?;
    let digits = &caps[1];
    match digits.trim_start_matches(['+', '-']) {
        "Infinity" if digits.starts_with('-') => Some(f64::NEG_INFINITY),
        "Infinity" => Some(f64::INFINITY),
        _ => digits.parse().ok(),
    }
}

/// Numeric reading of a property value.
///
/// Returns `None` for null, booleans, containers and strings without a
/// numeric prefix. NaN is never returned.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    }?;
    (!parsed.is_nan()).then_some(parsed)
}

/// Whether a value is a number, or a string that is exactly the canonical
/// rendering of a number (`"42"`, `"1.5"`, but not `"1.50"` or `"42 m"`).
pub fn is_lossless_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => match parse_leading_float(s) {
            Some(parsed) => format_number(parsed) == *s,
            None => false,
        },
        _ => false,
    }
}

/// Renders a number the way JavaScript's `Number#toString` does.
///
/// Shortest round-trip digits; plain notation for decimal exponents in
/// `-6..21`, exponent notation (`1e-7`, `1e+21`) outside it. Negative zero
/// renders as `0`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value < 0.0 {
        return format!("-{}", format_number(-value));
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.25e-7"
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let len = digits.len() as i32;
    // Position of the decimal point relative to the first digit
    let point = exponent + 1;

    if len <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - len) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let sign = if exponent >= 0 { "+" } else { "" };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, exponent)
        } else {
            format!("{}.{}e{}{}", first, rest, sign, exponent)
        }
    }
}

/// Text label of a category value.
pub fn category_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_f64()
            .map(format_number)
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

/// A property value is absent when missing or JSON null.
pub fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("12.5"), Some(12.5));
        assert_eq!(parse_leading_float("  -3e2 meters"), Some(-300.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_leading_float("abc"), None);
        assert_eq!(parse_leading_float(""), None);
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value(&json!(7)), Some(7.0));
        assert_eq!(numeric_value(&json!("12abc")), Some(12.0));
        assert_eq!(numeric_value(&json!(true)), None);
        assert_eq!(numeric_value(&Value::Null), None);
    }

    #[test]
    fn test_lossless_numeric() {
        assert!(is_lossless_numeric(&json!(3.25)));
        assert!(is_lossless_numeric(&json!("42")));
        assert!(is_lossless_numeric(&json!("-1.5")));
        assert!(!is_lossless_numeric(&json!("1.50")));
        assert!(!is_lossless_numeric(&json!("42 m")));
        assert!(!is_lossless_numeric(&json!("forest")));
        assert!(!is_lossless_numeric(&json!(null)));
    }

    #[test]
    fn test_format_number_matches_javascript() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-1.5), "-1.5");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(123456.789), "123456.789");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(0.0000001), "1e-7");
        assert_eq!(format_number(1.25e-8), "1.25e-8");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_lossless_numeric_uses_javascript_rendering() {
        assert!(!is_lossless_numeric(&json!("0.0000001")), "renders as 1e-7");
        assert!(is_lossless_numeric(&json!("1e-7")));
        assert!(!is_lossless_numeric(&json!("-0")), "renders as 0");
        assert!(is_lossless_numeric(&json!("0")));
        assert!(is_lossless_numeric(&json!("0.000001")));
    }

    #[test]
    fn test_category_label() {
        assert_eq!(category_label(&json!("forest")), "forest");
        assert_eq!(category_label(&json!(3)), "3");
        assert_eq!(category_label(&json!(2.5)), "2.5");
        assert_eq!(category_label(&json!(false)), "false");
    }

    #[test]
    fn test_absent() {
        assert!(is_absent(None));
        assert!(is_absent(Some(&Value::Null)));
        assert!(!is_absent(Some(&json!(0))));
    }
}
