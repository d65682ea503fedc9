//! Type inference for raw declaration values.
//!
//! [`infer`] tries each kind in a fixed order and keeps the first that parses:
//! signed integer, unsigned integer, float, bool, duration, URL, then string.
//! Integers come before floats so whole numbers keep their integer kind, and
//! URLs are only attempted when the text contains `://` so values such as
//! `12:30` stay strings.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::InferError;
use crate::types::{Kind, Value};

static DURATION_SPANS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\s*(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:ns|us|µs|ms|h|m|s))+\s*$")
        .expect("duration pattern is valid")
});

static DURATION_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]*)(?:\.([0-9]*))?(ns|us|µs|ms|h|m|s)").expect("span pattern is valid")
});

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Infer the typed value of a raw declaration string.
pub fn infer(raw: &str) -> Result<Value, InferError> {
    if raw.is_empty() {
        return Ok(Value::String(String::new()));
    }
    if let Some(n) = parse_int(raw) {
        return Ok(Value::Int(n));
    }
    if let Some(n) = parse_uint(raw) {
        return Ok(Value::Uint(n));
    }
    if let Some(f) = parse_float(raw) {
        return Ok(Value::Float(f));
    }
    if let Some(b) = parse_bool(raw) {
        return Ok(Value::Bool(b));
    }
    if let Some(d) = parse_duration(raw) {
        return Ok(Value::Duration(d));
    }
    if raw.contains("://") {
        return parse_url(raw).map(|url| Value::Url(Some(url)));
    }
    Ok(Value::String(raw.to_string()))
}

/// Parse `text` with the rule of a single kind, without the inference cascade.
pub fn parse_as(kind: Kind, text: &str) -> Result<Value, InferError> {
    let invalid = |reason: &str| InferError::new(kind, text, reason);
    match kind {
        Kind::Int => parse_int(text).map(Value::Int).ok_or_else(|| invalid("not a signed 64-bit integer")),
        Kind::Uint => parse_uint(text).map(Value::Uint).ok_or_else(|| invalid("not an unsigned 64-bit integer")),
        Kind::Float => parse_float(text).map(Value::Float).ok_or_else(|| invalid("not a 64-bit float")),
        Kind::Bool => parse_bool(text).map(Value::Bool).ok_or_else(|| invalid("not a boolean")),
        Kind::Duration => parse_duration(text)
            .map(Value::Duration)
            .ok_or_else(|| invalid("expected spans such as 1h30m or 250ms")),
        Kind::Url if text.is_empty() => Ok(Value::Url(None)),
        Kind::Url if !text.contains("://") => Err(invalid("missing scheme separator `://`")),
        Kind::Url => parse_url(text).map(|url| Value::Url(Some(url))),
        Kind::String => Ok(Value::String(text.to_string())),
        Kind::StringList => Ok(Value::StringList(text.split(',').map(str::to_string).collect())),
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    }
}

fn split_radix(text: &str) -> (u32, &str) {
    let lower = text.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &text[2..]),
        Some("0o") => (8, &text[2..]),
        Some("0b") => (2, &text[2..]),
        _ => (10, text),
    }
}

fn parse_magnitude(text: &str) -> Option<u64> {
    let (radix, digits) = split_radix(text);
    if !digits.chars().next()?.is_ascii_alphanumeric() {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

pub(crate) fn parse_int(text: &str) -> Option<i64> {
    let (negative, rest) = split_sign(text);
    let magnitude = parse_magnitude(rest)?;
    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return None;
        }
        Some((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).ok()
    }
}

pub(crate) fn parse_uint(text: &str) -> Option<u64> {
    match split_sign(text) {
        (false, rest) => parse_magnitude(rest),
        (true, _) => None,
    }
}

pub(crate) fn parse_float(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parse unit spans such as `2h45m`, `1m30s`, `250ms` or `1.5h`.
///
/// Fractional spans are resolved to whole nanoseconds before the text reaches
/// `humantime`, which only understands integer magnitudes.
pub fn parse_duration(text: &str) -> Option<Duration> {
    if !DURATION_SPANS.is_match(text) {
        return None;
    }
    let mut spans = Vec::new();
    for caps in DURATION_SPAN.captures_iter(text) {
        let unit = caps[3].replace('µ', "u");
        match caps.get(2) {
            None => spans.push(format!("{}{unit}", &caps[1])),
            Some(fraction) => {
                let nanos = span_nanos(&caps[1], fraction.as_str(), unit_nanos(&unit)?)?;
                spans.push(format!("{}s {}ns", nanos / NANOS_PER_SEC, nanos % NANOS_PER_SEC));
            }
        }
    }
    humantime::parse_duration(&spans.join(" ")).ok()
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

// Digits below one nanosecond are dropped.
fn span_nanos(whole: &str, fraction: &str, unit: u128) -> Option<u128> {
    let mut total = if whole.is_empty() { 0 } else { whole.parse::<u128>().ok()?.checked_mul(unit)? };
    let mut scale = unit;
    for digit in fraction.bytes() {
        scale /= 10;
        total = total.checked_add(u128::from(digit - b'0') * scale)?;
    }
    Some(total)
}

/// Format a duration as unit spans that [`parse_duration`] accepts.
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }
    let secs = duration.as_secs();
    let nanos = u64::from(duration.subsec_nanos());
    let spans = [
        (secs / 3600, "h"),
        (secs / 60 % 60, "m"),
        (secs % 60, "s"),
        (nanos / 1_000_000, "ms"),
        (nanos / 1_000 % 1_000, "us"),
        (nanos % 1_000, "ns"),
    ];
    spans
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| format!("{amount}{unit}"))
        .collect()
}

fn parse_url(text: &str) -> Result<Url, InferError> {
    Url::parse(text).map_err(|err| InferError::new(Kind::Url, text, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_an_integer() {
        assert_eq!(infer("0").unwrap(), Value::Int(0));
        assert_eq!(infer("1").unwrap(), Value::Int(1));
    }

    #[test]
    fn precedence_picks_the_first_kind_that_parses() {
        assert_eq!(infer("-42").unwrap(), Value::Int(-42));
        assert_eq!(infer("0x1F").unwrap(), Value::Int(31));
        assert_eq!(infer("18446744073709551615").unwrap(), Value::Uint(u64::MAX));
        assert_eq!(infer("3.14").unwrap(), Value::Float("3.14".parse().unwrap()));
        assert_eq!(infer("true").unwrap(), Value::Bool(true));
        assert_eq!(infer("F").unwrap(), Value::Bool(false));
        assert_eq!(infer("2h45m").unwrap(), Value::Duration(Duration::from_secs(9900)));
        assert_eq!(infer("hello").unwrap(), Value::String("hello".into()));
    }

    #[test]
    fn empty_value_is_an_empty_string() {
        assert_eq!(infer("").unwrap(), Value::String(String::new()));
    }

    #[test]
    fn colon_without_scheme_separator_stays_a_string() {
        assert_eq!(infer("12:30").unwrap(), Value::String("12:30".into()));
        assert_eq!(infer("localhost:5432").unwrap(), Value::String("localhost:5432".into()));
    }

    #[test]
    fn url_with_scheme_separator_is_parsed() {
        let value = infer("http://host/path?q=1").unwrap();
        let url = value.as_url().unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("host"));
        assert_eq!(url.path(), "/path");
        assert_eq!(url.query(), Some("q=1"));
    }

    #[test]
    fn malformed_url_is_a_hard_error() {
        let err = infer("http://[::1").unwrap_err();
        assert_eq!(err.expected, Kind::Url);
        assert_eq!(err.value, "http://[::1");
    }

    #[test]
    fn duration_units_are_restricted() {
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("3µs"), Some(Duration::from_micros(3)));
        assert_eq!(parse_duration("1h 30m"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration("2days"), None);
        assert_eq!(parse_duration("-1s"), None);
        assert_eq!(parse_duration("."), None);
        assert_eq!(parse_duration("h"), None);
    }

    #[test]
    fn fractional_spans_are_durations() {
        assert_eq!(infer("1.5h").unwrap(), Value::Duration(Duration::from_secs(5400)));
        assert_eq!(infer(".5s").unwrap(), Value::Duration(Duration::from_millis(500)));
        assert_eq!(infer("1h1.5s").unwrap(), Value::Duration(Duration::from_millis(3_601_500)));
        assert_eq!(infer("0.25ms").unwrap(), Value::Duration(Duration::from_micros(250)));
        assert_eq!(
            parse_as(Kind::Duration, "1.5h").unwrap(),
            Value::Duration(Duration::from_secs(5400))
        );
        assert_eq!(
            parse_as(Kind::Duration, ".5s").unwrap(),
            Value::Duration(Duration::from_millis(500))
        );
        assert_eq!(parse_duration("1.5µs"), Some(Duration::from_nanos(1500)));
        assert_eq!(parse_duration("2.m"), Some(Duration::from_secs(120)));
    }

    #[test]
    fn format_duration_uses_compact_spans() {
        assert_eq!(format_duration(Duration::from_secs(9900)), "2h45m");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1s500ms");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }

    #[test]
    fn parse_as_skips_the_cascade() {
        assert_eq!(parse_as(Kind::String, "0").unwrap(), Value::String("0".into()));
        assert_eq!(parse_as(Kind::Float, "5").unwrap(), Value::Float(5.0));
        assert_eq!(parse_as(Kind::Url, "").unwrap(), Value::Url(None));
        assert!(parse_as(Kind::Url, "example.com").is_err());
        assert!(parse_as(Kind::Uint, "-1").is_err());
        assert_eq!(
            parse_as(Kind::StringList, "a,b").unwrap(),
            Value::StringList(vec!["a".into(), "b".into()])
        );
    }
}
