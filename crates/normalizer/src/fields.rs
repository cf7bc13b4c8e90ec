//! Lenient field readers shared by the payload projections.
//!
//! Upstream engines are inconsistent about key names and number encodings, so every reader
//! takes a list of aliases and returns `None` rather than failing.

use chrono::{DateTime, NaiveDate};
use core_types::Timestamp;
use serde_json::{Map, Value};

/// The first alias present with a non-null value. Aliases may be JSON pointers (`/a/b`).
pub fn first<'a>(obj: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| {
        let value = if alias.starts_with('/') { obj.pointer(alias) } else { obj.get(*alias) };
        value.filter(|v| !v.is_null())
    })
}

/// A finite number, accepting numeric strings.
pub fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

pub fn number_at(obj: &Value, aliases: &[&str]) -> Option<f64> {
    first(obj, aliases).and_then(number)
}

/// A counter: absent or invalid values are zero, fractional values are truncated.
pub fn counter_at(obj: &Value, aliases: &[&str]) -> u64 {
    number_at(obj, aliases).map(|n| n.max(0.0) as u64).unwrap_or(0)
}

/// Text, accepting numbers and booleans by their JSON rendering.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn text_at(obj: &Value, aliases: &[&str]) -> Option<String> {
    first(obj, aliases).and_then(text)
}

/// Epoch seconds from a number, a numeric string or an RFC 3339 string.
pub fn timestamp(value: &Value) -> Option<Timestamp> {
    if let Some(n) = number(value) {
        return Some(n);
    }
    let raw = value.as_str()?;
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1e6)
}

pub fn timestamp_at(obj: &Value, aliases: &[&str]) -> Option<Timestamp> {
    first(obj, aliases).and_then(timestamp)
}

/// A calendar date from `YYYY-MM-DD` or the date part of an RFC 3339 timestamp.
pub fn date_at(obj: &Value, aliases: &[&str]) -> Option<NaiveDate> {
    let raw = first(obj, aliases)?.as_str()?.trim();
    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d").ok()
}

/// A generation time rendered as text; epoch numbers become RFC 3339.
pub fn generated_at(obj: &Value, aliases: &[&str]) -> Option<String> {
    match first(obj, aliases)? {
        Value::String(s) => Some(s.clone()),
        other => {
            let secs = number(other)?;
            DateTime::from_timestamp(secs.trunc() as i64, 0).map(|dt| dt.to_rfc3339())
        }
    }
}

pub fn object_at<'a>(obj: &'a Value, aliases: &[&str]) -> Option<&'a Map<String, Value>> {
    first(obj, aliases).and_then(Value::as_object)
}

/// The array under the first present alias; anything else reads as empty.
pub fn array_at<'a>(obj: &'a Value, aliases: &[&str]) -> &'a [Value] {
    first(obj, aliases).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}
