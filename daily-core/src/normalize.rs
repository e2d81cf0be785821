//! Helpers that turn a provider's loosely shaped JSON into a [`WeatherReading`].
//!
//! Providers disagree on where the weather node lives and on what each field
//! is called, so every field is looked up through an ordered alias list.
//! Aliases are dotted paths relative to the node; numeric segments index
//! arrays (`weather.0.description`).

use serde_json::Value;

use crate::model::{DEFAULT_DESCRIPTION, DEFAULT_TEMPERATURE, WeatherReading};

/// Characters accepted between the two halves of a range like `"20~28"`.
pub const RANGE_SEPARATORS: &[char] = &['/', '~', '到', '-', '–', '—'];

/// Where to find each field in one provider's payload.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Candidate paths to the weather node, from the payload root.
    pub nodes: &'static [&'static str],
    pub description: &'static [&'static str],
    pub current: &'static [&'static str],
    pub min: &'static [&'static str],
    pub max: &'static [&'static str],
    /// Fields that may hold a combined `"min/max"` string.
    pub range: &'static [&'static str],
}

impl Schema {
    /// Aliases seen across list-style providers.
    pub const COMMON: Schema = Schema {
        nodes: &["data.list.0", "list.0", "weather.0"],
        description: &["weather", "description", "text"],
        current: &["temp", "temperature", "now", "tem"],
        min: &["low", "min_temp", "temp_min", "tem2", "night_temp"],
        max: &["high", "max_temp", "temp_max", "tem1", "day_temp"],
        range: &["temp_range", "temperature_range", "range", "temp", "temperature", "tem"],
    };
}

/// Resolve a dotted path. An empty path is the root itself.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }

    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// First alias that resolves to a non-empty value.
pub fn first_populated<'a>(node: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| lookup(node, alias))
        .find(|value| is_populated(value))
}

/// First candidate path that resolves to a JSON object.
pub fn locate_node<'a>(root: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| lookup(root, path))
        .find(|node| node.is_object())
}

fn floor_to_i64(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let floored = value.floor();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if floored < i64::MIN as f64 || floored >= i64::MAX as f64 {
        return None;
    }
    Some(floored as i64)
}

/// Scan for the first `[+-]?digits(.digits)?` and return it with the rest of
/// the text after it.
fn take_number(text: &str) -> Option<(f64, &str)> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;
    let begin = match start.checked_sub(1).map(|i| bytes[i]) {
        Some(b'-' | b'+') => start - 1,
        _ => start,
    };

    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    let number = text[begin..end].parse().ok()?;
    Some((number, &text[end..]))
}

/// Tolerant temperature parser.
///
/// Numbers are floored; strings yield the floor of the first signed decimal
/// they contain. Anything else is `None`.
pub fn parse_temp(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(floor_to_i64)),
        Value::String(s) => take_number(s).and_then(|(n, _)| floor_to_i64(n)),
        _ => None,
    }
}

/// Split a combined range such as `"20/28"`, `"28~20"` or `"20℃到28℃"`.
///
/// Returns `(min, max)` regardless of which bound came first.
pub fn split_range(text: &str) -> Option<(i64, i64)> {
    let (first, rest) = take_number(text)?;
    let sep_at = rest.find(RANGE_SEPARATORS)?;
    if rest[..sep_at].bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let sep_len = rest[sep_at..].chars().next()?.len_utf8();
    let (second, _) = take_number(&rest[sep_at + sep_len..])?;

    let (a, b) = (floor_to_i64(first)?, floor_to_i64(second)?);
    Some((a.min(b), a.max(b)))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalize one payload. `None` only when no weather node exists; every
/// field inside a located node has a default.
pub fn extract_reading(root: &Value, schema: &Schema) -> Option<WeatherReading> {
    let node = locate_node(root, schema.nodes)?;

    let description = first_populated(node, schema.description)
        .and_then(text_of)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let current_temp = first_populated(node, schema.current)
        .and_then(parse_temp)
        .unwrap_or(DEFAULT_TEMPERATURE);

    let min = first_populated(node, schema.min).and_then(parse_temp);
    let max = first_populated(node, schema.max).and_then(parse_temp);

    let (min_temp, max_temp) = match (min, max) {
        (None, None) => schema
            .range
            .iter()
            .filter_map(|alias| lookup(node, alias))
            .filter_map(Value::as_str)
            .find_map(split_range)
            .unwrap_or((current_temp, current_temp)),
        (min, max) => (min.unwrap_or(current_temp), max.unwrap_or(current_temp)),
    };

    Some(WeatherReading {
        description,
        current_temp,
        min_temp,
        max_temp,
    })
}
