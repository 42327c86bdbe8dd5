//! Lenient parsing of free-form completion text.
//!
//! Completion services are asked for JSON but often wrap it in prose or
//! markdown fences, quote numbers, or answer in plain text. These helpers
//! recover what they can and never fail.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static NUMBER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?").ok());

/// Parses the substring from the first `{` to the last `}` as a JSON object.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Coerces a JSON number or numeric string (`"1,200"`, `"₹ 4500"`) to `f64`.
#[must_use]
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => first_number(s),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Returns a non-empty trimmed string value.
#[must_use]
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a list of strings; a single comma-separated string is split.
#[must_use]
pub fn as_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Every number in `text`, in order of appearance. Thousands separators are ignored.
///
/// A leading `-` is a sign unless a number precedes it, as in `5,000-8,000`.
#[must_use]
pub fn numbers_in(text: &str) -> Vec<f64> {
    NUMBER.as_ref().map_or_else(Vec::new, |re| {
        re.find_iter(text)
            .filter_map(|m| {
                let joins_range = text[..m.start()]
                    .trim_end()
                    .ends_with(|c: char| c.is_ascii_digit());
                let digits = if joins_range {
                    m.as_str().trim_start_matches('-')
                } else {
                    m.as_str()
                };
                digits.replace(',', "").parse().ok()
            })
            .collect()
    })
}

fn first_number(text: &str) -> Option<f64> {
    numbers_in(text).into_iter().next()
}

/// Finds the first line mentioning `label` and returns the text after its first colon,
/// stripped of quotes and trailing commas.
#[must_use]
pub fn labeled_value(text: &str, label: &str) -> Option<String> {
    let label = label.to_lowercase();
    text.lines()
        .filter(|line| line.to_lowercase().contains(&label))
        .find_map(|line| {
            let (_, rest) = line.split_once(':')?;
            let value = rest
                .trim()
                .trim_end_matches(',')
                .trim()
                .trim_matches(|c: char| c == '"' || c == '\'')
                .trim();
            (!value.is_empty()).then(|| value.to_string())
        })
}
