//! Lenient conversions for semi-structured clinical JSON.
//!
//! Every helper maps a shape it does not understand to "no value" instead of
//! an error, so one malformed field never hides the rest of a document.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Number or numeric string.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Scalar rendered as text. Empty strings count as missing.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// JavaScript truthiness of a JSON value.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// ISO date, optionally followed by a time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Text for one list entry: scalars directly, objects through a name-like key.
fn entry_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => ["name", "procedure", "description", "value"]
            .iter()
            .find_map(|key| map.get(*key).and_then(value_as_string)),
        other => value_as_string(other),
    }
}

/// Array of entries, or a single scalar treated as a one-element list.
pub fn value_as_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(entry_text).collect(),
        other => entry_text(other).into_iter().collect(),
    }
}

/// Parse an array leniently, skipping items that fail to deserialize.
pub fn parse_array_lenient<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
        _ => vec![],
    }
}

/// Parse one object-shaped section; anything else is `None`.
pub fn parse_section<T: DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    match value {
        Some(v @ Value::Object(_)) => serde_json::from_value(v.clone()).ok(),
        _ => None,
    }
}

// ── serde `deserialize_with` adapters ───────────────────────────────────────

pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().and_then(value_as_f64))
}

pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().and_then(value_as_string))
}

pub fn opt_truthy<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.filter(|v| !v.is_null()).map(|v| truthy(&v)))
}

pub fn opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_date))
}

pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().map(value_as_string_list).unwrap_or_default())
}

pub fn lenient_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(d)?;
    Ok(parse_array_lenient(raw.as_ref()))
}

pub fn section<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(d)?;
    Ok(parse_section(raw.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_are_numbers() {
        assert_eq!(value_as_f64(&json!("7")), Some(7.0));
        assert_eq!(value_as_f64(&json!(" 4.5 ")), Some(4.5));
        assert_eq!(value_as_f64(&json!(3)), Some(3.0));
        assert_eq!(value_as_f64(&json!("severe")), None);
        assert_eq!(value_as_f64(&json!(null)), None);
        assert_eq!(value_as_f64(&json!([1, 2])), None);
    }

    #[test]
    fn truthiness_follows_javascript() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!(false)));
        assert!(truthy(&json!("false")));
        assert!(truthy(&json!([])));
        assert!(truthy(&json!({})));
        assert!(truthy(&json!(2)));
    }

    #[test]
    fn blank_strings_are_missing() {
        assert_eq!(value_as_string(&json!("   ")), None);
        assert_eq!(value_as_string(&json!(12)), Some("12".into()));
    }

    #[test]
    fn dates_accept_timestamp_suffix() {
        assert_eq!(
            parse_date("2024-03-05T10:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(parse_date("05/03/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn string_list_accepts_scalars_and_named_objects() {
        let list = value_as_string_list(&json!([
            "Scaling",
            {"procedure": "Root canal"},
            {"unrelated": true},
            36
        ]));
        assert_eq!(list, vec!["Scaling", "Root canal", "36"]);
        assert_eq!(value_as_string_list(&json!("Extraction")), vec!["Extraction"]);
        assert!(value_as_string_list(&json!(null)).is_empty());
    }

    #[test]
    fn section_rejects_non_objects() {
        let parsed: Option<serde_json::Map<String, Value>> = parse_section(Some(&json!("text")));
        assert!(parsed.is_none());
    }
}
