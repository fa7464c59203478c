//! Operator semantics over resolved field values.
//!
//! Text comparisons are case-insensitive. Multi-valued fields match a
//! positive operator when any element does; negative operators are the
//! negation of their positive form, so they hold on a missing value.

use chrono::NaiveDate;
use serde_json::Value;

use crate::models::lenient::{parse_date, truthy, value_as_f64, value_as_string, value_as_string_list};
use crate::models::Operator;

/// A field value resolved from an enriched patient.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Flag(bool),
    TextList(Vec<String>),
    DateList(Vec<NaiveDate>),
}

impl FieldValue {
    /// Empty lists and blank text count as absent.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::TextList(items) => items.is_empty(),
            Self::DateList(items) => items.is_empty(),
            Self::Number(_) | Self::Date(_) | Self::Flag(_) => false,
        }
    }
}

/// Apply `op` to `actual` against the filter's `expected` value.
pub fn compare(op: Operator, actual: Option<&FieldValue>, expected: &Value) -> bool {
    let actual = actual.filter(|v| !v.is_empty());
    match op {
        Operator::IsNull => actual.is_none(),
        Operator::IsNotNull => actual.is_some(),
        Operator::Unsupported => false,
        _ => {
            if let Some(positive) = op.positive_form() {
                return !compare(positive, actual, expected);
            }
            actual.is_some_and(|value| compare_present(op, value, expected))
        }
    }
}

fn compare_present(op: Operator, actual: &FieldValue, expected: &Value) -> bool {
    match actual {
        FieldValue::Text(text) => compare_text(op, text, expected),
        FieldValue::Number(n) => compare_number(op, *n, expected),
        FieldValue::Date(d) => compare_date(op, *d, expected),
        FieldValue::Flag(flag) => compare_flag(op, *flag, expected),
        FieldValue::TextList(items) => items.iter().any(|item| compare_text(op, item, expected)),
        FieldValue::DateList(items) => items.iter().any(|d| compare_date(op, *d, expected)),
    }
}

fn compare_text(op: Operator, actual: &str, expected: &Value) -> bool {
    let haystack = actual.to_lowercase();
    let needle = || value_as_string(expected).map(|s| s.to_lowercase());
    match op {
        Operator::Equals => needle().is_some_and(|n| haystack == n),
        Operator::Contains => needle().is_some_and(|n| haystack.contains(&n)),
        Operator::StartsWith => needle().is_some_and(|n| haystack.starts_with(&n)),
        Operator::EndsWith => needle().is_some_and(|n| haystack.ends_with(&n)),
        Operator::In => value_as_string_list(expected)
            .iter()
            .any(|candidate| candidate.to_lowercase() == haystack),
        _ => actual
            .trim()
            .parse::<f64>()
            .ok()
            .is_some_and(|n| compare_ordered(op, n, expected, value_as_f64)),
    }
}

fn compare_number(op: Operator, actual: f64, expected: &Value) -> bool {
    match op {
        Operator::Equals => value_as_f64(expected).is_some_and(|e| actual == e),
        Operator::In => match expected {
            Value::Array(items) => items.iter().filter_map(value_as_f64).any(|e| actual == e),
            other => value_as_f64(other).is_some_and(|e| actual == e),
        },
        Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
            compare_text(op, &render_number(actual), expected)
        }
        _ => compare_ordered(op, actual, expected, value_as_f64),
    }
}

fn compare_date(op: Operator, actual: NaiveDate, expected: &Value) -> bool {
    let as_date = |v: &Value| v.as_str().and_then(parse_date);
    match op {
        Operator::Equals => as_date(expected).is_some_and(|e| actual == e),
        Operator::In => match expected {
            Value::Array(items) => items.iter().filter_map(as_date).any(|e| actual == e),
            other => as_date(other).is_some_and(|e| actual == e),
        },
        Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
            compare_text(op, &actual.format("%Y-%m-%d").to_string(), expected)
        }
        _ => compare_ordered(op, actual, expected, as_date),
    }
}

/// Booleans only support equality; the filter value is `true` or `"true"`.
fn compare_flag(op: Operator, actual: bool, expected: &Value) -> bool {
    let wanted = match expected {
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        other => truthy(other),
    };
    match op {
        Operator::Equals => actual == wanted,
        _ => false,
    }
}

/// Ordering operators plus `between`, which needs a two-element array.
fn compare_ordered<T, F>(op: Operator, actual: T, expected: &Value, convert: F) -> bool
where
    T: PartialOrd,
    F: Fn(&Value) -> Option<T>,
{
    match op {
        Operator::GreaterThan => convert(expected).is_some_and(|e| actual > e),
        Operator::LessThan => convert(expected).is_some_and(|e| actual < e),
        Operator::GreaterThanOrEqual => convert(expected).is_some_and(|e| actual >= e),
        Operator::LessThanOrEqual => convert(expected).is_some_and(|e| actual <= e),
        Operator::Between => match expected {
            Value::Array(bounds) if bounds.len() == 2 => {
                match (convert(&bounds[0]), convert(&bounds[1])) {
                    (Some(low), Some(high)) => actual >= low && actual <= high,
                    _ => false,
                }
            }
            _ => false,
        },
        Operator::Equals => convert(expected).is_some_and(|e| actual == e),
        _ => false,
    }
}

fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
