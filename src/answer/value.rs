use ahash::AHashMap;
use itertools::Itertools;
use serde_json::Value;

/// The accumulated answers of a session, keyed by `save_to` field name.
pub type Answers = AHashMap<String, Value>;

/// String answers that count as an affirmative reply to a yes/no node.
const AFFIRMATIVE: [&str; 3] = ["sí", "si", "yes"];

/// Returns `true` when an answer reads as "yes".
///
/// Booleans are taken at face value; strings are matched case-insensitively
/// against the affirmative set. Everything else is a "no".
pub fn is_affirmative(answer: &Value) -> bool {
    match answer {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            AFFIRMATIVE.contains(&s.as_str())
        }
        _ => false,
    }
}

/// Compares two answers, treating numbers by value so that `2` equals `2.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Returns `true` when `answer` is an array holding `needle`.
pub fn array_contains(answer: &Value, needle: &Value) -> bool {
    answer
        .as_array()
        .is_some_and(|items| items.iter().any(|item| values_equal(item, needle)))
}

/// Returns `true` when `answer` equals `needle` or, for arrays, contains it.
pub fn matches_value(answer: &Value, needle: &Value) -> bool {
    values_equal(answer, needle) || array_contains(answer, needle)
}

/// Reads a numeric answer.
///
/// Numbers are returned directly. Strings are trimmed and parsed, accepting a
/// decimal comma (`"1,60"`) as typed on Spanish keyboards.
pub fn as_number(answer: &Value) -> Option<f64> {
    match answer {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Interprets an answer as a non-negative count.
///
/// Non-numeric and negative values count as zero; fractions are truncated.
pub fn as_count(answer: Option<&Value>) -> usize {
    match answer.and_then(as_number) {
        Some(n) if n > 0.0 => n.trunc() as usize,
        _ => 0,
    }
}

/// Returns `true` for answers that carry no information yet.
pub fn is_unanswered(answer: Option<&Value>) -> bool {
    match answer {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Builds a JSON number from a float, falling back to `null` for NaN/inf.
pub fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Format an answer for human-readable output.
pub fn format_value(answer: &Value) -> String {
    match answer {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        Value::Array(items) => items.iter().map(format_value).join(", "),
        Value::Object(_) => answer.to_string(),
    }
}
