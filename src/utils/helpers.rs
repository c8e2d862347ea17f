// src/utils/helpers.rs

use serde_json::Value;

/// Safely parses a JSON value to a floating-point number.
/// If parsing fails or the value has no numeric reading, returns the default.
pub fn safe_parse_float(value: &Value, default_value: f64) -> f64 {
    match value {
        Value::Null => default_value,
        Value::Number(n) => n.as_f64().unwrap_or(default_value),
        Value::String(s) => {
            if s.trim().is_empty() {
                default_value
            } else {
                s.trim().parse::<f64>().unwrap_or(default_value)
            }
        }
        _ => default_value,
    }
}

/// Safely parses a string to a floating-point number.
pub fn safe_parse_float_str(value: &str, default_value: f64) -> f64 {
    if value.trim().is_empty() {
        return default_value;
    }

    value.trim().parse::<f64>().unwrap_or(default_value)
}

// D1 rows come back as HashMap<String, Value>; columns may surface as
// numbers, strings, or null depending on how the row was written.

pub fn value_to_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

pub fn value_to_opt_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub fn value_to_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| {
            // D1 hands big integers back as floats
            n.as_f64().map(|f| f as i64).unwrap_or(0)
        }),
        Some(Value::String(s)) => s.parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

pub fn value_to_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(v) => safe_parse_float(v, 0.0),
        None => 0.0,
    }
}

/// SQLite stores booleans as 0/1 integers.
pub fn value_to_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
