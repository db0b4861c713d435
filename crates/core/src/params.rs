//! Pure helpers for extracting typed tunables from a `serde_json::Value`.
//!
//! Each helper takes a JSON object, a key, and a default. A missing key or a
//! value of the wrong type falls back to the default; configuration never
//! fails, it degrades.

use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or
/// wrong type. JSON integers are accepted and widened.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `u64` from `params[name]`, returning `default` if missing,
/// negative, fractional, or wrong type.
pub fn param_u64(params: &Value, name: &str, default: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or
/// wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}
