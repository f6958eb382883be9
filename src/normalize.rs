//! Settings value normalization.
//!
//! Templated configuration arrives with every scalar rendered as a string.
//! Before diffing against the broker's typed attributes, string values that
//! look numeric are coerced back: all-digit strings become integers, and
//! strings of the form `digits.digit` become floats. The fractional pattern
//! deliberately matches a single digit only; callers rely on strings like
//! `"3.14"` passing through untouched, so the narrow match must not be
//! widened into general numeric parsing.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]$").unwrap());

/// Normalize a settings object in place, recursing into nested objects.
///
/// Idempotent: a second pass finds no remaining matching strings.
pub fn normalize(settings: &mut Map<String, Value>) {
    for value in settings.values_mut() {
        match value {
            Value::String(s) => {
                if INT_RE.is_match(s) {
                    if let Ok(n) = s.parse::<i64>() {
                        *value = Value::Number(n.into());
                    }
                } else if FLOAT_RE.is_match(s) {
                    if let Ok(f) = s.parse::<f64>() {
                        if let Some(n) = serde_json::Number::from_f64(f) {
                            *value = Value::Number(n);
                        }
                    }
                }
            }
            Value::Object(nested) => normalize(nested),
            _ => {}
        }
    }
}
