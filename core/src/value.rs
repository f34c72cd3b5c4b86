//! Dynamic values. Event payloads are untyped strings on the wire; this is
//! the tagged in-memory form with the coercion rules shared by the evaluator,
//! the validator and the recalc engine.

use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Signed decimal shape: `-?digits(.digits)?`. Deliberately excludes
/// exponents, infinities and NaN spellings that `f64::from_str` would accept.
pub fn is_numeric_token(s: &str) -> bool {
    let t = s.trim();
    let t = t.strip_prefix('-').unwrap_or(t);
    if t.is_empty() {
        return false;
    }
    match t.split_once('.') {
        None => t.bytes().all(|b| b.is_ascii_digit()),
        Some((int, frac)) => {
            !int.is_empty() && !frac.is_empty() && int.bytes().all(|b| b.is_ascii_digit()) && frac.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

/// The truthy/falsy token set accepted where a Boolean is expected.
pub fn is_boolean_token(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "0" | "true" | "false" | "yes" | "no")
}

impl Value {
    /// Coerce a raw payload string: integers, then decimals, otherwise the
    /// trimmed string. Empty / `nil` / `null` mean the value is absent.
    pub fn parse(raw: &str) -> Value {
        let t = raw.trim();
        if t.is_empty() || t.eq_ignore_ascii_case("nil") || t.eq_ignore_ascii_case("null") {
            return Value::Null;
        }
        if let Ok(i) = t.parse::<i64>() {
            return Value::Int(i);
        }
        if is_numeric_token(t) {
            if let Ok(f) = t.parse::<f64>() {
                return Value::Float(f);
            }
        }
        Value::String(t.to_string())
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => {
                let t = s.trim().to_ascii_lowercase();
                !(t.is_empty() || t == "0" || t == "false" || t == "no" || t == "nil" || t == "null")
            }
        }
    }

    /// Numeric view, including numeric strings. `None` means "not a number",
    /// which is exactly what `isNaN` reports.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) if is_numeric_token(s) => s.trim().parse().ok(),
            Value::String(_) => None,
        }
    }

    /// Canonical serialization form: what gets written into an event payload
    /// and what "did this field change?" compares.
    pub fn canonical(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.trim().to_string(),
        }
    }

    /// Value equality with numeric-string coercion: `"30" == 30` holds,
    /// `null` equals only `null`.
    pub fn eq_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => self.canonical() == other.canonical(),
            },
        }
    }

    /// Ordering with the same coercion: numeric when both sides are numeric,
    /// lexicographic when neither is, `None` for mixed or null operands.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            (None, None) => Some(self.canonical().cmp(&other.canonical())),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.canonical()) }
}
