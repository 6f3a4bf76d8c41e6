// SPDX-License-Identifier: MIT

//! Runtime values for condition evaluation
//!
//! Raw agent output arrives as JSON; expressions work over `Scalar`, a
//! small tagged value. Coercion from JSON happens exactly once, when the
//! variable environment is built, never during evaluation.

use serde_json::Value;

/// A coerced runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Produced only by the `None` literal during evaluation; coercion
    /// never emits it
    Null,
}

impl Scalar {
    /// Coerce a raw JSON value into a `Scalar`.
    ///
    /// Booleans and numbers pass through. Strings spelling a boolean
    /// (`true`/`1`/`yes`, `false`/`0`/`no`, case-insensitive) become
    /// booleans; other strings stay text. Anything else collapses to the
    /// boolean of its truthiness.
    pub fn coerce(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => Scalar::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" | "1" | "yes" => Scalar::Bool(true),
                "false" | "0" | "no" => Scalar::Bool(false),
                _ => Scalar::Text(s.clone()),
            },
            other => Scalar::Bool(json_truthy(other)),
        }
    }

    /// Truthiness of the value
    pub fn truthy(&self) -> bool {
        match self {
            Scalar::Bool(b) => *b,
            Scalar::Number(n) => *n != 0.0,
            Scalar::Text(s) => !s.is_empty(),
            Scalar::Null => false,
        }
    }

    /// Numeric view; booleans promote to 0/1, text never does
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Bool(true) => Some(1.0),
            Scalar::Bool(false) => Some(0.0),
            Scalar::Text(_) | Scalar::Null => None,
        }
    }

    /// Type name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "boolean",
            Scalar::Number(_) => "number",
            Scalar::Text(_) => "string",
            Scalar::Null => "null",
        }
    }
}

/// Truthiness of a raw JSON value: null, false, zero, empty string,
/// empty array, and empty object are falsy.
pub fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
