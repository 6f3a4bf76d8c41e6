//! Legacy string-condition matcher
//!
//! Terminal fallback for condition strings the expression language cannot
//! handle. Predates the parser; workflows written against the old
//! matching rules still pass through here, so the historical behavior is
//! preserved exactly: a decision key match, then a single regex-extracted
//! comparison against condition state, then plain key truthiness. Every
//! path returns a boolean.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::state::{AgentResponse, StateMap};
use crate::value::json_truthy;

static COMPARISON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\s*([><=!]+)\s*(.+)").unwrap());

const OPERATOR_TEXTS: [&str; 7] = [">=", "<=", "!=", "==", ">", "<", "="];

/// Evaluate a legacy condition string.
pub fn evaluate(expr: &str, response: &AgentResponse, condition_state: &StateMap) -> bool {
    // A decision key wins outright
    if let Some(value) = response.decisions.get(expr) {
        return json_truthy(value);
    }

    if OPERATOR_TEXTS.iter().any(|op| expr.contains(op)) {
        return evaluate_comparison(expr, condition_state);
    }

    // Plain name: truthiness of the condition-state entry
    condition_state.get(expr).map(json_truthy).unwrap_or(false)
}

fn evaluate_comparison(expr: &str, condition_state: &StateMap) -> bool {
    // Historical spelling: a lone `=` means equality
    let rewritten;
    let expr = if expr.contains('=')
        && !([">=", "<=", "!=", "=="].iter().any(|op| expr.contains(op)))
    {
        rewritten = expr.replace('=', "==");
        rewritten.as_str()
    } else {
        expr
    };

    let caps = match COMPARISON.captures(expr) {
        Some(caps) => caps,
        None => return false,
    };
    let var_name = &caps[1];
    let op = &caps[2];
    let value_str = &caps[3];

    // Variables resolve against condition state only; decisions never
    // reach this branch
    let left = match condition_state.get(var_name) {
        Some(value) if !value.is_null() => value,
        _ => return false,
    };

    match value_str.trim().parse::<f64>() {
        Ok(number) => compare_numeric(left, op, number),
        Err(_) => {
            let text = value_str.trim_matches(|c| c == '\'' || c == '"');
            compare_text(left, op, text)
        }
    }
}

fn compare_numeric(left: &Value, op: &str, right: f64) -> bool {
    let left_num = match left {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match left_num {
        Some(l) => match op {
            ">" => l > right,
            "<" => l < right,
            ">=" => l >= right,
            "<=" => l <= right,
            "==" => (l - right).abs() < f64::EPSILON,
            "!=" => (l - right).abs() >= f64::EPSILON,
            _ => false,
        },
        // Mismatched types: unequal, unordered
        None => op == "!=",
    }
}

fn compare_text(left: &Value, op: &str, right: &str) -> bool {
    match left {
        Value::String(l) => match op {
            ">" => l.as_str() > right,
            "<" => l.as_str() < right,
            ">=" => l.as_str() >= right,
            "<=" => l.as_str() <= right,
            "==" => l == right,
            "!=" => l != right,
            _ => false,
        },
        _ => op == "!=",
    }
}
