//! Tree-walking evaluator for condition expressions

use std::cmp::Ordering;

use super::ast::{CompareOp, Expr};
use crate::env::Environment;
use crate::error::ExprError;
use crate::value::Scalar;

/// Evaluate a parsed expression against a variable environment.
///
/// Undefined identifiers raise `ExprError::UndefinedVariable` rather than
/// defaulting to false, so the caller can fall back instead of silently
/// misreading a typo. `AND`/`OR` evaluate both operands and yield the
/// deciding operand's value, not a forced boolean.
pub fn evaluate(expr: &Expr, env: &Environment) -> Result<Scalar, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Ident(name) => lookup(name, env),
        Expr::Not(inner) => Ok(Scalar::Bool(!evaluate(inner, env)?.truthy())),
        Expr::And(left, right) => {
            let left = evaluate(left, env)?;
            let right = evaluate(right, env)?;
            Ok(if left.truthy() { right } else { left })
        }
        Expr::Or(left, right) => {
            let left = evaluate(left, env)?;
            let right = evaluate(right, env)?;
            Ok(if left.truthy() { left } else { right })
        }
        Expr::Compare { first, rest } => evaluate_chain(first, rest, env),
    }
}

fn lookup(name: &str, env: &Environment) -> Result<Scalar, ExprError> {
    if let Some(value) = env.get(name) {
        return Ok(value.clone());
    }
    // Unbound names spelling the Python-style literals keep their
    // historical meaning; everything else is an error.
    match name {
        "True" => Ok(Scalar::Bool(true)),
        "False" => Ok(Scalar::Bool(false)),
        "None" => Ok(Scalar::Null),
        _ => Err(ExprError::undefined(name)),
    }
}

/// A chain stops at the first failing pair; each intermediate value is
/// the left operand of the next pair.
fn evaluate_chain(
    first: &Expr,
    rest: &[(CompareOp, Expr)],
    env: &Environment,
) -> Result<Scalar, ExprError> {
    let mut left = evaluate(first, env)?;

    for (op, right_expr) in rest {
        let right = evaluate(right_expr, env)?;
        if !compare(&left, *op, &right)? {
            return Ok(Scalar::Bool(false));
        }
        left = right;
    }

    Ok(Scalar::Bool(true))
}

fn compare(left: &Scalar, op: CompareOp, right: &Scalar) -> Result<bool, ExprError> {
    match op {
        CompareOp::Eq => Ok(scalars_equal(left, right)),
        CompareOp::NotEq => Ok(!scalars_equal(left, right)),
        CompareOp::Lt => Ok(scalars_order(left, right)? == Ordering::Less),
        CompareOp::Lte => Ok(scalars_order(left, right)? != Ordering::Greater),
        CompareOp::Gt => Ok(scalars_order(left, right)? == Ordering::Greater),
        CompareOp::Gte => Ok(scalars_order(left, right)? != Ordering::Less),
    }
}

fn scalars_equal(left: &Scalar, right: &Scalar) -> bool {
    // Numeric equality covers bool operands through 0/1 promotion
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return (l - r).abs() < f64::EPSILON;
    }
    match (left, right) {
        (Scalar::Text(l), Scalar::Text(r)) => l == r,
        (Scalar::Null, Scalar::Null) => true,
        _ => false,
    }
}

fn scalars_order(left: &Scalar, right: &Scalar) -> Result<Ordering, ExprError> {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return l.partial_cmp(&r).ok_or(ExprError::Incomparable {
            left: left.kind(),
            right: right.kind(),
        });
    }
    if let (Scalar::Text(l), Scalar::Text(r)) = (left, right) {
        return Ok(l.cmp(r));
    }
    Err(ExprError::Incomparable {
        left: left.kind(),
        right: right.kind(),
    })
}
