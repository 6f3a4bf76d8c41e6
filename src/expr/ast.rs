// SPDX-License-Identifier: MIT

//! Abstract syntax tree for condition expressions
//!
//! The enums here are the complete operator surface of the language;
//! anything not representable below cannot be parsed, so there is no
//! separate allow-list to maintain.

use crate::value::Scalar;

/// A parsed condition expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal(Scalar),
    /// Variable reference
    Ident(String),
    /// Logical NOT (binds tighter than comparisons)
    Not(Box<Expr>),
    /// Logical AND
    And(Box<Expr>, Box<Expr>),
    /// Logical OR
    Or(Box<Expr>, Box<Expr>),
    /// Comparison chain: `1 < x < 5` holds when every adjacent pair holds
    Compare {
        first: Box<Expr>,
        rest: Vec<(CompareOp, Expr)>,
    },
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// ==
    Eq,
    /// !=
    NotEq,
    /// <
    Lt,
    /// <=
    Lte,
    /// >
    Gt,
    /// >=
    Gte,
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
        }
    }
}
