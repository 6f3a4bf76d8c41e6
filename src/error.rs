// SPDX-License-Identifier: MIT

//! Typed error handling for switchyard-rs
//!
//! Expression-language failures and predicate-registry failures are kept
//! as separate hierarchies: the former are recoverable (the evaluator
//! falls back to legacy matching), the latter signal a wiring defect or a
//! failure inside workflow-supplied code.

use thiserror::Error;

/// Errors raised while tokenizing, parsing, or evaluating a condition
/// expression.
#[derive(Debug, Error)]
pub enum ExprError {
    /// Character outside the expression grammar (arithmetic symbols,
    /// bare `=`, brackets, and so on)
    #[error("unexpected character '{0}' in condition expression")]
    UnexpectedChar(char),

    /// String literal with no closing quote
    #[error("unterminated string literal")]
    UnterminatedString,

    /// Numeric literal that does not parse as f64
    #[error("malformed number '{0}'")]
    MalformedNumber(String),

    /// Input ended where the grammar required more
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// Token that cannot start or continue the current production
    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    /// Identifier bound in neither decisions nor condition state
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    /// Ordering comparison between types with no defined order
    #[error("cannot compare {left} with {right}")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },
}

/// Errors raised by the condition router.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Condition name not present in the registry
    #[error("unknown condition '{name}' (registered: {available:?})")]
    UnknownCondition { name: String, available: Vec<String> },

    /// Workflow-supplied predicate returned an error
    #[error("condition '{name}' failed")]
    PredicateFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ExprError {
    /// Create an unexpected-token error
    pub fn unexpected_token(token: impl Into<String>) -> Self {
        Self::UnexpectedToken(token.into())
    }

    /// Create an undefined-variable error
    pub fn undefined(name: impl Into<String>) -> Self {
        Self::UndefinedVariable(name.into())
    }
}

impl RouterError {
    /// Create an unknown-condition error
    pub fn unknown(name: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownCondition {
            name: name.into(),
            available,
        }
    }

    /// Wrap a predicate failure
    pub fn predicate_failed(name: impl Into<String>, source: anyhow::Error) -> Self {
        Self::PredicateFailed {
            name: name.into(),
            source,
        }
    }
}
