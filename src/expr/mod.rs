// SPDX-License-Identifier: MIT

//! The condition expression language
//!
//! Parsing and evaluation of transition guard expressions like:
//! - `quality_score >= 8`
//! - `NOT needs_revision AND tests_passed`
//! - `1 < turn_count_writer_draft < 5`
//!
//! The language is deliberately small: literals, variables, six
//! comparison operators, NOT/AND/OR, and parentheses. No arithmetic, no
//! calls, no attribute access.

mod ast;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{CompareOp, Expr};
pub use evaluator::evaluate;
pub use parser::parse;
