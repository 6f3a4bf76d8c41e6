//! Recursive-descent parser for condition expressions
//!
//! Precedence, tightest binding first:
//! parentheses, `NOT`, comparisons, `AND`, `OR`.
//! Comparisons chain: `1 < x < 5` requires every adjacent pair to hold.

use super::ast::Expr;
use super::lexer::{Lexer, Token};
use crate::error::ExprError;
use crate::value::Scalar;

/// Parse a condition expression string into an AST
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression()?;

    // The whole input must be one expression
    if let Some(token) = parser.peek() {
        return Err(ExprError::unexpected_token(token.to_string()));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expression(&mut self) -> Result<Expr, ExprError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.and_expr()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.pos += 1;
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.comparison()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.pos += 1;
            let right = self.comparison()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let first = self.unary()?;
        let mut rest = Vec::new();

        while let Some(Token::Cmp(op)) = self.peek() {
            let op = *op;
            self.pos += 1;
            rest.push((op, self.unary()?));
        }

        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if matches!(self.peek(), Some(Token::Not)) {
            self.pos += 1;
            let inner = self.unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Token::Number(n)) => {
                let n = *n;
                self.pos += 1;
                Ok(Expr::Literal(Scalar::Number(n)))
            }
            Some(Token::Str(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(Expr::Literal(Scalar::Text(s)))
            }
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(Expr::Ident(name))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expression()?;
                match self.peek() {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    Some(token) => Err(ExprError::unexpected_token(token.to_string())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(token) => Err(ExprError::unexpected_token(token.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ast::CompareOp;

    fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_string())
    }

    #[test]
    fn test_not_binds_tighter_than_and() {
        // NOT a AND b parses as (NOT a) AND b
        let expr = parse("NOT a AND b").unwrap();
        assert_eq!(
            expr,
            Expr::And(
                Box::new(Expr::Not(Box::new(ident("a")))),
                Box::new(ident("b")),
            )
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        // a OR b AND c parses as a OR (b AND c)
        let expr = parse("a OR b AND c").unwrap();
        assert_eq!(
            expr,
            Expr::Or(
                Box::new(ident("a")),
                Box::new(Expr::And(Box::new(ident("b")), Box::new(ident("c")))),
            )
        );
    }

    #[test]
    fn test_parens_override_precedence() {
        let expr = parse("(a OR b) AND c").unwrap();
        assert_eq!(
            expr,
            Expr::And(
                Box::new(Expr::Or(Box::new(ident("a")), Box::new(ident("b")))),
                Box::new(ident("c")),
            )
        );
    }

    #[test]
    fn test_comparison_chain_shape() {
        let expr = parse("1 < turn_count < 5").unwrap();
        assert_eq!(
            expr,
            Expr::Compare {
                first: Box::new(Expr::Literal(Scalar::Number(1.0))),
                rest: vec![
                    (CompareOp::Lt, ident("turn_count")),
                    (CompareOp::Lt, Expr::Literal(Scalar::Number(5.0))),
                ],
            }
        );
    }

    #[test]
    fn test_not_binds_tighter_than_comparison() {
        // NOT a == b parses as (NOT a) == b
        let expr = parse("NOT a == b").unwrap();
        assert_eq!(
            expr,
            Expr::Compare {
                first: Box::new(Expr::Not(Box::new(ident("a")))),
                rest: vec![(CompareOp::Eq, ident("b"))],
            }
        );
    }

    #[test]
    fn test_string_literal_operand() {
        let expr = parse("verdict == 'approve'").unwrap();
        assert_eq!(
            expr,
            Expr::Compare {
                first: Box::new(ident("verdict")),
                rest: vec![(CompareOp::Eq, Expr::Literal(Scalar::Text("approve".to_string())))],
            }
        );
    }

    #[test]
    fn test_double_not() {
        let expr = parse("NOT NOT done").unwrap();
        assert_eq!(
            expr,
            Expr::Not(Box::new(Expr::Not(Box::new(ident("done")))))
        );
    }

    #[test]
    fn test_and_is_left_associative() {
        let expr = parse("a AND b AND c").unwrap();
        assert_eq!(
            expr,
            Expr::And(
                Box::new(Expr::And(Box::new(ident("a")), Box::new(ident("b")))),
                Box::new(ident("c")),
            )
        );
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(parse(""), Err(ExprError::UnexpectedEnd)));
        assert!(matches!(parse("   "), Err(ExprError::UnexpectedEnd)));
    }

    #[test]
    fn test_dangling_operator() {
        assert!(matches!(parse("a AND"), Err(ExprError::UnexpectedEnd)));
        assert!(matches!(parse("NOT"), Err(ExprError::UnexpectedEnd)));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(matches!(
            parse("a b"),
            Err(ExprError::UnexpectedToken(_))
        ));
    }

    #[test]
    fn test_unbalanced_parens() {
        assert!(matches!(parse("(a OR b"), Err(ExprError::UnexpectedEnd)));
        assert!(matches!(
            parse("a OR b)"),
            Err(ExprError::UnexpectedToken(_))
        ));
    }

    #[test]
    fn test_consecutive_operators_rejected() {
        assert!(matches!(
            parse("a == == b"),
            Err(ExprError::UnexpectedToken(_))
        ));
    }
}
