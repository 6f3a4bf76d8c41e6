//! Tokenizer for condition expressions
//!
//! Produces the token stream the parser consumes. The match below is the
//! full character-level surface of the language: identifiers, numbers,
//! quoted strings, the six comparison operators, parentheses, and the
//! keywords NOT/AND/OR (case-insensitive). Every other symbol is
//! rejected, which is what keeps arithmetic, call syntax, and attribute
//! access out of condition strings.

use super::ast::CompareOp;
use crate::error::ExprError;

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    Not,
    And,
    Or,
    Cmp(CompareOp),
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "identifier '{}'", name),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Str(s) => write!(f, "string '{}'", s),
            Token::Not => write!(f, "'NOT'"),
            Token::And => write!(f, "'AND'"),
            Token::Or => write!(f, "'OR'"),
            Token::Cmp(op) => write!(f, "'{}'", op),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
        }
    }
}

/// Lexer over a condition expression string
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> Result<Vec<Token>, ExprError> {
        let mut tokens = Vec::new();

        while self.pos < self.input.len() {
            if self.input[self.pos].is_whitespace() {
                self.pos += 1;
                continue;
            }
            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, ExprError> {
        let ch = self.input[self.pos];

        match ch {
            '(' => {
                self.pos += 1;
                Ok(Token::LParen)
            }
            ')' => {
                self.pos += 1;
                Ok(Token::RParen)
            }
            '\'' | '"' => self.read_string(ch),
            '=' if self.peek(1) == Some('=') => {
                self.pos += 2;
                Ok(Token::Cmp(CompareOp::Eq))
            }
            '!' if self.peek(1) == Some('=') => {
                self.pos += 2;
                Ok(Token::Cmp(CompareOp::NotEq))
            }
            '<' => {
                if self.peek(1) == Some('=') {
                    self.pos += 2;
                    Ok(Token::Cmp(CompareOp::Lte))
                } else {
                    self.pos += 1;
                    Ok(Token::Cmp(CompareOp::Lt))
                }
            }
            '>' => {
                if self.peek(1) == Some('=') {
                    self.pos += 2;
                    Ok(Token::Cmp(CompareOp::Gte))
                } else {
                    self.pos += 1;
                    Ok(Token::Cmp(CompareOp::Gt))
                }
            }
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.read_word()),
            // Bare '=' and lone '!' land here too
            c => Err(ExprError::UnexpectedChar(c)),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn read_string(&mut self, quote: char) -> Result<Token, ExprError> {
        self.pos += 1;
        let start = self.pos;

        while self.pos < self.input.len() {
            if self.input[self.pos] == quote {
                let text: String = self.input[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(Token::Str(text));
            }
            self.pos += 1;
        }

        Err(ExprError::UnterminatedString)
    }

    fn read_number(&mut self) -> Result<Token, ExprError> {
        let start = self.pos;

        while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        // Fractional part only when a digit follows the dot
        if self.peek(0) == Some('.') && matches!(self.peek(1), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
            while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        // Optional exponent, consumed only when well-formed
        if matches!(self.peek(0), Some('e') | Some('E')) {
            let mut ahead = 1;
            if matches!(self.peek(ahead), Some('+') | Some('-')) {
                ahead += 1;
            }
            if matches!(self.peek(ahead), Some(c) if c.is_ascii_digit()) {
                self.pos += ahead;
                while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let text: String = self.input[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ExprError::MalformedNumber(text))
    }

    fn read_word(&mut self) -> Token {
        let start = self.pos;

        while matches!(self.peek(0), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }

        let word: String = self.input[start..self.pos].iter().collect();
        match word.to_lowercase().as_str() {
            "not" => Token::Not,
            "and" => Token::And,
            "or" => Token::Or,
            _ => Token::Ident(word),
        }
    }
}
