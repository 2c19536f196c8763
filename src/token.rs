//! Tokens produced by the [`scanner`](crate::scanner) and consumed by the
//! [`parser`](crate::parser).
//!
//! A [`Token`] pairs a [`TokenKind`] with the raw lexeme it was read from and
//! the [`Position`] of its first byte. Scalar kinds carry their decoded value,
//! so the parser maps each token to exactly one [`Value`](crate::Value)
//! variant without looking at the text again.

use crate::value::{IntegerBase, StringStyle};
use std::fmt;

/// A location in the source buffer.
///
/// `line` and `column` are 1-based; `column` counts characters, not bytes.
/// `offset` is the 0-based byte offset into the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    /// The position of the first byte of a buffer.
    pub const START: Position = Position {
        line: 1,
        column: 1,
        offset: 0,
    };

    #[must_use]
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Position {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The typed tag of a token.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// A bare key such as `name`, `1234` or `true` read in key position.
    Identifier(String),
    /// A quoted string, already unescaped.
    String { value: String, style: StringStyle },
    Integer { value: i64, base: IntegerBase },
    Float(f64),
    Boolean(bool),
    /// A date/time literal; calendar validation happens in the parser.
    DateTime,
    Dot,
    Equals,
    Comma,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    DoubleLBracket,
    DoubleRBracket,
    Newline,
    Eof,
}

impl TokenKind {
    /// A short human-readable name, used in "expected X, found Y" messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Identifier(_) => "a bare key",
            TokenKind::String { .. } => "a string",
            TokenKind::Integer { .. } => "an integer",
            TokenKind::Float(_) => "a float",
            TokenKind::Boolean(_) => "a boolean",
            TokenKind::DateTime => "a date-time",
            TokenKind::Dot => "`.`",
            TokenKind::Equals => "`=`",
            TokenKind::Comma => "`,`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::DoubleLBracket => "`[[`",
            TokenKind::DoubleRBracket => "`]]`",
            TokenKind::Newline => "a newline",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A single lexical token.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}
