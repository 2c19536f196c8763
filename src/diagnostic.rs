//! Positioned diagnostics shared by the scanner and the parser.
//!
//! Diagnostics are plain data. The scanner and parser push them into a
//! [`Diagnostics`] collection in source order and return it; nothing here
//! prints, logs or panics.
//!
//! ## Categories
//!
//! - **Lexical**: a malformed token (bad escape, unterminated string, bad number)
//! - **Structural**: a grammar violation (duplicate key, type conflict on a key path,
//!   unterminated table header/array/inline table)
//! - **Semantic**: a well-formed literal with an impossible value (February 30th)
//! - **Advisory**: warnings that never abort a parse
//!
//! ## Examples
//!
//! ```rust
//! use unreal_toml::from_str;
//!
//! let diagnostics = from_str("a = 1\na = 2").unwrap_err();
//! let first = diagnostics.first_error().unwrap();
//! assert_eq!(first.position.line, 2);
//! assert!(unreal_toml::diagnostic::format(first).contains("line 2, column 1"));
//! ```

use crate::token::Position;
use std::fmt;
use thiserror::Error;

/// Severity of a diagnostic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// Which phase of reading a diagnostic belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Category {
    Lexical,
    Structural,
    Semantic,
    Advisory,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Lexical => write!(f, "lexical"),
            Category::Structural => write!(f, "structural"),
            Category::Semantic => write!(f, "semantic"),
            Category::Advisory => write!(f, "advisory"),
        }
    }
}

/// Every condition the scanner and parser can report.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error("invalid UTF-8 byte sequence")]
    InvalidUtf8,

    #[error("unexpected character `{}`", .0.escape_debug())]
    UnexpectedChar(char),

    #[error("invalid character `{}` in bare key", .0.escape_debug())]
    InvalidKeyChar(char),

    #[error("control character U+{:04X} must be escaped", codepoint(.0))]
    ControlChar(char),

    #[error("carriage return must be followed by a newline")]
    LoneCarriageReturn,

    #[error("unterminated string")]
    UnterminatedString,

    #[error("unterminated multi-line string")]
    UnterminatedMultilineString,

    #[error("newline in single-line string")]
    NewlineInString,

    #[error("invalid escape sequence `\\{}`", .0.escape_debug())]
    InvalidEscape(char),

    #[error("invalid unicode escape `{0}`")]
    InvalidUnicodeEscape(String),

    #[error("malformed number `{lexeme}`: {reason}")]
    MalformedNumber { lexeme: String, reason: &'static str },

    #[error("integer `{0}` does not fit in a 64-bit signed integer")]
    IntegerOutOfRange(String),

    #[error("unquoted value `{0}`; strings must be quoted")]
    UnquotedValue(String),

    #[error("expected {expected}, found {found}")]
    Expected {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unterminated table header")]
    UnterminatedTableHeader,

    #[error("unterminated array-of-tables header")]
    UnterminatedArrayHeader,

    #[error("unterminated array")]
    UnterminatedArray,

    #[error("unterminated inline table")]
    UnterminatedInlineTable,

    #[error("newline in inline table")]
    NewlineInInlineTable,

    #[error("trailing comma in inline table")]
    TrailingCommaInInlineTable,

    #[error("arrays and inline tables nest deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("multi-line strings cannot be used as keys")]
    MultilineKey,

    #[error("duplicate key `{key}`")]
    DuplicateKey { key: String },

    #[error("table `{name}` defined more than once")]
    DuplicateTable { name: String },

    #[error("key `{key}` already defined as {kind}")]
    KeyTypeConflict { key: String, kind: &'static str },

    #[error("table `{key}` was defined by dotted keys and cannot be reopened with a header")]
    DottedTableReopened { key: String },

    #[error("table `{key}` was defined by a header and cannot be extended with dotted keys")]
    HeaderTableExtended { key: String },

    #[error("inline table `{key}` cannot be extended after it is closed")]
    InlineTableExtended { key: String },

    #[error("static array `{key}` cannot be extended with an array-of-tables header")]
    StaticArrayExtended { key: String },

    #[error("invalid date-time `{lexeme}`: {reason}")]
    InvalidDatetime { lexeme: String, reason: String },

    #[error("array mixes {first} and {other} values")]
    MixedArray {
        first: &'static str,
        other: &'static str,
    },

    #[error("empty keys are allowed but discouraged")]
    EmptyKey,

    #[error("first defined here")]
    FirstDefinedHere,

    #[error("opened here")]
    OpenedHere,
}

fn codepoint(c: &char) -> u32 {
    u32::from(*c)
}

impl DiagnosticKind {
    /// The phase this condition belongs to.
    #[must_use]
    pub fn category(&self) -> Category {
        use DiagnosticKind::*;
        match self {
            InvalidUtf8
            | UnexpectedChar(_)
            | InvalidKeyChar(_)
            | ControlChar(_)
            | LoneCarriageReturn
            | UnterminatedString
            | UnterminatedMultilineString
            | NewlineInString
            | InvalidEscape(_)
            | InvalidUnicodeEscape(_)
            | MalformedNumber { .. }
            | IntegerOutOfRange(_)
            | UnquotedValue(_) => Category::Lexical,
            Expected { .. }
            | UnterminatedTableHeader
            | UnterminatedArrayHeader
            | UnterminatedArray
            | UnterminatedInlineTable
            | NewlineInInlineTable
            | TrailingCommaInInlineTable
            | NestingTooDeep { .. }
            | MultilineKey
            | DuplicateKey { .. }
            | DuplicateTable { .. }
            | KeyTypeConflict { .. }
            | DottedTableReopened { .. }
            | HeaderTableExtended { .. }
            | InlineTableExtended { .. }
            | StaticArrayExtended { .. } => Category::Structural,
            InvalidDatetime { .. } => Category::Semantic,
            MixedArray { .. } | EmptyKey | FirstDefinedHere | OpenedHere => Category::Advisory,
        }
    }
}

/// A single positioned report.
///
/// `cause` chains a secondary location, e.g. the first definition of a
/// duplicated key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub position: Position,
    pub cause: Option<Box<Diagnostic>>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(kind: DiagnosticKind, position: Position) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind,
            position,
            cause: None,
        }
    }

    #[must_use]
    pub fn warning(kind: DiagnosticKind, position: Position) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            kind,
            position,
            cause: None,
        }
    }

    #[must_use]
    pub fn note(kind: DiagnosticKind, position: Position) -> Self {
        Diagnostic {
            severity: Severity::Note,
            kind,
            position,
            cause: None,
        }
    }

    /// Attaches a cause to the end of this diagnostic's chain.
    #[must_use]
    pub fn with_cause(mut self, cause: Diagnostic) -> Self {
        let tail = match self.cause.take() {
            Some(existing) => (*existing).with_cause(cause),
            None => cause,
        };
        self.cause = Some(Box::new(tail));
        self
    }

    /// The human-readable message for this diagnostic.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Iterates over the cause chain, nearest cause first.
    pub fn causes(&self) -> impl Iterator<Item = &Diagnostic> {
        std::iter::successors(self.cause.as_deref(), |d| d.cause.as_deref())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] at {}: {}",
            self.severity,
            self.category(),
            self.position,
            self.kind
        )?;
        for cause in self.causes() {
            write!(f, "\n  {} at {}: {}", cause.severity, cause.position, cause.kind)?;
        }
        Ok(())
    }
}

/// Renders a diagnostic with its 1-based line and column and every cause.
///
/// ```rust
/// use unreal_toml::diagnostic::{format, Diagnostic, DiagnosticKind};
/// use unreal_toml::Position;
///
/// let d = Diagnostic::error(DiagnosticKind::UnterminatedString, Position::new(4, 9, 52));
/// assert_eq!(format(&d), "error[lexical] at line 4, column 9: unterminated string");
/// ```
#[must_use]
pub fn format(diagnostic: &Diagnostic) -> String {
    diagnostic.to_string()
}

/// An ordered collection of diagnostics.
///
/// Returned as the error side of [`from_str`](crate::from_str); it always
/// holds at least one [`Severity::Error`] in that case, possibly preceded by
/// warnings collected earlier in the same buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    /// The first error in source order, which decides parse failure.
    #[must_use]
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.0.iter().find(|d| d.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Warning)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Diagnostics(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Diagnostics(diagnostics)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_cause_chain() {
        let d = Diagnostic::error(
            DiagnosticKind::DuplicateKey {
                key: "a".to_string(),
            },
            Position::new(2, 1, 6),
        )
        .with_cause(Diagnostic::note(
            DiagnosticKind::FirstDefinedHere,
            Position::new(1, 1, 0),
        ));

        assert_eq!(
            format(&d),
            "error[structural] at line 2, column 1: duplicate key `a`\n  note at line 1, column 1: first defined here"
        );
        assert_eq!(d.causes().count(), 1);
    }

    #[test]
    fn test_with_cause_appends_to_chain_end() {
        let d = Diagnostic::error(DiagnosticKind::UnterminatedArray, Position::START)
            .with_cause(Diagnostic::note(DiagnosticKind::OpenedHere, Position::START))
            .with_cause(Diagnostic::note(
                DiagnosticKind::FirstDefinedHere,
                Position::START,
            ));
        let kinds: Vec<_> = d.causes().map(|c| c.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::OpenedHere, DiagnosticKind::FirstDefinedHere]
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            DiagnosticKind::InvalidEscape('q').category(),
            Category::Lexical
        );
        assert_eq!(
            DiagnosticKind::DuplicateTable {
                name: "a".to_string()
            }
            .category(),
            Category::Structural
        );
        assert_eq!(
            DiagnosticKind::InvalidDatetime {
                lexeme: "2021-02-30".to_string(),
                reason: "day out of range".to_string()
            }
            .category(),
            Category::Semantic
        );
    }

    #[test]
    fn test_collection_queries() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning(DiagnosticKind::EmptyKey, Position::START));
        assert!(!diagnostics.has_errors());
        diagnostics.push(Diagnostic::error(
            DiagnosticKind::UnterminatedString,
            Position::new(3, 2, 20),
        ));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(
            diagnostics.first_error().map(|d| d.position.line),
            Some(3)
        );
    }

    #[test]
    fn test_control_char_message() {
        let kind = DiagnosticKind::ControlChar('\u{7}');
        assert_eq!(kind.to_string(), "control character U+0007 must be escaped");
    }
}
