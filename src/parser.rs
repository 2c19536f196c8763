//! The parser: tokens to a [`Document`].
//!
//! A recursive-descent reader with one token of lookahead. The table being
//! filled by key/value lines is not held as a live reference; the parser
//! keeps its path from the root (`current`) and walks down again for each
//! insertion, so every table has exactly one owner while it is built.
//!
//! The first structural or semantic error aborts the parse. Warnings
//! collected before it are returned alongside it.
//!
//! ## Definition rules
//!
//! - `[a.b]` may define a table that `[a.b.c]` created implicitly, but only once.
//! - A table created by dotted keys can gain sub-tables through headers but
//!   cannot be reopened by its own header.
//! - Dotted keys cannot reach into a table defined by a header or by `[[...]]`.
//! - Inline tables and static arrays are closed once their closing bracket is read.
//! - A header path that passes through an array of tables refers to its last element.

use crate::array::{Array, ArrayKind};
use crate::datetime;
use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::document::Document;
use crate::table::{Table, TableKind};
use crate::token::{Position, Token, TokenKind};
use crate::value::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Builds a document from a token stream produced by
/// [`scan`](crate::scanner::scan).
///
/// # Errors
///
/// Returns every diagnostic collected, ending with the error that stopped
/// the parse.
///
/// # Examples
///
/// ```rust
/// use unreal_toml::{parser::parse, scanner::scan};
///
/// let (tokens, diagnostics) = scan(b"[[p]]\nx = 1\n[[p]]\nx = 2\n");
/// assert!(diagnostics.is_empty());
///
/// let doc = parse(tokens).unwrap();
/// assert_eq!(doc.at_path_as::<i64>("p[1].x").unwrap(), 2);
/// ```
pub fn parse(mut tokens: Vec<Token>) -> Result<Document, Diagnostics> {
    if !tokens.last().is_some_and(Token::is_eof) {
        let end = tokens.last().map_or(Position::START, |t| Position {
            column: t.position.column + t.lexeme.chars().count(),
            offset: t.position.offset + t.lexeme.len(),
            ..t.position
        });
        tokens.push(Token::new(TokenKind::Eof, "", end));
    }

    let source_len = tokens.last().map_or(0, |t| t.position.offset);
    // comments and whitespace after the last line break leave no tokens
    let trailing_newline = tokens
        .iter()
        .rev()
        .find(|t| matches!(t.kind, TokenKind::Newline))
        .is_some_and(|t| t.position.offset + t.lexeme.len() == source_len);

    debug!(tokens = tokens.len(), "parsing document");
    let mut parser = Parser::new(tokens);
    match parser.document() {
        Ok(()) => {
            trace!(keys = parser.root.len(), warnings = parser.warnings.len(), "parsed document");
            Ok(Document::from_parts(
                parser.root,
                source_len,
                trailing_newline,
                parser.warnings,
            ))
        }
        Err(error) => {
            debug!(%error, "parse failed");
            let mut diagnostics = parser.warnings;
            diagnostics.push(error);
            Err(diagnostics)
        }
    }
}

/// One step in a path from the root table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum PathSeg {
    Key(String),
    Index(usize),
}

/// A single key segment with where it was written.
#[derive(Clone, Debug)]
struct Key {
    name: String,
    position: Position,
}

type Parse<T> = Result<T, Diagnostic>;

/// How many arrays and inline tables may enclose a value.
pub const MAX_NESTING: usize = 128;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    root: Table,
    /// Path of the table that key/value lines currently go into.
    current: Vec<PathSeg>,
    /// Where each explicitly defined key path was first written.
    defined: HashMap<Vec<PathSeg>, Position>,
    warnings: Diagnostics,
    /// Open arrays and inline tables around the value being read.
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            root: Table::new(),
            current: Vec::new(),
            defined: HashMap::new(),
            warnings: Diagnostics::new(),
            depth: 0,
        }
    }

    // ---- token cursor ----

    fn peek(&self) -> &Token {
        // `parse` guarantees a trailing Eof, and the cursor never passes it
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        trace!(kind = token.kind.describe(), line = token.position.line, "advance");
        token
    }

    fn unexpected<T>(&self, expected: &'static str) -> Parse<T> {
        let token = self.peek();
        Err(Diagnostic::error(
            DiagnosticKind::Expected {
                expected,
                found: token.kind.describe(),
            },
            token.position,
        ))
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek().kind, TokenKind::Newline) {
            self.bump();
        }
    }

    fn expect_line_end(&mut self) -> Parse<()> {
        match self.peek().kind {
            TokenKind::Newline => {
                self.bump();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => self.unexpected("a newline"),
        }
    }

    // ---- document structure ----

    fn document(&mut self) -> Parse<()> {
        loop {
            match self.peek().kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Newline => {
                    self.bump();
                }
                TokenKind::LBracket => {
                    self.table_header()?;
                    self.expect_line_end()?;
                }
                TokenKind::DoubleLBracket => {
                    self.array_header()?;
                    self.expect_line_end()?;
                }
                TokenKind::Identifier(_) | TokenKind::String { .. } => {
                    self.key_value_line()?;
                    self.expect_line_end()?;
                }
                _ => return self.unexpected("a key or a table header"),
            }
        }
    }

    fn key_value_line(&mut self) -> Parse<()> {
        let keys = self.dotted_key()?;
        let value_position = self.key_value_separator()?;
        let value = self.value()?;
        trace!(key = %join_keys(&keys), kind = value.type_name(), line = value_position.line, "key/value");

        let table = walk(&mut self.root, &self.current)?;
        insert_dotted(
            table,
            self.current.clone(),
            &keys,
            value,
            &mut self.defined,
        )
    }

    /// Consumes `=` and returns the position of the value after it.
    fn key_value_separator(&mut self) -> Parse<Position> {
        if !matches!(self.peek().kind, TokenKind::Equals) {
            return self.unexpected("`=`");
        }
        self.bump();
        Ok(self.peek().position)
    }

    fn table_header(&mut self) -> Parse<()> {
        let open = self.bump().position;
        let keys = self.header_key(open, DiagnosticKind::UnterminatedTableHeader)?;
        match self.peek().kind {
            TokenKind::RBracket => {
                self.bump();
            }
            TokenKind::Newline | TokenKind::Eof => {
                return Err(Diagnostic::error(DiagnosticKind::UnterminatedTableHeader, open))
            }
            _ => return self.unexpected("`]`"),
        }

        debug!(table = %join_keys(&keys), line = open.line, "table header");
        self.current = open_table(&mut self.root, &keys, &mut self.defined)?;
        Ok(())
    }

    fn array_header(&mut self) -> Parse<()> {
        let open = self.bump().position;
        let keys = self.header_key(open, DiagnosticKind::UnterminatedArrayHeader)?;
        match self.peek().kind {
            TokenKind::DoubleRBracket => {
                self.bump();
            }
            TokenKind::RBracket | TokenKind::Newline | TokenKind::Eof => {
                return Err(Diagnostic::error(DiagnosticKind::UnterminatedArrayHeader, open))
            }
            _ => return self.unexpected("`]]`"),
        }

        debug!(table = %join_keys(&keys), line = open.line, "array-of-tables header");
        self.current = append_table(&mut self.root, &keys, &mut self.defined)?;
        Ok(())
    }

    /// Reads the key inside a header, reporting a line end as an unterminated
    /// header at its opening bracket.
    fn header_key(&mut self, open: Position, unterminated: DiagnosticKind) -> Parse<Vec<Key>> {
        if matches!(self.peek().kind, TokenKind::Newline | TokenKind::Eof) {
            return Err(Diagnostic::error(unterminated, open));
        }
        self.dotted_key()
    }

    // ---- keys ----

    fn dotted_key(&mut self) -> Parse<Vec<Key>> {
        let mut keys = vec![self.simple_key()?];
        while matches!(self.peek().kind, TokenKind::Dot) {
            self.bump();
            keys.push(self.simple_key()?);
        }
        Ok(keys)
    }

    fn simple_key(&mut self) -> Parse<Key> {
        match &self.peek().kind {
            TokenKind::Identifier(_) | TokenKind::String { .. } => {}
            _ => return self.unexpected("a key"),
        }
        let token = self.bump();
        match token.kind {
            TokenKind::Identifier(name) => Ok(Key {
                name,
                position: token.position,
            }),
            TokenKind::String { style, .. } if style.is_multiline() => {
                Err(Diagnostic::error(DiagnosticKind::MultilineKey, token.position))
            }
            TokenKind::String { value, .. } => {
                if value.is_empty() {
                    self.warnings
                        .push(Diagnostic::warning(DiagnosticKind::EmptyKey, token.position));
                }
                Ok(Key {
                    name: value,
                    position: token.position,
                })
            }
            _ => self.unexpected("a key"),
        }
    }

    // ---- values ----

    fn value(&mut self) -> Parse<Value> {
        match self.peek().kind {
            TokenKind::LBracket | TokenKind::LBrace => return self.nested(),
            TokenKind::String { .. }
            | TokenKind::Integer { .. }
            | TokenKind::Float(_)
            | TokenKind::Boolean(_)
            | TokenKind::DateTime => {}
            _ => return self.unexpected("a value"),
        }

        let token = self.bump();
        let value = match token.kind {
            TokenKind::String { value, style } => Value::String(value, style),
            TokenKind::Integer { value, base } => Value::Integer(value, base),
            TokenKind::Float(f) => Value::Float(f),
            TokenKind::Boolean(b) => Value::Boolean(b),
            TokenKind::DateTime => {
                let dt = datetime::parse(&token.lexeme).map_err(|reason| {
                    Diagnostic::error(
                        DiagnosticKind::InvalidDatetime {
                            lexeme: token.lexeme.clone(),
                            reason,
                        },
                        token.position,
                    )
                })?;
                Value::Datetime(dt)
            }
            _ => return self.unexpected("a value"),
        };
        Ok(value)
    }

    /// Reads an array or inline table one level further down.
    fn nested(&mut self) -> Parse<Value> {
        if self.depth == MAX_NESTING {
            return Err(Diagnostic::error(
                DiagnosticKind::NestingTooDeep { limit: MAX_NESTING },
                self.peek().position,
            ));
        }
        self.depth += 1;
        let value = if matches!(self.peek().kind, TokenKind::LBracket) {
            self.array()
        } else {
            self.inline_table()
        };
        self.depth -= 1;
        value
    }

    fn array(&mut self) -> Parse<Value> {
        let open = self.bump().position;
        let unterminated = || {
            Diagnostic::error(DiagnosticKind::UnterminatedArray, open)
        };

        let mut items: Vec<Value> = Vec::new();
        let mut mixed_reported = false;
        loop {
            self.skip_newlines();
            match self.peek().kind {
                TokenKind::RBracket => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => return Err(unterminated()),
                _ => {}
            }

            let position = self.peek().position;
            let value = self.value()?;
            if let Some(first) = items.first() {
                if !mixed_reported && first.type_name() != value.type_name() {
                    mixed_reported = true;
                    self.warnings.push(Diagnostic::warning(
                        DiagnosticKind::MixedArray {
                            first: first.type_name(),
                            other: value.type_name(),
                        },
                        position,
                    ));
                }
            }
            items.push(value);

            self.skip_newlines();
            match self.peek().kind {
                TokenKind::Comma => {
                    self.bump();
                }
                TokenKind::RBracket => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => return Err(unterminated()),
                _ => return self.unexpected("`,` or `]`"),
            }
        }
        Ok(Value::Array(Array::from(items)))
    }

    fn inline_table(&mut self) -> Parse<Value> {
        let open = self.bump().position;
        let mut table = Table::with_kind(TableKind::Inline);
        let mut defined = HashMap::new();

        if matches!(self.peek().kind, TokenKind::RBrace) {
            self.bump();
            return Ok(Value::Table(table));
        }

        loop {
            self.inline_line_check(open)?;
            let keys = self.dotted_key()?;
            self.key_value_separator()?;
            self.inline_line_check(open)?;
            let value = self.value()?;
            insert_dotted(&mut table, Vec::new(), &keys, value, &mut defined)?;

            match self.peek().kind {
                TokenKind::Comma => {
                    let comma = self.bump().position;
                    if matches!(self.peek().kind, TokenKind::RBrace) {
                        return Err(Diagnostic::error(
                            DiagnosticKind::TrailingCommaInInlineTable,
                            comma,
                        ));
                    }
                }
                TokenKind::RBrace => {
                    self.bump();
                    return Ok(Value::Table(table));
                }
                _ => {
                    self.inline_line_check(open)?;
                    return self.unexpected("`,` or `}`");
                }
            }
        }
    }

    /// Inline tables must fit on one line.
    fn inline_line_check(&self, open: Position) -> Parse<()> {
        let token = self.peek();
        match token.kind {
            TokenKind::Newline => Err(Diagnostic::error(
                DiagnosticKind::NewlineInInlineTable,
                token.position,
            )
            .with_cause(Diagnostic::note(DiagnosticKind::OpenedHere, open))),
            TokenKind::Eof => Err(Diagnostic::error(
                DiagnosticKind::UnterminatedInlineTable,
                open,
            )),
            _ => Ok(()),
        }
    }
}

// ---- table construction ----
//
// These work on `&mut Table` plus an explicit path rather than on the
// parser, so the same rules serve the document root and inline tables.

fn join_keys(keys: &[Key]) -> String {
    keys.iter()
        .map(|k| crate::ser::format_key(&k.name))
        .collect::<Vec<_>>()
        .join(".")
}

fn first_defined(
    defined: &HashMap<Vec<PathSeg>, Position>,
    path: &[PathSeg],
    error: Diagnostic,
) -> Diagnostic {
    match defined.get(path) {
        Some(&position) => {
            error.with_cause(Diagnostic::note(DiagnosticKind::FirstDefinedHere, position))
        }
        None => error,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Array(array) if array.kind() == ArrayKind::Tables => "an array of tables",
        Value::Table(table) if table.kind() == TableKind::Inline => "an inline table",
        Value::Table(_) => "a table",
        Value::Array(_) => "an array",
        Value::String(..) => "a string",
        Value::Integer(..) => "an integer",
        Value::Float(_) => "a float",
        Value::Boolean(_) => "a boolean",
        Value::Datetime(_) => "a date-time",
    }
}

/// Steps through one header segment toward a table, creating an implicit
/// table when the key is absent. An array of tables is entered at its last
/// element, whose index is pushed onto `path`.
fn descend_for_header<'t>(
    table: &'t mut Table,
    key: &Key,
    display: &str,
    path: &mut Vec<PathSeg>,
    defined: &HashMap<Vec<PathSeg>, Position>,
) -> Parse<&'t mut Table> {
    path.push(PathSeg::Key(key.name.clone()));
    let existing = table.entries.get(&key.name).map(kind_name);
    let slot = table
        .entries
        .entry(key.name.clone())
        .or_insert_with(|| Value::Table(Table::with_kind(TableKind::Implicit)));

    match slot {
        Value::Table(child) if child.kind == TableKind::Inline => Err(first_defined(
            defined,
            path,
            Diagnostic::error(
                DiagnosticKind::InlineTableExtended {
                    key: display.to_string(),
                },
                key.position,
            ),
        )),
        Value::Table(child) => Ok(child),
        Value::Array(array) if array.kind == ArrayKind::Tables => {
            let last = array.items.len().saturating_sub(1);
            path.push(PathSeg::Index(last));
            match array.items.last_mut() {
                Some(Value::Table(child)) => Ok(child),
                _ => Err(Diagnostic::error(
                    DiagnosticKind::KeyTypeConflict {
                        key: display.to_string(),
                        kind: "an array",
                    },
                    key.position,
                )),
            }
        }
        _ => Err(first_defined(
            defined,
            path,
            Diagnostic::error(
                DiagnosticKind::KeyTypeConflict {
                    key: display.to_string(),
                    kind: existing.unwrap_or("a value"),
                },
                key.position,
            ),
        )),
    }
}

/// Walks from the root to the table at `path`, which a header already
/// opened.
fn walk<'t>(root: &'t mut Table, path: &[PathSeg]) -> Parse<&'t mut Table> {
    let mut table = root;
    let mut trail = Vec::new();
    let no_defs = HashMap::new();
    for seg in path {
        if let PathSeg::Key(name) = seg {
            let key = Key {
                name: name.clone(),
                position: Position::START,
            };
            table = descend_for_header(table, &key, name, &mut trail, &no_defs)?;
        }
    }
    Ok(table)
}

/// Handles `[a.b.c]`; returns the path of the opened table.
fn open_table(
    root: &mut Table,
    keys: &[Key],
    defined: &mut HashMap<Vec<PathSeg>, Position>,
) -> Parse<Vec<PathSeg>> {
    let Some((last, parents)) = keys.split_last() else {
        return Ok(Vec::new());
    };
    let name = join_keys(keys);
    let mut path = Vec::new();
    let mut table = root;
    for (i, key) in parents.iter().enumerate() {
        let display = join_keys(&keys[..=i]);
        table = descend_for_header(table, key, &display, &mut path, defined)?;
    }

    path.push(PathSeg::Key(last.name.clone()));
    let position = last.position;
    match table.entries.get_mut(&last.name) {
        None => {
            table.entries.insert(
                last.name.clone(),
                Value::Table(Table::with_kind(TableKind::Header)),
            );
        }
        Some(Value::Table(existing)) => match existing.kind {
            TableKind::Implicit => existing.kind = TableKind::Header,
            TableKind::Dotted => {
                return Err(first_defined(
                    defined,
                    &path,
                    Diagnostic::error(DiagnosticKind::DottedTableReopened { key: name }, position),
                ))
            }
            TableKind::Inline => {
                return Err(first_defined(
                    defined,
                    &path,
                    Diagnostic::error(DiagnosticKind::InlineTableExtended { key: name }, position),
                ))
            }
            TableKind::Header | TableKind::ArrayElement => {
                return Err(first_defined(
                    defined,
                    &path,
                    Diagnostic::error(DiagnosticKind::DuplicateTable { name }, position),
                ))
            }
        },
        Some(other) => {
            let kind = kind_name(other);
            return Err(first_defined(
                defined,
                &path,
                Diagnostic::error(DiagnosticKind::KeyTypeConflict { key: name, kind }, position),
            ));
        }
    }
    defined.insert(path.clone(), position);
    Ok(path)
}

/// Handles `[[a.b.c]]`; returns the path of the new element.
fn append_table(
    root: &mut Table,
    keys: &[Key],
    defined: &mut HashMap<Vec<PathSeg>, Position>,
) -> Parse<Vec<PathSeg>> {
    let Some((last, parents)) = keys.split_last() else {
        return Ok(Vec::new());
    };
    let name = join_keys(keys);
    let mut path = Vec::new();
    let mut table = root;
    for (i, key) in parents.iter().enumerate() {
        let display = join_keys(&keys[..=i]);
        table = descend_for_header(table, key, &display, &mut path, defined)?;
    }

    path.push(PathSeg::Key(last.name.clone()));
    let position = last.position;
    let element = Value::Table(Table::with_kind(TableKind::ArrayElement));
    let index = match table.entries.get_mut(&last.name) {
        None => {
            let mut array = Array::with_kind(ArrayKind::Tables);
            array.items.push(element);
            table.entries.insert(last.name.clone(), Value::Array(array));
            defined.insert(path.clone(), position);
            0
        }
        Some(Value::Array(array)) if array.kind == ArrayKind::Tables => {
            array.items.push(element);
            array.items.len() - 1
        }
        Some(Value::Array(_)) => {
            return Err(first_defined(
                defined,
                &path,
                Diagnostic::error(DiagnosticKind::StaticArrayExtended { key: name }, position),
            ))
        }
        Some(other) => {
            let kind = kind_name(other);
            return Err(first_defined(
                defined,
                &path,
                Diagnostic::error(DiagnosticKind::KeyTypeConflict { key: name, kind }, position),
            ));
        }
    };
    path.push(PathSeg::Index(index));
    Ok(path)
}

/// Inserts `a.b.c = value` into `table`, whose own path is `path`.
fn insert_dotted(
    table: &mut Table,
    mut path: Vec<PathSeg>,
    keys: &[Key],
    value: Value,
    defined: &mut HashMap<Vec<PathSeg>, Position>,
) -> Parse<()> {
    let Some((last, parents)) = keys.split_last() else {
        return Ok(());
    };
    let mut table = table;
    for (i, key) in parents.iter().enumerate() {
        let display = join_keys(&keys[..=i]);
        path.push(PathSeg::Key(key.name.clone()));

        let existing = table.entries.get(&key.name).map(kind_name);
        let created = existing.is_none();
        let slot = table
            .entries
            .entry(key.name.clone())
            .or_insert_with(|| Value::Table(Table::with_kind(TableKind::Dotted)));
        if created {
            defined.insert(path.clone(), key.position);
        }

        table = match slot {
            Value::Table(child) => match child.kind {
                TableKind::Dotted => child,
                TableKind::Implicit => {
                    child.kind = TableKind::Dotted;
                    child
                }
                TableKind::Header | TableKind::ArrayElement => {
                    return Err(first_defined(
                        defined,
                        &path,
                        Diagnostic::error(
                            DiagnosticKind::HeaderTableExtended { key: display },
                            key.position,
                        ),
                    ))
                }
                TableKind::Inline => {
                    return Err(first_defined(
                        defined,
                        &path,
                        Diagnostic::error(
                            DiagnosticKind::InlineTableExtended { key: display },
                            key.position,
                        ),
                    ))
                }
            },
            _ => {
                return Err(first_defined(
                    defined,
                    &path,
                    Diagnostic::error(
                        DiagnosticKind::KeyTypeConflict {
                            key: display,
                            kind: existing.unwrap_or("a value"),
                        },
                        key.position,
                    ),
                ));
            }
        };
    }

    path.push(PathSeg::Key(last.name.clone()));
    if table.entries.contains_key(&last.name) {
        return Err(first_defined(
            defined,
            &path,
            Diagnostic::error(
                DiagnosticKind::DuplicateKey {
                    key: join_keys(keys),
                },
                last.position,
            ),
        ));
    }
    table.entries.insert(last.name.clone(), value);
    defined.insert(path, last.position);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;

    fn parse_str(input: &str) -> Result<Document, Diagnostics> {
        let (tokens, diagnostics) = scan(input.as_bytes());
        assert!(diagnostics.is_empty(), "scan failed: {}", diagnostics);
        parse(tokens)
    }

    fn error_of(input: &str) -> Diagnostic {
        let diagnostics = parse_str(input).expect_err("expected a parse error");
        diagnostics.first_error().cloned().expect("an error")
    }

    #[test]
    fn test_dotted_keys_and_headers_agree() {
        let dotted = parse_str("a.b.c = 1").unwrap();
        let header = parse_str("[a.b]\nc = 1").unwrap();
        assert_eq!(dotted, header);
        assert_eq!(dotted.get_table("a").unwrap().kind(), TableKind::Dotted);
        assert_eq!(
            header.at_path("a.b").unwrap().as_table().unwrap().kind(),
            TableKind::Header
        );
    }

    #[test]
    fn test_duplicate_key_points_at_second_with_first_as_cause() {
        let d = error_of("a = 1\na = 2");
        assert_eq!(
            d.kind,
            DiagnosticKind::DuplicateKey {
                key: "a".to_string()
            }
        );
        assert_eq!(d.position.line, 2);
        let cause = d.cause.as_deref().unwrap();
        assert_eq!(cause.kind, DiagnosticKind::FirstDefinedHere);
        assert_eq!(cause.position.line, 1);
    }

    #[test]
    fn test_array_of_tables_elements_are_independent() {
        let doc = parse_str("[[p]]\nx=1\n[[p]]\nx=2").unwrap();
        let p = doc.get_array("p").unwrap();
        assert_eq!(p.kind(), ArrayKind::Tables);
        assert_eq!(p.len(), 2);
        assert_eq!(p.get_as::<&Table>(0).unwrap().get_as::<i64>("x").unwrap(), 1);
        assert_eq!(p.get_as::<&Table>(1).unwrap().get_as::<i64>("x").unwrap(), 2);
    }

    #[test]
    fn test_header_through_array_of_tables_uses_last_element() {
        let doc = parse_str(
            "[[fruit]]\nname = \"apple\"\n[fruit.physical]\ncolor = \"red\"\n\
             [[fruit]]\nname = \"banana\"\n[[fruit.variety]]\nname = \"plantain\"",
        )
        .unwrap();
        assert_eq!(doc.at_path_as::<&str>("fruit[0].physical.color").unwrap(), "red");
        assert_eq!(
            doc.at_path_as::<&str>("fruit[1].variety[0].name").unwrap(),
            "plantain"
        );
        assert!(doc.at_path("fruit[0].variety").is_err());
    }

    #[test]
    fn test_type_conflict_table_over_integer() {
        let d = error_of("a = 1\n[a]\nb=2");
        assert_eq!(
            d.kind,
            DiagnosticKind::KeyTypeConflict {
                key: "a".to_string(),
                kind: "an integer"
            }
        );
        assert_eq!(d.position.line, 2);
    }

    #[test]
    fn test_type_conflict_on_intermediate_key() {
        let d = error_of("a = \"x\"\n[a.b]\n");
        assert_eq!(
            d.kind,
            DiagnosticKind::KeyTypeConflict {
                key: "a".to_string(),
                kind: "a string"
            }
        );
        assert_eq!(d.position, Position::new(2, 2, 9));
        assert!(d.cause.is_some());

        let d = error_of("[p]\nx.y = 1\n[[q]]\nx = [1]\nx.y.z = 2\n");
        assert_eq!(
            d.kind,
            DiagnosticKind::KeyTypeConflict {
                key: "x".to_string(),
                kind: "an array"
            }
        );
        assert_eq!(d.position.line, 5);
    }

    #[test]
    fn test_table_redefinition_rules() {
        assert!(matches!(
            error_of("[a]\n[a]").kind,
            DiagnosticKind::DuplicateTable { .. }
        ));
        // implicit then explicit is fine, once
        assert!(parse_str("[a.b]\n[a]\nx = 1").is_ok());
        assert!(matches!(
            error_of("[a.b]\n[a]\n[a]").kind,
            DiagnosticKind::DuplicateTable { .. }
        ));
        assert!(matches!(
            error_of("a.b = 1\n[a]").kind,
            DiagnosticKind::DottedTableReopened { .. }
        ));
        // sub-tables of a dotted table are fine
        assert!(parse_str("a.b = 1\n[a.c]\nd = 2").is_ok());
        assert!(matches!(
            error_of("[a.b.c]\nz = 9\n[a]\nb.c.t = 1").kind,
            DiagnosticKind::HeaderTableExtended { .. }
        ));
        assert!(matches!(
            error_of("[[a]]\n[a]").kind,
            DiagnosticKind::KeyTypeConflict { .. }
        ));
    }

    #[test]
    fn test_inline_tables_are_closed() {
        assert!(matches!(
            error_of("a = {x = 1}\na.y = 2").kind,
            DiagnosticKind::InlineTableExtended { .. }
        ));
        assert!(matches!(
            error_of("a = {x = 1}\n[a.b]").kind,
            DiagnosticKind::InlineTableExtended { .. }
        ));
        assert!(matches!(
            error_of("a = {x = 1}\n[a]").kind,
            DiagnosticKind::InlineTableExtended { .. }
        ));
        assert!(matches!(
            error_of("a = {}\n[[a]]").kind,
            DiagnosticKind::KeyTypeConflict { .. }
        ));
    }

    #[test]
    fn test_static_array_cannot_be_extended() {
        assert!(matches!(
            error_of("a = [{b = 1}]\n[[a]]").kind,
            DiagnosticKind::StaticArrayExtended { .. }
        ));
        assert!(matches!(
            error_of("a = [1]\n[a.b]").kind,
            DiagnosticKind::KeyTypeConflict { .. }
        ));
    }

    #[test]
    fn test_inline_table_grammar() {
        let doc = parse_str("p = { x = 1, y.z = 2, s = { } }").unwrap();
        assert_eq!(doc.at_path_as::<i64>("p.y.z").unwrap(), 2);
        assert!(doc.at_path_as::<&Table>("p.s").unwrap().is_empty());

        assert_eq!(
            error_of("p = { x = 1, }").kind,
            DiagnosticKind::TrailingCommaInInlineTable
        );
        let d = error_of("p = { x = 1,\n y = 2 }");
        assert_eq!(d.kind, DiagnosticKind::NewlineInInlineTable);
        assert_eq!(d.cause.as_deref().map(|c| c.position.column), Some(5));
        assert!(matches!(
            error_of("p = { x = 1, x = 2 }").kind,
            DiagnosticKind::DuplicateKey { .. }
        ));
    }

    #[test]
    fn test_unterminated_constructs_point_at_opening() {
        let d = error_of("x = 1\n[a");
        assert_eq!(d.kind, DiagnosticKind::UnterminatedTableHeader);
        assert_eq!((d.position.line, d.position.column), (2, 1));

        let d = error_of("[[a]\nx = 1");
        assert_eq!(d.kind, DiagnosticKind::UnterminatedArrayHeader);

        let d = error_of("a = [1, 2");
        assert_eq!(d.kind, DiagnosticKind::UnterminatedArray);
        assert_eq!(d.position.column, 5);

        let d = error_of("a = { x = 1");
        assert_eq!(d.kind, DiagnosticKind::UnterminatedInlineTable);
        assert_eq!(d.position.column, 5);
    }

    #[test]
    fn test_arrays_allow_newlines_comments_and_trailing_comma() {
        let doc = parse_str("a = [\n  1, # one\n  2,\n]\n").unwrap();
        assert_eq!(doc.get_homogeneous_array::<i64>("a").unwrap(), vec![1, 2]);
        assert_eq!(doc.warnings().count(), 0);
    }

    #[test]
    fn test_warnings_do_not_abort() {
        let doc = parse_str("a = [1, \"two\", 3.0]\n\"\" = 1\n").unwrap();
        let kinds: Vec<_> = doc.warnings().map(|w| w.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::MixedArray {
                    first: "integer",
                    other: "string"
                },
                DiagnosticKind::EmptyKey,
            ]
        );
        assert_eq!(doc.get_as::<i64>("").unwrap(), 1);
    }

    #[test]
    fn test_invalid_datetime_is_semantic() {
        let d = error_of("d = 2021-02-30");
        assert_eq!(d.category(), crate::diagnostic::Category::Semantic);
        assert_eq!(d.position.column, 5);
    }

    #[test]
    fn test_multiline_key_rejected() {
        assert_eq!(error_of("\"\"\"k\"\"\" = 1").kind, DiagnosticKind::MultilineKey);
    }

    #[test]
    fn test_missing_separator_and_value() {
        assert!(matches!(
            error_of("a 1").kind,
            DiagnosticKind::Expected { expected: "`=`", .. }
        ));
        assert!(matches!(
            error_of("a =\n").kind,
            DiagnosticKind::Expected { expected: "a value", .. }
        ));
        assert!(matches!(
            error_of("a = 1 2").kind,
            DiagnosticKind::Expected { expected: "a newline", .. }
        ));
    }

    #[test]
    fn test_metadata() {
        let doc = parse_str("a = 1\n").unwrap();
        assert_eq!(doc.source_len(), 6);
        assert!(doc.has_trailing_newline());
        let doc = parse_str("a = 1").unwrap();
        assert!(!doc.has_trailing_newline());
        let doc = parse_str("a = 1\r\n").unwrap();
        assert!(doc.has_trailing_newline());
    }

    #[test]
    fn test_comment_after_last_newline_is_not_a_trailing_newline() {
        let doc = parse_str("a = 1\n# note").unwrap();
        assert_eq!(doc.source_len(), 13);
        assert!(!doc.has_trailing_newline());
        assert_eq!(crate::to_string(&doc), "a = 1");
    }

    #[test]
    fn test_nesting_limit() {
        let depth = 10_000;
        let input = format!("a = {}{}\n", "[".repeat(depth), "]".repeat(depth));
        let d = error_of(&input);
        assert_eq!(d.kind, DiagnosticKind::NestingTooDeep { limit: MAX_NESTING });
        assert_eq!(d.position, Position::new(1, 5 + MAX_NESTING, 4 + MAX_NESTING));

        let input = format!("a = {}{}\n", "{ b = ".repeat(depth), "}".repeat(depth));
        assert_eq!(
            error_of(&input).kind,
            DiagnosticKind::NestingTooDeep { limit: MAX_NESTING }
        );

        let input = format!(
            "a = {}{}\n",
            "[".repeat(MAX_NESTING),
            "]".repeat(MAX_NESTING)
        );
        let doc = parse_str(&input).unwrap();
        let mut value = doc.get("a").unwrap();
        for _ in 1..MAX_NESTING {
            value = value.as_array().unwrap().get(0).unwrap();
        }
        assert!(value.as_array().unwrap().is_empty());
    }
}
