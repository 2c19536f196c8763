//! TOML serialization.
//!
//! The [`Serializer`] walks a [`Document`] read-only and writes canonical
//! TOML text.
//!
//! ## Layout
//!
//! Each table writes its plain key/value lines first, then its sections:
//!
//! - a table that is not inline becomes a `[header]` section
//! - an array whose elements are all tables and that was built from
//!   `[[header]]` sections becomes one `[[header]]` section per element
//! - everything else (scalars, static arrays, inline tables) is written on
//!   its key's line
//!
//! A header whose table holds only sub-sections is left out; reading the
//! output back creates that table implicitly.
//!
//! ```rust
//! use unreal_toml::{from_str, to_string};
//!
//! let doc = from_str("a.b.c = 1\n[x]\ny = [1, 2]\n").unwrap();
//! assert_eq!(to_string(&doc), "[a.b]\nc = 1\n\n[x]\ny = [1, 2]\n");
//! ```

use crate::{Array, ArrayKind, Document, QuoteStyle, SerializeOptions, StringStyle, Table, TableKind, Value};
use std::fmt::Write;
use tracing::debug;

/// Writes `document` as TOML text.
///
/// Serialization cannot fail: every [`Document`] has a textual form.
#[must_use]
pub fn serialize(document: &Document, options: &SerializeOptions) -> String {
    debug!(
        keys = document.len(),
        sort_keys = options.sort_keys,
        "serializing document"
    );
    let mut serializer = Serializer::new(options.clone());
    serializer.document(document);
    serializer.into_inner()
}

/// A single value in its inline form, as written after `key = `.
pub(crate) fn inline_value(value: &Value, options: &SerializeOptions) -> String {
    let mut serializer = Serializer::new(options.clone());
    serializer.value(value);
    serializer.into_inner()
}

/// A key segment, bare when possible.
pub(crate) fn format_key(key: &str) -> String {
    if !key.is_empty() && key.chars().all(is_bare_key_char) {
        key.to_string()
    } else {
        let mut out = String::with_capacity(key.len() + 2);
        write_basic(&mut out, key);
        out
    }
}

fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Tables that are written under their own header.
fn is_section(value: &Value) -> bool {
    match value {
        Value::Table(table) => table.kind() != TableKind::Inline,
        Value::Array(array) => array.kind() == ArrayKind::Tables && array.is_array_of_tables(),
        _ => false,
    }
}

/// The TOML serializer.
pub struct Serializer {
    output: String,
    options: SerializeOptions,
}

impl Serializer {
    #[must_use]
    pub fn new(options: SerializeOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes a whole document, honouring its trailing-newline flag.
    pub fn document(&mut self, document: &Document) {
        let mut path = Vec::new();
        self.table_body(document.root(), &mut path);
        if !document.has_trailing_newline() && self.output.ends_with('\n') {
            self.output.pop();
        }
    }

    fn entries<'t>(&self, table: &'t Table) -> Vec<(&'t String, &'t Value)> {
        let mut entries: Vec<_> = table.iter().collect();
        if self.options.sort_keys {
            entries.sort_by(|a, b| a.0.cmp(b.0));
        }
        entries
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth * self.options.indent_width {
            self.output.push(' ');
        }
    }

    /// Key/value lines of `table`, then its sections. `path` holds the
    /// already formatted keys leading to `table`.
    fn table_body(&mut self, table: &Table, path: &mut Vec<String>) {
        let depth = path.len().saturating_sub(1);
        let entries = self.entries(table);

        for (key, value) in entries.iter().filter(|(_, v)| !is_section(v)) {
            self.indent(depth);
            self.output.push_str(&format_key(key));
            self.output.push_str(" = ");
            self.value(value);
            self.output.push('\n');
        }

        for (key, value) in entries.iter().filter(|(_, v)| is_section(v)) {
            path.push(format_key(key));
            match value {
                Value::Table(child) => {
                    let has_lines = child.values().any(|v| !is_section(v));
                    let has_sections = child.values().any(is_section);
                    if has_lines || !has_sections {
                        self.header(path, false);
                    }
                    self.table_body(child, path);
                }
                Value::Array(array) => {
                    for element in array {
                        if let Value::Table(child) = element {
                            self.header(path, true);
                            self.table_body(child, path);
                        }
                    }
                }
                _ => {}
            }
            path.pop();
        }
    }

    fn header(&mut self, path: &[String], array_of_tables: bool) {
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        self.indent(path.len().saturating_sub(1));
        let (open, close) = if array_of_tables {
            ("[[", "]]")
        } else {
            ("[", "]")
        };
        self.output.push_str(open);
        self.output.push_str(&path.join("."));
        self.output.push_str(close);
        self.output.push('\n');
    }

    fn value(&mut self, value: &Value) {
        match value {
            Value::String(s, style) => self.string(s, *style),
            // always decimal; the source base is not kept
            Value::Integer(i, _) => {
                let _ = write!(self.output, "{}", i);
            }
            Value::Float(f) => self.float(*f),
            Value::Boolean(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Value::Datetime(dt) => {
                let _ = write!(self.output, "{}", dt);
            }
            Value::Array(array) => self.inline_array(array),
            Value::Table(table) => self.inline_table(table),
        }
    }

    fn inline_array(&mut self, array: &Array) {
        self.output.push('[');
        for (i, element) in array.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.value(element);
        }
        self.output.push(']');
    }

    fn inline_table(&mut self, table: &Table) {
        if table.is_empty() {
            self.output.push_str("{}");
            return;
        }
        self.output.push_str("{ ");
        for (i, (key, value)) in self.entries(table).into_iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.output.push_str(&format_key(key));
            self.output.push_str(" = ");
            self.value(value);
        }
        self.output.push_str(" }");
    }

    fn float(&mut self, f: f64) {
        if f.is_nan() {
            self.output.push_str("nan");
        } else if f.is_infinite() {
            self.output.push_str(if f > 0.0 { "inf" } else { "-inf" });
        } else {
            let start = self.output.len();
            let _ = write!(self.output, "{:?}", f);
            if !self.output[start..].contains(['.', 'e', 'E']) {
                self.output.push_str(".0");
            }
        }
    }

    fn string(&mut self, s: &str, style: StringStyle) {
        let preferred = match self.options.quote_style {
            QuoteStyle::Basic => StringStyle::Basic,
            QuoteStyle::Literal => StringStyle::Literal,
            QuoteStyle::Preserve => style,
        };
        match preferred {
            StringStyle::Literal if fits_literal(s) => {
                self.output.push('\'');
                self.output.push_str(s);
                self.output.push('\'');
            }
            StringStyle::MultilineLiteral if fits_multiline_literal(s) => {
                // the newline after the delimiter is dropped on read
                self.output.push_str("'''\n");
                self.output.push_str(s);
                self.output.push_str("'''");
            }
            StringStyle::MultilineBasic => {
                self.output.push_str("\"\"\"\n");
                for c in s.chars() {
                    match c {
                        '\n' => self.output.push('\n'),
                        c => push_escaped(&mut self.output, c),
                    }
                }
                self.output.push_str("\"\"\"");
            }
            _ => write_basic(&mut self.output, s),
        }
    }
}

fn write_basic(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        push_escaped(out, c);
    }
    out.push('"');
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        '\u{8}' => out.push_str("\\b"),
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\u{c}' => out.push_str("\\f"),
        '\r' => out.push_str("\\r"),
        c if c < ' ' || c == '\u{7f}' => {
            let _ = write!(out, "\\u{:04X}", u32::from(c));
        }
        c => out.push(c),
    }
}

fn needs_escape(c: char) -> bool {
    (c < ' ' && c != '\t') || c == '\u{7f}'
}

fn fits_literal(s: &str) -> bool {
    !s.chars().any(|c| c == '\'' || needs_escape(c))
}

fn fits_multiline_literal(s: &str) -> bool {
    !s.contains("'''") && !s.chars().any(|c| c != '\n' && needs_escape(c))
}
