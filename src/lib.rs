//! # unreal_toml
//!
//! A TOML 1.0 document reader and writer for engine-side configuration.
//!
//! ## Pipeline
//!
//! ```text
//! bytes ─► scanner::scan ─► tokens ─► parser::parse ─► Document ─► ser::serialize ─► text
//!                 │                          │
//!                 └────────── Diagnostics ◄──┘
//! ```
//!
//! Reading either yields a complete [`Document`] or a [`Diagnostics`]
//! collection whose first error says what went wrong and where. A partial
//! document is never returned. Advisory warnings (mixed-type arrays, empty
//! keys) travel with a successful document instead.
//!
//! ## Key Features
//!
//! - **Typed values**: strings, 64-bit integers, floats, booleans, the four
//!   date/time forms, arrays and tables, each a distinct [`Value`] variant
//! - **Positioned diagnostics**: 1-based line and column plus a cause chain
//!   pointing at the first definition of a duplicated key
//! - **Round-trip safe**: serializing a parsed document and reading it back
//!   yields an equal value tree
//! - **Typed accessors**: `get_as`, `get_or`, `at_path("servers[0].port")`
//!   return caller [`Error`]s a consumer can match on
//!
//! ## Quick Start
//!
//! ```rust
//! use unreal_toml::{from_str, to_string};
//!
//! let doc = from_str(r#"
//! title = "Demo"
//!
//! [server]
//! host = "localhost"
//! ports = [8080, 8081]
//! "#).unwrap();
//!
//! assert_eq!(doc.at_path_as::<&str>("server.host").unwrap(), "localhost");
//! assert_eq!(doc.at_path_as::<i64>("server.ports[1]").unwrap(), 8081);
//! assert_eq!(doc.get_or("missing", 3_i64), 3);
//!
//! let text = to_string(&doc);
//! assert_eq!(from_str(&text).unwrap(), doc);
//! ```
//!
//! ### Diagnostics
//!
//! ```rust
//! use unreal_toml::{diagnostic, from_str};
//!
//! let err = from_str("[server]\nport = 80\nport = 81\n").unwrap_err();
//! let first = err.first_error().unwrap();
//! assert_eq!(
//!     diagnostic::format(first),
//!     "error[structural] at line 3, column 1: duplicate key `port`\n  note at line 2, column 1: first defined here"
//! );
//! ```
//!
//! ### Building Documents with toml! Macro
//!
//! ```rust
//! use unreal_toml::{toml, to_string, Document, Table};
//!
//! let mut root = Table::new();
//! root.insert("name", "engine");
//! root.insert("limits", toml!({ "fps": 120, "vsync": true }));
//!
//! let doc = Document::new(root);
//! assert_eq!(to_string(&doc), "name = \"engine\"\nlimits = { fps = 120, vsync = true }\n");
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events at the scan, parse and serialize
//! boundaries and never installs a subscriber.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - read, query and write a document
//! - **`typed_access.rs`** - accessors, defaults and paths
//! - **`custom_options.rs`** - indentation, key order and quoting
//! - **`diagnostics.rs`** - what malformed input reports
//!
//! Run any example with: `cargo run --example <name>`

pub mod array;
pub mod datetime;
pub mod diagnostic;
pub mod document;
pub mod error;
pub mod macros;
pub mod options;
pub mod parser;
pub mod scanner;
pub mod ser;
pub mod table;
pub mod token;
pub mod value;

pub use array::{Array, ArrayKind};
pub use datetime::{Datetime, DatetimeKind, Offset};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use document::Document;
pub use error::{Error, Result};
pub use options::{QuoteStyle, SerializeOptions};
pub use ser::Serializer;
pub use table::{Table, TableKind};
pub use token::{Position, Token, TokenKind};
pub use value::{FromValue, IntegerBase, StringStyle, Value};

use std::io;
use tracing::{debug, error};

/// Reads a TOML document from a string.
///
/// # Examples
///
/// ```rust
/// use unreal_toml::from_str;
///
/// let doc = from_str("answer = 42").unwrap();
/// assert_eq!(doc.get_as::<i64>("answer").unwrap(), 42);
/// ```
///
/// # Errors
///
/// Returns every diagnostic collected up to and including the first error.
pub fn from_str(s: &str) -> std::result::Result<Document, Diagnostics> {
    from_slice(s.as_bytes())
}

/// Reads a TOML document from raw bytes.
///
/// # Errors
///
/// Invalid UTF-8 is reported as a lexical diagnostic at the offending byte,
/// otherwise as [`from_str`].
pub fn from_slice(v: &[u8]) -> std::result::Result<Document, Diagnostics> {
    let (tokens, diagnostics) = scanner::scan(v);
    if diagnostics.has_errors() {
        debug!(errors = diagnostics.errors().count(), "scan failed");
        return Err(diagnostics);
    }
    parser::parse(tokens)
}

/// Reads a TOML document from an I/O stream.
///
/// # Errors
///
/// [`Error::Io`] if reading fails, [`Error::Parse`] if the text is not
/// valid TOML.
pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Document> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(from_slice(&bytes)?)
}

/// Reads a document, logging failure instead of returning it.
///
/// Each error is logged through `tracing::error!` and `None` is returned.
///
/// ```rust
/// assert!(unreal_toml::load_str("a = ").is_none());
/// assert!(unreal_toml::load_str("a = 1").is_some());
/// ```
#[must_use]
pub fn load_str(s: &str) -> Option<Document> {
    match from_str(s) {
        Ok(document) => Some(document),
        Err(diagnostics) => {
            for diagnostic in diagnostics.errors() {
                error!(%diagnostic, "Failed to parse TOML string");
            }
            None
        }
    }
}

/// Writes a document as TOML text with default options.
///
/// # Examples
///
/// ```rust
/// use unreal_toml::{to_string, Document, Table};
///
/// let mut root = Table::new();
/// root.insert("x", 1);
/// assert_eq!(to_string(&Document::new(root)), "x = 1\n");
/// ```
#[must_use]
pub fn to_string(document: &Document) -> String {
    ser::serialize(document, &SerializeOptions::default())
}

/// Writes a document as TOML text with custom options.
#[must_use]
pub fn to_string_with_options(document: &Document, options: &SerializeOptions) -> String {
    ser::serialize(document, options)
}

/// Writes a document to a writer with default options.
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W: io::Write>(writer: W, document: &Document) -> Result<()> {
    to_writer_with_options(writer, document, &SerializeOptions::default())
}

/// Writes a document to a writer with custom options.
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W: io::Write>(
    mut writer: W,
    document: &Document,
    options: &SerializeOptions,
) -> Result<()> {
    let text = ser::serialize(document, options);
    writer.write_all(text.as_bytes())?;
    Ok(())
}
