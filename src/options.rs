//! Configuration options for TOML serialization.
//!
//! - [`SerializeOptions`]: main configuration struct
//! - [`QuoteStyle`]: preferred quoting for string values
//!
//! Options are cosmetic. Every combination produces text that reads back
//! to the same value tree.
//!
//! ## Examples
//!
//! ```rust
//! use unreal_toml::{from_str, to_string_with_options, QuoteStyle, SerializeOptions};
//!
//! let doc = from_str("b = 'x'\na = \"y\"\n").unwrap();
//!
//! let options = SerializeOptions::new()
//!     .with_sort_keys(true)
//!     .with_quote_style(QuoteStyle::Literal);
//! assert_eq!(to_string_with_options(&doc, &options), "a = 'y'\nb = 'x'\n");
//! ```

/// Preferred quoting for string values.
///
/// A string the requested style cannot hold (a literal string containing
/// `'` or a control character, say) falls back to a basic string.
///
/// # Examples
///
/// ```rust
/// use unreal_toml::QuoteStyle;
///
/// assert_eq!(QuoteStyle::default(), QuoteStyle::Basic);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    /// `"..."` with escapes.
    #[default]
    Basic,
    /// `'...'` without escapes.
    Literal,
    /// Whatever style the string was read with.
    Preserve,
}

/// Configuration options for TOML serialization.
///
/// # Examples
///
/// ```rust
/// use unreal_toml::{QuoteStyle, SerializeOptions};
///
/// // Flat output, insertion order, basic strings
/// let options = SerializeOptions::new();
/// assert_eq!(options.indent_width, 0);
///
/// // Nested headers indented by two spaces per level
/// let options = SerializeOptions::pretty();
/// assert_eq!(options.indent_width, 2);
///
/// let options = SerializeOptions::new()
///     .with_indent_width(4)
///     .with_sort_keys(true)
///     .with_quote_style(QuoteStyle::Preserve);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SerializeOptions {
    /// Spaces per nesting level in front of table headers and their entries.
    pub indent_width: usize,
    /// Emit table entries in lexicographic key order instead of insertion order.
    pub sort_keys: bool,
    pub quote_style: QuoteStyle,
}

impl SerializeOptions {
    /// Creates default options (no indentation, insertion order, basic strings).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that indent nested tables by two spaces per level.
    #[must_use]
    pub fn pretty() -> Self {
        SerializeOptions {
            indent_width: 2,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    #[must_use]
    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    #[must_use]
    pub fn with_quote_style(mut self, quote_style: QuoteStyle) -> Self {
        self.quote_style = quote_style;
        self
    }
}
