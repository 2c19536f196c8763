//! A parsed document: the root table plus what the serializer needs to
//! reproduce the source faithfully.

use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::Table;
use serde::{Serialize, Serializer};
use std::ops::{Deref, DerefMut};

/// The root [`Table`] of a TOML document together with source metadata.
///
/// A `Document` dereferences to its root table, so every [`Table`] accessor
/// works on it directly.
///
/// # Examples
///
/// ```rust
/// use unreal_toml::from_str;
///
/// let doc = from_str("title = \"demo\"\n").unwrap();
/// assert_eq!(doc.get_as::<&str>("title").unwrap(), "demo");
/// assert_eq!(doc.source_len(), 15);
/// assert!(doc.has_trailing_newline());
/// ```
#[derive(Clone, Debug)]
pub struct Document {
    root: Table,
    source_len: usize,
    trailing_newline: bool,
    warnings: Diagnostics,
}

impl Document {
    /// Wraps a table built in code. Serialization ends with a newline.
    #[must_use]
    pub fn new(root: Table) -> Self {
        Document {
            root,
            source_len: 0,
            trailing_newline: true,
            warnings: Diagnostics::new(),
        }
    }

    pub(crate) fn from_parts(
        root: Table,
        source_len: usize,
        trailing_newline: bool,
        warnings: Diagnostics,
    ) -> Self {
        Document {
            root,
            source_len,
            trailing_newline,
            warnings,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Table {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Table {
        &mut self.root
    }

    #[must_use]
    pub fn into_table(self) -> Table {
        self.root
    }

    /// Length in bytes of the buffer this document was read from; zero for
    /// documents built in code.
    #[must_use]
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    #[must_use]
    pub fn has_trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    pub fn set_trailing_newline(&mut self, trailing_newline: bool) {
        self.trailing_newline = trailing_newline;
    }

    /// Advisory diagnostics collected while reading, in source order.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.warnings.iter()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new(Table::new())
    }
}

impl Deref for Document {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.root
    }
}

impl DerefMut for Document {
    fn deref_mut(&mut self) -> &mut Table {
        &mut self.root
    }
}

/// Documents compare by their value trees only.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl From<Table> for Document {
    fn from(root: Table) -> Self {
        Document::new(root)
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.root.serialize(serializer)
    }
}
