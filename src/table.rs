//! Ordered tables and the typed accessors downstream code reads through.
//!
//! [`Table`] keeps insertion order (it is backed by [`IndexMap`]) so a
//! parsed document re-serializes with its keys where the author put them.
//! Each table also remembers how it was defined ([`TableKind`]), which the
//! parser uses to enforce TOML's redefinition rules and the serializer uses
//! to pick between `[header]` sections and `{ inline }` tables.
//!
//! ## Examples
//!
//! ```rust
//! use unreal_toml::from_str;
//!
//! let doc = from_str(r#"
//! [server]
//! host = "localhost"
//! ports = [8000, 8001]
//!
//! [[server.mirror]]
//! host = "eu"
//! "#).unwrap();
//!
//! assert_eq!(doc.at_path_as::<&str>("server.host").unwrap(), "localhost");
//! assert_eq!(doc.at_path_as::<i64>("server.ports[1]").unwrap(), 8001);
//! assert_eq!(doc.at_path_as::<&str>("server.mirror[0].host").unwrap(), "eu");
//! assert_eq!(doc.get_or("timeout", 30), 30);
//! ```

use crate::{Array, Error, FromValue, Result, Value};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// How a table came into existence.
///
/// Ignored by equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TableKind {
    /// Created as a side effect of a longer header such as `[a.b]` creating `a`,
    /// or built in code.
    #[default]
    Implicit,
    /// Defined by its own `[header]`.
    Header,
    /// Created by a dotted key such as `a.b = 1`.
    Dotted,
    /// A `{ ... }` literal; closed once its brace is read.
    Inline,
    /// One element of a `[[header]]` array.
    ArrayElement,
}

/// An ordered map from keys to values.
///
/// # Examples
///
/// ```rust
/// use unreal_toml::{Table, Value};
///
/// let mut table = Table::new();
/// table.insert("first", 1);
/// table.insert("second", "two");
///
/// let keys: Vec<_> = table.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// assert_eq!(table.get_as::<i64>("first").unwrap(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub(crate) entries: IndexMap<String, Value>,
    pub(crate) kind: TableKind,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Table::default()
    }

    #[must_use]
    pub fn with_kind(kind: TableKind) -> Self {
        Table {
            entries: IndexMap::new(),
            kind,
        }
    }

    /// Creates an empty inline table, serialized as `{ ... }`.
    #[must_use]
    pub fn inline() -> Self {
        Table::with_kind(TableKind::Inline)
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: TableKind) {
        self.kind = kind;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Inserts a value, returning the one it replaced.
    ///
    /// This is the programmatic builder; the duplicate-key rules apply only
    /// to parsed text.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.entries.values()
    }

    /// Returns an iterator over the entries, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.entries.iter_mut()
    }

    /// Reads `key` as `T`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingKey`] when the key is absent, otherwise whatever
    /// [`FromValue`] reports, tagged with `key`.
    pub fn get_as<'a, T: FromValue<'a>>(&'a self, key: &str) -> Result<T> {
        let value = self.get(key).ok_or_else(|| Error::missing_key(key))?;
        T::from_value(value).map_err(|e| e.at_key(key))
    }

    /// Reads `key` as `T`, falling back to `default` when the key is missing
    /// or holds another type.
    ///
    /// ```rust
    /// use unreal_toml::from_str;
    ///
    /// let doc = from_str("volume = 0.5\nmuted = \"no\"").unwrap();
    /// assert_eq!(doc.get_or("volume", 1.0), 0.5);
    /// assert_eq!(doc.get_or("muted", false), false);
    /// assert_eq!(doc.get_or("missing", 7), 7);
    /// ```
    pub fn get_or<'a, T: FromValue<'a>>(&'a self, key: &str, default: T) -> T {
        self.get_as(key).unwrap_or(default)
    }

    /// # Errors
    ///
    /// [`Error::MissingKey`] or [`Error::TypeMismatch`].
    pub fn get_table(&self, key: &str) -> Result<&Table> {
        self.get_as(key)
    }

    /// # Errors
    ///
    /// [`Error::MissingKey`] or [`Error::TypeMismatch`].
    pub fn get_array(&self, key: &str) -> Result<&Array> {
        self.get_as(key)
    }

    /// Reads an array whose elements all convert to `T`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingKey`]; [`Error::TypeMismatch`] when `key` is not an
    /// array or when an element has another type (the error's key names the
    /// element, e.g. `sizes[2]`).
    pub fn get_homogeneous_array<'a, T: FromValue<'a>>(&'a self, key: &str) -> Result<Vec<T>> {
        let array = self.get_array(key)?;
        array
            .iter()
            .enumerate()
            .map(|(i, item)| T::from_value(item).map_err(|e| e.at_key(&format!("{}[{}]", key, i))))
            .collect()
    }

    /// Looks up a value by a path such as `servers[0].host`.
    ///
    /// Segments are bare keys (or `"quoted"` keys) separated by `.`; `[n]`
    /// indexes into an array.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPath`] for a malformed path, and the usual missing-key,
    /// type-mismatch and out-of-bounds errors while walking it.
    pub fn at_path(&self, path: &str) -> Result<&Value> {
        let steps = parse_path(path)?;
        let mut walked = String::new();
        let mut current: Option<&Value> = None;

        for step in steps {
            let next = match step {
                PathStep::Key(key) => {
                    let table = match current {
                        None => self,
                        Some(Value::Table(table)) => table,
                        Some(other) => {
                            return Err(Error::type_mismatch(walked, "table", other.type_name()))
                        }
                    };
                    if !walked.is_empty() {
                        walked.push('.');
                    }
                    walked.push_str(key);
                    table
                        .get(key)
                        .ok_or_else(|| Error::missing_key(walked.as_str()))?
                }
                PathStep::Index(index) => {
                    let array = match current {
                        Some(Value::Array(array)) => array,
                        Some(other) => {
                            return Err(Error::type_mismatch(walked, "array", other.type_name()))
                        }
                        None => return Err(Error::invalid_path(path, "path starts with an index")),
                    };
                    walked.push_str(&format!("[{}]", index));
                    array.get(index).ok_or(Error::IndexOutOfBounds {
                        index,
                        len: array.len(),
                    })?
                }
            };
            current = Some(next);
        }

        current.ok_or_else(|| Error::invalid_path(path, "empty path"))
    }

    /// # Errors
    ///
    /// See [`Table::at_path`] and [`Table::get_as`].
    pub fn at_path_as<'a, T: FromValue<'a>>(&'a self, path: &str) -> Result<T> {
        T::from_value(self.at_path(path)?).map_err(|e| e.at_key(path))
    }

    pub fn at_path_or<'a, T: FromValue<'a>>(&'a self, path: &str, default: T) -> T {
        self.at_path_as(path).unwrap_or(default)
    }

    /// Looks up the table at `path`, e.g. `servers[0]`.
    ///
    /// # Errors
    ///
    /// See [`Table::at_path`]; a non-table value is a type mismatch.
    pub fn table_at_path(&self, path: &str) -> Result<&Table> {
        self.at_path_as(path)
    }
}

#[derive(Debug, PartialEq)]
enum PathStep<'p> {
    Key(&'p str),
    Index(usize),
}

fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn parse_path(path: &str) -> Result<Vec<PathStep<'_>>> {
    let mut steps = Vec::new();
    let mut rest = path;

    loop {
        // one key segment
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted
                .find('"')
                .ok_or_else(|| Error::invalid_path(path, "unterminated quoted key"))?;
            steps.push(PathStep::Key(&quoted[..end]));
            rest = &quoted[end + 1..];
        } else {
            let end = rest.find(|c| !is_bare_key_char(c)).unwrap_or(rest.len());
            if end == 0 {
                return Err(Error::invalid_path(path, "expected a key"));
            }
            steps.push(PathStep::Key(&rest[..end]));
            rest = &rest[end..];
        }

        // any number of [n] suffixes
        while let Some(inner) = rest.strip_prefix('[') {
            let close = inner
                .find(']')
                .ok_or_else(|| Error::invalid_path(path, "unterminated index"))?;
            let index = inner[..close]
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::invalid_path(path, "index is not a non-negative integer"))?;
            steps.push(PathStep::Index(index));
            rest = &inner[close + 1..];
        }

        match rest.strip_prefix('.') {
            Some(next) => rest = next,
            None if rest.is_empty() => return Ok(steps),
            None => return Err(Error::invalid_path(path, "expected `.` or `[`")),
        }
    }
}

impl PartialEq for Table {
    /// Compares entries only; key order and [`TableKind`] are presentation.
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Table {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Table {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Table {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            kind: TableKind::Implicit,
        }
    }
}
