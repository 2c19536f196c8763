//! Arrays, both static (`[1, 2]`) and arrays of tables (`[[name]]`).

use crate::{Error, FromValue, Result, Value};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// How an array was written.
///
/// Ignored by equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ArrayKind {
    /// A `[ ... ]` literal. Closed once its bracket is read.
    #[default]
    Inline,
    /// Built from `[[header]]` sections; each element is a table.
    Tables,
}

/// An ordered sequence of values.
///
/// TOML 1.0 allows mixed element types; [`Array::is_homogeneous`] tells a
/// consumer whether it can read every element as one type.
///
/// # Examples
///
/// ```rust
/// use unreal_toml::{Array, Value};
///
/// let array = Array::from(vec![Value::from(1), Value::from(2)]);
/// assert_eq!(array.get_as::<i64>(1).unwrap(), 2);
/// assert!(array.get_as::<i64>(2).is_err());
/// assert!(array.is_homogeneous());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Array {
    pub(crate) items: Vec<Value>,
    pub(crate) kind: ArrayKind,
}

impl Array {
    #[must_use]
    pub fn new() -> Self {
        Array::default()
    }

    #[must_use]
    pub fn with_kind(kind: ArrayKind) -> Self {
        Array {
            items: Vec::new(),
            kind,
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ArrayKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ArrayKind) {
        self.kind = kind;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    /// Reads element `index` as `T`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] past the end, otherwise whatever
    /// [`FromValue`] reports, tagged with `[index]`.
    pub fn get_as<'a, T: FromValue<'a>>(&'a self, index: usize) -> Result<T> {
        let value = self.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.len(),
        })?;
        T::from_value(value).map_err(|e| e.at_key(&format!("[{}]", index)))
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.items.iter_mut()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Returns `true` when every element has the same TOML type.
    ///
    /// An empty array is homogeneous.
    #[must_use]
    pub fn is_homogeneous(&self) -> bool {
        match self.items.split_first() {
            Some((first, rest)) => rest.iter().all(|v| v.type_name() == first.type_name()),
            None => true,
        }
    }

    /// Returns `true` for a non-empty array whose elements are all tables.
    #[must_use]
    pub fn is_array_of_tables(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(Value::is_table)
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Array {
            items,
            kind: ArrayKind::Inline,
        }
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Array::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for Array {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in &self.items {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Table;

    #[test]
    fn test_bounds_checked_access() {
        let array: Array = vec![1, 2, 3].into_iter().collect();
        assert_eq!(array.get_as::<i64>(0).unwrap(), 1);
        assert_eq!(
            array.get_as::<i64>(3).unwrap_err(),
            Error::IndexOutOfBounds { index: 3, len: 3 }
        );
        assert_eq!(
            array.get_as::<bool>(1).unwrap_err(),
            Error::type_mismatch("[1]", "boolean", "integer")
        );
    }

    #[test]
    fn test_homogeneity() {
        let mixed = Array::from(vec![Value::from(1), Value::from("a")]);
        assert!(!mixed.is_homogeneous());
        assert!(Array::new().is_homogeneous());

        // int and float are distinct TOML types
        let numbers = Array::from(vec![Value::from(1), Value::from(1.5)]);
        assert!(!numbers.is_homogeneous());
    }

    #[test]
    fn test_equality_ignores_kind() {
        let mut tables = Array::with_kind(ArrayKind::Tables);
        tables.push(Table::new());
        let inline = Array::from(vec![Value::from(Table::new())]);
        assert_eq!(tables, inline);
        assert!(tables.is_array_of_tables());
    }
}
