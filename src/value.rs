//! The typed value model.
//!
//! Every TOML value is one [`Value`] variant. Scalars keep a little
//! presentation metadata ([`StringStyle`], [`IntegerBase`]) so a caller can
//! see how a value was written, but equality ignores it: two values are equal
//! when they carry the same data.
//!
//! ## Type Checking
//!
//! ```rust
//! use unreal_toml::Value;
//!
//! let value = Value::from(42);
//! assert!(value.is_integer());
//! assert!(!value.is_string());
//! assert_eq!(value.type_name(), "integer");
//! ```
//!
//! ## Extracting Values
//!
//! ```rust
//! use unreal_toml::{FromValue, Value};
//!
//! let value = Value::from(42);
//! assert_eq!(i64::from_value(&value).unwrap(), 42);
//! assert_eq!(f64::from_value(&value).unwrap(), 42.0);
//! assert!(bool::from_value(&value).is_err());
//! ```

use crate::{Array, Datetime, Error, Result, Table};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// How a string literal was quoted in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum StringStyle {
    /// `"..."`, with escapes.
    #[default]
    Basic,
    /// `'...'`, taken verbatim.
    Literal,
    /// `"""..."""`
    MultilineBasic,
    /// `'''...'''`
    MultilineLiteral,
}

impl StringStyle {
    #[inline]
    #[must_use]
    pub const fn is_multiline(&self) -> bool {
        matches!(self, StringStyle::MultilineBasic | StringStyle::MultilineLiteral)
    }
}

/// The radix an integer literal was written in.
///
/// The serializer always writes decimal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum IntegerBase {
    #[default]
    Decimal,
    Hex,
    Octal,
    Binary,
}

impl IntegerBase {
    #[must_use]
    pub const fn radix(&self) -> u32 {
        match self {
            IntegerBase::Decimal => 10,
            IntegerBase::Hex => 16,
            IntegerBase::Octal => 8,
            IntegerBase::Binary => 2,
        }
    }
}

/// Any TOML value.
///
/// # Examples
///
/// ```rust
/// use unreal_toml::{IntegerBase, StringStyle, Value};
///
/// let hex = Value::Integer(255, IntegerBase::Hex);
/// let dec = Value::from(255);
/// assert_eq!(hex, dec);
///
/// let literal = Value::String("C:\\path".to_string(), StringStyle::Literal);
/// assert_eq!(literal.as_str(), Some("C:\\path"));
/// ```
#[derive(Clone, Debug)]
pub enum Value {
    String(String, StringStyle),
    Integer(i64, IntegerBase),
    /// May hold `nan`, `inf` or `-inf`.
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    Array(Array),
    Table(Table),
}

impl Value {
    /// The lower-case TOML name of this value's type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::String(..) => "string",
            Value::Integer(..) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Datetime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(..))
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(..))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_datetime(&self) -> bool {
        matches!(self, Value::Datetime(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s, _) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i, _) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> Option<&Datetime> {
        match self {
            Value::Datetime(dt) => Some(dt),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    #[inline]
    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    /// The quoting style of a string value.
    #[must_use]
    pub fn string_style(&self) -> Option<StringStyle> {
        match self {
            Value::String(_, style) => Some(*style),
            _ => None,
        }
    }

    /// The radix an integer value was written in.
    #[must_use]
    pub fn integer_base(&self) -> Option<IntegerBase> {
        match self {
            Value::Integer(_, base) => Some(*base),
            _ => None,
        }
    }

    /// Converts this value into `T`, reporting a caller error on mismatch.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] when the value has another type and
    /// [`Error::OutOfRange`] when a number does not fit `T`.
    pub fn get<'a, T: FromValue<'a>>(&'a self) -> Result<T> {
        T::from_value(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a, _), Value::String(b, _)) => a == b,
            (Value::Integer(a, _), Value::Integer(b, _)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Datetime(a), Value::Datetime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Writes the value in its inline TOML form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::inline_value(self, &crate::SerializeOptions::default()))
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(s, _) => serializer.serialize_str(s),
            Value::Integer(i, _) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Datetime(dt) => dt.serialize(serializer),
            Value::Array(arr) => arr.serialize(serializer),
            Value::Table(table) => table.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any value representable in TOML")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Self::Value, E> {
                Ok(Value::Boolean(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value).map(Value::from).map_err(|_| {
                    E::invalid_value(de::Unexpected::Unsigned(value), &"a 64-bit signed integer")
                })
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Self::Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Err(E::invalid_type(de::Unexpected::Unit, &self))
            }

            fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Err(E::invalid_type(de::Unexpected::Option, &self))
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    items.push(elem);
                }
                Ok(Value::Array(Array::from(items)))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut table = Table::new();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    table.insert(key, value);
                }
                Ok(Value::Table(table))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Typed extraction from a borrowed [`Value`].
///
/// Implemented for the scalar types a configuration consumer asks for and
/// for borrowed views of strings, tables, arrays and date-times. The
/// returned errors carry no key; [`Table`] and [`Array`] accessors attach
/// one before handing the error to the caller.
pub trait FromValue<'a>: Sized {
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] or [`Error::OutOfRange`].
    fn from_value(value: &'a Value) -> Result<Self>;
}

fn mismatch(expected: &'static str, value: &Value) -> Error {
    Error::type_mismatch("", expected, value.type_name())
}

impl<'a> FromValue<'a> for &'a Value {
    fn from_value(value: &'a Value) -> Result<Self> {
        Ok(value)
    }
}

impl<'a> FromValue<'a> for Value {
    fn from_value(value: &'a Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<'a> FromValue<'a> for bool {
    fn from_value(value: &'a Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch("boolean", value))
    }
}

impl<'a> FromValue<'a> for i64 {
    fn from_value(value: &'a Value) -> Result<Self> {
        value.as_integer().ok_or_else(|| mismatch("integer", value))
    }
}

impl<'a> FromValue<'a> for i32 {
    fn from_value(value: &'a Value) -> Result<Self> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| Error::out_of_range("", wide.to_string(), "i32"))
    }
}

/// Integers widen to `f64`, matching how configuration files often write
/// whole-number floats.
impl<'a> FromValue<'a> for f64 {
    fn from_value(value: &'a Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Integer(i, _) => Ok(*i as f64),
            _ => Err(mismatch("float", value)),
        }
    }
}

impl<'a> FromValue<'a> for f32 {
    fn from_value(value: &'a Value) -> Result<Self> {
        let wide = f64::from_value(value)?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(Error::out_of_range("", wide.to_string(), "f32"));
        }
        Ok(wide as f32)
    }
}

impl<'a> FromValue<'a> for &'a str {
    fn from_value(value: &'a Value) -> Result<Self> {
        value.as_str().ok_or_else(|| mismatch("string", value))
    }
}

impl<'a> FromValue<'a> for String {
    fn from_value(value: &'a Value) -> Result<Self> {
        <&str>::from_value(value).map(str::to_string)
    }
}

impl<'a> FromValue<'a> for &'a Datetime {
    fn from_value(value: &'a Value) -> Result<Self> {
        value.as_datetime().ok_or_else(|| mismatch("datetime", value))
    }
}

impl<'a> FromValue<'a> for Datetime {
    fn from_value(value: &'a Value) -> Result<Self> {
        <&Datetime>::from_value(value).copied()
    }
}

impl<'a> FromValue<'a> for &'a Array {
    fn from_value(value: &'a Value) -> Result<Self> {
        value.as_array().ok_or_else(|| mismatch("array", value))
    }
}

impl<'a> FromValue<'a> for &'a Table {
    fn from_value(value: &'a Value) -> Result<Self> {
        value.as_table().ok_or_else(|| mismatch("table", value))
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        i64::from_value(&value)
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        f64::from_value(&value)
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        bool::from_value(&value)
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s, _) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value), IntegerBase::Decimal)
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value, StringStyle::Basic)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string(), StringStyle::Basic)
    }
}

impl From<Datetime> for Value {
    fn from(value: Datetime) -> Self {
        Value::Datetime(value)
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(Array::from(value))
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(value)
    }
}
