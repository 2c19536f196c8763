//! Caller-facing errors.
//!
//! Reading a document fails with [`Diagnostics`]; this module covers what
//! happens after that, when a consumer asks a [`Table`](crate::Table) or
//! [`Array`](crate::Array) for something it does not hold. A missing
//! optional key is routine, so these are plain values the caller can match
//! on and replace with a default.
//!
//! ## Error Categories
//!
//! - **Missing keys**: the key or path segment is absent
//! - **Type mismatches**: the value exists but has another type
//! - **Range errors**: an index past the end, or a number too wide for the target
//! - **Path errors**: a malformed `a.b[0].c` path string
//!
//! ## Examples
//!
//! ```rust
//! use unreal_toml::{from_str, Error};
//!
//! let doc = from_str("port = \"eighty\"").unwrap();
//! match doc.get_as::<i64>("port") {
//!     Err(Error::TypeMismatch { key, expected, found }) => {
//!         assert_eq!(key, "port");
//!         assert_eq!(expected, "integer");
//!         assert_eq!(found, "string");
//!     }
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use crate::diagnostic::Diagnostics;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("missing key `{key}`")]
    MissingKey { key: String },

    #[error("type mismatch at `{key}`: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("value {value} at `{key}` does not fit in {target}")]
    OutOfRange {
        key: String,
        value: String,
        target: &'static str,
    },

    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    /// The document could not be read.
    #[error("{0}")]
    Parse(#[from] Diagnostics),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Creates a missing-key error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unreal_toml::Error;
    ///
    /// let err = Error::missing_key("server.port");
    /// assert_eq!(err.to_string(), "missing key `server.port`");
    /// ```
    pub fn missing_key(key: impl Into<String>) -> Self {
        Error::MissingKey { key: key.into() }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unreal_toml::Error;
    ///
    /// let err = Error::type_mismatch("name", "string", "integer");
    /// assert!(err.to_string().contains("expected string"));
    /// ```
    pub fn type_mismatch(key: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Error::TypeMismatch {
            key: key.into(),
            expected,
            found,
        }
    }

    pub fn out_of_range(key: impl Into<String>, value: String, target: &'static str) -> Self {
        Error::OutOfRange {
            key: key.into(),
            value,
            target,
        }
    }

    pub fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Fills in the key of an error raised by [`FromValue`](crate::FromValue),
    /// which does not know where the value came from.
    #[must_use]
    pub fn at_key(self, at: &str) -> Self {
        match self {
            Error::TypeMismatch {
                key,
                expected,
                found,
            } if key.is_empty() => Error::TypeMismatch {
                key: at.to_string(),
                expected,
                found,
            },
            Error::OutOfRange { key, value, target } if key.is_empty() => Error::OutOfRange {
                key: at.to_string(),
                value,
                target,
            },
            other => other,
        }
    }

    /// Returns `true` for [`Error::MissingKey`].
    #[must_use]
    pub fn is_missing_key(&self) -> bool {
        matches!(self, Error::MissingKey { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
