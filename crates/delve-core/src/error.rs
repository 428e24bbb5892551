// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy for retrieval, decoding and encoding.
//!
//! Every failure is one of a closed set of kinds:
//!
//! - [`Error::Missing`]: no present, non-null value at the requested path
//! - [`Error::TypeMismatch`]: a value is present but cannot become the requested type
//! - [`Error::Filtered`]: a value was decoded but rejected by a combinator
//! - [`Error::DataCorrupted`]: the parser could not read the input as JSON
//! - [`Error::SerializeFailed`]: the serializer could not write a value
//! - [`Error::Custom`]: domain-specific failures raised by user decoders
//!
//! Paths carried by `Missing` and `TypeMismatch` are always relative to the
//! document root the caller queried. Nested decoders produce errors relative to
//! their own sub-value; [`Error::prefixed`] rebases them on the way out.

use crate::path::Path;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Result alias used across delve.
pub type Result<T> = std::result::Result<T, Error>;

/// Raw input that failed to parse, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Byte buffer input
    Bytes(Vec<u8>),
    /// Text input, as given by the caller
    Text(String),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LIMIT: usize = 64;
        match self {
            Self::Bytes(bytes) => {
                let shown = &bytes[..bytes.len().min(LIMIT)];
                write!(f, "{} bytes: {}", bytes.len(), String::from_utf8_lossy(shown))?;
                if bytes.len() > LIMIT {
                    f.write_str("...")?;
                }
                Ok(())
            }
            Self::Text(text) => {
                let shown: String = text.chars().take(LIMIT).collect();
                write!(f, "{shown:?}")?;
                if shown.len() < text.len() {
                    f.write_str("...")?;
                }
                Ok(())
            }
        }
    }
}

/// Errors raised while locating, decoding or encoding JSON values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No present, non-null value at `path`
    #[error("missing value at {path}")]
    Missing {
        /// The full path that was requested
        path: Path,
    },

    /// The value at `path` cannot be converted to `expected`
    #[error("type mismatch at {path}: expected {expected}, found {}", snippet(.actual))]
    TypeMismatch {
        /// Name of the requested type
        expected: Cow<'static, str>,
        /// The value that was found
        actual: Value,
        /// Where the value was found
        path: Path,
    },

    /// A decoded value was rejected by a filter or unwrap step
    #[error("value {value} of type {type_name} was filtered out")]
    Filtered {
        /// Name of the type the rejected value had, or was meant to become
        type_name: Cow<'static, str>,
        /// Debug rendering of the rejected value
        value: String,
    },

    /// The parser could not read the input as JSON
    #[error("data corrupted: {reason} (input: {input})")]
    DataCorrupted {
        /// The offending input
        input: Input,
        /// Parser diagnostic
        reason: String,
    },

    /// The serializer failed to write a value
    #[error("serialize failed: {reason}")]
    SerializeFailed {
        /// Serializer diagnostic
        reason: String,
    },

    /// Failure raised by user decode logic
    #[error("{reason}")]
    Custom {
        /// Human-readable reason
        reason: String,
    },
}

impl Error {
    /// A `Missing` error at `path`.
    #[must_use]
    pub fn missing(path: impl Into<Path>) -> Self {
        Self::Missing { path: path.into() }
    }

    /// A `TypeMismatch` error.
    #[must_use]
    pub fn type_mismatch(
        expected: impl Into<Cow<'static, str>>,
        actual: Value,
        path: impl Into<Path>,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual,
            path: path.into(),
        }
    }

    /// A `Filtered` error for a rejected value of type `T`.
    #[must_use]
    pub fn filtered<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Self::Filtered {
            type_name: Cow::Borrowed(std::any::type_name::<T>()),
            value: format!("{value:?}"),
        }
    }

    /// A `Filtered` error for an absent value that should have become `T`.
    #[must_use]
    pub fn filtered_none<T: ?Sized>() -> Self {
        Self::Filtered {
            type_name: Cow::Borrowed(std::any::type_name::<T>()),
            value: "None".to_owned(),
        }
    }

    /// A `Custom` error.
    #[must_use]
    pub fn custom(reason: impl fmt::Display) -> Self {
        Self::Custom {
            reason: reason.to_string(),
        }
    }

    /// Rebases a path-carrying error onto `parent`.
    ///
    /// `Missing` and `TypeMismatch` get `parent` prepended to their path; every
    /// other kind is returned unchanged.
    #[must_use]
    pub fn prefixed(self, parent: &Path) -> Self {
        if parent.is_empty() {
            return self;
        }
        match self {
            Self::Missing { path } => Self::Missing {
                path: parent.join(&path),
            },
            Self::TypeMismatch {
                expected,
                actual,
                path,
            } => Self::TypeMismatch {
                expected,
                actual,
                path: parent.join(&path),
            },
            other => other,
        }
    }

    /// The path this error refers to, if it carries one.
    #[must_use]
    pub const fn path(&self) -> Option<&Path> {
        match self {
            Self::Missing { path } | Self::TypeMismatch { path, .. } => Some(path),
            _ => None,
        }
    }

    /// True for any `Missing` error.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    /// True when this is `Missing` at exactly `path`.
    #[must_use]
    pub fn is_missing_at(&self, path: &Path) -> bool {
        matches!(self, Self::Missing { path: p } if p == path)
    }

    /// True for any `TypeMismatch` error.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// True for any `Filtered` error.
    #[must_use]
    pub const fn is_filtered(&self) -> bool {
        matches!(self, Self::Filtered { .. })
    }
}

fn snippet(value: &Value) -> String {
    const LIMIT: usize = 80;
    let text = value.to_string();
    if text.len() <= LIMIT {
        return text;
    }
    let mut end = LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    #[test]
    fn test_prefixed_rebases_path_errors() {
        let parent = path!["user"];
        let missing = Error::missing(path!["contact", "email"]).prefixed(&parent);
        assert_eq!(missing, Error::missing(path!["user", "contact", "email"]));

        let mismatch = Error::type_mismatch("i64", json!("x"), path!["id"]).prefixed(&parent);
        assert_eq!(mismatch.path(), Some(&path!["user", "id"]));
    }

    #[test]
    fn test_prefixed_leaves_other_kinds() {
        let parent = path!["user"];
        let filtered = Error::filtered(&5_i64);
        assert_eq!(filtered.clone().prefixed(&parent), filtered);
        let custom = Error::custom("bad");
        assert_eq!(custom.clone().prefixed(&parent), custom);
    }

    #[test]
    fn test_is_missing_at() {
        let err = Error::missing(path!["a", "b"]);
        assert!(err.is_missing());
        assert!(err.is_missing_at(&path!["a", "b"]));
        assert!(!err.is_missing_at(&path!["a"]));
        assert!(!Error::custom("x").is_missing());
    }

    #[test]
    fn test_display() {
        let err = Error::type_mismatch("i64", json!("thatstring"), "int_key");
        assert_eq!(
            err.to_string(),
            "type mismatch at int_key: expected i64, found \"thatstring\""
        );
        assert_eq!(
            Error::missing(path!["user", "name"]).to_string(),
            "missing value at user.name"
        );
        assert_eq!(
            Error::filtered_none::<String>().to_string(),
            "value None of type alloc::string::String was filtered out"
        );
    }

    #[test]
    fn test_input_display_truncates() {
        let text = Input::Text("x".repeat(100));
        assert!(text.to_string().ends_with("..."));
        let bytes = Input::Bytes(b"{oops".to_vec());
        assert_eq!(bytes.to_string(), "5 bytes: {oops");
    }
}
