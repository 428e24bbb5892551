// SPDX-License-Identifier: MIT OR Apache-2.0
//! The JSON value container and its borrowed view.
//!
//! [`Json`] owns one parsed document and never changes after construction. It is
//! cheap to clone and safe to share between threads. [`JsonRef`] is a borrowed
//! view of any value inside a document; decoders receive one so that nested
//! decoding does not copy sub-trees.

use crate::cursor::Cursor;
use crate::decode::Decode;
use crate::error::{Error, Input, Result};
use crate::path::Path;
use crate::retrieve;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// The shape of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `null`
    Null,
    /// `true` / `false`
    Bool,
    /// Any number
    Number,
    /// A string
    String,
    /// An array
    Array,
    /// An object
    Object,
}

impl Kind {
    /// The kind of `value`.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        })
    }
}

/// An immutable parsed JSON document.
///
/// ```
/// use delve_core::{Error, Json, path};
///
/// let json = Json::parse(r#"{"user": {"id": 200}}"#)?;
/// let id: i64 = json.decode(path!["user", "id"])?;
/// assert_eq!(id, 200);
///
/// let name: Option<String> = json.option(path!["user", "name"])?;
/// assert_eq!(name, None);
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Json {
    root: Arc<Value>,
}

impl Json {
    /// Wraps an already-parsed value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            root: Arc::new(value),
        }
    }

    /// The `null` document.
    #[must_use]
    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    /// Parses a byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataCorrupted`] carrying a copy of `bytes` if they are
    /// not valid JSON.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map(Self::new).map_err(|e| {
            debug!(error = %e, len = bytes.len(), "rejected JSON bytes");
            Error::DataCorrupted {
                input: Input::Bytes(bytes.to_vec()),
                reason: e.to_string(),
            }
        })
    }

    /// Parses text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataCorrupted`] carrying the original text if it is not
    /// valid JSON.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_slice(text.as_bytes())
            .map(Self::new)
            .map_err(|e| {
                debug!(error = %e, len = text.len(), "rejected JSON text");
                Error::DataCorrupted {
                    input: Input::Text(text.to_owned()),
                    reason: e.to_string(),
                }
            })
    }

    /// The wrapped value.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Unwraps the value, copying it only if other clones are alive.
    #[must_use]
    pub fn into_value(self) -> Value {
        Arc::try_unwrap(self.root).unwrap_or_else(|shared| (*shared).clone())
    }

    /// A borrowed view of the whole document.
    #[must_use]
    pub fn view(&self) -> JsonRef<'_> {
        JsonRef::new(&self.root)
    }

    /// The shape of the root value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        Kind::of(&self.root)
    }

    /// The raw value at `path`.
    ///
    /// # Errors
    ///
    /// `Missing` or `TypeMismatch` as described on [`JsonRef::get`].
    pub fn get(&self, path: impl Into<Path>) -> Result<JsonRef<'_>> {
        self.view().get(path)
    }

    /// True when a present, non-null value lives at `path`.
    #[must_use]
    pub fn contains(&self, path: impl Into<Path>) -> bool {
        self.view().contains(path)
    }

    /// Decodes the value at `path` as `T`.
    ///
    /// # Errors
    ///
    /// See [`JsonRef::decode`].
    pub fn decode<T: Decode>(&self, path: impl Into<Path>) -> Result<T> {
        self.view().decode(path)
    }

    /// Decodes the value at `path`, or `None` if that exact path is absent.
    ///
    /// # Errors
    ///
    /// See [`JsonRef::option`].
    pub fn option<T: Decode>(&self, path: impl Into<Path>) -> Result<Option<T>> {
        self.view().option(path)
    }

    /// Decodes every element of the array at `path`.
    ///
    /// # Errors
    ///
    /// See [`JsonRef::decode_array`].
    pub fn decode_array<T: Decode>(&self, path: impl Into<Path>) -> Result<Vec<T>> {
        self.view().decode_array(path)
    }

    /// Decodes every member of the object at `path`.
    ///
    /// # Errors
    ///
    /// See [`JsonRef::decode_map`].
    pub fn decode_map<T: Decode>(&self, path: impl Into<Path>) -> Result<HashMap<String, T>> {
        self.view().decode_map(path)
    }

    /// Optional form of [`Json::decode_array`].
    ///
    /// # Errors
    ///
    /// See [`JsonRef::option`].
    pub fn option_array<T: Decode>(&self, path: impl Into<Path>) -> Result<Option<Vec<T>>> {
        self.view().option_array(path)
    }

    /// Optional form of [`Json::decode_map`].
    ///
    /// # Errors
    ///
    /// See [`JsonRef::option`].
    pub fn option_map<T: Decode>(
        &self,
        path: impl Into<Path>,
    ) -> Result<Option<HashMap<String, T>>> {
        self.view().option_map(path)
    }

    /// A reusable cursor rooted at `path`.
    #[must_use]
    pub fn focus(&self, path: impl Into<Path>) -> Cursor<'_> {
        self.view().focus(path)
    }
}

impl Default for Json {
    fn default() -> Self {
        Self::null()
    }
}

impl From<Value> for Json {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        json.into_value()
    }
}

impl FromStr for Json {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<Value> for Json {
    fn as_ref(&self) -> &Value {
        &self.root
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// A borrowed view of a value inside a document.
///
/// Paths given to a `JsonRef` are relative to the viewed value. Decoders that
/// receive a view and look up fields return errors relative to it; the caller
/// that located the view prefixes them with its own path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsonRef<'a> {
    value: &'a Value,
}

impl<'a> JsonRef<'a> {
    /// A view of `value`.
    #[must_use]
    pub const fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// The viewed value.
    #[must_use]
    pub const fn value(self) -> &'a Value {
        self.value
    }

    /// The shape of the viewed value.
    #[must_use]
    pub const fn kind(self) -> Kind {
        Kind::of(self.value)
    }

    /// Copies the viewed value into an owned document.
    #[must_use]
    pub fn to_json(self) -> Json {
        Json::new(self.value.clone())
    }

    /// The raw value at `path`.
    ///
    /// # Errors
    ///
    /// `Missing` with the full `path` when a step finds no value or `null`;
    /// `TypeMismatch` when a key step meets a non-object or an index step
    /// meets a non-array.
    pub fn get(self, path: impl Into<Path>) -> Result<Self> {
        retrieve::walk(self.value, &path.into()).map(Self::new)
    }

    /// True when a present, non-null value lives at `path`.
    #[must_use]
    pub fn contains(self, path: impl Into<Path>) -> bool {
        self.get(path).is_ok()
    }

    /// Decodes the value at `path` as `T`.
    ///
    /// # Errors
    ///
    /// Retrieval errors from [`JsonRef::get`], or whatever `T`'s decoder
    /// raises, with paths rebased onto `path`.
    pub fn decode<T: Decode>(self, path: impl Into<Path>) -> Result<T> {
        self.decode_at(&path.into())
    }

    /// Like [`JsonRef::decode`] without taking ownership of the path.
    ///
    /// # Errors
    ///
    /// See [`JsonRef::decode`].
    pub fn decode_at<T: Decode>(self, path: &Path) -> Result<T> {
        let found = retrieve::walk(self.value, path)?;
        T::decode(Self::new(found)).map_err(|e| e.prefixed(path))
    }

    /// Decodes the value at `path`, or `None` if that exact path is absent.
    ///
    /// Only a `Missing` error whose path equals `path` becomes `None`. A value
    /// of the wrong type, or a field missing deeper inside `T`, still fails.
    ///
    /// # Errors
    ///
    /// Every failure of [`JsonRef::decode`] other than `Missing` at `path`.
    pub fn option<T: Decode>(self, path: impl Into<Path>) -> Result<Option<T>> {
        self.option_at(&path.into())
    }

    /// Like [`JsonRef::option`] without taking ownership of the path.
    ///
    /// # Errors
    ///
    /// See [`JsonRef::option`].
    pub fn option_at<T: Decode>(self, path: &Path) -> Result<Option<T>> {
        match self.decode_at(path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_missing_at(path) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Decodes every element of the array at `path`; any failing element
    /// fails the whole call.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the value is not an array, otherwise the first
    /// element failure with its index in the path.
    pub fn decode_array<T: Decode>(self, path: impl Into<Path>) -> Result<Vec<T>> {
        self.decode(path)
    }

    /// Decodes every member of the object at `path`; any failing member
    /// fails the whole call.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the value is not an object, otherwise the first
    /// member failure with its key in the path.
    pub fn decode_map<T: Decode>(self, path: impl Into<Path>) -> Result<HashMap<String, T>> {
        self.decode(path)
    }

    /// Optional form of [`JsonRef::decode_array`].
    ///
    /// # Errors
    ///
    /// See [`JsonRef::option`].
    pub fn option_array<T: Decode>(self, path: impl Into<Path>) -> Result<Option<Vec<T>>> {
        self.option(path)
    }

    /// Optional form of [`JsonRef::decode_map`].
    ///
    /// # Errors
    ///
    /// See [`JsonRef::option`].
    pub fn option_map<T: Decode>(
        self,
        path: impl Into<Path>,
    ) -> Result<Option<HashMap<String, T>>> {
        self.option(path)
    }

    /// A reusable cursor rooted at `path`.
    #[must_use]
    pub fn focus(self, path: impl Into<Path>) -> Cursor<'a> {
        Cursor::new(self, path.into())
    }
}

impl<'a> From<&'a Value> for JsonRef<'a> {
    fn from(value: &'a Value) -> Self {
        Self::new(value)
    }
}

impl<'a> From<&'a Json> for JsonRef<'a> {
    fn from(json: &'a Json) -> Self {
        json.view()
    }
}

impl fmt::Display for JsonRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
