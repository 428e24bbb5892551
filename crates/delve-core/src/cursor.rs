// SPDX-License-Identifier: MIT OR Apache-2.0
//! Focus cursors: a document paired with a base path.

use crate::decode::Decode;
use crate::error::Result;
use crate::json::JsonRef;
use crate::path::Path;
use std::collections::HashMap;

/// A reusable view of `root` at a fixed base path.
///
/// Lookups through a cursor take paths relative to the base but report errors
/// with the full path from `root`, exactly as if the caller had spelled out
/// the whole path.
///
/// ```
/// use delve_core::{Json, path};
///
/// let json = Json::parse(r#"{"user": {"id": 1, "name": "ann"}}"#).unwrap();
/// let user = json.focus("user");
/// assert_eq!(user.decode::<u32>("id").unwrap(), 1);
/// assert_eq!(user.decode::<String>("name").unwrap(), "ann");
/// let err = user.decode::<String>("email").unwrap_err();
/// assert!(err.is_missing_at(&path!["user", "email"]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor<'a> {
    root: JsonRef<'a>,
    base: Path,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(root: JsonRef<'a>, base: Path) -> Self {
        Self { root, base }
    }

    /// The base path, relative to the document root.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, relative: impl Into<Path>) -> Path {
        self.base.join(&relative.into())
    }

    /// The raw value at the base path.
    ///
    /// # Errors
    ///
    /// `Missing` or `TypeMismatch` if the base path does not resolve.
    pub fn get(&self) -> Result<JsonRef<'a>> {
        self.root.get(&self.base)
    }

    /// True when the base path resolves to a present value.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.root.contains(&self.base)
    }

    /// Decodes the value at `relative` below the base.
    ///
    /// # Errors
    ///
    /// See [`JsonRef::decode`].
    pub fn decode<T: Decode>(&self, relative: impl Into<Path>) -> Result<T> {
        self.root.decode_at(&self.resolve(relative))
    }

    /// Optional decode below the base; `None` only when that exact path is
    /// absent.
    ///
    /// # Errors
    ///
    /// See [`JsonRef::option`].
    pub fn option<T: Decode>(&self, relative: impl Into<Path>) -> Result<Option<T>> {
        self.root.option_at(&self.resolve(relative))
    }

    /// Decodes every element of the array at `relative`.
    ///
    /// # Errors
    ///
    /// See [`JsonRef::decode_array`].
    pub fn decode_array<T: Decode>(&self, relative: impl Into<Path>) -> Result<Vec<T>> {
        self.decode(relative)
    }

    /// Decodes every member of the object at `relative`.
    ///
    /// # Errors
    ///
    /// See [`JsonRef::decode_map`].
    pub fn decode_map<T: Decode>(&self, relative: impl Into<Path>) -> Result<HashMap<String, T>> {
        self.decode(relative)
    }

    /// A cursor further down, at `relative` below this one.
    #[must_use]
    pub fn focus(&self, relative: impl Into<Path>) -> Self {
        Self::new(self.root, self.resolve(relative))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, Json, path};
    use serde_json::json;

    fn doc() -> Json {
        Json::new(json!({
            "users": [
                {"name": "ann", "tags": ["a", "b"], "meta": {"k": 1}},
                {"name": 7}
            ]
        }))
    }

    #[test]
    fn test_cursor_relative_lookups() {
        let json = doc();
        let first = json.focus(path!["users", 0]);
        assert_eq!(first.path(), &path!["users", 0]);
        assert!(first.exists());
        assert_eq!(first.decode::<String>("name").unwrap(), "ann");
        assert_eq!(first.decode_array::<String>("tags").unwrap(), ["a", "b"]);
        assert_eq!(first.decode_map::<i32>("meta").unwrap()["k"], 1);
        assert_eq!(first.option::<String>("email").unwrap(), None);
    }

    #[test]
    fn test_cursor_errors_carry_full_path() {
        let json = doc();
        let second = json.focus(path!["users", 1]);
        assert_eq!(
            second.decode::<String>("name"),
            Err(Error::type_mismatch(
                "String",
                json!(7),
                path!["users", 1, "name"]
            ))
        );
        let nested = second.focus("meta");
        assert!(!nested.exists());
        assert_eq!(
            nested.decode::<i32>("k"),
            Err(Error::missing(path!["users", 1, "meta", "k"]))
        );
        assert!(nested.get().unwrap_err().is_missing_at(&path!["users", 1, "meta"]));
    }
}
