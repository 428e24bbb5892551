// SPDX-License-Identifier: MIT OR Apache-2.0
//! Path walk over a parsed value tree.
//!
//! The walk consumes path elements left to right. Every failure reports the
//! full requested path rather than the prefix that was consumed, so callers can
//! compare a `Missing` path with the path they asked for.

use crate::error::{Error, Result};
use crate::path::{Path, PathElement};
use serde_json::Value;
use tracing::trace;

/// Locates the value at `path` below `root`.
///
/// A key step needs an object and an index step needs an array; anything else
/// is a type mismatch. Absent keys, out-of-range indices and explicit `null`s
/// are all `Missing`.
pub(crate) fn walk<'a>(root: &'a Value, path: &Path) -> Result<&'a Value> {
    let mut current = root;
    for element in path {
        let next = match (element, current) {
            (PathElement::Key(key), Value::Object(map)) => map.get(key),
            (PathElement::Index(index), Value::Array(items)) => items.get(*index),
            (PathElement::Key(_), other) => {
                trace!(%path, found = %crate::json::Kind::of(other), "key step on non-object");
                return Err(Error::type_mismatch("object", other.clone(), path));
            }
            (PathElement::Index(_), other) => {
                trace!(%path, found = %crate::json::Kind::of(other), "index step on non-array");
                return Err(Error::type_mismatch("array", other.clone(), path));
            }
        };
        current = match next {
            Some(Value::Null) | None => {
                trace!(%path, at = %element, "path absent");
                return Err(Error::missing(path));
            }
            Some(value) => value,
        };
    }
    Ok(current)
}
