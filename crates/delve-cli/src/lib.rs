// SPDX-License-Identifier: MIT OR Apache-2.0
//! # delve-cli
//!
//! Command-line interface for delve: typed, path-addressed lookups over JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Decode a value, failing with a path-precise diagnostic
//! delve get user.contact.email data.json
//! delve get 'items[0].count' --as int data.json
//!
//! # Like get, but prints null when the path is absent
//! delve option user.nickname data.json
//!
//! # Keys of the object at a path
//! delve keys user data.json
//!
//! # Every leaf path in dotted notation
//! delve paths data.json
//! ```
//!
//! Input is read from FILE, or from stdin when no file is given. `RUST_LOG`
//! controls diagnostics on stderr; `--verbose` raises the default to `debug`.
//!
//! The command bodies live here so they can be exercised without a process.

#![warn(missing_docs)]

use clap::ValueEnum;
use delve_core::serde_json::Value;
use delve_core::{Decode, Error, Json, JsonRef, Path, Result, to_value};

/// Re-export of delve-core for core types.
pub use delve_core as core;

/// The type a value is decoded as before printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Shape {
    /// Any JSON value
    #[default]
    Json,
    /// A JSON string
    String,
    /// An integral number fitting in 64 bits
    Int,
    /// Any number
    Float,
    /// `true` or `false`
    Bool,
}

/// Decodes the value at `path` as `shape`.
///
/// # Errors
///
/// Returns the decode error for `path`: `Missing` when absent, `TypeMismatch`
/// when the value has the wrong shape.
pub fn get(json: &Json, path: &Path, shape: Shape) -> Result<Value> {
    let view = json.view();
    match shape {
        Shape::Json => view.decode_at::<Value>(path),
        Shape::String => reshape::<String>(view, path),
        Shape::Int => reshape::<i64>(view, path),
        Shape::Float => reshape::<f64>(view, path),
        Shape::Bool => reshape::<bool>(view, path),
    }
}

/// Like [`get`], but an absent `path` yields `null`.
///
/// # Errors
///
/// Returns every error [`get`] does except `Missing` at exactly `path`.
pub fn option(json: &Json, path: &Path, shape: Shape) -> Result<Value> {
    match get(json, path, shape) {
        Err(error) if error.is_missing_at(path) => Ok(Value::Null),
        other => other,
    }
}

fn reshape<T: Decode + delve_core::Encode>(view: JsonRef<'_>, path: &Path) -> Result<Value> {
    view.decode_at::<T>(path).map(|value| to_value(&value))
}

/// Keys of the object at `path`, sorted unless built with `preserve_order`.
///
/// # Errors
///
/// Returns `Missing` when `path` is absent and `TypeMismatch` when it does not
/// hold an object.
pub fn keys(json: &Json, path: &Path) -> Result<Vec<String>> {
    let node = json.get(path)?;
    match node.value() {
        Value::Object(members) => Ok(members.keys().cloned().collect()),
        other => Err(Error::type_mismatch("object", other.clone(), path)),
    }
}

/// Every leaf path below `json`, depth first.
///
/// Scalars and empty containers are leaves.
#[must_use]
pub fn leaf_paths(json: JsonRef<'_>) -> Vec<Path> {
    let mut out = Vec::new();
    collect_leaves(json.value(), &Path::root(), &mut out);
    out
}

fn collect_leaves(value: &Value, at: &Path, out: &mut Vec<Path>) {
    match value {
        Value::Object(members) if !members.is_empty() => {
            for (key, member) in members {
                collect_leaves(member, &at.key(key.as_str()), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, item) in items.iter().enumerate() {
                collect_leaves(item, &at.index(i), out);
            }
        }
        _ => out.push(at.clone()),
    }
}
