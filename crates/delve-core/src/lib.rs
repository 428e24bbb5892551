// SPDX-License-Identifier: MIT OR Apache-2.0
//! Core types for delve: path-addressed, typed decoding over JSON
//!
//! This crate provides the building blocks the rest of the workspace uses:
//!
//! - [`path`] - paths into a document and dotted-notation parsing
//! - [`json`] - the immutable JSON container and its borrowed view
//! - [`decode`] - the [`Decode`] capability and built-in decoders
//! - [`encode`] - the [`Encode`] counterpart and JSON writers
//! - [`cursor`] - focus cursors bound to a base path
//! - [`error`] - the error taxonomy and `Result` alias
//!
//! Lookups walk a [`Path`] through nested objects and arrays. A missing value
//! is always reported with the full requested path, and errors raised by nested
//! decoders are rebased onto the path they were decoded at, so every error names
//! its location from the document root.

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::cargo)]

/// Focus cursors
pub mod cursor;
/// The decode capability
pub mod decode;
/// The serialization counterpart
pub mod encode;
/// Error types for delve operations
pub mod error;
/// The JSON container
pub mod json;
/// Paths into a document
pub mod path;
mod retrieve;

// Re-exports for convenience
pub use cursor::Cursor;
pub use decode::{Decode, Serde, decode_entries};
pub use encode::{Encode, EncodeOptions, to_string, to_value, to_vec};
pub use error::{Error, Input, Result};
pub use json::{Json, JsonRef, Kind};
pub use path::{Path, PathElement, PathParseError};

#[doc(hidden)]
pub use serde_json;
#[cfg(feature = "url")]
pub use url;
