// SPDX-License-Identifier: MIT OR Apache-2.0
//! # delve
//!
//! Path-addressed, typed decoding over JSON documents, with lazy combinator
//! chains on top.
//!
//! - [`Path`] / [`PathElement`] - locations inside a document
//! - [`Json`] / [`JsonRef`] - an immutable, shareable document and a borrowed view
//! - [`Decode`] / [`Encode`] - typed conversion in both directions
//! - [`Decoded`] / [`Lazy`] - deferred computations with cached or repeated evaluation
//!
//! Every failure is an [`Error`] naming the full path from the document root,
//! so `option` can tell an absent field from a broken one.
//!
//! ```
//! use delve::{Decode, Error, Json, JsonRef, LazyDecode, Result, path};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Contact {
//!     email: String,
//! }
//!
//! impl Decode for Contact {
//!     fn decode(json: JsonRef<'_>) -> Result<Self> {
//!         Ok(Self { email: json.decode(path!["email"])? })
//!     }
//! }
//!
//! let json = Json::parse(r#"{"user": {"id": 200, "contact": {}}}"#).unwrap();
//!
//! assert_eq!(json.decode::<i64>(path!["user", "id"]), Ok(200));
//! assert_eq!(json.option::<String>(path!["user", "name"]), Ok(None));
//! assert_eq!(
//!     json.option::<Contact>(path!["user", "contact"]),
//!     Err(Error::missing(path!["user", "contact", "email"]))
//! );
//!
//! let id = json
//!     .decoded::<i64>(path!["user", "id"])
//!     .filter(|id| *id > 0)
//!     .recover_value(-1);
//! assert_eq!(id.get(), 200);
//! ```

#![doc(html_root_url = "https://docs.rs/delve/0.1.0")]
#![warn(missing_docs)]

pub use delve_chain::{Chainable, Decoded, Lazy, LazyDecode, Strategy};
pub use delve_core::{
    Cursor, Decode, Encode, EncodeOptions, Error, Input, Json, JsonRef, Kind, Path, PathElement,
    PathParseError, Result, Serde, decode_entries, path, raw_representable, to_string, to_value,
    to_vec,
};

/// Re-export of delve-core for core types.
pub use delve_core as core;

/// Re-export of delve-chain for lazy combinators.
pub use delve_chain as chain;
