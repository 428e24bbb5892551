// SPDX-License-Identifier: MIT OR Apache-2.0
//! The serialization counterpart of [`Decode`](crate::Decode).
//!
//! [`Encode`] turns a typed value back into a generic JSON value. The
//! top-level [`to_vec`] and [`to_string`] write it out as JSON text, optionally
//! nested under a single root key.

use crate::error::{Error, Result};
use crate::json::{Json, JsonRef};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Types that can produce a generic JSON value from themselves.
pub trait Encode {
    /// The JSON representation of `self`.
    fn encode(&self) -> Value;
}

/// Output options for [`to_vec`] and [`to_string`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Nest the value under this key in a single-member object
    pub root_key: Option<String>,
    /// Pretty-print with two-space indentation
    pub pretty: bool,
}

impl EncodeOptions {
    /// Compact output with no root key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nests the value under `key`.
    #[must_use]
    pub fn with_root_key(mut self, key: impl Into<String>) -> Self {
        self.root_key = Some(key.into());
        self
    }

    /// Enables pretty-printing.
    #[must_use]
    pub const fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn wrap(&self, value: Value) -> Value {
        match &self.root_key {
            Some(key) => {
                let mut map = Map::new();
                map.insert(key.clone(), value);
                Value::Object(map)
            }
            None => value,
        }
    }
}

/// The JSON value for `value`.
#[must_use]
pub fn to_value<T: Encode + ?Sized>(value: &T) -> Value {
    value.encode()
}

/// Serializes `value` to JSON bytes.
///
/// # Errors
///
/// [`Error::SerializeFailed`] if the serializer rejects the value.
pub fn to_vec<T: Encode + ?Sized>(value: &T, options: &EncodeOptions) -> Result<Vec<u8>> {
    let value = options.wrap(value.encode());
    let written = if options.pretty {
        serde_json::to_vec_pretty(&value)
    } else {
        serde_json::to_vec(&value)
    };
    written.map_err(|e| Error::SerializeFailed {
        reason: e.to_string(),
    })
}

/// Serializes `value` to JSON text.
///
/// # Errors
///
/// [`Error::SerializeFailed`] if the serializer rejects the value.
pub fn to_string<T: Encode + ?Sized>(value: &T, options: &EncodeOptions) -> Result<String> {
    let value = options.wrap(value.encode());
    let written = if options.pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    written.map_err(|e| Error::SerializeFailed {
        reason: e.to_string(),
    })
}

impl Encode for Value {
    fn encode(&self) -> Value {
        self.clone()
    }
}

impl Encode for Json {
    fn encode(&self) -> Value {
        self.as_value().clone()
    }
}

impl Encode for JsonRef<'_> {
    fn encode(&self) -> Value {
        self.value().clone()
    }
}

impl Encode for str {
    fn encode(&self) -> Value {
        Value::String(self.to_owned())
    }
}

impl Encode for String {
    fn encode(&self) -> Value {
        Value::String(self.clone())
    }
}

macro_rules! encode_from {
    ($($ty:ty),* $(,)?) => {$(
        impl Encode for $ty {
            fn encode(&self) -> Value {
                Value::from(*self)
            }
        }
    )*};
}

// Non-finite floats become `null`.
encode_from!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self) -> Value {
        (**self).encode()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self) -> Value {
        (**self).encode()
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self) -> Value {
        self.as_ref().map_or(Value::Null, Encode::encode)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self) -> Value {
        Value::Array(self.iter().map(Encode::encode).collect())
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self) -> Value {
        self.as_slice().encode()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self) -> Value {
        self.as_slice().encode()
    }
}

impl<T: Encode, S: BuildHasher> Encode for HashMap<String, T, S> {
    fn encode(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.encode()))
                .collect(),
        )
    }
}

impl<T: Encode> Encode for BTreeMap<String, T> {
    fn encode(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.encode()))
                .collect(),
        )
    }
}

#[cfg(feature = "url")]
impl Encode for url::Url {
    fn encode(&self) -> Value {
        Value::String(self.as_str().to_owned())
    }
}
