// SPDX-License-Identifier: MIT OR Apache-2.0
//! The decode capability and its built-in implementations.
//!
//! A type implements [`Decode`] to build itself from a [`JsonRef`]. Decoders
//! look up their own fields relative to the view they receive; the engine
//! rebases any error onto the path the view was found at, so a failure deep
//! inside a nested type still names its location from the document root.
//!
//! ```
//! use delve_core::{Decode, Json, JsonRef, Result, path};
//!
//! struct Contact {
//!     email: String,
//! }
//!
//! impl Decode for Contact {
//!     fn decode(json: JsonRef<'_>) -> Result<Self> {
//!         Ok(Self { email: json.decode("email")? })
//!     }
//! }
//!
//! let json = Json::parse(r#"{"user": {"contact": {}}}"#).unwrap();
//! let err = json.decode::<Contact>(path!["user", "contact"]).err().unwrap();
//! assert!(err.is_missing_at(&path!["user", "contact", "email"]));
//! ```

use crate::error::{Error, Result};
use crate::json::{Json, JsonRef};
use crate::path::Path;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use tracing::trace;

/// Types that can be built from a JSON value.
pub trait Decode: Sized {
    /// Builds `Self` from the viewed value.
    ///
    /// # Errors
    ///
    /// Any [`Error`]; paths in the error are relative to `json`.
    fn decode(json: JsonRef<'_>) -> Result<Self>;

    /// The type name reported in `TypeMismatch` errors.
    #[must_use]
    fn expected() -> Cow<'static, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

fn mismatch<T: Decode>(json: JsonRef<'_>) -> Error {
    Error::type_mismatch(T::expected(), json.value().clone(), Path::root())
}

impl Decode for Json {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        Ok(json.to_json())
    }

    fn expected() -> Cow<'static, str> {
        Cow::Borrowed("json")
    }
}

impl Decode for Value {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        Ok(json.value().clone())
    }

    fn expected() -> Cow<'static, str> {
        Cow::Borrowed("json")
    }
}

impl Decode for String {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        match json.value() {
            Value::String(s) => Ok(s.clone()),
            _ => Err(mismatch::<Self>(json)),
        }
    }

    fn expected() -> Cow<'static, str> {
        Cow::Borrowed("String")
    }
}

impl Decode for bool {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        match json.value() {
            Value::Bool(b) => Ok(*b),
            _ => Err(mismatch::<Self>(json)),
        }
    }

    fn expected() -> Cow<'static, str> {
        Cow::Borrowed("bool")
    }
}

// Integers decode only from integral numbers that fit the target width.
macro_rules! decode_int {
    ($($ty:ty),* $(,)?) => {$(
        impl Decode for $ty {
            fn decode(json: JsonRef<'_>) -> Result<Self> {
                let Value::Number(n) = json.value() else {
                    return Err(mismatch::<Self>(json));
                };
                n.as_i64()
                    .and_then(|i| <$ty>::try_from(i).ok())
                    .or_else(|| n.as_u64().and_then(|u| <$ty>::try_from(u).ok()))
                    .ok_or_else(|| mismatch::<Self>(json))
            }

            fn expected() -> Cow<'static, str> {
                Cow::Borrowed(stringify!($ty))
            }
        }
    )*};
}

decode_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Decode for f64 {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        match json.value() {
            Value::Number(n) => n.as_f64().ok_or_else(|| mismatch::<Self>(json)),
            _ => Err(mismatch::<Self>(json)),
        }
    }

    fn expected() -> Cow<'static, str> {
        Cow::Borrowed("f64")
    }
}

impl Decode for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        match json.value() {
            Value::Number(n) => n
                .as_f64()
                .map(|f| f as Self)
                .filter(|f| f.is_finite())
                .ok_or_else(|| mismatch::<Self>(json)),
            _ => Err(mismatch::<Self>(json)),
        }
    }

    fn expected() -> Cow<'static, str> {
        Cow::Borrowed("f32")
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        T::decode(json).map(Self::new)
    }

    fn expected() -> Cow<'static, str> {
        T::expected()
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        let Value::Array(items) = json.value() else {
            return Err(mismatch::<Self>(json));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_element(item, &Path::from(i)))
            .collect::<Result<Self>>()
            .inspect_err(|e| trace!(error = %e, "array decode aborted"))
    }

    fn expected() -> Cow<'static, str> {
        Cow::Owned(format!("Vec<{}>", T::expected()))
    }
}

// Elements are decoded in place rather than walked to, so `null` reaches
// identity decoders and primitive targets report it as a mismatch.
fn decode_element<T: Decode>(item: &Value, at: &Path) -> Result<T> {
    T::decode(JsonRef::new(item)).map_err(|e| e.prefixed(at))
}

fn decode_members<T, C>(json: JsonRef<'_>) -> Result<C>
where
    T: Decode,
    C: FromIterator<(String, T)> + Decode,
{
    let Value::Object(map) = json.value() else {
        return Err(mismatch::<C>(json));
    };
    map.iter()
        .map(|(key, member)| {
            decode_element(member, &Path::from(key.as_str())).map(|value| (key.clone(), value))
        })
        .collect::<Result<C>>()
        .inspect_err(|e| trace!(error = %e, "map decode aborted"))
}

impl<T: Decode, S: BuildHasher + Default> Decode for HashMap<String, T, S> {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        decode_members::<T, Self>(json)
    }

    fn expected() -> Cow<'static, str> {
        Cow::Owned(format!("HashMap<String, {}>", T::expected()))
    }
}

impl<T: Decode> Decode for BTreeMap<String, T> {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        decode_members::<T, Self>(json)
    }

    fn expected() -> Cow<'static, str> {
        Cow::Owned(format!("BTreeMap<String, {}>", T::expected()))
    }
}

#[cfg(feature = "url")]
impl Decode for url::Url {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        match json.value() {
            Value::String(s) => Self::parse(s).map_err(|_| mismatch::<Self>(json)),
            _ => Err(mismatch::<Self>(json)),
        }
    }

    fn expected() -> Cow<'static, str> {
        Cow::Borrowed("Url")
    }
}

/// Decodes any serde-deserializable type through serde.
///
/// A serde failure becomes a `TypeMismatch` at the requested path.
///
/// ```
/// use delve_core::{Json, Serde};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let json = Json::parse(r#"{"p": {"x": 1, "y": 2}}"#).unwrap();
/// let Serde(p) = json.decode::<Serde<Point>>("p").unwrap();
/// assert_eq!(p, Point { x: 1, y: 2 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Serde<T>(pub T);

impl<T> Serde<T> {
    /// Unwraps the decoded value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> Decode for Serde<T> {
    fn decode(json: JsonRef<'_>) -> Result<Self> {
        T::deserialize(json.value()).map(Serde).map_err(|e| {
            trace!(error = %e, "serde decode rejected value");
            mismatch::<Self>(json)
        })
    }

    fn expected() -> Cow<'static, str> {
        Cow::Borrowed(std::any::type_name::<T>())
    }
}

/// Derives [`Decode`] and [`Encode`](crate::Encode) for a type backed by a raw
/// value, typically a C-like enum.
///
/// Decoding reads the raw value and passes it to `from`; a `None` result is a
/// `TypeMismatch` naming the type. Encoding writes `to(self)`.
///
/// ```
/// use delve_core::{Json, raw_representable};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Role { Admin, Guest }
///
/// impl Role {
///     fn from_raw(raw: String) -> Option<Self> {
///         match raw.as_str() {
///             "admin" => Some(Self::Admin),
///             "guest" => Some(Self::Guest),
///             _ => None,
///         }
///     }
///     fn raw(&self) -> String {
///         match self {
///             Self::Admin => "admin".into(),
///             Self::Guest => "guest".into(),
///         }
///     }
/// }
///
/// raw_representable!(Role, String, from = Role::from_raw, to = Role::raw);
///
/// let json = Json::parse(r#"{"role": "admin", "bad": "root"}"#).unwrap();
/// assert_eq!(json.decode::<Role>("role").unwrap(), Role::Admin);
/// assert!(json.decode::<Role>("bad").unwrap_err().is_type_mismatch());
/// ```
#[macro_export]
macro_rules! raw_representable {
    ($ty:ty, $raw:ty, from = $from:expr, to = $to:expr $(,)?) => {
        impl $crate::Decode for $ty {
            fn decode(json: $crate::JsonRef<'_>) -> $crate::Result<Self> {
                let raw = <$raw as $crate::Decode>::decode(json)?;
                let from: fn($raw) -> ::std::option::Option<$ty> = $from;
                from(raw).ok_or_else(|| {
                    $crate::Error::type_mismatch(
                        <Self as $crate::Decode>::expected(),
                        json.value().clone(),
                        $crate::Path::root(),
                    )
                })
            }

            fn expected() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(stringify!($ty))
            }
        }

        impl $crate::Encode for $ty {
            fn encode(&self) -> $crate::serde_json::Value {
                let to: fn(&$ty) -> $raw = $to;
                $crate::Encode::encode(&to(self))
            }
        }
    };
}

/// Decodes every member of an object, converting each key with `key`.
///
/// For user decoders whose map keys are not plain strings.
///
/// # Errors
///
/// `TypeMismatch` if `json` is not an object, otherwise the first key or
/// member failure with that member's key in the path.
pub fn decode_entries<K, T>(
    json: JsonRef<'_>,
    mut key: impl FnMut(&str) -> Result<K>,
) -> Result<Vec<(K, T)>>
where
    T: Decode,
{
    let Value::Object(map) = json.value() else {
        return Err(Error::type_mismatch(
            "object",
            json.value().clone(),
            Path::root(),
        ));
    };
    map.iter()
        .map(|(name, member)| {
            let path = Path::from(name.as_str());
            let k = key(name).map_err(|e| e.prefixed(&path))?;
            decode_element(member, &path).map(|v| (k, v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Contact {
        email: String,
        url: Option<String>,
    }

    impl Decode for Contact {
        fn decode(json: JsonRef<'_>) -> Result<Self> {
            Ok(Self {
                email: json.decode("email")?,
                url: json.option("url")?,
            })
        }
    }

    #[derive(Debug, PartialEq)]
    struct User {
        id: u32,
        contact: Contact,
    }

    impl Decode for User {
        fn decode(json: JsonRef<'_>) -> Result<Self> {
            Ok(Self {
                id: json.decode("id")?,
                contact: json.decode("contact")?,
            })
        }
    }

    #[test]
    fn test_primitives() {
        let json = Json::new(json!({
            "s": "text", "b": true, "i": -3, "u": 42, "f": 1.5, "big": 300
        }));
        assert_eq!(json.decode::<String>("s").unwrap(), "text");
        assert!(json.decode::<bool>("b").unwrap());
        assert_eq!(json.decode::<i8>("i").unwrap(), -3);
        assert_eq!(json.decode::<u64>("u").unwrap(), 42);
        assert!((json.decode::<f64>("f").unwrap() - 1.5).abs() < f64::EPSILON);
        assert!((json.decode::<f64>("u").unwrap() - 42.0).abs() < f64::EPSILON);
        assert!(json.decode::<u8>("big").unwrap_err().is_type_mismatch());
        assert!(json.decode::<u32>("i").unwrap_err().is_type_mismatch());
        assert!(json.decode::<i64>("f").unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_type_mismatch_fidelity() {
        let json = Json::new(json!({"int_key": "thatstring"}));
        assert_eq!(
            json.decode::<i64>("int_key"),
            Err(Error::type_mismatch(
                "i64",
                json!("thatstring"),
                path!["int_key"]
            ))
        );
    }

    #[test]
    fn test_nested_missing_is_rebased() {
        let json = Json::new(json!({"user": {"id": 1, "contact": {"url": "u"}}}));
        assert_eq!(
            json.decode::<User>("user"),
            Err(Error::missing(path!["user", "contact", "email"]))
        );
    }

    #[test]
    fn test_nested_mismatch_is_rebased() {
        let json = Json::new(json!({"user": {"id": "one", "contact": {"email": "e"}}}));
        let err = json.decode::<User>("user").unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(err.path(), Some(&path!["user", "id"]));
    }

    #[test]
    fn test_option_distinguishes_absence() {
        let json = Json::new(json!({
            "present": {"email": "e"},
            "mistyped": 5,
            "partial": {"url": "u"},
            "null": null
        }));
        assert_eq!(json.option::<Contact>("absent").unwrap(), None);
        assert_eq!(json.option::<Contact>("null").unwrap(), None);
        assert_eq!(
            json.option::<Contact>("present").unwrap(),
            Some(Contact {
                email: "e".into(),
                url: None
            })
        );
        assert!(json.option::<Contact>("mistyped").unwrap_err().is_type_mismatch());
        assert!(
            json.option::<Contact>("partial")
                .unwrap_err()
                .is_missing_at(&path!["partial", "email"])
        );
    }

    #[test]
    fn test_option_absent_intermediate() {
        let json = Json::new(json!({"a": {}}));
        assert_eq!(json.option::<i64>(path!["a", "b", "c"]).unwrap(), None);
    }

    #[test]
    fn test_array_all_or_nothing() {
        let json = Json::new(json!({"ok": [1, 2, 3], "bad": [1, "two", 3], "hole": [1, null]}));
        assert_eq!(json.decode_array::<i32>("ok").unwrap(), vec![1, 2, 3]);
        let err = json.decode_array::<i32>("bad").unwrap_err();
        assert_eq!(err.path(), Some(&path!["bad", 1]));
        assert_eq!(
            json.decode_array::<i32>("hole"),
            Err(Error::type_mismatch("i32", Value::Null, path!["hole", 1]))
        );
        assert!(json.decode_array::<i32>(path!["ok", 0]).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_map_all_or_nothing() {
        let json = Json::new(json!({"ok": {"a": 1, "b": 2}, "bad": {"a": 1, "b": false}}));
        let map = json.decode_map::<u8>("ok").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["b"], 2);
        let err = json.decode_map::<u8>("bad").unwrap_err();
        assert_eq!(err.path(), Some(&path!["bad", "b"]));
        let tree: BTreeMap<String, u8> = json.decode("ok").unwrap();
        assert_eq!(tree.keys().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_nested_collections() {
        let json = Json::new(json!({"grid": [[1, 2], [3]], "groups": {"x": [true]}}));
        let grid: Vec<Vec<u8>> = json.decode("grid").unwrap();
        assert_eq!(grid, vec![vec![1, 2], vec![3]]);
        let groups: HashMap<String, Vec<bool>> = json.decode("groups").unwrap();
        assert_eq!(groups["x"], vec![true]);
        assert_eq!(<Vec<Vec<u8>>>::expected(), "Vec<Vec<u8>>");
    }

    #[test]
    fn test_identity_decoders() {
        let json = Json::new(json!({"inner": {"k": [1]}}));
        let inner: Json = json.decode("inner").unwrap();
        assert_eq!(inner.decode::<Vec<u8>>("k").unwrap(), vec![1]);
        let raw: Value = json.decode(path!["inner", "k"]).unwrap();
        assert_eq!(raw, json!([1]));
    }

    #[cfg(feature = "url")]
    #[test]
    fn test_url() {
        let json = Json::new(json!({"u": "http://x.com/a", "bad": "not a url"}));
        let url: url::Url = json.decode("u").unwrap();
        assert_eq!(url.host_str(), Some("x.com"));
        assert!(json.decode::<url::Url>("bad").unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_serde_bridge_mismatch_path() {
        #[derive(Debug, serde::Deserialize)]
        struct P {
            #[allow(dead_code)]
            x: i32,
        }
        let json = Json::new(json!({"p": {"x": "no"}}));
        let err = json.decode::<Serde<P>>("p").unwrap_err();
        assert_eq!(err.path(), Some(&path!["p"]));
    }

    #[test]
    fn test_identity_collections_keep_nulls() {
        let json = Json::new(json!({"xs": [1, null, 3], "m": {"a": 1, "b": null}}));
        assert_eq!(
            json.decode::<Vec<Value>>("xs"),
            Ok(vec![json!(1), Value::Null, json!(3)])
        );
        let members = json.decode::<HashMap<String, Json>>("m").unwrap();
        assert_eq!(members["b"], Json::null());
        assert_eq!(members["a"].as_value(), &json!(1));
        assert_eq!(
            json.decode_map::<i64>("m"),
            Err(Error::type_mismatch("i64", Value::Null, path!["m", "b"]))
        );
    }

    #[test]
    fn test_encoded_options_decode_back() {
        let encoded = crate::to_value(&vec![Some(1), None]);
        let json = Json::new(json!({ "v": encoded }));
        assert_eq!(
            json.decode::<Vec<Value>>("v"),
            Ok(vec![json!(1), Value::Null])
        );
    }

    #[test]
    fn test_f32_rejects_out_of_range() {
        let json = Json::new(json!({"big": 1e300, "ok": 1.5}));
        assert_eq!(json.decode::<f32>("ok"), Ok(1.5));
        assert_eq!(
            json.decode::<f32>("big"),
            Err(Error::type_mismatch("f32", json!(1e300), "big"))
        );
    }

    #[test]
    fn test_decode_entries_custom_keys() {
        let json = Json::new(json!({"1": "a", "2": "b"}));
        let mut entries: Vec<(u32, String)> = decode_entries(json.view(), |k| {
            k.parse().map_err(Error::custom)
        })
        .unwrap();
        entries.sort();
        assert_eq!(entries, vec![(1, "a".to_owned()), (2, "b".to_owned())]);
    }
}
