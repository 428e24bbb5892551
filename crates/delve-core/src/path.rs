// SPDX-License-Identifier: MIT OR Apache-2.0
//! Paths into a JSON document.
//!
//! A [`Path`] is an immutable, ordered sequence of [`PathElement`]s. Keys step
//! into objects, indices step into arrays. Paths are built from literals
//! (`"name"` is a single key, `3` is a single index), from lists via the
//! [`path!`](crate::path!) macro, or by parsing dotted notation with
//! [`Path::parse`].
//!
//! ```
//! use delve_core::{Path, PathElement, path};
//!
//! let user = Path::from("user");
//! let email = path!["contact", "email"];
//! assert_eq!(&user + &email, path!["user", "contact", "email"]);
//! assert_eq!(Path::parse("user.contact.email").unwrap(), &user + &email);
//! assert_ne!(PathElement::from("0"), PathElement::from(0));
//! ```

use smallvec::SmallVec;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathElement {
    /// Object member access
    Key(String),
    /// Array element access
    Index(usize),
}

impl PathElement {
    /// Returns the key if this is a key step.
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Index(_) => None,
        }
    }

    /// Returns the index if this is an index step.
    #[must_use]
    pub const fn as_index(&self) -> Option<usize> {
        match self {
            Self::Key(_) => None,
            Self::Index(i) => Some(*i),
        }
    }
}

impl From<&str> for PathElement {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for PathElement {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<&String> for PathElement {
    fn from(key: &String) -> Self {
        Self::Key(key.clone())
    }
}

impl From<usize> for PathElement {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) if is_bare_key(k) => f.write_str(k),
            Self::Key(k) => write!(f, "[{}]", quote(k)),
            Self::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// A location inside a JSON document, relative to the value it is applied to.
///
/// Paths never change once built; [`Path::key`], [`Path::index`] and
/// concatenation with `+` all return new paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    elements: SmallVec<[PathElement; 4]>,
}

impl Path {
    /// The empty path, addressing the value itself.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from an ordered list of elements.
    #[must_use]
    pub fn new<I, E>(elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<PathElement>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    /// A path holding exactly one element.
    #[must_use]
    pub fn element(element: impl Into<PathElement>) -> Self {
        let mut elements = SmallVec::new();
        elements.push(element.into());
        Self { elements }
    }

    /// Returns a new path with `key` appended.
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.appended(PathElement::Key(key.into()))
    }

    /// Returns a new path with `index` appended.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.appended(PathElement::Index(index))
    }

    fn appended(&self, element: PathElement) -> Self {
        let mut elements = self.elements.clone();
        elements.push(element);
        Self { elements }
    }

    /// Concatenates `self` followed by `other`.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut elements = SmallVec::with_capacity(self.len() + other.len());
        elements.extend(self.elements.iter().cloned());
        elements.extend(other.elements.iter().cloned());
        Self { elements }
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The steps in order.
    #[must_use]
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// Iterates over the steps in order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, PathElement> {
        self.elements.iter()
    }

    /// The final step, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// The path without its final step. The root has no parent.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.elements.split_last()?;
        Some(Self {
            elements: init.iter().cloned().collect(),
        })
    }

    /// True when `prefix` is a leading run of this path.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.elements.starts_with(&prefix.elements)
    }

    /// The remainder after `prefix`, or `None` if `prefix` does not lead this path.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &Self) -> Option<Self> {
        self.elements
            .strip_prefix(prefix.elements.as_slice())
            .map(|rest| Self {
                elements: rest.iter().cloned().collect(),
            })
    }

    /// Parses dotted notation: `user.contacts[0].email`, `["odd key"].x`, `$`.
    ///
    /// # Errors
    ///
    /// Returns [`PathParseError`] with the byte offset of the first invalid
    /// character.
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        PathParser::new(input).parse()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl From<PathElement> for Path {
    fn from(element: PathElement) -> Self {
        Self::element(element)
    }
}

impl From<&str> for Path {
    fn from(key: &str) -> Self {
        Self::element(key)
    }
}

impl From<String> for Path {
    fn from(key: String) -> Self {
        Self::element(key)
    }
}

impl From<usize> for Path {
    fn from(index: usize) -> Self {
        Self::element(index)
    }
}

impl From<Vec<PathElement>> for Path {
    fn from(elements: Vec<PathElement>) -> Self {
        Self {
            elements: SmallVec::from_vec(elements),
        }
    }
}

impl From<&[PathElement]> for Path {
    fn from(elements: &[PathElement]) -> Self {
        Self {
            elements: elements.iter().cloned().collect(),
        }
    }
}

impl<const N: usize> From<[PathElement; N]> for Path {
    fn from(elements: [PathElement; N]) -> Self {
        Self::new(elements)
    }
}

impl From<&Self> for Path {
    fn from(path: &Self) -> Self {
        path.clone()
    }
}

impl Add for Path {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self.elements.extend(rhs.elements);
        self
    }
}

impl Add<&Path> for Path {
    type Output = Self;

    fn add(mut self, rhs: &Self) -> Self {
        self.elements.extend(rhs.elements.iter().cloned());
        self
    }
}

impl Add for &Path {
    type Output = Path;

    fn add(self, rhs: Self) -> Path {
        self.join(rhs)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("$");
        }
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 && matches!(element, PathElement::Key(k) if is_bare_key(k)) {
                f.write_str(".")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Builds a [`Path`] from a list of keys and indices.
///
/// ```
/// use delve_core::{Path, PathElement, path};
///
/// let p = path!["users", 0, "name"];
/// assert_eq!(p.elements()[1], PathElement::Index(0));
/// assert_eq!(path![], Path::root());
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($element:expr),+ $(,)?) => {
        $crate::Path::new([$($crate::PathElement::from($element)),+])
    };
}

/// Failure to parse dotted path notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    /// A character that cannot appear at this position
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar {
        /// The offending character
        found: char,
        /// Byte offset in the input
        offset: usize,
    },
    /// Input ended inside a step
    #[error("unexpected end of path at offset {offset}")]
    UnexpectedEnd {
        /// Byte offset in the input
        offset: usize,
    },
    /// A bracketed index that does not fit in `usize`
    #[error("invalid index at offset {offset}")]
    InvalidIndex {
        /// Byte offset in the input
        offset: usize,
    },
    /// A quoted key that is not a valid JSON string
    #[error("invalid quoted key at offset {offset}")]
    InvalidKey {
        /// Byte offset in the input
        offset: usize,
    },
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn quote(key: &str) -> String {
    serde_json::to_string(key).unwrap_or_else(|_| format!("\"{key}\""))
}

fn is_bare_char(c: char) -> bool {
    !matches!(c, '.' | '[' | ']' | '"')
}

struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PathParser<'a> {
    const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn parse(mut self) -> Result<Path, PathParseError> {
        let mut elements = SmallVec::new();
        if self.peek() == Some('$') {
            self.bump();
        }
        let mut first = self.pos == 0;
        while let Some(c) = self.peek() {
            match c {
                '[' => {
                    self.bump();
                    elements.push(self.bracketed()?);
                }
                '.' if !first => {
                    self.bump();
                    elements.push(PathElement::Key(self.bare()?));
                }
                c if first && is_bare_char(c) => {
                    elements.push(PathElement::Key(self.bare()?));
                }
                found => {
                    return Err(PathParseError::UnexpectedChar {
                        found,
                        offset: self.pos,
                    });
                }
            }
            first = false;
        }
        Ok(Path { elements })
    }

    fn bare(&mut self) -> Result<String, PathParseError> {
        let start = self.pos;
        while self.peek().is_some_and(is_bare_char) {
            self.bump();
        }
        if start == self.pos {
            return match self.peek() {
                Some(found) => Err(PathParseError::UnexpectedChar {
                    found,
                    offset: self.pos,
                }),
                None => Err(PathParseError::UnexpectedEnd { offset: self.pos }),
            };
        }
        Ok(self.input[start..self.pos].to_owned())
    }

    fn bracketed(&mut self) -> Result<PathElement, PathParseError> {
        let element = match self.peek() {
            Some('"') => PathElement::Key(self.quoted()?),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
                let index = self.input[start..self.pos]
                    .parse()
                    .map_err(|_| PathParseError::InvalidIndex { offset: start })?;
                PathElement::Index(index)
            }
            Some(found) => {
                return Err(PathParseError::UnexpectedChar {
                    found,
                    offset: self.pos,
                });
            }
            None => return Err(PathParseError::UnexpectedEnd { offset: self.pos }),
        };
        match self.bump() {
            Some(']') => Ok(element),
            Some(found) => Err(PathParseError::UnexpectedChar {
                found,
                offset: self.pos - found.len_utf8(),
            }),
            None => Err(PathParseError::UnexpectedEnd { offset: self.pos }),
        }
    }

    fn quoted(&mut self) -> Result<String, PathParseError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('"') => break,
                Some(_) => {}
                None => return Err(PathParseError::UnexpectedEnd { offset: self.pos }),
            }
        }
        serde_json::from_str(&self.input[start..self.pos])
            .map_err(|_| PathParseError::InvalidKey { offset: start })
    }
}
