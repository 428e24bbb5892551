// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lazy combinator chains over delve decodes
//!
//! - [`Decoded`] - a deferred computation that may fail, tied to its source path
//! - [`Lazy`] - a deferred computation that cannot fail
//! - [`LazyDecode`] - deferred `decode` / `option` on a document
//! - [`Strategy`] - run a producer once and cache it, or run it on every read
//!
//! Chains capture what they need by value when they are built and never
//! change afterwards. A cached node guards its memo cell with its own lock, so
//! its producer runs at most once even under concurrent reads.

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::cargo)]

mod decoded;
mod lazy;
mod source;
mod thunk;

pub use decoded::Decoded;
pub use lazy::Lazy;
pub use source::LazyDecode;
pub use thunk::{Chainable, Strategy};
