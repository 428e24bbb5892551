// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lazy lookups on a document.

use crate::decoded::Decoded;
use crate::thunk::{Chainable, Strategy};
use delve_core::{Decode, Json, Path};

/// Deferred `decode` / `option` on a [`Json`] document.
///
/// The returned chains hold their own handle on the document and can outlive
/// the borrow they were built from.
pub trait LazyDecode {
    /// A cached chain decoding `T` at `path`.
    fn decoded<T: Decode + Chainable>(&self, path: impl Into<Path>) -> Decoded<T> {
        self.decoded_with(path, Strategy::Cached)
    }

    /// A chain decoding `T` at `path` under `strategy`.
    fn decoded_with<T: Decode + Chainable>(
        &self,
        path: impl Into<Path>,
        strategy: Strategy,
    ) -> Decoded<T>;

    /// A cached chain decoding `T` at `path`, yielding `None` when exactly
    /// that path is absent.
    fn optional<T: Decode + Chainable>(&self, path: impl Into<Path>) -> Decoded<Option<T>> {
        self.decoded::<T>(path).optional()
    }
}

impl LazyDecode for Json {
    fn decoded_with<T: Decode + Chainable>(
        &self,
        path: impl Into<Path>,
        strategy: Strategy,
    ) -> Decoded<T> {
        let path = path.into();
        let json = self.clone();
        let at = path.clone();
        Decoded::with_strategy(path, strategy, move || json.view().decode_at(&at))
    }
}
