// SPDX-License-Identifier: MIT OR Apache-2.0
//! Infallible lazy values.

use crate::decoded::Decoded;
use crate::thunk::{Chainable, Strategy, Thunk};
use delve_core::{Error, Path, Result};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

/// A deferred computation that cannot fail.
///
/// Usually produced by [`Decoded::recover`]. Steps that may fail again
/// ([`Lazy::try_map`], [`Lazy::filter`]) lead back to a [`Decoded`].
pub struct Lazy<T> {
    path: Path,
    strategy: Strategy,
    thunk: Arc<Thunk<T, Infallible>>,
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            strategy: self.strategy,
            thunk: Arc::clone(&self.thunk),
        }
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("path", &self.path)
            .field("strategy", &self.strategy)
            .field("thunk", &self.thunk)
            .finish()
    }
}

impl<T: Chainable> Lazy<T> {
    /// A cached node running `producer` on first read.
    #[must_use]
    pub fn new(producer: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::with_strategy(Path::root(), Strategy::Cached, producer)
    }

    /// A node tied to `path`, running `producer` under `strategy`.
    #[must_use]
    pub fn with_strategy(
        path: impl Into<Path>,
        strategy: Strategy,
        producer: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            strategy,
            thunk: Arc::new(Thunk::new(strategy, move || Ok(producer()))),
        }
    }

    /// A node holding `value`.
    #[must_use]
    pub fn value(value: T) -> Self {
        Self::new(move || value.clone())
    }

    /// The path this value originated from.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// The evaluation policy of this node.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Evaluates now.
    #[must_use]
    pub fn get(&self) -> T {
        match self.thunk.force() {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    fn derive<U: Chainable>(&self, producer: impl Fn() -> U + Send + Sync + 'static) -> Lazy<U> {
        Lazy::with_strategy(self.path.clone(), self.strategy, producer)
    }

    /// Transforms the value.
    #[must_use]
    pub fn map<U: Chainable>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Lazy<U> {
        let source = self.clone();
        self.derive(move || f(source.get()))
    }

    /// Feeds the value into `f` and evaluates the node it returns.
    #[must_use]
    pub fn flat_map<U: Chainable>(
        &self,
        f: impl Fn(T) -> Lazy<U> + Send + Sync + 'static,
    ) -> Lazy<U> {
        let source = self.clone();
        self.derive(move || f(source.get()).get())
    }

    /// Continues with a step that may fail.
    #[must_use]
    pub fn try_map<U: Chainable>(
        &self,
        f: impl Fn(T) -> Result<U> + Send + Sync + 'static,
    ) -> Decoded<U> {
        let source = self.clone();
        Decoded::with_strategy(self.path.clone(), self.strategy, move || f(source.get()))
    }

    /// Keeps the value only if `predicate` holds; otherwise fails with
    /// `Filtered`.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Decoded<T>
    where
        T: fmt::Debug,
    {
        self.try_map(move |value| {
            if predicate(&value) {
                Ok(value)
            } else {
                Err(Error::filtered(&value))
            }
        })
    }

    /// The same computation as a fallible chain that never fails.
    #[must_use]
    pub fn into_decoded(self) -> Decoded<T> {
        self.try_map(Ok)
    }
}

impl<T: Chainable> Lazy<Option<T>> {
    /// Unwraps a present value; `None` fails with `Filtered` naming `T`.
    #[must_use]
    pub fn filter_none(&self) -> Decoded<T> {
        self.try_map(|value| value.ok_or_else(Error::filtered_none::<T>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_get_and_map() {
        let lazy = Lazy::value(3).map(|n| n * 3);
        assert_eq!(lazy.get(), 9);
        assert_eq!(lazy.flat_map(|n| Lazy::value(n + 1)).get(), 10);
    }

    #[test]
    fn test_cached_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lazy = Lazy::new(move || counter.fetch_add(1, Ordering::SeqCst));
        assert_eq!(lazy.get(), 0);
        assert_eq!(lazy.get(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_uncached_runs_every_read() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lazy = Lazy::with_strategy(Path::root(), Strategy::Uncached, move || {
            counter.fetch_add(1, Ordering::SeqCst)
        });
        assert_eq!(lazy.get(), 0);
        assert_eq!(lazy.get(), 1);
        assert_eq!(lazy.get(), 2);
    }

    #[test]
    fn test_filter_leads_back_to_decoded() {
        let lazy = Lazy::value(4);
        assert_eq!(lazy.filter(|n| n % 2 == 0).eval(), Ok(4));
        assert!(lazy.filter(|n| *n > 5).eval().unwrap_err().is_filtered());
        assert_eq!(lazy.try_map(|n| Ok(n.to_string())).eval(), Ok("4".to_owned()));
        assert_eq!(lazy.into_decoded().eval(), Ok(4));
    }

    #[test]
    fn test_filter_none() {
        assert_eq!(Lazy::value(Some('x')).filter_none().eval(), Ok('x'));
        assert_eq!(
            Lazy::value(None::<char>).filter_none().eval(),
            Err(Error::filtered_none::<char>())
        );
    }
}
