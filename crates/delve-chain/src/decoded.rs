// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fallible lazy decode chains.

use crate::lazy::Lazy;
use crate::thunk::{Chainable, Strategy, Thunk};
use delve_core::{Error, Path, Result};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A deferred, possibly failing computation tied to the path it came from.
///
/// Nothing runs until [`Decoded::eval`] is called. Combinators never change an
/// existing node; each returns a new node that reads its source when it is
/// itself evaluated. `map`, `flat_map` and `filter` pass upstream failures
/// through untouched; only [`Decoded::recover`], [`Decoded::recover_value`]
/// and [`Decoded::flat_map_err`] handle them.
///
/// Cloning a node is cheap and shares its memo cell.
///
/// ```
/// use delve_chain::{Decoded, LazyDecode};
/// use delve_core::{Json, path};
///
/// let json = Json::parse(r#"{"user": {"id": 200}}"#).unwrap();
/// let id = json.decoded::<i64>(path!["user", "id"]).map(|id| id * 2);
/// assert_eq!(id.eval().unwrap(), 400);
///
/// let name = json
///     .decoded::<String>(path!["user", "name"])
///     .recover_value("anonymous".to_owned());
/// assert_eq!(name.get(), "anonymous");
/// ```
pub struct Decoded<T> {
    path: Path,
    strategy: Strategy,
    thunk: Arc<Thunk<T, Error>>,
}

impl<T> Clone for Decoded<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            strategy: self.strategy,
            thunk: Arc::clone(&self.thunk),
        }
    }
}

impl<T> fmt::Debug for Decoded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoded")
            .field("path", &self.path)
            .field("strategy", &self.strategy)
            .field("thunk", &self.thunk)
            .finish()
    }
}

impl<T: Chainable> Decoded<T> {
    /// A cached node running `producer` on first read.
    #[must_use]
    pub fn from_fn(
        path: impl Into<Path>,
        producer: impl Fn() -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self::with_strategy(path, Strategy::Cached, producer)
    }

    /// A node running `producer` under `strategy`.
    #[must_use]
    pub fn with_strategy(
        path: impl Into<Path>,
        strategy: Strategy,
        producer: impl Fn() -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            strategy,
            thunk: Arc::new(Thunk::new(strategy, producer)),
        }
    }

    /// A node that always succeeds with `value`.
    #[must_use]
    pub fn ok(value: T) -> Self {
        Self::from_fn(Path::root(), move || Ok(value.clone()))
    }

    /// A node that always fails with `error`.
    #[must_use]
    pub fn err(error: Error) -> Self {
        Self::from_fn(Path::root(), move || Err(error.clone()))
    }

    /// The path this chain originated from; the root path if it was not
    /// built from a lookup.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// The evaluation policy of this node.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Evaluates the chain now.
    ///
    /// # Errors
    ///
    /// The first failure raised anywhere along the chain.
    pub fn eval(&self) -> Result<T> {
        self.thunk.force()
    }

    fn derive<U: Chainable>(
        &self,
        producer: impl Fn() -> Result<U> + Send + Sync + 'static,
    ) -> Decoded<U> {
        Decoded::with_strategy(self.path.clone(), self.strategy, producer)
    }

    /// Transforms a successful value.
    #[must_use]
    pub fn map<U: Chainable>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Decoded<U> {
        let source = self.clone();
        self.derive(move || source.eval().map(&f))
    }

    /// Transforms a successful value with a fallible step.
    #[must_use]
    pub fn try_map<U: Chainable>(
        &self,
        f: impl Fn(T) -> Result<U> + Send + Sync + 'static,
    ) -> Decoded<U> {
        let source = self.clone();
        self.derive(move || source.eval().and_then(&f))
    }

    /// Feeds a successful value into `f` and evaluates the chain it returns.
    #[must_use]
    pub fn flat_map<U: Chainable>(
        &self,
        f: impl Fn(T) -> Decoded<U> + Send + Sync + 'static,
    ) -> Decoded<U> {
        let source = self.clone();
        self.derive(move || source.eval().and_then(|value| f(value).eval()))
    }

    /// Transforms a successful value with a step that may produce nothing;
    /// `None` becomes a `Filtered` error naming `U`.
    #[must_use]
    pub fn filter_map<U: Chainable>(
        &self,
        f: impl Fn(T) -> Option<U> + Send + Sync + 'static,
    ) -> Decoded<U> {
        let source = self.clone();
        self.derive(move || {
            source
                .eval()
                .and_then(|value| f(value).ok_or_else(Error::filtered_none::<U>))
        })
    }

    /// Keeps a successful value only if `predicate` holds; otherwise fails
    /// with `Filtered` carrying the rejected value.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self
    where
        T: fmt::Debug,
    {
        let source = self.clone();
        self.derive(move || {
            source.eval().and_then(|value| {
                if predicate(&value) {
                    Ok(value)
                } else {
                    Err(Error::filtered(&value))
                }
            })
        })
    }

    /// Replaces any failure with `handler(error)`, giving a chain that
    /// cannot fail.
    #[must_use]
    pub fn recover(&self, handler: impl Fn(Error) -> T + Send + Sync + 'static) -> Lazy<T> {
        let source = self.clone();
        let path = self.path.clone();
        Lazy::with_strategy(self.path.clone(), self.strategy, move || {
            source.eval().unwrap_or_else(|error| {
                trace!(%path, %error, "recovered");
                handler(error)
            })
        })
    }

    /// Replaces any failure with `value`.
    #[must_use]
    pub fn recover_value(&self, value: T) -> Lazy<T> {
        self.recover(move |_| value.clone())
    }

    /// Rewrites a failure; success passes through.
    #[must_use]
    pub fn map_err(&self, f: impl Fn(Error) -> Error + Send + Sync + 'static) -> Self {
        let source = self.clone();
        self.derive(move || source.eval().map_err(&f))
    }

    /// On failure, evaluates the alternative chain `f(error)` instead.
    #[must_use]
    pub fn flat_map_err(&self, f: impl Fn(Error) -> Self + Send + Sync + 'static) -> Self {
        let source = self.clone();
        let path = self.path.clone();
        self.derive(move || {
            source.eval().or_else(|error| {
                trace!(%path, %error, "falling back");
                f(error).eval()
            })
        })
    }

    /// Turns a `Missing` failure at exactly this node's own path into `None`.
    ///
    /// Every other failure, including `Missing` at a deeper path, still fails.
    #[must_use]
    pub fn optional(&self) -> Decoded<Option<T>> {
        let source = self.clone();
        let path = self.path.clone();
        self.derive(move || match source.eval() {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.is_missing_at(&path) => Ok(None),
            Err(error) => Err(error),
        })
    }

    /// Pairs this chain with `other`; fails with whichever fails first,
    /// checking `self` before `other`.
    #[must_use]
    pub fn zip<U: Chainable>(&self, other: &Decoded<U>) -> Decoded<(T, U)> {
        let left = self.clone();
        let right = other.clone();
        self.derive(move || Ok((left.eval()?, right.eval()?)))
    }
}

impl<T: Chainable> Decoded<Option<T>> {
    /// Unwraps a present value; `None` fails with `Filtered` naming `T`.
    #[must_use]
    pub fn filter_none(&self) -> Decoded<T> {
        let source = self.clone();
        self.derive(move || {
            source
                .eval()
                .and_then(|value| value.ok_or_else(Error::filtered_none::<T>))
        })
    }
}

impl<T: Chainable> From<Lazy<T>> for Decoded<T> {
    fn from(lazy: Lazy<T>) -> Self {
        lazy.into_decoded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::path;
    use proptest::prelude::{any, prop_assert_eq, proptest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted(strategy: Strategy, calls: &Arc<AtomicUsize>) -> Decoded<i32> {
        let calls = Arc::clone(calls);
        Decoded::with_strategy("n", strategy, move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(21)
        })
    }

    #[test]
    fn test_map_and_eval() {
        let doubled = Decoded::ok(21).map(|n| n * 2);
        assert_eq!(doubled.eval(), Ok(42));
    }

    #[test]
    fn test_nothing_runs_until_eval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = counted(Strategy::Cached, &calls).map(|n| n + 1).filter(|n| *n > 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(chain.eval(), Ok(22));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cached_producer_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let node = counted(Strategy::Cached, &calls);
        for _ in 0..3 {
            assert_eq!(node.eval(), Ok(21));
        }
        let mapped = node.map(|n| n * 2);
        assert_eq!(mapped.eval(), Ok(42));
        assert_eq!(mapped.eval(), Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_uncached_producer_runs_every_read() {
        let calls = Arc::new(AtomicUsize::new(0));
        let node = counted(Strategy::Uncached, &calls);
        for _ in 0..3 {
            assert_eq!(node.eval(), Ok(21));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let mapped = node.map(|n| n * 2);
        assert_eq!(mapped.strategy(), Strategy::Uncached);
        let _ = mapped.eval();
        let _ = mapped.eval();
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_failure_passes_through_map_and_filter() {
        let missing = Error::missing(path!["a"]);
        let chain = Decoded::<i32>::err(missing.clone())
            .map(|n| n + 1)
            .filter(|_| true)
            .flat_map(|n| Decoded::ok(n.to_string()));
        assert_eq!(chain.eval(), Err(missing));
    }

    #[test]
    fn test_filter_rejects_with_filtered() {
        let err = Decoded::ok(5).filter(|n| *n > 10).eval().unwrap_err();
        assert!(err.is_filtered());
        assert!(!err.is_missing());
        assert_eq!(
            err,
            Error::Filtered {
                type_name: "i32".into(),
                value: "5".to_owned()
            }
        );
    }

    #[test]
    fn test_filter_map_none_is_filtered() {
        let err = Decoded::ok("x".to_owned())
            .filter_map(|s| s.parse::<u8>().ok())
            .eval()
            .unwrap_err();
        assert_eq!(err, Error::filtered_none::<u8>());
        let ok = Decoded::ok("7".to_owned()).filter_map(|s| s.parse::<u8>().ok());
        assert_eq!(ok.eval(), Ok(7));
    }

    #[test]
    fn test_filter_none() {
        assert_eq!(Decoded::ok(Some(3)).filter_none().eval(), Ok(3));
        let err = Decoded::ok(None::<i32>).filter_none().eval().unwrap_err();
        assert_eq!(err, Error::filtered_none::<i32>());
    }

    #[test]
    fn test_flat_map_failure_at_second_stage() {
        let chain = Decoded::ok(1).flat_map(|_| Decoded::<i32>::err(Error::custom("inner")));
        assert_eq!(chain.eval(), Err(Error::custom("inner")));
    }

    #[test]
    fn test_recover_and_recover_value() {
        let failing = Decoded::<i32>::err(Error::custom("x"));
        assert_eq!(failing.recover(|_| -1).get(), -1);
        assert_eq!(failing.recover_value(9).get(), 9);
        assert_eq!(Decoded::ok(4).recover_value(9).get(), 4);
    }

    #[test]
    fn test_recover_sees_every_kind() {
        let kinds = [
            Error::missing("a"),
            Error::type_mismatch("i32", serde_json::json!("s"), "a"),
            Error::filtered(&1),
            Error::custom("c"),
        ];
        for kind in kinds {
            let seen = Decoded::<i32>::err(kind.clone())
                .recover(|e| i32::from(e.is_missing()))
                .get();
            assert_eq!(seen, i32::from(kind.is_missing()));
        }
    }

    #[test]
    fn test_map_err_and_flat_map_err() {
        let failing = Decoded::<i32>::err(Error::missing("a"));
        let renamed = failing.map_err(|_| Error::custom("renamed"));
        assert_eq!(renamed.eval(), Err(Error::custom("renamed")));
        assert_eq!(Decoded::ok(1).map_err(|_| Error::custom("x")).eval(), Ok(1));

        let fallback = failing.flat_map_err(|_| Decoded::ok(7));
        assert_eq!(fallback.eval(), Ok(7));
        let still_failing = failing.flat_map_err(Decoded::err);
        assert!(still_failing.eval().unwrap_err().is_missing());
    }

    #[test]
    fn test_optional_uses_own_path() {
        let own = Decoded::<i32>::from_fn("field", || Err(Error::missing("field")));
        assert_eq!(own.optional().eval(), Ok(None));

        let deeper = Decoded::<i32>::from_fn("field", || {
            Err(Error::missing(path!["field", "inner"]))
        });
        assert!(deeper.optional().eval().is_err());

        let mismatch = Decoded::<i32>::from_fn("field", || {
            Err(Error::type_mismatch("i32", serde_json::json!(true), "field"))
        });
        assert!(mismatch.optional().eval().unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_zip() {
        let pair = Decoded::ok(1).zip(&Decoded::ok("a"));
        assert_eq!(pair.eval(), Ok((1, "a")));
        let failed = Decoded::ok(1).zip(&Decoded::<i32>::err(Error::custom("r")));
        assert_eq!(failed.eval(), Err(Error::custom("r")));
    }

    #[test]
    fn test_transforms_keep_source_path() {
        let node = Decoded::from_fn(path!["a", 0], || Ok(1));
        assert_eq!(node.map(|n| n + 1).path(), &path!["a", 0]);
        assert_eq!(node.filter(|_| true).path(), &path!["a", 0]);
        assert_eq!(node.recover_value(0).path(), &path!["a", 0]);
    }

    #[test]
    fn test_original_node_unchanged_by_combinators() {
        let base = Decoded::ok(2);
        let _ = base.map(|n| n * 100);
        let _ = base.filter(|_| false);
        assert_eq!(base.eval(), Ok(2));
    }

    proptest! {
        #[test]
        fn test_strategies_agree(n in any::<i32>(), threshold in any::<i32>()) {
            let build = |strategy| {
                Decoded::with_strategy("n", strategy, move || Ok(n))
                    .map(i64::from)
                    .filter(move |v| *v >= i64::from(threshold))
                    .map_err(|e| Error::custom(e.to_string()))
            };
            let cached = build(Strategy::Cached);
            let uncached = build(Strategy::Uncached);
            prop_assert_eq!(cached.eval(), uncached.eval());
            prop_assert_eq!(cached.eval(), cached.eval());
        }
    }
}
