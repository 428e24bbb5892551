// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deferred producers with an optional per-node memo cell.

use parking_lot::Mutex;
use std::fmt;
use tracing::trace;

/// How often a chain node runs its producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Run at most once; every read sees the first outcome
    #[default]
    Cached,
    /// Run on every read; no state is kept between reads
    Uncached,
}

/// Values that can flow through a chain: cloned out of memo cells and
/// shared with producers on other threads.
pub trait Chainable: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Chainable for T {}

enum Memo<T, E> {
    Pending,
    Ready(T),
    Failed(E),
}

type Producer<T, E> = Box<dyn Fn() -> Result<T, E> + Send + Sync>;

/// A producer plus, for cached nodes, the cell holding its outcome.
///
/// The lock is held while the producer runs, so concurrent first reads block
/// until the single evaluation finishes and then observe its outcome.
pub(crate) struct Thunk<T, E> {
    producer: Producer<T, E>,
    memo: Option<Mutex<Memo<T, E>>>,
}

impl<T: Clone, E: Clone> Thunk<T, E> {
    pub(crate) fn new(
        strategy: Strategy,
        producer: impl Fn() -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        let memo = match strategy {
            Strategy::Cached => Some(Mutex::new(Memo::Pending)),
            Strategy::Uncached => None,
        };
        Self {
            producer: Box::new(producer),
            memo,
        }
    }

    pub(crate) fn force(&self) -> Result<T, E> {
        let Some(cell) = &self.memo else {
            return (self.producer)();
        };
        let mut memo = cell.lock();
        match &*memo {
            Memo::Ready(value) => {
                trace!("memo hit");
                return Ok(value.clone());
            }
            Memo::Failed(error) => {
                trace!("memo hit (failure)");
                return Err(error.clone());
            }
            Memo::Pending => {}
        }
        let outcome = (self.producer)();
        trace!(ok = outcome.is_ok(), "evaluated");
        *memo = match &outcome {
            Ok(value) => Memo::Ready(value.clone()),
            Err(error) => Memo::Failed(error.clone()),
        };
        outcome
    }
}

impl<T, E> fmt::Debug for Thunk<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.memo {
            None => "uncached",
            Some(cell) => match cell.try_lock().as_deref() {
                Some(Memo::Pending) => "pending",
                Some(Memo::Ready(_)) => "ready",
                Some(Memo::Failed(_)) => "failed",
                None => "evaluating",
            },
        };
        f.debug_struct("Thunk").field("state", &state).finish()
    }
}
