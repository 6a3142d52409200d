//! # Suspensions
//!
//! A [`Suspension<T>`] is a deferred, zero-argument computation together with
//! a cache slot: Scheme's `delay`/`force` pair with call-by-need semantics.
//!
//! ## States
//!
//! ```text
//! Pending(compute) ──force──> Evaluating ──ok──────> Evaluated(value)
//!                                  │
//!                                  └──panic──> Poisoned
//! ```
//!
//! The pending → evaluated transition happens at most once. Every later
//! [`force`](Suspension::force) returns the same cached value without
//! running the computation again, so side effects inside the computation
//! happen at most once per cell.
//!
//! Cloning a suspension clones the handle, not the computation: all clones
//! share one cell, and whichever consumer forces first does the work for
//! everyone.
//!
//! ## Example
//!
//! ```
//! use lazy_core::Suspension;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let calls = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&calls);
//! let answer = Suspension::new(move || {
//!     counter.set(counter.get() + 1);
//!     6 * 7
//! });
//!
//! // Nothing has run yet.
//! assert_eq!(calls.get(), 0);
//!
//! assert_eq!(*answer.force(), 42);
//! assert_eq!(*answer.force(), 42);
//! assert_eq!(calls.get(), 1);
//! ```

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::error::ForceError;

type Thunk<T> = Box<dyn FnOnce() -> T>;

/// A memoized, single-evaluation deferred computation.
///
/// Single-threaded: the handle is `!Send` and `!Sync`. Use
/// [`SyncSuspension`](crate::SyncSuspension) to share a suspension across
/// threads.
pub struct Suspension<T> {
    cell: Rc<SuspensionCell<T>>,
}

struct SuspensionCell<T> {
    value: OnceCell<T>,
    compute: RefCell<Option<Thunk<T>>>,
    evaluating: Cell<bool>,
}

/// Observable state of a suspension, as reported by [`Suspension::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspensionState {
    Pending,
    Evaluating,
    Evaluated,
    Poisoned,
}

impl<T> Suspension<T> {
    /// Wraps `compute` without running it.
    ///
    /// # Scheme equivalent
    /// ```scheme
    /// (delay (expensive-computation))
    /// ```
    pub fn new<F>(compute: F) -> Self
    where
        F: FnOnce() -> T + 'static,
    {
        Self {
            cell: Rc::new(SuspensionCell {
                value: OnceCell::new(),
                compute: RefCell::new(Some(Box::new(compute))),
                evaluating: Cell::new(false),
            }),
        }
    }

    /// Creates a suspension that is already evaluated.
    pub fn evaluated(value: T) -> Self {
        Self {
            cell: Rc::new(SuspensionCell {
                value: OnceCell::from(value),
                compute: RefCell::new(None),
                evaluating: Cell::new(false),
            }),
        }
    }

    /// Returns the value, running the computation on the first call only.
    ///
    /// # Panics
    ///
    /// Panics if the computation panics, if it panicked on an earlier force
    /// ([`ForceError::Poisoned`]), or if the suspension is forced from inside
    /// its own computation ([`ForceError::Cycle`]). Use
    /// [`try_force`](Self::try_force) to observe the latter two as errors.
    ///
    /// # Scheme equivalent
    /// ```scheme
    /// (force promise)
    /// ```
    pub fn force(&self) -> &T {
        match self.try_force() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns the value, running the computation on the first call only.
    ///
    /// A panic inside the computation still unwinds through this call; the
    /// cell is left poisoned and every later call returns
    /// [`ForceError::Poisoned`] without running anything.
    pub fn try_force(&self) -> Result<&T, ForceError> {
        if let Some(value) = self.cell.value.get() {
            return Ok(value);
        }
        if self.cell.evaluating.get() {
            trace!("suspension forced re-entrantly");
            return Err(ForceError::Cycle);
        }

        let compute = self.cell.compute.borrow_mut().take();
        let Some(compute) = compute else {
            return Err(ForceError::Poisoned);
        };

        trace!("forcing pending suspension");
        let value = {
            let _guard = EvaluatingGuard::enter(&self.cell.evaluating);
            compute()
        };
        // Re-entrant forcing is rejected above, so the slot is still empty.
        Ok(self.cell.value.get_or_init(|| value))
    }

    /// Returns the cached value without forcing.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.cell.value.get()
    }

    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.cell.value.get().is_some()
    }

    #[must_use]
    pub fn state(&self) -> SuspensionState {
        if self.cell.value.get().is_some() {
            SuspensionState::Evaluated
        } else if self.cell.evaluating.get() {
            SuspensionState::Evaluating
        } else if self.cell.compute.borrow().is_some() {
            SuspensionState::Pending
        } else {
            SuspensionState::Poisoned
        }
    }

    /// Returns `true` if both handles share one cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    /// Takes the cached value out if this is the last handle to the cell.
    ///
    /// Returns `None` when other handles exist or the cell was never
    /// evaluated; in both cases this handle is simply dropped.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        Rc::into_inner(self.cell).and_then(|cell| cell.value.into_inner())
    }
}

impl<T: 'static> Suspension<T> {
    /// Derives a new suspension whose computation forces `self` and applies
    /// `f`. Neither suspension is forced by this call.
    pub fn map<U, F>(self, f: F) -> Suspension<U>
    where
        F: FnOnce(&T) -> U + 'static,
    {
        Suspension::new(move || f(self.force()))
    }
}

impl<T> Clone for Suspension<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T> From<T> for Suspension<T> {
    fn from(value: T) -> Self {
        Self::evaluated(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Suspension<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.peek() {
            Some(value) => f.debug_tuple("Suspension").field(value).finish(),
            None => write!(f, "Suspension(<{:?}>)", self.state()),
        }
    }
}

/// Marks a cell as evaluating for the duration of its computation.
struct EvaluatingGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> EvaluatingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for EvaluatingGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
        if std::thread::panicking() {
            trace!("suspension poisoned by a panicking computation");
        }
    }
}
