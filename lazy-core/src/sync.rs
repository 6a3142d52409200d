//! # Thread-Safe Suspensions
//!
//! [`SyncSuspension<T>`] has the same call-by-need contract as
//! [`Suspension<T>`](crate::Suspension), but its handle is `Send + Sync`.
//! The pending → evaluated transition is guarded: concurrent forcers block
//! until the first forcer finishes, then all of them observe the same
//! cached value.
//!
//! ```text
//! Thread 1                 SyncSuspension              Thread 2
//!    │                          │                         │
//!    ├─> force() ──> runs compute (owner = T1)            │
//!    │                          │ <───────── force() ─────┤ blocks
//!    │    value cached <────────┤                         │
//!    │                          ├──────> same &T ────────>┤
//! ```
//!
//! ## Example
//!
//! ```
//! use lazy_core::SyncSuspension;
//! use std::thread;
//!
//! let shared = SyncSuspension::new(|| (1..=10).sum::<u64>());
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let shared = shared.clone();
//!         thread::spawn(move || *shared.force())
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     assert_eq!(handle.join().unwrap(), 55);
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::ForceError;
use crate::suspension::SuspensionState;

type SendThunk<T> = Box<dyn FnOnce() -> T + Send>;

/// A memoized deferred computation that may be forced from any thread.
pub struct SyncSuspension<T> {
    cell: Arc<SyncCell<T>>,
}

struct SyncCell<T> {
    value: OnceCell<T>,
    compute: Mutex<Option<SendThunk<T>>>,
    // Thread currently running `compute`, used to report re-entrant forcing
    // instead of deadlocking on the cell.
    owner: Mutex<Option<ThreadId>>,
}

impl<T> SyncSuspension<T> {
    pub fn new<F>(compute: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            cell: Arc::new(SyncCell {
                value: OnceCell::new(),
                compute: Mutex::new(Some(Box::new(compute))),
                owner: Mutex::new(None),
            }),
        }
    }

    pub fn evaluated(value: T) -> Self {
        Self {
            cell: Arc::new(SyncCell {
                value: OnceCell::with_value(value),
                compute: Mutex::new(None),
                owner: Mutex::new(None),
            }),
        }
    }

    /// Returns the value, running the computation on the first call only.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`Suspension::force`](crate::Suspension::force).
    pub fn force(&self) -> &T {
        match self.try_force() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns the value, blocking while another thread is computing it.
    pub fn try_force(&self) -> Result<&T, ForceError> {
        if let Some(value) = self.cell.value.get() {
            return Ok(value);
        }

        let me = thread::current().id();
        if *self.cell.owner.lock() == Some(me) {
            trace!("sync suspension forced re-entrantly");
            return Err(ForceError::Cycle);
        }

        self.cell.value.get_or_try_init(|| {
            // A waiter that gets here after the owner panicked finds the
            // computation already taken.
            let compute = self.cell.compute.lock().take().ok_or(ForceError::Poisoned)?;
            trace!(thread = ?me, "forcing pending sync suspension");
            let _guard = OwnerGuard::enter(&self.cell.owner, me);
            Ok(compute())
        })
    }

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
        } else if self.cell.owner.lock().is_some() {
            SuspensionState::Evaluating
        } else if self.cell.compute.lock().is_some() {
            SuspensionState::Pending
        } else {
            SuspensionState::Poisoned
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> Clone for SyncSuspension<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SyncSuspension<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.peek() {
            Some(value) => f.debug_tuple("SyncSuspension").field(value).finish(),
            None => write!(f, "SyncSuspension(<{:?}>)", self.state()),
        }
    }
}

struct OwnerGuard<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
}

impl<'a> OwnerGuard<'a> {
    fn enter(owner: &'a Mutex<Option<ThreadId>>, me: ThreadId) -> Self {
        *owner.lock() = Some(me);
        Self { owner }
    }
}

impl Drop for OwnerGuard<'_> {
    fn drop(&mut self) {
        *self.owner.lock() = None;
        if thread::panicking() {
            trace!("sync suspension poisoned by a panicking computation");
        }
    }
}
