//! # Lazy Streams
//!
//! Possibly infinite sequences whose elements are computed on demand and
//! computed at most once, built on the suspensions from [`lazy_core`].
//!
//! ## Modules
//!
//! - [`stream`]: the [`Stream`] type, its constructors and accessors
//! - [`traverse`]: consumers (`to_vec`, `nth`, folds, iteration)
//! - [`combinators`]: lazy transformations (`map`, `filter`, `take`, ...)
//! - [`sources`]: infinite and generated streams, stream arithmetic
//! - [`approximation`]: successive-approximation processes as streams
//!
//! ## Example
//!
//! ```
//! use lazy_stream::sources::integers_from;
//!
//! let evens: Vec<i64> = integers_from(1)
//!     .map(|x| x * 2)
//!     .filter(|y| y % 4 == 0)
//!     .take(3)
//!     .to_vec();
//! assert_eq!(evens, vec![4, 8, 12]);
//! ```
//!
//! ## Design Principles
//!
//! 1. **Lazy by construction**: combinators build one cell and suspend the rest
//! 2. **Memoized**: every head and tail is forced at most once, across all clones
//! 3. **Stack-safe consumers**: walking or dropping a long stream is a loop
//! 4. **Single-threaded**: `Stream` is `!Send`; use [`SyncSuspension`] to
//!    share deferred work between threads

pub mod approximation;
pub mod combinators;
pub mod sources;
pub mod stream;
pub mod traverse;

pub use lazy_core::{ForceError, Suspension, SuspensionState, SyncSuspension};
pub use stream::Stream;
pub use traverse::StreamIter;
