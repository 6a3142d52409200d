//! # Lazy Core
//!
//! Call-by-need building blocks: deferred computations that run at most
//! once and cache their result.
//!
//! ## Modules
//!
//! - [`suspension`]: single-threaded memoized thunks ([`Suspension`])
//! - [`sync`]: thread-safe memoized thunks ([`SyncSuspension`])
//! - [`error`]: forcing failures ([`ForceError`])
//!
//! ## Design Principles
//!
//! 1. **Construction is free**: creating a suspension never runs its computation
//! 2. **At most once**: the first force does the work, later forces read the cache
//! 3. **Failures are sticky**: an `Err` result is cached like any value, and a
//!    panicking computation poisons its cell instead of being retried
//! 4. **Shared, not copied**: clones are handles to the same cell

pub mod error;
pub mod suspension;
pub mod sync;

pub use error::ForceError;
pub use suspension::{Suspension, SuspensionState};
pub use sync::SyncSuspension;
