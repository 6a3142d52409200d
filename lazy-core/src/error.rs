//! # Forcing Errors
//!
//! Failures reported when a suspension cannot produce its value.
//!
//! A computation that fails by returning an error is not a forcing error:
//! wrap it as `Suspension<Result<T, E>>` and the `Err` is memoized like any
//! other value. The variants here cover the two ways the cell itself can be
//! left without a value.

/// Errors returned by [`Suspension::try_force`](crate::Suspension::try_force)
/// and [`SyncSuspension::try_force`](crate::SyncSuspension::try_force).
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceError {
    /// The computation panicked during an earlier force. The panic is not
    /// replayed and the computation is never run again.
    #[error("suspension poisoned: its computation panicked on an earlier force")]
    Poisoned,

    /// The suspension was forced from inside its own computation.
    #[error("suspension forced re-entrantly while its computation was running")]
    Cycle,
}
