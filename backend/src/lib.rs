//! Collaborator layer around the engine: uuid-keyed session registry with
//! per-session mutual exclusion, wall-clock and move-count tracking the core
//! deliberately leaves to its callers, and an in-memory results/statistics
//! store implementing the leaderboard contract.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use error::*;
pub use registry::*;
pub use session::*;
pub use stats::*;

mod error;
mod registry;
mod session;
mod stats;

/// A poisoned lock only means another move panicked mid-session; the state
/// itself is still a valid engine state, so keep serving it.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
