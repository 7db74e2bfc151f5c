//! Scoped pairing of the per-thread reentrancy marker.
//!
//! Dispatch wraps every call into external hook code in a
//! [`ReentrancyGuard`] so the marker's enter and exit always arrive in
//! pairs, whatever path the call takes back out.

use std::marker::PhantomData;

use talus_core::reentrancy;

/// Marks the current thread as inside an external hook for the span of
/// the guard's lifetime.
///
/// Construction calls [`reentrancy::enter`]; `Drop` calls
/// [`reentrancy::exit`]. Because the exit lives in `Drop`, the pairing
/// holds on every exit path, early returns and panics alike.
///
/// The marker is per-thread state, so the guard is not `Send`.
pub(crate) struct ReentrancyGuard {
    // *const () keeps the type !Send + !Sync; the enter and exit must
    // land on the same thread's counters.
    _thread_bound: PhantomData<*const ()>,
}

impl ReentrancyGuard {
    /// Opens a hook frame on the current thread.
    pub(crate) fn enter() -> Self {
        reentrancy::enter();
        Self {
            _thread_bound: PhantomData,
        }
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        reentrancy::exit();
    }
}
