//! Per-thread reentrancy accounting.
//!
//! External hooks run arbitrary code, and that code may call back into
//! the allocator that invoked the hook. The dispatch layer brackets
//! every call into an external hook with [`enter`]/[`exit`], so
//! allocator code can ask [`is_reentrant`] whether foreign code is on
//! the current thread's stack and take a restricted path if so.
//!
//! Accounting is kept as two cumulative counters rather than a single
//! depth so that a completed bracket leaves a visible trace: after a
//! hook returns, [`depth`] is back where it started but [`entries`]
//! and [`exits`] have both advanced by one.
//!
//! Operations that never leave the allocator, meaning the default hook
//! implementations and dispatches whose slot is absent, are not
//! bracketed. The marker answers "is foreign code running", and for
//! those paths the answer is no.

use std::cell::Cell;

thread_local! {
    static ENTERED: Cell<u64> = const { Cell::new(0) };
    static EXITED: Cell<u64> = const { Cell::new(0) };
}

/// Marks entry into an external hook on the current thread.
pub fn enter() {
    ENTERED.with(|c| c.set(c.get() + 1));
}

/// Marks exit from an external hook on the current thread.
///
/// Every `exit` must close a preceding [`enter`] on the same thread.
pub fn exit() {
    let entered = ENTERED.with(Cell::get);
    let exited = EXITED.with(Cell::get);
    debug_assert!(exited < entered, "reentrancy exit without a matching enter");
    EXITED.with(|c| c.set(exited + 1));
}

/// Number of hook frames currently open on this thread.
pub fn depth() -> u64 {
    let entered = ENTERED.with(Cell::get);
    let exited = EXITED.with(Cell::get);
    entered.saturating_sub(exited)
}

/// True while the current thread is inside an external hook.
pub fn is_reentrant() -> bool {
    depth() > 0
}

/// Cumulative count of hook entries on this thread.
pub fn entries() -> u64 {
    ENTERED.with(Cell::get)
}

/// Cumulative count of hook exits on this thread.
pub fn exits() -> u64 {
    EXITED.with(Cell::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counters are thread-local and the harness may reuse threads, so
    // every test works in deltas from its own starting point.

    #[test]
    fn brackets_nest_and_unwind() {
        let (d0, e0, x0) = (depth(), entries(), exits());
        enter();
        enter();
        assert_eq!(depth(), d0 + 2);
        assert!(is_reentrant());
        exit();
        assert_eq!(depth(), d0 + 1);
        exit();
        assert_eq!(depth(), d0);
        assert_eq!(entries(), e0 + 2);
        assert_eq!(exits(), x0 + 2);
    }

    #[test]
    fn completed_bracket_leaves_a_trace() {
        let (d0, e0, x0) = (depth(), entries(), exits());
        enter();
        exit();
        assert_eq!(depth(), d0);
        assert_eq!(entries(), e0 + 1);
        assert_eq!(exits(), x0 + 1);
    }

    #[test]
    fn other_threads_are_unaffected() {
        enter();
        let observed = std::thread::spawn(|| (depth(), is_reentrant()))
            .join()
            .unwrap();
        assert_eq!(observed, (0, false));
        exit();
    }
}
