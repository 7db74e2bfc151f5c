//! Reusable hook-table test fixtures.
//!
//! Three standard tables for dispatch testing:
//!
//! - [`counting_hooks`] — every slot present; each call tallies and succeeds.
//! - [`failing_hooks`] — every slot present; each call tallies and reports
//!   failure.
//! - [`alloc_only_hooks`] — the mandatory alloc slot only; every optional
//!   slot absent.
//!
//! Hook slots are plain function pointers and cannot carry per-table
//! state, so the tallies live in a thread-local [`HookCalls`] read with
//! [`calls`] and cleared with [`reset_calls`]. Thread-local rather than
//! shared: the test harness runs tests on parallel threads, and one
//! test's counts must not bleed into another's.
//!
//! Fixture allocations are dangling, well-aligned addresses. None of
//! these tables touches memory, so the addresses must never be
//! dereferenced — they exist to be threaded through dispatch and
//! compared.

use std::cell::Cell;
use std::ptr::NonNull;

use talus_core::{DomainId, ExtentHooks};

/// Per-slot invocation tally for the fixture tables, as seen by the
/// current thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HookCalls {
    pub alloc: u64,
    pub dalloc: u64,
    pub destroy: u64,
    pub commit: u64,
    pub decommit: u64,
    pub purge_lazy: u64,
    pub purge_forced: u64,
    pub split: u64,
    pub merge: u64,
}

impl HookCalls {
    const ZERO: HookCalls = HookCalls {
        alloc: 0,
        dalloc: 0,
        destroy: 0,
        commit: 0,
        decommit: 0,
        purge_lazy: 0,
        purge_forced: 0,
        split: 0,
        merge: 0,
    };

    /// Sum of the tallies across all slots.
    pub fn total(&self) -> u64 {
        self.alloc
            + self.dalloc
            + self.destroy
            + self.commit
            + self.decommit
            + self.purge_lazy
            + self.purge_forced
            + self.split
            + self.merge
    }
}

thread_local! {
    static CALLS: Cell<HookCalls> = const { Cell::new(HookCalls::ZERO) };
}

/// Invocation tallies accumulated on the current thread since the last
/// [`reset_calls`].
pub fn calls() -> HookCalls {
    CALLS.with(Cell::get)
}

/// Clears the current thread's invocation tallies.
pub fn reset_calls() {
    CALLS.with(|c| c.set(HookCalls::ZERO));
}

fn bump(f: impl FnOnce(&mut HookCalls)) {
    CALLS.with(|c| {
        let mut tally = c.get();
        f(&mut tally);
        c.set(tally);
    });
}

// ── Fixture tables ──────────────────────────────────────────────────

static COUNTING: ExtentHooks = ExtentHooks {
    alloc: counting_alloc,
    dalloc: Some(counting_dalloc),
    destroy: Some(counting_destroy),
    commit: Some(counting_commit),
    decommit: Some(counting_decommit),
    purge_lazy: Some(counting_purge_lazy),
    purge_forced: Some(counting_purge_forced),
    split: Some(counting_split),
    merge: Some(counting_merge),
};

static FAILING: ExtentHooks = ExtentHooks {
    alloc: failing_alloc,
    dalloc: Some(failing_dalloc),
    destroy: Some(counting_destroy),
    commit: Some(failing_commit),
    decommit: Some(failing_decommit),
    purge_lazy: Some(failing_purge_lazy),
    purge_forced: Some(failing_purge_forced),
    split: Some(failing_split),
    merge: Some(failing_merge),
};

static ALLOC_ONLY: ExtentHooks = ExtentHooks {
    alloc: counting_alloc,
    dalloc: None,
    destroy: None,
    commit: None,
    decommit: None,
    purge_lazy: None,
    purge_forced: None,
    split: None,
    merge: None,
};

/// A table whose every slot is present, tallies its call, and succeeds.
///
/// Alloc hands out a dangling address aligned to the request. Never
/// dereference fixture extents.
pub fn counting_hooks() -> &'static ExtentHooks {
    &COUNTING
}

/// A table whose every slot is present, tallies its call, and reports
/// failure (alloc returns `None`).
///
/// Destroy has no failure channel, so its slot tallies like the
/// counting table's.
pub fn failing_hooks() -> &'static ExtentHooks {
    &FAILING
}

/// A table with only the mandatory alloc slot; every optional slot is
/// absent, so dispatch takes its neutral-result path for all of them.
pub fn alloc_only_hooks() -> &'static ExtentHooks {
    &ALLOC_ONLY
}

// ── Slot implementations ────────────────────────────────────────────
//
// Safe fns: they coerce to the unsafe hook pointer types at the table
// definitions above, and never do anything a safe fn could not.

fn counting_alloc(
    _table: &ExtentHooks,
    new_addr: Option<NonNull<u8>>,
    _size: usize,
    alignment: usize,
    _zero: &mut bool,
    _commit: &mut bool,
    _domain: DomainId,
) -> Option<NonNull<u8>> {
    bump(|t| t.alloc += 1);
    // Honor a placement request exactly; otherwise the alignment value
    // itself is a nonzero address with the right alignment.
    new_addr.or_else(|| NonNull::new(alignment as *mut u8))
}

fn counting_dalloc(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    bump(|t| t.dalloc += 1);
    false
}

fn counting_destroy(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _committed: bool,
    _domain: DomainId,
) {
    bump(|t| t.destroy += 1);
}

fn counting_commit(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    bump(|t| t.commit += 1);
    false
}

fn counting_decommit(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    bump(|t| t.decommit += 1);
    false
}

fn counting_purge_lazy(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    bump(|t| t.purge_lazy += 1);
    false
}

fn counting_purge_forced(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    bump(|t| t.purge_forced += 1);
    false
}

fn counting_split(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _size_a: usize,
    _size_b: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    bump(|t| t.split += 1);
    false
}

fn counting_merge(
    _table: &ExtentHooks,
    _addr_a: NonNull<u8>,
    _size_a: usize,
    _addr_b: NonNull<u8>,
    _size_b: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    bump(|t| t.merge += 1);
    false
}

fn failing_alloc(
    _table: &ExtentHooks,
    _new_addr: Option<NonNull<u8>>,
    _size: usize,
    _alignment: usize,
    _zero: &mut bool,
    _commit: &mut bool,
    _domain: DomainId,
) -> Option<NonNull<u8>> {
    bump(|t| t.alloc += 1);
    None
}

fn failing_dalloc(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    bump(|t| t.dalloc += 1);
    true
}

fn failing_commit(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    bump(|t| t.commit += 1);
    true
}

fn failing_decommit(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    bump(|t| t.decommit += 1);
    true
}

fn failing_purge_lazy(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    bump(|t| t.purge_lazy += 1);
    true
}

fn failing_purge_forced(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    bump(|t| t.purge_forced += 1);
    true
}

fn failing_split(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _size_a: usize,
    _size_b: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    bump(|t| t.split += 1);
    true
}

fn failing_merge(
    _table: &ExtentHooks,
    _addr_a: NonNull<u8>,
    _size_a: usize,
    _addr_b: NonNull<u8>,
    _size_b: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    bump(|t| t.merge += 1);
    true
}
