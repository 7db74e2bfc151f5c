//! Integration test: reentrancy bracketing around external hooks.
//!
//! Every dispatch that reaches a hook slot must enter the per-thread
//! marker exactly once before the call and exit exactly once after it,
//! whether the hook succeeds, reports failure, or panics. The hook
//! itself must observe the marker as set.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr::NonNull;

use talus_core::{reentrancy, DomainId, ExtentHooks};
use talus_hooks::DomainHooks;
use talus_test_utils::{calls, counting_hooks, failing_hooks, reset_calls};

const DOMAIN: DomainId = DomainId(7);
const SIZE: usize = 1 << 16;

fn extent() -> NonNull<u8> {
    NonNull::new(0x20_0000 as *mut u8).unwrap()
}

fn marker_state() -> (u64, u64, u64) {
    (
        reentrancy::entries(),
        reentrancy::exits(),
        reentrancy::depth(),
    )
}

// ── One bracket per dispatched hook ──────────────────────────────────

#[test]
fn successful_hook_is_bracketed_once() {
    reset_calls();
    let hooks = DomainHooks::new(counting_hooks());
    let (e0, x0, d0) = marker_state();
    let (mut zero, mut commit) = (false, true);
    // SAFETY: the fixture returns a dangling address and touches
    // nothing.
    let addr = unsafe { hooks.alloc(None, SIZE, 4096, &mut zero, &mut commit, DOMAIN) };
    assert!(addr.is_some());
    assert_eq!(calls().alloc, 1);
    assert_eq!(marker_state(), (e0 + 1, x0 + 1, d0));
}

#[test]
fn failing_merge_is_bracketed_and_propagates() {
    // The failure comes back verbatim; the exit still runs.
    reset_calls();
    let hooks = DomainHooks::new(failing_hooks());
    let (e0, x0, d0) = marker_state();
    let b = NonNull::new((0x20_0000 + SIZE / 2) as *mut u8).unwrap();
    // SAFETY: fixture slots never dereference their arguments.
    let failed = unsafe { hooks.merge(extent(), SIZE / 2, b, SIZE / 2, true, DOMAIN) };
    assert!(failed, "hook failure must reach the caller unchanged");
    assert_eq!(calls().merge, 1, "the slot runs exactly once");
    assert_eq!(marker_state(), (e0 + 1, x0 + 1, d0));
}

#[test]
fn every_present_slot_is_bracketed() {
    reset_calls();
    let hooks = DomainHooks::new(counting_hooks());
    let (e0, x0, d0) = marker_state();
    let addr = extent();
    let b = NonNull::new((0x20_0000 + SIZE / 2) as *mut u8).unwrap();
    let (mut zero, mut commit) = (false, true);

    // SAFETY: fixture slots never dereference their arguments.
    unsafe {
        hooks.alloc(None, SIZE, 4096, &mut zero, &mut commit, DOMAIN);
        assert!(!hooks.dalloc(addr, SIZE, true, DOMAIN));
        hooks.destroy(addr, SIZE, true, DOMAIN);
        assert!(!hooks.commit(addr, SIZE, 0, SIZE, DOMAIN));
        assert!(!hooks.decommit(addr, SIZE, 0, SIZE, DOMAIN));
        assert!(!hooks.purge_lazy(addr, SIZE, 0, SIZE, DOMAIN));
        assert!(!hooks.purge_forced(addr, SIZE, 0, SIZE, DOMAIN));
        assert!(!hooks.split(addr, SIZE, SIZE / 2, SIZE / 2, true, DOMAIN));
        assert!(!hooks.merge(addr, SIZE / 2, b, SIZE / 2, true, DOMAIN));
    }

    assert_eq!(calls().total(), 9, "all nine slots ran");
    assert_eq!(marker_state(), (e0 + 9, x0 + 9, d0));
}

// ── The hook observes the marker ─────────────────────────────────────

fn stub_alloc(
    _table: &ExtentHooks,
    _new_addr: Option<NonNull<u8>>,
    _size: usize,
    alignment: usize,
    _zero: &mut bool,
    _commit: &mut bool,
    _domain: DomainId,
) -> Option<NonNull<u8>> {
    NonNull::new(alignment as *mut u8)
}

/// Reports failure iff the marker is NOT set, so a `false` return
/// proves the hook ran inside the bracket.
fn marker_probe_commit(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    !reentrancy::is_reentrant()
}

static MARKER_PROBE: ExtentHooks = ExtentHooks {
    alloc: stub_alloc,
    dalloc: None,
    destroy: None,
    commit: Some(marker_probe_commit),
    decommit: None,
    purge_lazy: None,
    purge_forced: None,
    split: None,
    merge: None,
};

#[test]
fn hook_runs_with_the_marker_set() {
    let hooks = DomainHooks::new(&MARKER_PROBE);
    assert!(!reentrancy::is_reentrant());
    // SAFETY: the probe slot only reads thread-local state.
    let failed = unsafe { hooks.commit(extent(), SIZE, 0, SIZE, DOMAIN) };
    assert!(!failed, "the hook must observe the marker as set");
    assert!(!reentrancy::is_reentrant());
}

// ── Panicking hooks ──────────────────────────────────────────────────

fn panicking_commit(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    panic!("commit hook blew up");
}

static PANICKING: ExtentHooks = ExtentHooks {
    alloc: stub_alloc,
    dalloc: None,
    destroy: None,
    commit: Some(panicking_commit),
    decommit: None,
    purge_lazy: None,
    purge_forced: None,
    split: None,
    merge: None,
};

#[test]
fn panicking_hook_still_exits_the_marker() {
    let hooks = DomainHooks::new(&PANICKING);
    let (e0, x0, d0) = marker_state();
    let result = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: the slot panics before touching anything.
        unsafe { hooks.commit(extent(), SIZE, 0, SIZE, DOMAIN) }
    }));
    assert!(result.is_err());
    assert_eq!(
        marker_state(),
        (e0 + 1, x0 + 1, d0),
        "the unwind must close the bracket"
    );
}
