//! Integration test: the split/merge capability probes.
//!
//! `split_will_fail` and `merge_will_fail` exist so the extent manager
//! can skip preparing bookkeeping for an operation the active table
//! cannot perform. Each probe must answer from the slot's presence
//! alone — true exactly when the slot is absent — without invoking
//! anything, and must track table swaps.

use std::ptr::NonNull;

use proptest::prelude::*;
use talus_core::{DomainId, ExtentHooks};
use talus_hooks::{default_hooks, DomainHooks};
use talus_test_utils::{alloc_only_hooks, calls, counting_hooks, reset_calls};

const DOMAIN: DomainId = DomainId(5);
const SIZE: usize = 1 << 16;

#[test]
fn probes_flip_across_swaps_without_calling_hooks() {
    reset_calls();
    let hooks = DomainHooks::new(counting_hooks());
    assert!(!hooks.split_will_fail());
    assert!(!hooks.merge_will_fail());

    hooks.set(alloc_only_hooks());
    assert!(hooks.split_will_fail());
    assert!(hooks.merge_will_fail());

    hooks.set(default_hooks());
    assert!(!hooks.split_will_fail());
    assert!(!hooks.merge_will_fail());

    assert_eq!(calls().total(), 0, "probes must never invoke a slot");
}

#[test]
fn probe_verdicts_match_dispatch_outcomes() {
    // When the probe predicts failure, dispatch must deliver it.
    reset_calls();
    let hooks = DomainHooks::new(alloc_only_hooks());
    assert!(hooks.split_will_fail());
    assert!(hooks.merge_will_fail());

    let a = NonNull::new(0x40_0000 as *mut u8).unwrap();
    let b = NonNull::new((0x40_0000 + SIZE / 2) as *mut u8).unwrap();
    // SAFETY: the slots are absent, so no hook receives the addresses.
    unsafe {
        assert!(hooks.split(a, SIZE, SIZE / 2, SIZE / 2, true, DOMAIN));
        assert!(hooks.merge(a, SIZE / 2, b, SIZE / 2, true, DOMAIN));
    }
    assert_eq!(calls().total(), 0);
}

// ── Probe/presence agreement over arbitrary tables ───────────────────

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

fn stub_dalloc(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    false
}

fn stub_destroy(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _committed: bool,
    _domain: DomainId,
) {
}

fn stub_range_op(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _offset: usize,
    _length: usize,
    _domain: DomainId,
) -> bool {
    false
}

fn stub_split(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _size_a: usize,
    _size_b: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    false
}

fn stub_merge(
    _table: &ExtentHooks,
    _addr_a: NonNull<u8>,
    _size_a: usize,
    _addr_b: NonNull<u8>,
    _size_b: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    false
}

/// Builds a table whose optional slots are present according to the
/// low eight bits of `mask`.
fn table_with_mask(mask: u8) -> ExtentHooks {
    let mut table = ExtentHooks {
        alloc: stub_alloc,
        dalloc: None,
        destroy: None,
        commit: None,
        decommit: None,
        purge_lazy: None,
        purge_forced: None,
        split: None,
        merge: None,
    };
    if mask & 0x01 != 0 {
        table.dalloc = Some(stub_dalloc);
    }
    if mask & 0x02 != 0 {
        table.destroy = Some(stub_destroy);
    }
    if mask & 0x04 != 0 {
        table.commit = Some(stub_range_op);
    }
    if mask & 0x08 != 0 {
        table.decommit = Some(stub_range_op);
    }
    if mask & 0x10 != 0 {
        table.purge_lazy = Some(stub_range_op);
    }
    if mask & 0x20 != 0 {
        table.purge_forced = Some(stub_range_op);
    }
    if mask & 0x40 != 0 {
        table.split = Some(stub_split);
    }
    if mask & 0x80 != 0 {
        table.merge = Some(stub_merge);
    }
    table
}

proptest! {
    #[test]
    fn probes_agree_with_slot_presence(mask in any::<u8>()) {
        // Holders take 'static tables; the few bytes per case are
        // deliberately leaked.
        let table: &'static ExtentHooks = Box::leak(Box::new(table_with_mask(mask)));
        let hooks = DomainHooks::new(table);
        prop_assert_eq!(hooks.split_will_fail(), table.split.is_none());
        prop_assert_eq!(hooks.merge_will_fail(), table.merge.is_none());
    }

    #[test]
    fn probes_track_the_latest_swap(first in any::<u8>(), second in any::<u8>()) {
        let t1: &'static ExtentHooks = Box::leak(Box::new(table_with_mask(first)));
        let t2: &'static ExtentHooks = Box::leak(Box::new(table_with_mask(second)));
        let hooks = DomainHooks::new(t1);
        hooks.set(t2);
        prop_assert_eq!(hooks.split_will_fail(), t2.split.is_none());
        prop_assert_eq!(hooks.merge_will_fail(), t2.merge.is_none());
    }
}
