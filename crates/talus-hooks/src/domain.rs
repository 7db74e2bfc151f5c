//! Per-domain hook table holder and dispatch.
//!
//! [`DomainHooks`] is the one piece of mutable state in this crate: an
//! atomic pointer to the domain's current [`ExtentHooks`] table. Every
//! operation dispatches the same way:
//!
//! 1. load the table pointer once (`Acquire`), and use that snapshot
//!    for every decision that follows;
//! 2. if the snapshot is the default table, call the physical impl
//!    directly, with no table indirection and no reentrancy marker;
//! 3. if the snapshot's slot is absent, return that operation's
//!    neutral result, again without touching the marker;
//! 4. otherwise open a `ReentrancyGuard` and call through the slot.
//!
//! A `set` racing a dispatch is benign: the dispatch runs entirely
//! against its snapshot, so it executes the old table or the new one,
//! never a mixture.

#![allow(unsafe_code)]

use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicPtr, Ordering};

use talus_core::{DomainId, ExtentHooks};

use crate::default::{self, default_hooks};
use crate::guard::ReentrancyGuard;

/// Hook table holder and dispatcher for one allocator domain.
///
/// The holder always points at a live table: it is constructed with
/// one and [`set`](Self::set) only replaces it with another. Tables
/// are `&'static`, so a reference obtained from [`get`](Self::get)
/// stays valid across any number of later swaps.
#[derive(Debug)]
pub struct DomainHooks {
    table: AtomicPtr<ExtentHooks>,
}

// Compile-time assertion: DomainHooks must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<DomainHooks>();
};

impl Default for DomainHooks {
    /// A holder starting on the built-in default table.
    fn default() -> Self {
        Self::new(default_hooks())
    }
}

impl DomainHooks {
    /// Creates a holder with `table` installed.
    pub const fn new(table: &'static ExtentHooks) -> Self {
        Self {
            table: AtomicPtr::new(ptr::from_ref(table).cast_mut()),
        }
    }

    /// Atomically installs `table` as the domain's current table.
    ///
    /// `Release` store: a thread that observes the new pointer through
    /// [`get`](Self::get) also observes everything the installing
    /// thread wrote beforehand, so a table may be filled in and then
    /// published with no further synchronization.
    pub fn set(&self, table: &'static ExtentHooks) {
        self.table
            .store(ptr::from_ref(table).cast_mut(), Ordering::Release);
    }

    /// Returns the currently installed table.
    pub fn get(&self) -> &'static ExtentHooks {
        let raw = self.table.load(Ordering::Acquire);
        // SAFETY: the holder only ever stores pointers derived from
        // `&'static ExtentHooks` (in `new` and `set`), so `raw` is
        // non-null, aligned, and valid for the life of the process.
        unsafe { &*raw }
    }

    /// True when the currently installed table is the built-in default
    /// table.
    ///
    /// Identity, not contents: a user table whose slots all equal the
    /// default's is still not the default.
    pub fn is_default(&self) -> bool {
        table_is_default(self.get())
    }

    /// True when a [`split`](Self::split) through the current table
    /// would fail without attempting it.
    ///
    /// Answers for the table installed at the moment of the call; no
    /// hook is invoked.
    pub fn split_will_fail(&self) -> bool {
        let table = self.get();
        !table_is_default(table) && table.split.is_none()
    }

    /// True when a [`merge`](Self::merge) through the current table
    /// would fail without attempting it.
    pub fn merge_will_fail(&self) -> bool {
        let table = self.get();
        !table_is_default(table) && table.merge.is_none()
    }

    /// Allocates an extent of `size` bytes aligned to `alignment`
    /// through the current table.
    ///
    /// `new_addr`, `zero`, and `commit` carry the
    /// [`AllocHook`](talus_core::AllocHook) placement and in-out flag
    /// semantics unchanged. Returns the extent base, or `None` on
    /// failure.
    ///
    /// # Safety
    ///
    /// Caller upholds the [`AllocHook`](talus_core::AllocHook)
    /// contract: `alignment` a nonzero power of two, `size` a nonzero
    /// multiple of the page size.
    pub unsafe fn alloc(
        &self,
        new_addr: Option<NonNull<u8>>,
        size: usize,
        alignment: usize,
        zero: &mut bool,
        commit: &mut bool,
        domain: DomainId,
    ) -> Option<NonNull<u8>> {
        let table = self.get();
        if table_is_default(table) {
            return default::default_alloc_impl(new_addr, size, alignment, zero, commit);
        }
        let _guard = ReentrancyGuard::enter();
        // SAFETY: forwarded caller contract.
        unsafe { (table.alloc)(table, new_addr, size, alignment, zero, commit, domain) }
    }

    /// Returns the extent at `addr` to its source through the current
    /// table.
    ///
    /// Returns `true` when the table declined (or could not accept)
    /// the deallocation; the caller then retains the extent.
    ///
    /// # Safety
    ///
    /// `addr`/`size` must describe a live extent obtained through this
    /// domain's tables, with no outstanding references into it.
    pub unsafe fn dalloc(
        &self,
        addr: NonNull<u8>,
        size: usize,
        committed: bool,
        domain: DomainId,
    ) -> bool {
        let table = self.get();
        if table_is_default(table) {
            // SAFETY: forwarded caller contract.
            return unsafe { default::default_dalloc_impl(addr, size) };
        }
        let Some(hook) = table.dalloc else {
            // No slot, no way to release; the caller keeps the extent.
            return true;
        };
        let _guard = ReentrancyGuard::enter();
        // SAFETY: forwarded caller contract.
        unsafe { hook(table, addr, size, committed, domain) }
    }

    /// Tears down the extent at `addr` unconditionally.
    ///
    /// Destruction cannot be declined; with no slot the extent is
    /// simply abandoned in place.
    ///
    /// # Safety
    ///
    /// Same requirements as [`dalloc`](Self::dalloc).
    pub unsafe fn destroy(
        &self,
        addr: NonNull<u8>,
        size: usize,
        committed: bool,
        domain: DomainId,
    ) {
        let table = self.get();
        if table_is_default(table) {
            // SAFETY: forwarded caller contract.
            unsafe { default::default_destroy_impl(addr, size) };
            return;
        }
        let Some(hook) = table.destroy else {
            return;
        };
        let _guard = ReentrancyGuard::enter();
        // SAFETY: forwarded caller contract.
        unsafe { hook(table, addr, size, committed, domain) }
    }

    /// Commits `offset..offset + length` of the extent at `addr`.
    ///
    /// Returns `true` on failure. With no slot the answer is `false`:
    /// a table that cannot commit serves always-committed memory, so
    /// there is nothing to do.
    ///
    /// # Safety
    ///
    /// Caller upholds the [`CommitHook`](talus_core::CommitHook) range
    /// contract.
    pub unsafe fn commit(
        &self,
        addr: NonNull<u8>,
        size: usize,
        offset: usize,
        length: usize,
        domain: DomainId,
    ) -> bool {
        let table = self.get();
        if table_is_default(table) {
            // SAFETY: forwarded caller contract.
            return unsafe { default::default_commit_impl(addr, offset, length) };
        }
        let Some(hook) = table.commit else {
            return false;
        };
        let _guard = ReentrancyGuard::enter();
        // SAFETY: forwarded caller contract.
        unsafe { hook(table, addr, size, offset, length, domain) }
    }

    /// Decommits `offset..offset + length` of the extent at `addr`.
    ///
    /// Returns `true` on failure. With no slot the answer is `false`
    /// and the range simply stays committed and usable.
    ///
    /// # Safety
    ///
    /// Same requirements as [`commit`](Self::commit).
    pub unsafe fn decommit(
        &self,
        addr: NonNull<u8>,
        size: usize,
        offset: usize,
        length: usize,
        domain: DomainId,
    ) -> bool {
        let table = self.get();
        if table_is_default(table) {
            // SAFETY: forwarded caller contract.
            return unsafe { default::default_decommit_impl(addr, offset, length) };
        }
        let Some(hook) = table.decommit else {
            return false;
        };
        let _guard = ReentrancyGuard::enter();
        // SAFETY: forwarded caller contract.
        unsafe { hook(table, addr, size, offset, length, domain) }
    }

    /// Lazily purges `offset..offset + length` of the extent at
    /// `addr`.
    ///
    /// Returns `true` if the range was not purged. With no slot (which
    /// includes the default table on targets without an OS lazy-purge
    /// primitive) the answer is `false`: purging is advisory, and
    /// "kept the pages" is an acceptable outcome.
    ///
    /// # Safety
    ///
    /// Same requirements as [`commit`](Self::commit); the range must
    /// be committed.
    pub unsafe fn purge_lazy(
        &self,
        addr: NonNull<u8>,
        size: usize,
        offset: usize,
        length: usize,
        domain: DomainId,
    ) -> bool {
        let table = self.get();
        if table_is_default(table) {
            #[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
            {
                // SAFETY: forwarded caller contract.
                return unsafe { default::default_purge_lazy_impl(addr, offset, length) };
            }
        }
        let Some(hook) = table.purge_lazy else {
            return false;
        };
        let _guard = ReentrancyGuard::enter();
        // SAFETY: forwarded caller contract.
        unsafe { hook(table, addr, size, offset, length, domain) }
    }

    /// Forcibly purges `offset..offset + length` of the extent at
    /// `addr`; on success the range reads back as zeroes.
    ///
    /// Returns `true` if the range was not purged, with the same
    /// absent-slot reading as [`purge_lazy`](Self::purge_lazy).
    ///
    /// # Safety
    ///
    /// Same requirements as [`commit`](Self::commit); the range must
    /// be committed.
    pub unsafe fn purge_forced(
        &self,
        addr: NonNull<u8>,
        size: usize,
        offset: usize,
        length: usize,
        domain: DomainId,
    ) -> bool {
        let table = self.get();
        if table_is_default(table) {
            #[cfg(target_os = "linux")]
            {
                // SAFETY: forwarded caller contract.
                return unsafe { default::default_purge_forced_impl(addr, offset, length) };
            }
        }
        let Some(hook) = table.purge_forced else {
            return false;
        };
        let _guard = ReentrancyGuard::enter();
        // SAFETY: forwarded caller contract.
        unsafe { hook(table, addr, size, offset, length, domain) }
    }

    /// Splits the extent at `addr` into two extents of `size_a` and
    /// `size_b` bytes.
    ///
    /// Returns `true` on failure, leaving the extent whole. The
    /// default table always succeeds (its extents are flat mappings
    /// and the split is pure bookkeeping); a table with no slot always
    /// fails, which is what [`split_will_fail`](Self::split_will_fail)
    /// predicts.
    ///
    /// # Safety
    ///
    /// `addr`/`size` must describe a live extent of this domain and
    /// `size_a + size_b` must equal `size`.
    pub unsafe fn split(
        &self,
        addr: NonNull<u8>,
        size: usize,
        size_a: usize,
        size_b: usize,
        committed: bool,
        domain: DomainId,
    ) -> bool {
        debug_assert_eq!(size_a + size_b, size, "split sizes must cover the extent");
        let table = self.get();
        if table_is_default(table) {
            return default::default_split_impl();
        }
        let Some(hook) = table.split else {
            return true;
        };
        let _guard = ReentrancyGuard::enter();
        // SAFETY: forwarded caller contract.
        unsafe { hook(table, addr, size, size_a, size_b, committed, domain) }
    }

    /// Merges the adjacent extents at `addr_a` and `addr_b` into one.
    ///
    /// Returns `true` on failure, leaving both extents usable
    /// separately. Absence behaves as for [`split`](Self::split).
    ///
    /// # Safety
    ///
    /// The extents must be live, belong to this domain, and satisfy
    /// `addr_b == addr_a + size_a`.
    pub unsafe fn merge(
        &self,
        addr_a: NonNull<u8>,
        size_a: usize,
        addr_b: NonNull<u8>,
        size_b: usize,
        committed: bool,
        domain: DomainId,
    ) -> bool {
        let table = self.get();
        if table_is_default(table) {
            return default::default_merge_impl(addr_a, addr_b);
        }
        let Some(hook) = table.merge else {
            return true;
        };
        let _guard = ReentrancyGuard::enter();
        // SAFETY: forwarded caller contract.
        unsafe { hook(table, addr_a, size_a, addr_b, size_b, committed, domain) }
    }
}

/// Identity test against the one default table.
fn table_is_default(table: &ExtentHooks) -> bool {
    ptr::eq(table, default_hooks())
}
