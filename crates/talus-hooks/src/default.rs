//! The built-in default hook table.
//!
//! The default table backs extents with anonymous OS pages through
//! `talus-pages`. It is a single `static`: [`default_hooks`] always
//! returns the same address, and that address is what the dispatch
//! layer's identity test means by "default".
//!
//! Each slot is a thin adapter from the full hook signature down to a
//! `default_*_impl` function taking only the arguments the physical
//! operation needs. Dispatch calls those impls directly on its fast
//! path, skipping both the table indirection and the reentrancy
//! marker; the adapters exist so the default table is also a complete,
//! well-formed [`ExtentHooks`] value when reached through a slot.
//!
//! On targets without an OS purge primitive the matching purge slot is
//! absent rather than lying about what happened.

#![allow(unsafe_code)]

use std::ptr::NonNull;

use talus_core::{DomainId, ExtentHooks};
use talus_pages as pages;

static DEFAULT: ExtentHooks = ExtentHooks {
    alloc: default_alloc,
    dalloc: Some(default_dalloc),
    destroy: Some(default_destroy),
    commit: Some(default_commit),
    decommit: Some(default_decommit),
    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
    purge_lazy: Some(default_purge_lazy),
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "freebsd")))]
    purge_lazy: None,
    #[cfg(target_os = "linux")]
    purge_forced: Some(default_purge_forced),
    #[cfg(not(target_os = "linux"))]
    purge_forced: None,
    split: Some(default_split),
    merge: Some(default_merge),
};

/// Returns the built-in default hook table.
///
/// There is exactly one default table in the process, and "is the
/// default" everywhere in this crate means pointer identity with this
/// return value.
pub const fn default_hooks() -> &'static ExtentHooks {
    &DEFAULT
}

// ── Physical impls (fast-path entry points) ─────────────────────────
//
// Dispatch calls these directly when the installed table is the
// default, with the minimal argument set and no reentrancy marker.

pub(crate) fn default_alloc_impl(
    new_addr: Option<NonNull<u8>>,
    size: usize,
    alignment: usize,
    zero: &mut bool,
    commit: &mut bool,
) -> Option<NonNull<u8>> {
    let addr = pages::map(new_addr, size, alignment, commit)?;
    // Fresh anonymous pages read as zero whether or not the caller
    // asked for that.
    *zero = true;
    Some(addr)
}

pub(crate) unsafe fn default_dalloc_impl(addr: NonNull<u8>, size: usize) -> bool {
    // SAFETY: forwarded caller contract; the extent came from the
    // default alloc path.
    unsafe { pages::unmap(addr, size) };
    false
}

pub(crate) unsafe fn default_destroy_impl(addr: NonNull<u8>, size: usize) {
    // SAFETY: forwarded caller contract.
    unsafe { pages::unmap(addr, size) };
}

pub(crate) unsafe fn default_commit_impl(addr: NonNull<u8>, offset: usize, length: usize) -> bool {
    // SAFETY: forwarded caller contract; the range lies inside the
    // caller's extent.
    unsafe { pages::commit(offset_ptr(addr, offset), length) }
}

pub(crate) unsafe fn default_decommit_impl(
    addr: NonNull<u8>,
    offset: usize,
    length: usize,
) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { pages::decommit(offset_ptr(addr, offset), length) }
}

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
pub(crate) unsafe fn default_purge_lazy_impl(
    addr: NonNull<u8>,
    offset: usize,
    length: usize,
) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { pages::purge_lazy(offset_ptr(addr, offset), length) }
}

#[cfg(target_os = "linux")]
pub(crate) unsafe fn default_purge_forced_impl(
    addr: NonNull<u8>,
    offset: usize,
    length: usize,
) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { pages::purge_forced(offset_ptr(addr, offset), length) }
}

pub(crate) fn default_split_impl() -> bool {
    // One flat anonymous mapping splits by bookkeeping alone; there is
    // nothing the OS needs to hear about.
    false
}

pub(crate) fn default_merge_impl(addr_a: NonNull<u8>, addr_b: NonNull<u8>) -> bool {
    debug_assert!(addr_a < addr_b, "merge operands out of address order");
    false
}

/// `addr + offset`; the caller keeps the sum inside its extent.
unsafe fn offset_ptr(addr: NonNull<u8>, offset: usize) -> NonNull<u8> {
    // SAFETY: in-bounds per the caller, hence nonzero.
    unsafe { NonNull::new_unchecked(addr.as_ptr().add(offset)) }
}

// ── Slot adapters ───────────────────────────────────────────────────

unsafe fn default_alloc(
    _table: &ExtentHooks,
    new_addr: Option<NonNull<u8>>,
    size: usize,
    alignment: usize,
    zero: &mut bool,
    commit: &mut bool,
    _domain: DomainId,
) -> Option<NonNull<u8>> {
    default_alloc_impl(new_addr, size, alignment, zero, commit)
}

unsafe fn default_dalloc(
    _table: &ExtentHooks,
    addr: NonNull<u8>,
    size: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { default_dalloc_impl(addr, size) }
}

unsafe fn default_destroy(
    _table: &ExtentHooks,
    addr: NonNull<u8>,
    size: usize,
    _committed: bool,
    _domain: DomainId,
) {
    // SAFETY: forwarded caller contract.
    unsafe { default_destroy_impl(addr, size) }
}

unsafe fn default_commit(
    _table: &ExtentHooks,
    addr: NonNull<u8>,
    _size: usize,
    offset: usize,
    length: usize,
    _domain: DomainId,
) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { default_commit_impl(addr, offset, length) }
}

unsafe fn default_decommit(
    _table: &ExtentHooks,
    addr: NonNull<u8>,
    _size: usize,
    offset: usize,
    length: usize,
    _domain: DomainId,
) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { default_decommit_impl(addr, offset, length) }
}

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
unsafe fn default_purge_lazy(
    _table: &ExtentHooks,
    addr: NonNull<u8>,
    _size: usize,
    offset: usize,
    length: usize,
    _domain: DomainId,
) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { default_purge_lazy_impl(addr, offset, length) }
}

#[cfg(target_os = "linux")]
unsafe fn default_purge_forced(
    _table: &ExtentHooks,
    addr: NonNull<u8>,
    _size: usize,
    offset: usize,
    length: usize,
    _domain: DomainId,
) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { default_purge_forced_impl(addr, offset, length) }
}

unsafe fn default_split(
    _table: &ExtentHooks,
    _addr: NonNull<u8>,
    _size: usize,
    _size_a: usize,
    _size_b: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    default_split_impl()
}

unsafe fn default_merge(
    _table: &ExtentHooks,
    addr_a: NonNull<u8>,
    _size_a: usize,
    addr_b: NonNull<u8>,
    _size_b: usize,
    _committed: bool,
    _domain: DomainId,
) -> bool {
    default_merge_impl(addr_a, addr_b)
}
