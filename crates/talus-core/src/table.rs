//! The pluggable extent hook table.
//!
//! An [`ExtentHooks`] value is a record of function pointers, one per
//! extent lifecycle operation. The allocation slot is always present;
//! every other slot is optional, and `None` means the table's author
//! does not support that operation. What an absent slot means for a
//! caller is decided by the dispatch layer, not here.
//!
//! Two conventions hold across all slots:
//!
//! * Fallible slots report failure by returning `true` and success by
//!   returning `false`.
//! * Each slot receives the table it was reached through as its first
//!   argument and the [`DomainId`] it is serving as its last, so a
//!   single function can back several tables and serve several domains.

use std::ptr::NonNull;

use crate::id::DomainId;

/// Allocates a new extent of `size` bytes aligned to `alignment`.
///
/// `new_addr` is a placement constraint: when it is `Some`, the hook
/// must return exactly that address or fail. `zero` and `commit` are
/// in-out flags. On entry they carry the caller's requirements; on
/// return they must describe the delivered memory. A hook may upgrade
/// either flag, for example when the operating system hands back pages
/// that are already zeroed.
///
/// Returns the extent base address, or `None` on failure.
///
/// # Safety
///
/// `alignment` must be a nonzero power of two and `size` a nonzero
/// multiple of the page size. Memory returned by the hook must stay
/// valid until it is passed back to a deallocation or destruction slot
/// of the same table.
pub type AllocHook = unsafe fn(
    table: &ExtentHooks,
    new_addr: Option<NonNull<u8>>,
    size: usize,
    alignment: usize,
    zero: &mut bool,
    commit: &mut bool,
    domain: DomainId,
) -> Option<NonNull<u8>>;

/// Returns an extent to the system, or declines to.
///
/// `committed` tells the hook whether the extent currently has
/// committed pages. Returning `true` declines the deallocation and the
/// caller must keep the extent; returning `false` releases it.
///
/// # Safety
///
/// `addr` and `size` must describe an extent previously produced
/// through this table and not yet deallocated or destroyed.
pub type DallocHook = unsafe fn(
    table: &ExtentHooks,
    addr: NonNull<u8>,
    size: usize,
    committed: bool,
    domain: DomainId,
) -> bool;

/// Tears an extent down unconditionally.
///
/// Destruction has no return value: after the call the extent is gone
/// whether or not the hook managed to reclaim anything.
///
/// # Safety
///
/// Same requirements as [`DallocHook`].
pub type DestroyHook = unsafe fn(
    table: &ExtentHooks,
    addr: NonNull<u8>,
    size: usize,
    committed: bool,
    domain: DomainId,
);

/// Commits a page range within an extent.
///
/// The range is `offset..offset + length` in bytes from `addr`, with
/// both ends page-aligned. After a successful commit the range may be
/// read and written. Returns `true` on failure.
///
/// # Safety
///
/// `addr` and `size` must describe a live extent of this table, and the
/// range must lie entirely inside it.
pub type CommitHook = unsafe fn(
    table: &ExtentHooks,
    addr: NonNull<u8>,
    size: usize,
    offset: usize,
    length: usize,
    domain: DomainId,
) -> bool;

/// Decommits a page range within an extent.
///
/// The mirror image of [`CommitHook`]: after a successful call the
/// range's contents are discarded and the range must not be touched
/// until it is committed again. Returns `true` on failure.
pub type DecommitHook = unsafe fn(
    table: &ExtentHooks,
    addr: NonNull<u8>,
    size: usize,
    offset: usize,
    length: usize,
    domain: DomainId,
) -> bool;

/// Purges a page range, releasing its physical backing.
///
/// One signature serves both purge slots. The lazy slot may defer
/// reclamation and leaves the range readable, returning either stale
/// contents or zeroes; the forced slot must make the range read back as
/// zeroes immediately. Either way the range stays committed. Returns
/// `true` if the range was not purged.
pub type PurgeHook = unsafe fn(
    table: &ExtentHooks,
    addr: NonNull<u8>,
    size: usize,
    offset: usize,
    length: usize,
    domain: DomainId,
) -> bool;

/// Splits one extent into two adjacent extents.
///
/// `size_a + size_b == size`. On success the extent at `addr` becomes
/// two extents of `size_a` and `size_b` bytes; on failure (`true`) it
/// is unchanged. With a single flat mapping this is pure bookkeeping,
/// but a hook backing extents with distinct OS objects may have real
/// work to do, or may refuse outright.
pub type SplitHook = unsafe fn(
    table: &ExtentHooks,
    addr: NonNull<u8>,
    size: usize,
    size_a: usize,
    size_b: usize,
    committed: bool,
    domain: DomainId,
) -> bool;

/// Merges two adjacent extents into one.
///
/// `addr_b` must be exactly `addr_a + size_a`. On success the extents
/// become a single extent of `size_a + size_b` bytes at `addr_a`; on
/// failure (`true`) both remain usable separately.
pub type MergeHook = unsafe fn(
    table: &ExtentHooks,
    addr_a: NonNull<u8>,
    size_a: usize,
    addr_b: NonNull<u8>,
    size_b: usize,
    committed: bool,
    domain: DomainId,
) -> bool;

/// A table of extent lifecycle callbacks.
///
/// Tables are installed with `'static` lifetime, usually as `static`
/// items, and shared freely across threads. Whether a table counts as
/// "the default" is a question of pointer identity, never of contents:
/// two tables whose slots are all equal are still two distinct tables.
/// That is also why this type deliberately does not implement
/// `PartialEq`.
#[derive(Clone, Copy, Debug)]
pub struct ExtentHooks {
    /// Allocates new extents. Always present.
    pub alloc: AllocHook,
    /// Returns extents to the system.
    pub dalloc: Option<DallocHook>,
    /// Unconditional extent teardown.
    pub destroy: Option<DestroyHook>,
    /// Commits page ranges.
    pub commit: Option<CommitHook>,
    /// Decommits page ranges.
    pub decommit: Option<DecommitHook>,
    /// Lazy purge.
    pub purge_lazy: Option<PurgeHook>,
    /// Forced purge.
    pub purge_forced: Option<PurgeHook>,
    /// Splits one extent into two.
    pub split: Option<SplitHook>,
    /// Merges two adjacent extents.
    pub merge: Option<MergeHook>,
}

// Compile-time assertion: ExtentHooks must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ExtentHooks>();
};
