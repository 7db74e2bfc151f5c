//! Anonymous-memory mapping primitives.
//!
//! This module holds the workspace's `unsafe` syscall surface, each
//! call site behind a `// SAFETY:` comment. All functions take
//! page-aligned ranges; alignment is `debug_assert!`ed, not validated.
//!
//! Failure reporting follows the hook-layer convention: fallible
//! operations return `true` on failure and `false` on success, and
//! [`map`] reports failure as `None`.

#![allow(unsafe_code)]

use std::ptr::{self, NonNull};

use crate::layout::{align_up, is_aligned, page_size};

// MAP_NORESERVE is Linux-only; the other Unixes lack or ignore it.
#[cfg(target_os = "linux")]
const MMAP_FLAGS: libc::c_int = libc::MAP_PRIVATE | libc::MAP_ANON | libc::MAP_NORESERVE;
#[cfg(not(target_os = "linux"))]
const MMAP_FLAGS: libc::c_int = libc::MAP_PRIVATE | libc::MAP_ANON;

/// True when the target OS supports lazy purging (`purge_lazy` is
/// compiled in).
pub const CAN_PURGE_LAZY: bool =
    cfg!(any(target_os = "linux", target_os = "macos", target_os = "freebsd"));

/// True when the target OS supports forced purging (`purge_forced` is
/// compiled in).
pub const CAN_PURGE_FORCED: bool = cfg!(target_os = "linux");

/// Maps `size` bytes of fresh anonymous memory aligned to `alignment`.
///
/// `*commit` on entry selects between committed (readable and
/// writable) and uncommitted (reserved, inaccessible) memory, and on
/// return describes what was delivered. Committed mappings read as
/// zero. `hint`, when present, is a placement requirement: the call
/// returns memory at exactly that address or fails. Without a hint,
/// alignments beyond the page size are satisfied by over-allocating
/// and trimming the misaligned head and tail.
///
/// Returns `None` on failure; the address space is left as it was.
///
/// `size` must be a nonzero multiple of the page size and `alignment`
/// a power of two.
pub fn map(
    hint: Option<NonNull<u8>>,
    size: usize,
    alignment: usize,
    commit: &mut bool,
) -> Option<NonNull<u8>> {
    let page = page_size();
    debug_assert!(size > 0 && is_aligned(size, page));
    debug_assert!(alignment.is_power_of_two());
    let align = alignment.max(page);

    let want = hint.map_or(ptr::null_mut(), NonNull::as_ptr);
    let got = os_map(want, size, *commit)?;
    if let Some(hint) = hint {
        if got != hint {
            // Placement miss: the kernel put the mapping elsewhere.
            // SAFETY: `got` is the fresh mapping created above.
            unsafe { unmap(got, size) };
            return None;
        }
        return Some(got);
    }
    if is_aligned(got.as_ptr() as usize, align) {
        return Some(got);
    }
    // SAFETY: `got` is the fresh mapping created above.
    unsafe { unmap(got, size) };
    map_aligned_slow(size, align, *commit)
}

/// Over-allocate by the worst-case alignment slack, then trim.
fn map_aligned_slow(size: usize, align: usize, commit: bool) -> Option<NonNull<u8>> {
    let padded = size.checked_add(align - page_size())?;
    let raw = os_map(ptr::null_mut(), padded, commit)?;
    let base = raw.as_ptr() as usize;
    let aligned = align_up(base, align);
    let head = aligned - base;
    let tail = padded - size - head;
    // SAFETY: the fresh mapping spans `padded` bytes from `base`; the
    // head and tail trims stay inside it and leave exactly
    // [aligned, aligned + size) mapped.
    unsafe {
        if head > 0 {
            unmap(raw, head);
        }
        if tail > 0 {
            unmap(NonNull::new_unchecked((aligned + size) as *mut u8), tail);
        }
    }
    NonNull::new(aligned as *mut u8)
}

/// One mmap call. A null `addr` lets the kernel place the mapping; a
/// non-null `addr` is advisory (never `MAP_FIXED`).
fn os_map(addr: *mut u8, size: usize, commit: bool) -> Option<NonNull<u8>> {
    let prot = if commit {
        libc::PROT_READ | libc::PROT_WRITE
    } else {
        libc::PROT_NONE
    };
    // SAFETY: an anonymous mapping without MAP_FIXED never replaces
    // existing mappings, whatever `addr` holds.
    let raw = unsafe { libc::mmap(addr.cast(), size, prot, MMAP_FLAGS, -1, 0) };
    if raw == libc::MAP_FAILED {
        return None;
    }
    NonNull::new(raw.cast())
}

/// Unmaps the `size` bytes at `addr`.
///
/// # Safety
///
/// `addr..addr + size` must be a page-aligned range mapped by this
/// module and not yet unmapped. Nothing may touch the range afterward.
pub unsafe fn unmap(addr: NonNull<u8>, size: usize) {
    debug_assert!(is_aligned(addr.as_ptr() as usize, page_size()));
    debug_assert!(size > 0 && is_aligned(size, page_size()));
    // SAFETY: the caller owns the range.
    let rc = unsafe { libc::munmap(addr.as_ptr().cast(), size) };
    debug_assert_eq!(rc, 0, "munmap rejected a range this process mapped");
}

/// Commits the `size` bytes at `addr`, making the range readable and
/// writable.
///
/// Committing maps fresh anonymous memory over the range, so previous
/// contents are discarded and the pages read as zero. Returns `true`
/// on failure, in which case the range is in an unspecified but mapped
/// state.
///
/// # Safety
///
/// `addr..addr + size` must be a page-aligned range inside a mapping
/// owned by the caller, with no live references into it.
pub unsafe fn commit(addr: NonNull<u8>, size: usize) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { remap_fixed(addr, size, libc::PROT_READ | libc::PROT_WRITE) }
}

/// Decommits the `size` bytes at `addr`, discarding their contents and
/// releasing the physical backing. The range stays reserved but must
/// not be touched until it is committed again. Returns `true` on
/// failure.
///
/// # Safety
///
/// Same requirements as [`commit`].
pub unsafe fn decommit(addr: NonNull<u8>, size: usize) -> bool {
    // SAFETY: forwarded caller contract.
    unsafe { remap_fixed(addr, size, libc::PROT_NONE) }
}

/// Replace the caller's range with a fresh anonymous mapping at the
/// given protection.
///
/// Callers must own `addr..addr + size`; `MAP_FIXED` clobbers whatever
/// is there.
unsafe fn remap_fixed(addr: NonNull<u8>, size: usize, prot: libc::c_int) -> bool {
    debug_assert!(is_aligned(addr.as_ptr() as usize, page_size()));
    debug_assert!(size > 0 && is_aligned(size, page_size()));
    // SAFETY: the caller owns the range, so MAP_FIXED replaces only
    // the caller's own pages.
    let raw = unsafe {
        libc::mmap(
            addr.as_ptr().cast(),
            size,
            prot,
            MMAP_FLAGS | libc::MAP_FIXED,
            -1,
            0,
        )
    };
    raw == libc::MAP_FAILED
}

/// Lazily purges the committed range at `addr`, surrendering its
/// physical pages while leaving the range mapped and readable.
///
/// Reads after a lazy purge see either the old contents or zeroes,
/// depending on whether the OS has reclaimed the pages yet. Returns
/// `true` on failure.
///
/// # Safety
///
/// Same range requirements as [`commit`]; the range must be committed.
#[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
pub unsafe fn purge_lazy(addr: NonNull<u8>, size: usize) -> bool {
    debug_assert!(is_aligned(addr.as_ptr() as usize, page_size()));
    debug_assert!(size > 0 && is_aligned(size, page_size()));
    // SAFETY: MADV_FREE affects only the caller's own range.
    let rc = unsafe { libc::madvise(addr.as_ptr().cast(), size, libc::MADV_FREE) };
    rc != 0
}

/// Forcibly purges the committed range at `addr`; the physical pages
/// are dropped immediately and subsequent reads return zeroes. Returns
/// `true` on failure.
///
/// # Safety
///
/// Same range requirements as [`commit`]; the range must be committed.
#[cfg(target_os = "linux")]
pub unsafe fn purge_forced(addr: NonNull<u8>, size: usize) -> bool {
    debug_assert!(is_aligned(addr.as_ptr() as usize, page_size()));
    debug_assert!(size > 0 && is_aligned(size, page_size()));
    // SAFETY: MADV_DONTNEED affects only the caller's own range.
    let rc = unsafe { libc::madvise(addr.as_ptr().cast(), size, libc::MADV_DONTNEED) };
    rc != 0
}
