//! Page-size and alignment arithmetic.
//!
//! Every address and length handed to the mapping primitives in
//! [`crate::sys`] must be page-granular; this module owns the page-size
//! probe and the rounding helpers the rest of the workspace shares.

use std::sync::OnceLock;

/// Returns the system page size in bytes.
///
/// Probed once from `sysconf(_SC_PAGESIZE)` and cached for the life of
/// the process. Always a power of two.
#[allow(unsafe_code)]
pub fn page_size() -> usize {
    static PAGE: OnceLock<usize> = OnceLock::new();
    *PAGE.get_or_init(|| {
        // SAFETY: sysconf reads a system constant; no preconditions.
        let raw = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        usize::try_from(raw).expect("_SC_PAGESIZE is positive on supported targets")
    })
}

/// True when `x` is a multiple of `align`.
///
/// `align` must be a power of two.
pub fn is_aligned(x: usize, align: usize) -> bool {
    debug_assert!(align.is_power_of_two());
    x & (align - 1) == 0
}

/// Rounds `x` up to the next multiple of `align`.
///
/// `align` must be a power of two, and `x + align` must not overflow.
pub fn align_up(x: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (x + (align - 1)) & !(align - 1)
}

/// Rounds `x` down to the previous multiple of `align`.
///
/// `align` must be a power of two.
pub fn align_down(x: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    x & !(align - 1)
}
