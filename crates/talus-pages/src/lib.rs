//! OS paging primitives for the Talus extent hook layer.
//!
//! This crate wraps the small set of virtual-memory operations the
//! built-in default hook table is made of: mapping and unmapping
//! anonymous memory, committing and decommitting page ranges, and
//! purging the physical backing of committed ranges. It also owns the
//! page-size probe and the alignment arithmetic the rest of the
//! workspace shares.
//!
//! Everything here works on raw page ranges and trusts the caller to
//! pass ranges it owns. This crate is one of two that may contain
//! `unsafe` code (along with `talus-hooks`); every `unsafe` block
//! carries a `// SAFETY:` comment.
//!
//! The implementation is `mmap`/`madvise`, so the crate is Unix-only.
//! Purge support varies by OS: lazy purge (`MADV_FREE`) exists on
//! Linux, macOS, and FreeBSD; forced purge (`MADV_DONTNEED` with its
//! zero-on-next-read guarantee) exists on Linux. The
//! [`CAN_PURGE_LAZY`] and [`CAN_PURGE_FORCED`] constants report what
//! the target offers, and the corresponding functions are compiled out
//! where unsupported.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

#[cfg(not(unix))]
compile_error!("talus-pages implements paging with mmap/madvise and requires a Unix target");

pub mod layout;
pub mod sys;

// Public re-exports for the primary API surface.
pub use layout::{align_down, align_up, is_aligned, page_size};
pub use sys::{commit, decommit, map, unmap, CAN_PURGE_FORCED, CAN_PURGE_LAZY};

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
pub use sys::purge_lazy;

#[cfg(target_os = "linux")]
pub use sys::purge_forced;
