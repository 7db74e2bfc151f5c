//! Talus: pluggable extent lifecycle hooks with an mmap-backed default.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Talus sub-crates. For most users, adding `talus` as a
//! single dependency is sufficient.
//!
//! An extent allocator manages large contiguous regions of address
//! space. Talus is its dispatch layer: each allocator domain owns a
//! [`DomainHooks`](hooks::DomainHooks) holding the
//! [`ExtentHooks`](types::ExtentHooks) table currently serving that
//! domain, and every lifecycle operation — allocate, deallocate,
//! destroy, commit, decommit, purge, split, merge — goes through it.
//! The built-in table backs extents with anonymous OS pages; swapping
//! in a custom table reroutes a domain to huge pages, a file mapping,
//! or an instrumented wrapper without touching the callers.
//!
//! # Quick start
//!
//! ```rust
//! use talus::prelude::*;
//!
//! // Every domain owns a holder; the default constructor installs the
//! // built-in mmap-backed table.
//! let hooks = DomainHooks::default();
//! assert!(hooks.is_default());
//!
//! let page = talus::pages::page_size();
//! let (mut zero, mut commit) = (false, true);
//! // SAFETY: size and alignment are page-granular, and the extent is
//! // released below.
//! let addr = unsafe {
//!     hooks.alloc(None, 2 * page, page, &mut zero, &mut commit, DomainId(0))
//! }
//! .expect("anonymous mapping");
//! assert!(zero && commit);
//!
//! // Capability probes answer from the installed table alone; the
//! // default table supports every operation.
//! assert!(!hooks.split_will_fail());
//!
//! // SAFETY: `addr` is the live extent mapped above, unused afterward.
//! let failed = unsafe { hooks.dalloc(addr, 2 * page, true, DomainId(0)) };
//! assert!(!failed);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for items not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `talus-core` | `ExtentHooks`, hook signatures, `DomainId` |
//! | [`reentrancy`] | `talus-core` | per-thread foreign-frame marker |
//! | [`hooks`] | `talus-hooks` | `DomainHooks` dispatch, the default table |
//! | [`pages`] | `talus-pages` | raw Unix paging primitives |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`talus-core`).
///
/// The [`types::ExtentHooks`] table record, the function-pointer type
/// of every slot, and the opaque [`types::DomainId`] passed through to
/// hooks.
pub use talus_core as types;

/// Per-thread reentrancy marker (`talus-core`).
///
/// Dispatch brackets every external hook call with
/// [`reentrancy::enter`]/[`reentrancy::exit`]; allocator code asks
/// [`reentrancy::is_reentrant`] whether foreign hook code is on the
/// current thread's stack.
pub use talus_core::reentrancy;

/// Hook dispatch (`talus-hooks`).
///
/// [`hooks::DomainHooks`] is the per-domain holder and the dispatcher
/// for all nine lifecycle operations; [`hooks::default_hooks`] is the
/// built-in table it recognizes by address.
pub use talus_hooks as hooks;

/// Unix paging primitives (`talus-pages`).
///
/// The mmap/madvise layer beneath the default table: [`pages::map`],
/// [`pages::unmap`], [`pages::commit`], [`pages::decommit`], the purge
/// flavors the target supports, and the page-size and alignment
/// helpers.
pub use talus_pages as pages;

/// Common imports for typical Talus usage.
///
/// ```rust
/// use talus::prelude::*;
/// ```
///
/// This imports the holder, the default table, the table record and
/// its slot signatures, and the domain identifier.
pub mod prelude {
    // Dispatch
    pub use talus_hooks::{default_hooks, DomainHooks};

    // Table record and slot signatures
    pub use talus_core::{
        AllocHook, CommitHook, DallocHook, DecommitHook, DestroyHook, ExtentHooks, MergeHook,
        PurgeHook, SplitHook,
    };

    // Identifiers
    pub use talus_core::DomainId;
}
