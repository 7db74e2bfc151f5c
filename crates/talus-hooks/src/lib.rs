//! Extent lifecycle dispatch through pluggable hook tables.
//!
//! This crate is the indirection point between an allocator's extent
//! machinery and the physical operations on address space. Each
//! allocator domain owns a [`DomainHooks`]: an atomically swappable
//! pointer to the [`ExtentHooks`](talus_core::ExtentHooks) table
//! currently serving that domain, plus one dispatch method per
//! lifecycle operation — alloc, dalloc, destroy, commit, decommit, the
//! two purges, split, and merge.
//!
//! Every dispatch resolves to one of three paths, decided per call:
//!
//! - the installed table is the built-in [`default_hooks`] table,
//!   recognized by address: the physical implementation runs directly,
//!   with no function-pointer indirection and no reentrancy bracket;
//! - the operation's slot is absent: the operation's neutral result
//!   comes back without calling anything;
//! - otherwise the slot is invoked under the per-thread reentrancy
//!   marker from [`talus_core::reentrancy`], so allocator code further
//!   down the stack can tell that foreign hook code sits above it.
//!
//! A table swap is one atomic pointer store. A dispatch in flight
//! finishes against the table it loaded; the next dispatch sees the
//! new one.
//!
//! This crate is one of two in the workspace that may contain `unsafe`
//! code (along with `talus-pages`); every `unsafe` block carries a
//! `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod default;
pub mod domain;
mod guard;

// Public re-exports for the primary API surface.
pub use default::default_hooks;
pub use domain::DomainHooks;
