//! Core types for the talus extent-hook layer.
//!
//! This is the leaf crate with zero dependencies. It defines the
//! fundamental abstractions shared across the talus workspace: the
//! [`DomainId`] identifier, the [`ExtentHooks`] table of pluggable
//! lifecycle callbacks, and the per-thread reentrancy marker that the
//! dispatch layer pairs around every external hook invocation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod reentrancy;
pub mod table;

// Public re-exports for the primary API surface.
pub use id::DomainId;
pub use table::{
    AllocHook, CommitHook, DallocHook, DecommitHook, DestroyHook, ExtentHooks, MergeHook,
    PurgeHook, SplitHook,
};
