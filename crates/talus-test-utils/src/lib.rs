//! Test utilities and fixture hook tables for Talus development.
//!
//! Provides prebuilt [`ExtentHooks`](talus_core::ExtentHooks) tables
//! whose slots tally their invocations — [`counting_hooks`],
//! [`failing_hooks`], [`alloc_only_hooks`] — plus the [`calls`] /
//! [`reset_calls`] accessors for the per-thread tallies.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    alloc_only_hooks, calls, counting_hooks, failing_hooks, reset_calls, HookCalls,
};
