//! Benchmark workloads for the Talus extent hook layer.
//!
//! Shared generators for the criterion benches: randomized
//! page-multiple size mixes and the alignment ladder, so
//! size-dependent branches in the code under test cannot settle into a
//! single pattern.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::RngExt;

use talus_pages::page_size;

/// `n` page-multiple extent sizes between one page and `max_pages`
/// pages, in random order.
pub fn mixed_sizes(n: usize, max_pages: usize) -> Vec<usize> {
    let page = page_size();
    let mut rng = rand::rng();
    (0..n)
        .map(|_| page * rng.random_range(1..=max_pages))
        .collect()
}

/// Power-of-two alignments from one page up to `ceiling` bytes
/// inclusive.
pub fn alignment_ladder(ceiling: usize) -> Vec<usize> {
    let mut aligns = Vec::new();
    let mut align = page_size();
    while align <= ceiling {
        aligns.push(align);
        align <<= 1;
    }
    aligns
}
