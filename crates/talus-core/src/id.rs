//! Strongly-typed identifiers.

use std::fmt;

/// Identifies the allocator domain on whose behalf a hook call is made.
///
/// A domain is an allocator-internal partition, typically one arena.
/// The dispatch layer never interprets this value; it is assigned by the
/// caller and passed through opaquely to external hooks so that one hook
/// table shared across several domains can tell its callers apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(pub u32);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DomainId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
