//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a particle-type slot within a format specification.
///
/// `ParticleType(n)` is the n-th slot of the [`FormatSpec`](crate::FormatSpec),
/// which is also the n-th entry of every per-type count array in a header.
/// Multi-type results are always ordered by ascending `ParticleType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleType(pub u32);

impl ParticleType {
    /// The slot index as a `usize`, for indexing per-type arrays.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ParticleType {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`SnapshotInstanceId`] allocation.
static SNAPSHOT_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for an opened snapshot.
///
/// Allocated from a monotonic atomic counter via [`SnapshotInstanceId::next`].
/// Opening the same files twice yields two different IDs. Selectors compare
/// IDs to decide whether they may be combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotInstanceId(u64);

impl SnapshotInstanceId {
    /// Allocate a fresh, unique instance ID. Thread-safe.
    pub fn next() -> Self {
        Self(SNAPSHOT_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SnapshotInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
