//! Read-through dataset cache.
//!
//! [`CachedStore`] wraps any [`RawStore`] and remembers every dataset it
//! has read, keyed by `(file, particle type, raw name)`. Headers and name
//! listings pass straight through. The cache never invalidates on its own;
//! the underlying files are assumed immutable for the store's lifetime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use snapfield_core::{ParticleType, RawArray, RawHeader, RawStore, StoreError};
use tracing::trace;

type Key = (usize, ParticleType, String);

/// A [`RawStore`] adapter caching datasets in memory.
#[derive(Debug)]
pub struct CachedStore<S> {
    inner: S,
    datasets: Mutex<HashMap<Key, RawArray>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: RawStore> CachedStore<S> {
    /// Wrap a store with an empty cache.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            datasets: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of reads served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of reads forwarded to the wrapped store.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of cached datasets.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every cached dataset.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Key, RawArray>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.datasets.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S: RawStore> RawStore for CachedStore<S> {
    fn file_count(&self) -> usize {
        self.inner.file_count()
    }

    fn read_header(&self, file: usize) -> Result<RawHeader, StoreError> {
        self.inner.read_header(file)
    }

    fn field_names(
        &self,
        file: usize,
        particle_type: ParticleType,
    ) -> Result<Vec<String>, StoreError> {
        self.inner.field_names(file, particle_type)
    }

    fn read_field(
        &self,
        file: usize,
        particle_type: ParticleType,
        raw_name: &str,
    ) -> Result<RawArray, StoreError> {
        let key = (file, particle_type, raw_name.to_string());
        if let Some(hit) = self.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(file, %particle_type, name = raw_name, "dataset cache hit");
            return Ok(hit.clone());
        }
        // The lock is released during the read; a concurrent miss on the
        // same key reads twice and the later insert wins.
        let array = self.inner.read_field(file, particle_type, raw_name)?;
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(key, array.clone());
        Ok(array)
    }

    fn has_field(
        &self,
        file: usize,
        particle_type: ParticleType,
        raw_name: &str,
    ) -> Result<bool, StoreError> {
        self.inner.has_field(file, particle_type, raw_name)
    }
}
