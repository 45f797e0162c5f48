//! In-memory store.

use indexmap::IndexMap;
use snapfield_core::{ParticleType, RawArray, RawHeader, RawStore, StoreError};

/// One file's worth of header and datasets held in memory.
#[derive(Clone, Debug)]
pub struct MemoryFile {
    header: RawHeader,
    groups: IndexMap<ParticleType, IndexMap<String, RawArray>>,
}

impl MemoryFile {
    /// An empty file with the given header.
    pub fn new(header: RawHeader) -> Self {
        Self {
            header,
            groups: IndexMap::new(),
        }
    }

    /// Add or replace a dataset, builder style.
    pub fn with_field(mut self, particle_type: ParticleType, name: &str, array: RawArray) -> Self {
        self.insert(particle_type, name, array);
        self
    }

    /// Add or replace a dataset.
    pub fn insert(&mut self, particle_type: ParticleType, name: &str, array: RawArray) {
        self.groups
            .entry(particle_type)
            .or_default()
            .insert(name.to_string(), array);
    }

    /// The header record.
    pub fn header(&self) -> &RawHeader {
        &self.header
    }
}

/// A [`RawStore`] over [`MemoryFile`]s.
///
/// Performs no shape validation beyond what the snapshot layer does.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    files: Vec<MemoryFile>,
}

impl MemoryStore {
    /// A store over the given files, in order.
    pub fn new(files: Vec<MemoryFile>) -> Self {
        Self { files }
    }

    /// Append a file.
    pub fn push(&mut self, file: MemoryFile) {
        self.files.push(file);
    }

    fn file(&self, file: usize) -> Result<&MemoryFile, StoreError> {
        self.files.get(file).ok_or(StoreError::FileOutOfRange {
            file,
            file_count: self.files.len(),
        })
    }
}

impl RawStore for MemoryStore {
    fn file_count(&self) -> usize {
        self.files.len()
    }

    fn read_header(&self, file: usize) -> Result<RawHeader, StoreError> {
        Ok(self.file(file)?.header.clone())
    }

    fn field_names(
        &self,
        file: usize,
        particle_type: ParticleType,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self
            .file(file)?
            .groups
            .get(&particle_type)
            .map(|g| g.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn read_field(
        &self,
        file: usize,
        particle_type: ParticleType,
        raw_name: &str,
    ) -> Result<RawArray, StoreError> {
        self.file(file)?
            .groups
            .get(&particle_type)
            .and_then(|g| g.get(raw_name))
            .cloned()
            .ok_or_else(|| StoreError::MissingField {
                file,
                particle_type,
                name: raw_name.to_string(),
            })
    }
}
