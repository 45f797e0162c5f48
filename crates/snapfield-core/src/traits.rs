//! The raw-store collaborator trait.

use crate::error::StoreError;
use crate::id::ParticleType;
use crate::record::{RawArray, RawHeader};

/// Read-only access to the container files composing one snapshot.
///
/// This trait decouples field resolution from the container format. The
/// resolver only ever asks for one `(file, type, raw_name)` dataset at a
/// time, in file order. Implementations must be `Send + Sync` so selectors
/// over the same snapshot can be read from several threads.
pub trait RawStore: Send + Sync {
    /// Number of files composing the snapshot.
    fn file_count(&self) -> usize;

    /// Read the header record of one file.
    fn read_header(&self, file: usize) -> Result<RawHeader, StoreError>;

    /// Names of the datasets stored for `particle_type` in one file.
    ///
    /// Returns an empty list if the file holds no group for that type.
    fn field_names(&self, file: usize, particle_type: ParticleType)
        -> Result<Vec<String>, StoreError>;

    /// Read one dataset.
    ///
    /// Returns [`StoreError::MissingField`] if the dataset does not exist.
    fn read_field(
        &self,
        file: usize,
        particle_type: ParticleType,
        raw_name: &str,
    ) -> Result<RawArray, StoreError>;

    /// Whether a dataset exists in one file.
    fn has_field(
        &self,
        file: usize,
        particle_type: ParticleType,
        raw_name: &str,
    ) -> Result<bool, StoreError> {
        Ok(self
            .field_names(file, particle_type)?
            .iter()
            .any(|n| n == raw_name))
    }

    /// Read the header records of every file, in file order.
    fn read_headers(&self) -> Result<Vec<RawHeader>, StoreError> {
        (0..self.file_count()).map(|i| self.read_header(i)).collect()
    }
}

impl<S: RawStore + ?Sized> RawStore for Box<S> {
    fn file_count(&self) -> usize {
        (**self).file_count()
    }

    fn read_header(&self, file: usize) -> Result<RawHeader, StoreError> {
        (**self).read_header(file)
    }

    fn field_names(
        &self,
        file: usize,
        particle_type: ParticleType,
    ) -> Result<Vec<String>, StoreError> {
        (**self).field_names(file, particle_type)
    }

    fn read_field(
        &self,
        file: usize,
        particle_type: ParticleType,
        raw_name: &str,
    ) -> Result<RawArray, StoreError> {
        (**self).read_field(file, particle_type, raw_name)
    }

    fn has_field(
        &self,
        file: usize,
        particle_type: ParticleType,
        raw_name: &str,
    ) -> Result<bool, StoreError> {
        (**self).has_field(file, particle_type, raw_name)
    }
}
