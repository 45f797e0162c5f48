//! The container-file backed store.

use std::path::{Path, PathBuf};

use snapfield_core::{ParticleType, RawArray, RawHeader, RawStore, StoreError};
use tracing::debug;

use crate::container::ContainerFile;

/// A [`RawStore`] over an ordered list of container files.
///
/// Every file is indexed once at [`open`](Self::open). Reads reopen the
/// file and seek to the dataset, so no file handle is shared between
/// threads.
#[derive(Clone, Debug)]
pub struct FileStore {
    files: Vec<ContainerFile>,
}

impl FileStore {
    /// Index every path, in the given order.
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self, StoreError> {
        let files = paths
            .iter()
            .map(|p| {
                let file = ContainerFile::open(p)?;
                debug!(
                    path = %file.path().display(),
                    datasets = file.dataset_count(),
                    "indexed container"
                );
                Ok(file)
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        Ok(Self { files })
    }

    /// Paths of the indexed files, in order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path().to_path_buf()).collect()
    }

    fn file(&self, file: usize) -> Result<&ContainerFile, StoreError> {
        self.files.get(file).ok_or(StoreError::FileOutOfRange {
            file,
            file_count: self.files.len(),
        })
    }
}

impl RawStore for FileStore {
    fn file_count(&self) -> usize {
        self.files.len()
    }

    fn read_header(&self, file: usize) -> Result<RawHeader, StoreError> {
        Ok(self.file(file)?.header().clone())
    }

    fn field_names(
        &self,
        file: usize,
        particle_type: ParticleType,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self.file(file)?.dataset_names(particle_type))
    }

    fn read_field(
        &self,
        file: usize,
        particle_type: ParticleType,
        raw_name: &str,
    ) -> Result<RawArray, StoreError> {
        let container = self.file(file)?;
        let array = container
            .read_dataset(particle_type, raw_name)?
            .ok_or_else(|| StoreError::MissingField {
                file,
                particle_type,
                name: raw_name.to_string(),
            })?;
        debug!(
            file,
            %particle_type,
            name = raw_name,
            rows = array.rows(),
            "read dataset"
        );
        Ok(array)
    }

    fn has_field(
        &self,
        file: usize,
        particle_type: ParticleType,
        raw_name: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.file(file)?.entry(particle_type, raw_name).is_some())
    }
}
