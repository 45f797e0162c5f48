//! Indexed access to one container file.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use snapfield_core::{ParticleType, RawArray, RawHeader, StoreError};

use crate::codec::{decode_dataset_head, decode_header, read_f64_values};

/// Location and shape of one dataset inside a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetEntry {
    /// Values per row.
    pub components: u32,
    /// Number of rows.
    pub rows: u64,
    /// Byte offset of the first value.
    pub offset: u64,
}

/// The decoded header and dataset index of one container file.
///
/// Indexing walks the record heads once and skips the values. The file
/// handle is not kept; [`read_dataset`](Self::read_dataset) reopens the
/// file and seeks to the dataset.
#[derive(Clone, Debug)]
pub struct ContainerFile {
    path: PathBuf,
    header: RawHeader,
    groups: IndexMap<ParticleType, IndexMap<String, DatasetEntry>>,
}

impl ContainerFile {
    /// Open and index a container file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut reader = BufReader::new(File::open(&path)?);
        let (header, groups) = index(&mut reader)?;
        Ok(Self {
            path,
            header,
            groups,
        })
    }

    /// Path the container was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The decoded header record.
    pub fn header(&self) -> &RawHeader {
        &self.header
    }

    /// Dataset names stored for a particle type, in file order.
    pub fn dataset_names(&self, particle_type: ParticleType) -> Vec<String> {
        self.groups
            .get(&particle_type)
            .map(|g| g.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Index entry of one dataset.
    pub fn entry(&self, particle_type: ParticleType, name: &str) -> Option<&DatasetEntry> {
        self.groups.get(&particle_type)?.get(name)
    }

    /// Total number of datasets across all groups.
    pub fn dataset_count(&self) -> usize {
        self.groups.values().map(IndexMap::len).sum()
    }

    /// Read one dataset, or `None` if it does not exist.
    pub fn read_dataset(
        &self,
        particle_type: ParticleType,
        name: &str,
    ) -> Result<Option<RawArray>, StoreError> {
        let Some(entry) = self.entry(particle_type, name) else {
            return Ok(None);
        };
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(entry.offset))?;
        let count = entry
            .rows
            .checked_mul(u64::from(entry.components))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| StoreError::Malformed {
                detail: format!("dataset '{name}' is too large to read"),
            })?;
        let values = read_f64_values(&mut BufReader::new(file), count)?;
        RawArray::new(values, entry.components).map(Some)
    }
}

type Groups = IndexMap<ParticleType, IndexMap<String, DatasetEntry>>;

fn index<R: Read + Seek>(reader: &mut R) -> Result<(RawHeader, Groups), StoreError> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;
    let header = decode_header(reader)?;
    let mut groups: Groups = IndexMap::new();
    while let Some(head) = decode_dataset_head(reader)? {
        if head.particle_type.index() >= header.type_count() {
            return Err(StoreError::Malformed {
                detail: format!(
                    "dataset '{}' belongs to particle type {} but the header declares {}",
                    head.name,
                    head.particle_type,
                    header.type_count()
                ),
            });
        }
        let offset = reader.stream_position()?;
        let end = head
            .byte_len()?
            .checked_add(offset)
            .filter(|&end| end <= file_len)
            .ok_or_else(|| StoreError::Malformed {
                detail: format!(
                    "dataset '{}' of particle type {} runs past the end of the container",
                    head.name, head.particle_type
                ),
            })?;
        let group = groups.entry(head.particle_type).or_default();
        if group.contains_key(&head.name) {
            return Err(StoreError::Malformed {
                detail: format!(
                    "dataset '{}' stored twice for particle type {}",
                    head.name, head.particle_type
                ),
            });
        }
        group.insert(
            head.name,
            DatasetEntry {
                components: head.components,
                rows: head.rows,
                offset,
            },
        );
        reader.seek(SeekFrom::Start(end))?;
    }
    Ok((header, groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ContainerWriter;
    use smallvec::smallvec;
    use snapfield_core::HeaderFlags;
    use std::io::Write;

    fn header(counts: [u64; 2]) -> RawHeader {
        RawHeader {
            num_part_this_file: smallvec![counts[0], counts[1]],
            num_part_total: smallvec![counts[0], counts[1]],
            mass_table: smallvec![0.0, 0.0],
            num_files: 1,
            time: 1.0,
            redshift: 0.0,
            box_size: 10.0,
            omega0: 0.3,
            omega_lambda: 0.7,
            hubble_param: 0.7,
            flags: HeaderFlags::default(),
        }
    }

    #[test]
    fn index_then_seek_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.snap");
        let mut w = ContainerWriter::new(File::create(&path).unwrap(), &header([2, 1])).unwrap();
        w.write_dataset(ParticleType(0), "Masses", &RawArray::scalar(vec![1.0, 2.0]))
            .unwrap();
        w.write_dataset(
            ParticleType(0),
            "Coordinates",
            &RawArray::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap(),
        )
        .unwrap();
        w.write_dataset(ParticleType(1), "Masses", &RawArray::scalar(vec![9.0]))
            .unwrap();
        w.finish().unwrap();

        let c = ContainerFile::open(&path).unwrap();
        assert_eq!(c.dataset_count(), 3);
        assert_eq!(c.dataset_names(ParticleType(0)), vec!["Masses", "Coordinates"]);
        assert!(c.dataset_names(ParticleType(5)).is_empty());

        let coords = c.read_dataset(ParticleType(0), "Coordinates").unwrap().unwrap();
        assert_eq!(coords.rows(), 2);
        assert_eq!(coords.values()[3..], [3.0, 4.0, 5.0]);
        let m1 = c.read_dataset(ParticleType(1), "Masses").unwrap().unwrap();
        assert_eq!(m1.values(), &[9.0]);
        assert!(c.read_dataset(ParticleType(1), "Density").unwrap().is_none());
    }

    #[test]
    fn missing_end_tag_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.snap");
        let mut buf = Vec::new();
        crate::codec::encode_header(&mut buf, &header([0, 0])).unwrap();
        File::create(&path).unwrap().write_all(&buf).unwrap();
        assert!(matches!(
            ContainerFile::open(&path),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn oversized_dataset_is_malformed() {
        use crate::codec::{
            encode_end, encode_header, write_length_prefixed_str, write_u32_le, write_u64_le,
            write_u8, TAG_DATASET,
        };

        let dir = tempfile::tempdir().unwrap();
        for (rows, components) in [(u64::MAX / 2, 4), (1_000, 1)] {
            let path = dir.path().join(format!("huge_{rows}.snap"));
            let mut buf = Vec::new();
            encode_header(&mut buf, &header([2, 0])).unwrap();
            write_u8(&mut buf, TAG_DATASET).unwrap();
            write_u32_le(&mut buf, 0).unwrap();
            write_length_prefixed_str(&mut buf, "Masses").unwrap();
            write_u32_le(&mut buf, components).unwrap();
            write_u64_le(&mut buf, rows).unwrap();
            buf.extend_from_slice(&[0u8; 16]);
            encode_end(&mut buf).unwrap();
            File::create(&path).unwrap().write_all(&buf).unwrap();
            assert!(
                matches!(ContainerFile::open(&path), Err(StoreError::Malformed { .. })),
                "{rows} rows of {components} should be rejected"
            );
        }
    }

    #[test]
    fn not_a_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello world").unwrap();
        assert!(matches!(
            ContainerFile::open(&path),
            Err(StoreError::InvalidMagic)
        ));
    }
}
