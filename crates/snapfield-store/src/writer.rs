//! Container writer.
//!
//! [`ContainerWriter`] streams datasets to any `Write` sink. The header is
//! written immediately on construction; [`finish`](ContainerWriter::finish)
//! writes the end tag.

use std::io::Write;

use snapfield_core::{ParticleType, RawArray, RawHeader, StoreError};

use crate::codec::{encode_dataset, encode_end, encode_header};

/// Writes one container file.
///
/// Each dataset's row count must match the header's per-file count for its
/// particle type, so a written container always satisfies the reader's
/// shape expectations.
///
/// # Examples
///
/// ```
/// use smallvec::smallvec;
/// use snapfield_core::{HeaderFlags, ParticleType, RawArray, RawHeader};
/// use snapfield_store::ContainerWriter;
///
/// let header = RawHeader {
///     num_part_this_file: smallvec![2],
///     num_part_total: smallvec![2],
///     mass_table: smallvec![0.0],
///     num_files: 1,
///     time: 1.0,
///     redshift: 0.0,
///     box_size: 1.0,
///     omega0: 0.3,
///     omega_lambda: 0.7,
///     hubble_param: 0.7,
///     flags: HeaderFlags::default(),
/// };
///
/// let mut writer = ContainerWriter::new(Vec::new(), &header).unwrap();
/// writer
///     .write_dataset(ParticleType(0), "Masses", &RawArray::scalar(vec![1.0, 2.0]))
///     .unwrap();
/// assert_eq!(writer.datasets_written(), 1);
/// let bytes = writer.finish().unwrap();
/// assert_eq!(&bytes[..4], b"SNAP");
/// ```
pub struct ContainerWriter<W: Write> {
    writer: W,
    counts: Vec<u64>,
    written: Vec<(ParticleType, String)>,
}

impl<W: Write> ContainerWriter<W> {
    /// Create a writer, immediately writing magic, version and header.
    pub fn new(mut writer: W, header: &RawHeader) -> Result<Self, StoreError> {
        encode_header(&mut writer, header)?;
        Ok(Self {
            writer,
            counts: header.num_part_this_file.to_vec(),
            written: Vec::new(),
        })
    }

    /// Append one dataset.
    pub fn write_dataset(
        &mut self,
        particle_type: ParticleType,
        name: &str,
        array: &RawArray,
    ) -> Result<(), StoreError> {
        let Some(&expected) = self.counts.get(particle_type.index()) else {
            return Err(StoreError::Malformed {
                detail: format!(
                    "particle type {particle_type} not declared in header ({} types)",
                    self.counts.len()
                ),
            });
        };
        if array.rows() as u64 != expected {
            return Err(StoreError::Malformed {
                detail: format!(
                    "dataset '{name}' has {} rows but type {particle_type} has {expected} particles in this file",
                    array.rows()
                ),
            });
        }
        if self
            .written
            .iter()
            .any(|(pt, n)| *pt == particle_type && n == name)
        {
            return Err(StoreError::Malformed {
                detail: format!("dataset '{name}' already written for type {particle_type}"),
            });
        }
        encode_dataset(&mut self.writer, particle_type, name, array)?;
        self.written.push((particle_type, name.to_string()));
        Ok(())
    }

    /// Number of datasets written so far.
    pub fn datasets_written(&self) -> usize {
        self.written.len()
    }

    /// Write the end tag, flush, and return the underlying sink.
    pub fn finish(mut self) -> Result<W, StoreError> {
        encode_end(&mut self.writer)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
