//! Binary encode/decode for the container format.
//!
//! All integers and floats are little-endian. Strings are length-prefixed
//! with a `u32` length. There is no compression or alignment padding.

use std::io::{self, Read, Write};

use smallvec::SmallVec;
use snapfield_core::{HeaderFlags, ParticleType, RawArray, RawHeader, StoreError, TypeCounts};

use crate::{FORMAT_VERSION, MAGIC};

/// Record tag introducing a dataset.
pub const TAG_DATASET: u8 = 1;
/// Record tag terminating a container.
pub const TAG_END: u8 = 0;

/// Upper bound on the particle-type slots a header may declare.
const MAX_TYPES: u32 = 64;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), StoreError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), StoreError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), StoreError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), StoreError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), StoreError> {
    write_u32_le(w, s.len() as u32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, StoreError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf).map_err(truncated)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, StoreError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(truncated)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, StoreError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(truncated)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, StoreError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(truncated)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, StoreError> {
    let len = read_u32_le(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(truncated)?;
    String::from_utf8(buf).map_err(|e| StoreError::Malformed {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

/// Read `count` little-endian f64 values.
///
/// The buffer grows with the bytes actually read, so a corrupt count fails
/// as a truncated container instead of allocating up front.
pub fn read_f64_values(r: &mut dyn Read, count: usize) -> Result<Vec<f64>, StoreError> {
    let byte_len = count
        .checked_mul(8)
        .ok_or_else(|| StoreError::Malformed {
            detail: format!("{count} values overflow the addressable size"),
        })?;
    let mut buf = Vec::new();
    r.take(byte_len as u64).read_to_end(&mut buf)?;
    if buf.len() < byte_len {
        return Err(truncated(io::ErrorKind::UnexpectedEof.into()));
    }
    Ok(buf
        .chunks_exact(8)
        .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
        .collect())
}

/// Map an unexpected EOF to a malformed-container error; keep other I/O errors.
fn truncated(e: io::Error) -> StoreError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        StoreError::Malformed {
            detail: "unexpected end of container".into(),
        }
    } else {
        StoreError::Io(e)
    }
}

// ── Header encode/decode ────────────────────────────────────────

fn flag_bits(flags: &HeaderFlags) -> u8 {
    (flags.star_formation as u8)
        | (flags.cooling as u8) << 1
        | (flags.feedback as u8) << 2
        | (flags.stellar_age as u8) << 3
        | (flags.metals as u8) << 4
}

fn flags_from_bits(bits: u8) -> HeaderFlags {
    HeaderFlags {
        star_formation: bits & 1 != 0,
        cooling: bits & (1 << 1) != 0,
        feedback: bits & (1 << 2) != 0,
        stellar_age: bits & (1 << 3) != 0,
        metals: bits & (1 << 4) != 0,
    }
}

/// Encode magic, version and the header record.
///
/// The three per-type arrays must have the same length.
pub fn encode_header(w: &mut dyn Write, header: &RawHeader) -> Result<(), StoreError> {
    let n = header.num_part_total.len();
    if header.num_part_this_file.len() != n || header.mass_table.len() != n {
        return Err(StoreError::Malformed {
            detail: format!(
                "per-type header arrays differ in length ({}, {n}, {})",
                header.num_part_this_file.len(),
                header.mass_table.len()
            ),
        });
    }

    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;

    write_u32_le(w, n as u32)?;
    for &count in &header.num_part_this_file {
        write_u64_le(w, count)?;
    }
    for &count in &header.num_part_total {
        write_u64_le(w, count)?;
    }
    for &mass in &header.mass_table {
        write_f64_le(w, mass)?;
    }
    write_u32_le(w, header.num_files)?;
    write_f64_le(w, header.time)?;
    write_f64_le(w, header.redshift)?;
    write_f64_le(w, header.box_size)?;
    write_f64_le(w, header.omega0)?;
    write_f64_le(w, header.omega_lambda)?;
    write_f64_le(w, header.hubble_param)?;
    write_u8(w, flag_bits(&header.flags))?;
    Ok(())
}

/// Decode and validate magic, version and the header record.
pub fn decode_header(r: &mut dyn Read) -> Result<RawHeader, StoreError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => StoreError::InvalidMagic,
        _ => StoreError::Io(e),
    })?;
    if magic != MAGIC {
        return Err(StoreError::InvalidMagic);
    }

    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion { found: version });
    }

    let n = read_u32_le(r)?;
    if n > MAX_TYPES {
        return Err(StoreError::Malformed {
            detail: format!("header declares {n} particle types"),
        });
    }
    let read_counts = |r: &mut dyn Read| -> Result<TypeCounts, StoreError> {
        (0..n).map(|_| read_u64_le(r)).collect()
    };
    let num_part_this_file = read_counts(r)?;
    let num_part_total = read_counts(r)?;
    let mass_table = (0..n)
        .map(|_| read_f64_le(r))
        .collect::<Result<SmallVec<[f64; 6]>, _>>()?;

    Ok(RawHeader {
        num_part_this_file,
        num_part_total,
        mass_table,
        num_files: read_u32_le(r)?,
        time: read_f64_le(r)?,
        redshift: read_f64_le(r)?,
        box_size: read_f64_le(r)?,
        omega0: read_f64_le(r)?,
        omega_lambda: read_f64_le(r)?,
        hubble_param: read_f64_le(r)?,
        flags: flags_from_bits(read_u8(r)?),
    })
}

// ── Dataset encode/decode ───────────────────────────────────────

/// The fixed part of a dataset record, preceding its values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetHead {
    /// Particle type the dataset belongs to.
    pub particle_type: ParticleType,
    /// Dataset name.
    pub name: String,
    /// Values per row.
    pub components: u32,
    /// Number of rows.
    pub rows: u64,
}

impl DatasetHead {
    /// Number of `f64` values following the head.
    pub fn value_count(&self) -> Result<usize, StoreError> {
        self.rows
            .checked_mul(u64::from(self.components))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| self.oversized())
    }

    /// Size in bytes of the values following the head. Always fits an `i64`
    /// seek offset.
    pub fn byte_len(&self) -> Result<u64, StoreError> {
        self.rows
            .checked_mul(u64::from(self.components))
            .and_then(|n| n.checked_mul(8))
            .filter(|&n| i64::try_from(n).is_ok())
            .ok_or_else(|| self.oversized())
    }

    fn oversized(&self) -> StoreError {
        StoreError::Malformed {
            detail: format!(
                "dataset '{}' declares {} rows of {} components, which overflows",
                self.name, self.rows, self.components
            ),
        }
    }
}

/// Encode one dataset record (tag, head, values).
pub fn encode_dataset(
    w: &mut dyn Write,
    particle_type: ParticleType,
    name: &str,
    array: &RawArray,
) -> Result<(), StoreError> {
    write_u8(w, TAG_DATASET)?;
    write_u32_le(w, particle_type.0)?;
    write_length_prefixed_str(w, name)?;
    write_u32_le(w, array.components())?;
    write_u64_le(w, array.rows() as u64)?;
    let mut buf = Vec::with_capacity(array.values().len() * 8);
    for v in array.values() {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    w.write_all(&buf)?;
    Ok(())
}

/// Write the end-of-container tag.
pub fn encode_end(w: &mut dyn Write) -> Result<(), StoreError> {
    write_u8(w, TAG_END)
}

/// Decode the next record head, or `None` at the end tag.
///
/// The values are left unread; callers either read them with
/// [`read_f64_values`] or skip them.
pub fn decode_dataset_head(r: &mut dyn Read) -> Result<Option<DatasetHead>, StoreError> {
    match read_u8(r)? {
        TAG_END => Ok(None),
        TAG_DATASET => {
            let particle_type = ParticleType(read_u32_le(r)?);
            let name = read_length_prefixed_str(r)?;
            let components = read_u32_le(r)?;
            if components == 0 {
                return Err(StoreError::Malformed {
                    detail: format!("dataset '{name}' has zero components"),
                });
            }
            let rows = read_u64_le(r)?;
            Ok(Some(DatasetHead {
                particle_type,
                name,
                components,
                rows,
            }))
        }
        tag => Err(StoreError::Malformed {
            detail: format!("unknown record tag {tag}"),
        }),
    }
}
