//! Error types for format specifications and raw stores.

use std::error::Error;
use std::fmt;
use std::io;

use crate::id::ParticleType;

/// Errors detected while building or loading a [`FormatSpec`](crate::FormatSpec).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpecError {
    /// Two fields in one slot share a raw name.
    DuplicateRawName {
        /// Raw name of the offending slot.
        slot: String,
        /// The repeated raw field name.
        name: String,
    },
    /// Two fields in one slot share an alias.
    DuplicateAlias {
        /// Raw name of the offending slot.
        slot: String,
        /// The repeated alias.
        alias: String,
    },
    /// Two slots share a raw name or an alias.
    DuplicateSlot {
        /// The repeated slot name.
        name: String,
    },
    /// An edit referenced a slot index beyond the spec's slot count.
    UnknownSlot {
        /// The requested slot.
        slot: ParticleType,
    },
    /// An edit referenced a field the slot does not declare.
    UnknownField {
        /// Raw name of the slot.
        slot: String,
        /// The missing raw field name.
        name: String,
    },
    /// The spec declares no particle-type slots.
    NoSlots,
    /// A TOML document could not be parsed.
    Parse {
        /// Parser message.
        reason: String,
    },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRawName { slot, name } => {
                write!(f, "slot '{slot}' declares raw field '{name}' twice")
            }
            Self::DuplicateAlias { slot, alias } => {
                write!(f, "slot '{slot}' declares alias '{alias}' twice")
            }
            Self::DuplicateSlot { name } => write!(f, "slot name '{name}' is not unique"),
            Self::UnknownSlot { slot } => write!(f, "no particle-type slot {slot}"),
            Self::UnknownField { slot, name } => {
                write!(f, "slot '{slot}' has no field '{name}'")
            }
            Self::NoSlots => write!(f, "format specification declares no slots"),
            Self::Parse { reason } => write!(f, "failed to parse format spec: {reason}"),
        }
    }
}

impl Error for SpecError {}

/// Errors raised by a [`RawStore`](crate::RawStore) implementation.
#[derive(Debug)]
pub enum StoreError {
    /// An I/O error occurred while reading a container.
    Io(io::Error),
    /// The container does not start with the expected magic bytes.
    InvalidMagic,
    /// The container format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },
    /// A record could not be decoded (truncated or corrupt data).
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A file index beyond the store's file count was requested.
    FileOutOfRange {
        /// The requested file index.
        file: usize,
        /// Number of files in the store.
        file_count: usize,
    },
    /// The requested dataset does not exist in that file.
    MissingField {
        /// File index.
        file: usize,
        /// Particle type of the requested dataset.
        particle_type: ParticleType,
        /// Raw dataset name.
        name: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"SNAP\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported container version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed container: {detail}"),
            Self::FileOutOfRange { file, file_count } => {
                write!(f, "file index {file} out of range (store has {file_count} files)")
            }
            Self::MissingField {
                file,
                particle_type,
                name,
            } => write!(
                f,
                "file {file} has no dataset '{name}' for particle type {particle_type}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
