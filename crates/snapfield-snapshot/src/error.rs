//! Error types for snapshot opening, field access and selection.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use snapfield_core::{ParticleType, SnapshotInstanceId, SpecError, StoreError};
use snapfield_units::UnitError;

// ── FieldError ─────────────────────────────────────────────────────

/// Errors raised while resolving a field for a selector.
#[derive(Debug)]
pub enum FieldError {
    /// The key is neither an on-disk field nor a registered derived field
    /// for this particle type. Declared fields missing from the snapshot's
    /// files surface here too.
    KeyNotFound {
        /// Particle type the key was resolved for.
        particle_type: ParticleType,
        /// The requested key.
        key: String,
    },
    /// A dataset or derived result has the wrong number of rows.
    ShapeMismatch {
        /// Particle type being resolved.
        particle_type: ParticleType,
        /// Key being resolved.
        key: String,
        /// Rows required.
        expected: usize,
        /// Rows produced.
        found: usize,
    },
    /// Per-type results cannot be joined (different dimensions or widths).
    Incompatible {
        /// Key being resolved.
        key: String,
        /// Why concatenation failed.
        source: UnitError,
    },
    /// A derived field requested itself, directly or transitively.
    DependencyCycle {
        /// Frames being evaluated, outermost first, ending with the re-entered frame.
        chain: Vec<(ParticleType, String)>,
    },
    /// The selector has no active particle types.
    EmptySelection {
        /// Key being resolved.
        key: String,
    },
    /// The raw store failed.
    Store(StoreError),
    /// Unit parsing or arithmetic failed.
    Unit(UnitError),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound { particle_type, key } => {
                write!(f, "key '{key}' not found for particle type {particle_type}")
            }
            Self::ShapeMismatch {
                particle_type,
                key,
                expected,
                found,
            } => write!(
                f,
                "field '{key}' for particle type {particle_type} has {found} rows, expected {expected}"
            ),
            Self::Incompatible { key, source } => {
                write!(f, "cannot join field '{key}' across particle types: {source}")
            }
            Self::DependencyCycle { chain } => {
                write!(f, "derived field dependency cycle: ")?;
                for (i, (pt, key)) in chain.iter().enumerate() {
                    if i > 0 {
                        write!(f, " -> ")?;
                    }
                    write!(f, "{key}@{pt}")?;
                }
                Ok(())
            }
            Self::EmptySelection { key } => {
                write!(f, "cannot resolve '{key}' for a selector with no active particles")
            }
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Unit(e) => write!(f, "unit: {e}"),
        }
    }
}

impl Error for FieldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Incompatible { source, .. } => Some(source),
            Self::Store(e) => Some(e),
            Self::Unit(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for FieldError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<UnitError> for FieldError {
    fn from(e: UnitError) -> Self {
        Self::Unit(e)
    }
}

// ── SelectError ────────────────────────────────────────────────────

/// Errors raised by refinement and set algebra.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectError {
    /// A refinement array's length differs from the selector's count.
    ShapeMismatch {
        /// The selector's count.
        expected: usize,
        /// The array's length.
        found: usize,
    },
    /// The operands belong to different snapshot instances.
    IncompatibleSelector {
        /// Snapshot of the left operand.
        left: SnapshotInstanceId,
        /// Snapshot of the right operand.
        right: SnapshotInstanceId,
    },
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { expected, found } => {
                write!(f, "mask has {found} entries, selector has {expected} particles")
            }
            Self::IncompatibleSelector { left, right } => write!(
                f,
                "selectors belong to different snapshots ({left} vs {right})"
            ),
        }
    }
}

impl Error for SelectError {}

// ── HeaderError ────────────────────────────────────────────────────

/// Errors detected while building a [`Header`](crate::Header).
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderError {
    /// No header records were given.
    NoRecords,
    /// A record's per-type arrays do not match the spec's slot count.
    SlotCountMismatch {
        /// File index of the record.
        file: usize,
        /// Per-type entries in the record.
        found: usize,
        /// Slots in the format spec.
        expected: usize,
    },
    /// Per-file counts do not sum to the global count.
    CountMismatch {
        /// The offending type.
        particle_type: ParticleType,
        /// Sum of per-file counts.
        per_file_sum: u64,
        /// Declared global count.
        total: u64,
    },
    /// The Hubble parameter is not a positive finite number.
    InvalidHubble {
        /// The value found.
        value: f64,
    },
    /// A header attribute's unit failed to resolve.
    Unit(UnitError),
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRecords => write!(f, "no header records"),
            Self::SlotCountMismatch {
                file,
                found,
                expected,
            } => write!(
                f,
                "file {file} header describes {found} particle types, spec has {expected}"
            ),
            Self::CountMismatch {
                particle_type,
                per_file_sum,
                total,
            } => write!(
                f,
                "particle type {particle_type}: per-file counts sum to {per_file_sum}, header total is {total}"
            ),
            Self::InvalidHubble { value } => write!(f, "invalid Hubble parameter {value}"),
            Self::Unit(e) => write!(f, "unit: {e}"),
        }
    }
}

impl Error for HeaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unit(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnitError> for HeaderError {
    fn from(e: UnitError) -> Self {
        Self::Unit(e)
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`OpenOptions::validate`](crate::OpenOptions::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The file suffix contains a path separator.
    InvalidSuffix {
        /// The rejected suffix.
        suffix: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSuffix { suffix } => {
                write!(f, "file suffix '{suffix}' must not contain a path separator")
            }
        }
    }
}

impl Error for ConfigError {}

// ── OpenError ──────────────────────────────────────────────────────

/// Errors raised while opening a snapshot.
#[derive(Debug)]
pub enum OpenError {
    /// No files matched the prefix and suffix.
    NoFiles {
        /// The prefix searched.
        prefix: PathBuf,
        /// The suffix searched.
        suffix: String,
    },
    /// A spec file could not be read.
    Io(io::Error),
    /// The options are invalid.
    Config(ConfigError),
    /// The format spec is invalid.
    Spec(SpecError),
    /// The raw store failed.
    Store(StoreError),
    /// The header records are inconsistent.
    Header(HeaderError),
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFiles { prefix, suffix } => write!(
                f,
                "no snapshot files match '{}' with suffix '{suffix}'",
                prefix.display()
            ),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Spec(e) => write!(f, "spec: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Header(e) => write!(f, "header: {e}"),
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Spec(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Header(e) => Some(e),
            Self::NoFiles { .. } => None,
        }
    }
}

impl From<io::Error> for OpenError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigError> for OpenError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SpecError> for OpenError {
    fn from(e: SpecError) -> Self {
        Self::Spec(e)
    }
}

impl From<StoreError> for OpenError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<HeaderError> for OpenError {
    fn from(e: HeaderError) -> Self {
        Self::Header(e)
    }
}
