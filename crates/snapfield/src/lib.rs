//! snapfield: field resolution and particle selection for multi-file
//! particle simulation snapshots.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all snapfield sub-crates. For most users, adding `snapfield` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use snapfield::prelude::*;
//! use snapfield::store::{MemoryFile, MemoryStore};
//! use snapfield::types::{HeaderFlags, RawHeader};
//!
//! // One file holding three gas particles of a GIZMO run at z = 0.
//! let header = RawHeader {
//!     num_part_this_file: [3, 0, 0, 0, 0, 0].into_iter().collect(),
//!     num_part_total: [3, 0, 0, 0, 0, 0].into_iter().collect(),
//!     mass_table: [0.0; 6].into_iter().collect(),
//!     num_files: 1,
//!     time: 1.0,
//!     redshift: 0.0,
//!     box_size: 100.0,
//!     omega0: 0.3,
//!     omega_lambda: 0.7,
//!     hubble_param: 0.7,
//!     flags: HeaderFlags::default(),
//! };
//! let file = MemoryFile::new(header)
//!     .with_field(ParticleType(0), "Masses", RawArray::scalar(vec![1.0, 2.0, 3.0]));
//!
//! let snap = Snapshot::from_store(MemoryStore::new(vec![file]), &OpenOptions::new()).unwrap();
//! let gas = snap.selector("gas").unwrap();
//! let heavy = gas.filter("m", |row| row[0] > 1.5).unwrap();
//! assert_eq!(heavy.get("Masses").unwrap().values(), &[2.0, 3.0]);
//! assert_eq!(snap.complement(&heavy).unwrap().count(), 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `snapfield-core` | Particle types, format specs, raw records, the store trait |
//! | [`units`] | `snapfield-units` | Unit registry, unit-tagged arrays and quantities |
//! | [`store`] | `snapfield-store` | Container files, file and memory stores, discovery |
//! | [`snapshot`] | `snapfield-snapshot` | Snapshots, selectors, derived fields, cosmology |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, format specs and the store trait (`snapfield-core`).
///
/// Contains [`types::ParticleType`], the declarative [`types::FormatSpec`]
/// with its GIZMO preset, raw header and array records, and the
/// [`types::RawStore`] collaborator trait.
pub use snapfield_core as types;

/// Units (`snapfield-units`).
///
/// [`units::UnitRegistry`] parses unit expressions; values travel as
/// [`units::UnitArray`]s.
pub use snapfield_units as units;

/// Raw snapshot storage (`snapfield-store`).
///
/// Write containers with [`store::ContainerWriter`], read them with
/// [`store::FileStore`], and wrap any store in a [`store::CachedStore`].
pub use snapfield_store as store;

/// Snapshots and selectors (`snapfield-snapshot`).
///
/// [`snapshot::Snapshot`] opens a multi-file snapshot;
/// [`snapshot::ParticleSelector`] resolves fields and combines selections.
pub use snapfield_snapshot as snapshot;

/// Common imports for typical snapfield usage.
///
/// ```rust
/// use snapfield::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use snapfield_core::{FormatSpec, ParticleType, RawArray, RawStore, SlotScope};

    // Units
    pub use snapfield_units::{Quantity, Unit, UnitArray, UnitRegistry};

    // Snapshots and selectors
    pub use snapfield_snapshot::{
        DerivedDefaults, DerivedField, Header, OpenOptions, ParticleSelector, Snapshot, ALL,
    };

    // Errors
    pub use snapfield_snapshot::{FieldError, OpenError, SelectError};
}
