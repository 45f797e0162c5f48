//! Field resolution and particle selection over simulation snapshots.
//!
//! A [`Snapshot`] reads the headers of its files and exposes one
//! [`ParticleSelector`] per non-empty particle type plus one spanning all
//! types. Selectors behave like read-only dictionaries of unit-tagged
//! arrays:
//!
//! - declared fields are found by raw name or alias through the
//!   [`FormatSpec`](snapfield_core::FormatSpec)
//! - undeclared stored datasets are found by raw name, dimensionless
//! - derived fields are computed on demand from other keys
//!
//! Selectors combine with [`union`](ParticleSelector::union),
//! [`intersection`](ParticleSelector::intersection),
//! [`difference`](ParticleSelector::difference) and
//! [`symmetric_difference`](ParticleSelector::symmetric_difference), and
//! narrow with [`select`](ParticleSelector::select) or
//! [`filter`](ParticleSelector::filter). Values always come back in
//! ascending particle-type order.
//!
//! Nothing is cached between lookups except, optionally, raw datasets
//! (the `cache` flag of [`OpenOptions`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod cosmology;
pub mod derived;
pub mod error;
pub mod header;
pub mod mask;
pub mod options;
pub mod resolver;
pub mod selector;
pub mod snapshot;

pub use context::SnapshotContext;
pub use cosmology::LambdaCdm;
pub use derived::{DerivedDefaults, DerivedField, GizmoDefaults, NoDefaults};
pub use error::{ConfigError, FieldError, HeaderError, OpenError, SelectError};
pub use header::Header;
pub use mask::ParticleMask;
pub use options::OpenOptions;
pub use resolver::Resolution;
pub use selector::{ParticleSelector, Registry};
pub use snapshot::{Snapshot, ALL};
