//! Core types and traits for the snapfield snapshot reader.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! pieces every other crate agrees on: particle-type identifiers, the
//! declarative [`FormatSpec`], raw per-file records, store errors, and the
//! [`RawStore`] collaborator trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod record;
pub mod spec;
pub mod traits;

pub use error::{SpecError, StoreError};
pub use id::{ParticleType, SnapshotInstanceId};
pub use record::{HeaderFlags, RawArray, RawHeader, TypeCounts};
pub use spec::{CodeUnits, FieldEntry, FormatSpec, SlotScope, SpecEdit, TypeSlot};
pub use traits::RawStore;
