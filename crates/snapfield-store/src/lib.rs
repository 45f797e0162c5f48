//! Snapshot containers and [`RawStore`](snapfield_core::RawStore) implementations.
//!
//! # Architecture
//!
//! - [`ContainerWriter`] writes one container file to any `Write` sink
//! - [`ContainerFile`] indexes a container and reads single datasets by seeking
//! - [`FileStore`] serves a multi-file snapshot from container paths
//! - [`MemoryStore`] serves a snapshot held in memory
//! - [`CachedStore`] adds a read-through dataset cache to any store
//! - [`discover`] expands a path prefix into the ordered list of files
//!
//! # Format
//!
//! ```text
//! [MAGIC "SNAP"] [VERSION u8] [Header]
//! [Dataset 1] [Dataset 2] ... [Dataset N] [END u8 = 0]
//! ```
//!
//! Each dataset record carries its particle type, name, components per row,
//! row count and the row-major `f64` values. All integers and floats are
//! little-endian.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod codec;
pub mod container;
pub mod discover;
pub mod file;
pub mod memory;
pub mod writer;

pub use cache::CachedStore;
pub use container::{ContainerFile, DatasetEntry};
pub use discover::discover;
pub use file::FileStore;
pub use memory::{MemoryFile, MemoryStore};
pub use writer::ContainerWriter;

/// Magic bytes at the start of every container file.
pub const MAGIC: [u8; 4] = *b"SNAP";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;
