//! Unit handling for snapfield.
//!
//! A [`UnitRegistry`] maps symbols (`cm`, `Msun`, `code_length`, ...) to
//! concrete [`Unit`]s and parses unit expressions such as
//! `"code_mass / code_length**3"`. Field values travel as [`UnitArray`]s,
//! flat row-major `f64` buffers tagged with their unit.
//!
//! Scales are stored relative to SI base units, so any two units with equal
//! [`Dimensions`] convert by a single multiplication.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod dims;
pub mod error;
mod parse;
pub mod registry;
pub mod traits;
pub mod unit;

pub use array::{Quantity, UnitArray};
pub use dims::Dimensions;
pub use error::UnitError;
pub use registry::UnitRegistry;
pub use traits::UnitSystem;
pub use unit::Unit;
