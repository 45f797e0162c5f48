//! Per-type field resolution.
//!
//! Keys resolve in a fixed order for each particle type:
//!
//! 1. a declared raw name or alias, read from its stored dataset
//! 2. an undeclared dataset stored on disk, tagged dimensionless
//! 3. a derived field in the selector's registry
//!
//! A declared key whose dataset is not stored for the type, and any key
//! matching none of the above, is [`FieldError::KeyNotFound`]. Results always cover the
//! type's full global count; masking happens in the selector.

use snapfield_core::{ParticleType, RawArray};
use snapfield_units::{UnitArray, UnitSystem};
use tracing::trace;

use crate::context::SnapshotContext;
use crate::derived::DerivedField;
use crate::error::FieldError;
use crate::selector::ParticleSelector;

/// How a key resolves for one particle type.
#[derive(Clone, Debug)]
pub enum Resolution<'a> {
    /// Read the dataset `raw_name` from every file and tag it with `unit`.
    Direct {
        /// Stored dataset name.
        raw_name: &'a str,
        /// Unit expression of the values.
        unit: &'a str,
    },
    /// Evaluate a registered derived field.
    Derived(&'a DerivedField),
    /// No source for the key.
    Unresolved,
}

/// Decide where `key` comes from for `particle_type`.
pub fn classify<'a>(
    selector: &'a ParticleSelector,
    particle_type: ParticleType,
    key: &str,
) -> Resolution<'a> {
    let ctx = selector.context();
    if let Some(entry) = ctx.spec().lookup(particle_type, key) {
        // A declared field is only ever read from disk.
        return match ctx.disk_field(particle_type, &entry.raw_name) {
            Some(raw_name) => Resolution::Direct {
                raw_name,
                unit: &entry.unit,
            },
            None => Resolution::Unresolved,
        };
    }
    if let Some(raw_name) = ctx.disk_field(particle_type, key) {
        return Resolution::Direct { raw_name, unit: "" };
    }
    match selector.derived(key) {
        Some(field) => Resolution::Derived(field),
        None => Resolution::Unresolved,
    }
}

/// Resolve `key` over every particle of `particle_type`, ignoring the mask.
pub fn resolve(
    selector: &ParticleSelector,
    particle_type: ParticleType,
    key: &str,
) -> Result<UnitArray, FieldError> {
    match classify(selector, particle_type, key) {
        Resolution::Direct { raw_name, unit } => {
            load_direct(selector.context(), particle_type, key, raw_name, unit)
        }
        Resolution::Derived(field) => evaluate_derived(selector, particle_type, key, field),
        Resolution::Unresolved => Err(FieldError::KeyNotFound {
            particle_type,
            key: key.to_string(),
        }),
    }
}

fn load_direct(
    ctx: &SnapshotContext,
    particle_type: ParticleType,
    key: &str,
    raw_name: &str,
    unit: &str,
) -> Result<UnitArray, FieldError> {
    let header = ctx.header();
    let mut parts = Vec::with_capacity(header.file_count());
    for file in 0..header.file_count() {
        let expected = header.file_type_count(file, particle_type) as usize;
        if expected == 0 {
            continue;
        }
        let part = ctx.store().read_field(file, particle_type, raw_name)?;
        if part.rows() != expected {
            return Err(FieldError::ShapeMismatch {
                particle_type,
                key: key.to_string(),
                expected,
                found: part.rows(),
            });
        }
        parts.push(part);
    }
    let raw = RawArray::concat(parts, 1)?;

    let units: &dyn UnitSystem = ctx.units();
    let unit = units.resolve(unit)?;
    trace!(
        %particle_type,
        key,
        raw_name,
        unit = unit.label(),
        rows = raw.rows(),
        "resolved direct field"
    );
    Ok(UnitArray::from_raw(raw, unit))
}

fn evaluate_derived(
    selector: &ParticleSelector,
    particle_type: ParticleType,
    key: &str,
    field: &DerivedField,
) -> Result<UnitArray, FieldError> {
    let frame = (particle_type, key.to_string());
    if selector.chain().contains(&frame) {
        let mut chain = selector.chain().to_vec();
        chain.push(frame);
        return Err(FieldError::DependencyCycle { chain });
    }

    trace!(%particle_type, key, depth = selector.chain().len(), "evaluating derived field");
    let restricted = selector.restricted(particle_type, frame);
    let out = field.evaluate(&restricted)?;

    let expected = selector.header().count(particle_type) as usize;
    if out.rows() != expected {
        return Err(FieldError::ShapeMismatch {
            particle_type,
            key: key.to_string(),
            expected,
            found: out.rows(),
        });
    }
    Ok(out)
}
