//! Raw per-file records: header metadata and flat field arrays.

use smallvec::SmallVec;

use crate::error::StoreError;

/// Per-type particle counts, indexed by [`ParticleType`](crate::ParticleType).
///
/// Inline storage covers the six canonical slots without allocating.
pub type TypeCounts = SmallVec<[u64; 6]>;

/// Which optional physics modules were active when the snapshot was written.
///
/// Flags decide which optional fields actually exist on disk; presence is
/// checked per snapshot at resolution time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeaderFlags {
    /// Star formation rate is written.
    pub star_formation: bool,
    /// Cooling was enabled (electron and neutral hydrogen abundances).
    pub cooling: bool,
    /// Stellar feedback was enabled.
    pub feedback: bool,
    /// Stellar formation times are written.
    pub stellar_age: bool,
    /// Metallicity arrays are written.
    pub metals: bool,
}

/// Raw header record of one container file.
///
/// All values are in code units exactly as written. Per-file counts differ
/// between files; everything else is global metadata repeated in every file.
#[derive(Clone, Debug, PartialEq)]
pub struct RawHeader {
    /// Particle counts per type in this file.
    pub num_part_this_file: TypeCounts,
    /// Particle counts per type across the whole snapshot.
    pub num_part_total: TypeCounts,
    /// Fixed particle mass per type (0 when masses are stored per particle).
    pub mass_table: SmallVec<[f64; 6]>,
    /// Number of files the snapshot was written as.
    pub num_files: u32,
    /// Scale factor (cosmological runs) or simulation time in code units.
    pub time: f64,
    /// Redshift of the snapshot.
    pub redshift: f64,
    /// Periodic box side length in code length.
    pub box_size: f64,
    /// Matter density parameter.
    pub omega0: f64,
    /// Dark energy density parameter.
    pub omega_lambda: f64,
    /// Reduced Hubble parameter `h`.
    pub hubble_param: f64,
    /// Optional-module flags.
    pub flags: HeaderFlags,
}

impl RawHeader {
    /// Number of particle-type slots this record describes.
    pub fn type_count(&self) -> usize {
        self.num_part_total.len()
    }
}

/// A flat numeric dataset read from one file.
///
/// Stored row-major: `components` values per particle. Scalar fields have
/// one component, vector fields such as positions have three.
#[derive(Clone, Debug, PartialEq)]
pub struct RawArray {
    values: Vec<f64>,
    components: u32,
}

impl RawArray {
    /// Wrap flat values with a per-row component count.
    ///
    /// Fails if `components` is zero or does not divide `values.len()`.
    pub fn new(values: Vec<f64>, components: u32) -> Result<Self, StoreError> {
        if components == 0 || values.len() % components as usize != 0 {
            return Err(StoreError::Malformed {
                detail: format!(
                    "{} values cannot be split into rows of {components}",
                    values.len()
                ),
            });
        }
        Ok(Self { values, components })
    }

    /// A one-component array.
    pub fn scalar(values: Vec<f64>) -> Self {
        Self {
            values,
            components: 1,
        }
    }

    /// Number of particles (rows).
    pub fn rows(&self) -> usize {
        self.values.len() / self.components as usize
    }

    /// Values per particle.
    pub fn components(&self) -> u32 {
        self.components
    }

    /// The flat row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the array, returning its flat values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Concatenate per-file parts in order.
    ///
    /// All parts must share one component count. An empty input yields an
    /// empty array with `default_components` per row.
    pub fn concat(parts: Vec<RawArray>, default_components: u32) -> Result<Self, StoreError> {
        let components = parts
            .first()
            .map(|p| p.components)
            .unwrap_or(default_components);
        let total: usize = parts.iter().map(|p| p.values.len()).sum();
        let mut values = Vec::with_capacity(total);
        for part in parts {
            if part.components != components {
                return Err(StoreError::Malformed {
                    detail: format!(
                        "component count changes across files ({} vs {components})",
                        part.components
                    ),
                });
            }
            values.extend(part.values);
        }
        Self::new(values, components)
    }
}
