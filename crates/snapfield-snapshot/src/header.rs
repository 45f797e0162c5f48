//! Parsed snapshot header.

use snapfield_core::{CodeUnits, HeaderFlags, ParticleType, RawHeader, TypeCounts};
use snapfield_units::{Quantity, UnitArray, UnitRegistry};
use tracing::warn;

use crate::cosmology::LambdaCdm;
use crate::error::HeaderError;

/// Relative tolerance for the `a == 1 / (1 + z)` cosmological test.
const COSMO_RTOL: f64 = 1e-5;
/// Absolute tolerance for the `a == 1 / (1 + z)` cosmological test.
const COSMO_ATOL: f64 = 1e-8;

/// Snapshot metadata assembled from every file's header record.
///
/// Global metadata is taken from the first record. Per-file counts are
/// kept per record and checked to sum to the global counts.
///
/// A snapshot is cosmological when its `Time` equals `1 / (1 + Redshift)`
/// within tolerance. Then `Time` is the scale factor and the header time is
/// the cosmic age at the redshift. Otherwise `Time / h` is taken as the
/// time in Gyr, and the scale factor and redshift are reset to 1 and 0.
#[derive(Clone, Debug)]
pub struct Header {
    file_counts: Vec<TypeCounts>,
    counts: TypeCounts,
    declared_files: u32,
    cosmological: bool,
    scale_factor: f64,
    redshift: f64,
    hubble: f64,
    omega0: f64,
    omega_lambda: f64,
    flags: HeaderFlags,
    time: Quantity,
    box_size: Quantity,
    mass_table: UnitArray,
    cosmology: LambdaCdm,
    units: UnitRegistry,
}

impl Header {
    /// Build from per-file records in file order.
    pub fn from_records(
        records: &[RawHeader],
        code_units: &CodeUnits,
        slot_count: usize,
    ) -> Result<Self, HeaderError> {
        let first = records.first().ok_or(HeaderError::NoRecords)?;

        for (file, rec) in records.iter().enumerate() {
            let found = rec
                .num_part_this_file
                .len()
                .max(rec.num_part_total.len())
                .max(rec.mass_table.len());
            let consistent = rec.num_part_this_file.len() == slot_count
                && rec.num_part_total.len() == slot_count
                && rec.mass_table.len() == slot_count;
            if !consistent {
                return Err(HeaderError::SlotCountMismatch {
                    file,
                    found,
                    expected: slot_count,
                });
            }
        }

        for (i, &total) in first.num_part_total.iter().enumerate() {
            // An overflowing sum is reported as u64::MAX and never matches.
            let summed = records
                .iter()
                .try_fold(0u64, |acc, r| acc.checked_add(r.num_part_this_file[i]));
            if summed != Some(total) {
                return Err(HeaderError::CountMismatch {
                    particle_type: ParticleType(i as u32),
                    per_file_sum: summed.unwrap_or(u64::MAX),
                    total,
                });
            }
        }

        if first.num_files as usize != records.len() {
            warn!(
                declared = first.num_files,
                found = records.len(),
                "header file count differs from number of files"
            );
        }

        let h = first.hubble_param;
        if !(h.is_finite() && h > 0.0) {
            return Err(HeaderError::InvalidHubble { value: h });
        }

        let cosmology = LambdaCdm::new(h * 100.0, first.omega0, first.omega_lambda);
        let a = first.time;
        let z = first.redshift;
        let expected_a = 1.0 / (1.0 + z);
        let cosmological = (a - expected_a).abs() <= COSMO_ATOL + COSMO_RTOL * expected_a.abs();

        let (time_gyr, scale_factor, redshift) = if cosmological {
            (cosmology.age(z), a, z)
        } else {
            (a / h, 1.0, 0.0)
        };

        let units = UnitRegistry::code(code_units, scale_factor, h);
        let time = units.quantity(time_gyr, "Gyr")?;
        let box_size = units.quantity(first.box_size, "code_length")?;
        let mass_table = units.array(first.mass_table.to_vec(), 1, "code_mass")?;

        Ok(Self {
            file_counts: records.iter().map(|r| r.num_part_this_file.clone()).collect(),
            counts: first.num_part_total.clone(),
            declared_files: first.num_files,
            cosmological,
            scale_factor,
            redshift,
            hubble: h,
            omega0: first.omega0,
            omega_lambda: first.omega_lambda,
            flags: first.flags,
            time,
            box_size,
            mass_table,
            cosmology,
            units,
        })
    }

    /// Number of files composing the snapshot.
    pub fn file_count(&self) -> usize {
        self.file_counts.len()
    }

    /// File count written in the header (may differ from [`file_count`](Self::file_count)).
    pub fn declared_file_count(&self) -> u32 {
        self.declared_files
    }

    /// Number of particle-type slots.
    pub fn type_count(&self) -> usize {
        self.counts.len()
    }

    /// Global particle counts per type.
    pub fn counts(&self) -> &TypeCounts {
        &self.counts
    }

    /// Global particle count of one type (0 for unknown types).
    pub fn count(&self, particle_type: ParticleType) -> u64 {
        self.counts.get(particle_type.index()).copied().unwrap_or(0)
    }

    /// Particle count of one type in one file (0 if out of range).
    pub fn file_type_count(&self, file: usize, particle_type: ParticleType) -> u64 {
        self.file_counts
            .get(file)
            .and_then(|c| c.get(particle_type.index()))
            .copied()
            .unwrap_or(0)
    }

    /// Total particles over all types.
    pub fn total(&self) -> u64 {
        self.counts.iter().fold(0u64, |acc, &n| acc.saturating_add(n))
    }

    /// Whether this is a cosmological run.
    pub fn is_cosmological(&self) -> bool {
        self.cosmological
    }

    /// Scale factor (1 for non-cosmological runs).
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Redshift (0 for non-cosmological runs).
    pub fn redshift(&self) -> f64 {
        self.redshift
    }

    /// Reduced Hubble parameter.
    pub fn hubble(&self) -> f64 {
        self.hubble
    }

    /// Matter density parameter.
    pub fn omega0(&self) -> f64 {
        self.omega0
    }

    /// Dark energy density parameter.
    pub fn omega_lambda(&self) -> f64 {
        self.omega_lambda
    }

    /// Optional-module flags.
    pub fn flags(&self) -> HeaderFlags {
        self.flags
    }

    /// Snapshot time in Gyr.
    pub fn time(&self) -> &Quantity {
        &self.time
    }

    /// Box side length in code length.
    pub fn box_size(&self) -> &Quantity {
        &self.box_size
    }

    /// Per-type fixed particle masses in code mass.
    pub fn mass_table(&self) -> &UnitArray {
        &self.mass_table
    }

    /// The Lambda-CDM model described by the header.
    pub fn cosmology(&self) -> &LambdaCdm {
        &self.cosmology
    }

    /// This snapshot's unit registry (built-ins plus code units).
    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn record(this_file: [u64; 2], time: f64, redshift: f64) -> RawHeader {
        RawHeader {
            num_part_this_file: smallvec![this_file[0], this_file[1]],
            num_part_total: smallvec![10, 5],
            mass_table: smallvec![0.0, 0.5],
            num_files: 2,
            time,
            redshift,
            box_size: 1000.0,
            omega0: 0.3,
            omega_lambda: 0.7,
            hubble_param: 0.7,
            flags: HeaderFlags::default(),
        }
    }

    #[test]
    fn per_file_counts_must_sum() {
        let recs = [record([6, 5], 1.0, 0.0), record([3, 0], 1.0, 0.0)];
        let err = Header::from_records(&recs, &CodeUnits::default(), 2).unwrap_err();
        assert_eq!(
            err,
            HeaderError::CountMismatch {
                particle_type: ParticleType(0),
                per_file_sum: 9,
                total: 10
            }
        );
    }

    #[test]
    fn overflowing_per_file_counts_are_a_mismatch() {
        let mut recs = [record([u64::MAX, 5], 1.0, 0.0), record([1, 0], 1.0, 0.0)];
        for r in &mut recs {
            r.num_part_total[0] = u64::MAX;
        }
        let err = Header::from_records(&recs, &CodeUnits::default(), 2).unwrap_err();
        assert_eq!(
            err,
            HeaderError::CountMismatch {
                particle_type: ParticleType(0),
                per_file_sum: u64::MAX,
                total: u64::MAX
            }
        );
    }

    #[test]
    fn slot_count_must_match_spec() {
        let recs = [record([10, 5], 1.0, 0.0)];
        let err = Header::from_records(&recs, &CodeUnits::default(), 6).unwrap_err();
        assert!(matches!(err, HeaderError::SlotCountMismatch { expected: 6, found: 2, .. }));
        assert_eq!(
            Header::from_records(&[], &CodeUnits::default(), 2).unwrap_err(),
            HeaderError::NoRecords
        );
    }

    #[test]
    fn cosmological_run_uses_cosmic_age() {
        let recs = [record([6, 5], 0.5, 1.0), record([4, 0], 0.5, 1.0)];
        let h = Header::from_records(&recs, &CodeUnits::default(), 2).unwrap();
        assert!(h.is_cosmological());
        assert_eq!(h.scale_factor(), 0.5);
        assert_eq!(h.redshift(), 1.0);
        assert!((h.time().value() - h.cosmology().age(1.0)).abs() < 1e-12);
        assert_eq!(h.time().unit().label(), "Gyr");
        assert_eq!(h.file_count(), 2);
        assert_eq!(h.file_type_count(1, ParticleType(0)), 4);
        assert_eq!(h.total(), 15);
    }

    #[test]
    fn non_cosmological_run_resets_expansion() {
        let recs = [record([10, 5], 0.35, 0.0)];
        let h = Header::from_records(&recs, &CodeUnits::default(), 2).unwrap();
        assert!(!h.is_cosmological());
        assert_eq!(h.scale_factor(), 1.0);
        assert_eq!(h.redshift(), 0.0);
        assert!((h.time().value() - 0.5).abs() < 1e-12);
        // Code length carries no expansion factor once a = 1.
        let cl = h.units().get("code_length").unwrap();
        assert!((cl.scale() - 3.085678e19 / 0.7).abs() < 1e6);
    }

    #[test]
    fn header_attributes_carry_units() {
        let recs = [record([10, 5], 1.0, 0.0)];
        let h = Header::from_records(&recs, &CodeUnits::default(), 2).unwrap();
        assert_eq!(h.box_size().unit().label(), "code_length");
        assert_eq!(h.mass_table().unit().label(), "code_mass");
        assert_eq!(h.mass_table().values(), &[0.0, 0.5]);
    }

    #[test]
    fn non_positive_hubble_rejected() {
        let mut rec = record([10, 5], 1.0, 0.0);
        rec.hubble_param = 0.0;
        assert!(matches!(
            Header::from_records(&[rec], &CodeUnits::default(), 2),
            Err(HeaderError::InvalidHubble { .. })
        ));
    }
}
