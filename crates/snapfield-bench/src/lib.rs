//! Benchmark profiles for the snapfield snapshot reader.
//!
//! Provides in-memory GIZMO snapshots of fixed shape for benchmarks and
//! examples:
//!
//! - [`BenchProfile::reference`]: 100K gas and 20K stars over 4 files
//! - [`BenchProfile::small`]: 1K gas and 200 stars in one file
//! - [`every_nth`]: deterministic refinement masks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;
use snapfield_core::{HeaderFlags, ParticleType, RawArray, RawHeader, StoreError};
use snapfield_snapshot::{OpenError, OpenOptions, Snapshot};
use snapfield_store::{MemoryFile, MemoryStore};

/// GIZMO gas slot.
pub const GAS: ParticleType = ParticleType(0);
/// GIZMO star slot.
pub const STAR: ParticleType = ParticleType(4);

/// Shape of a benchmark snapshot.
#[derive(Clone, Copy, Debug)]
pub struct BenchProfile {
    /// Gas particles.
    pub gas: u64,
    /// Star particles.
    pub stars: u64,
    /// Files the particles are spread over.
    pub files: usize,
}

impl BenchProfile {
    /// 100K gas and 20K stars over 4 files.
    pub fn reference() -> Self {
        Self {
            gas: 100_000,
            stars: 20_000,
            files: 4,
        }
    }

    /// 1K gas and 200 stars in one file.
    pub fn small() -> Self {
        Self {
            gas: 1_000,
            stars: 200,
            files: 1,
        }
    }

    fn split(&self, n: u64, file: usize) -> u64 {
        let k = self.files as u64;
        n / k + u64::from((file as u64) < n % k)
    }

    fn header(&self, file: usize) -> RawHeader {
        let mut this_file: SmallVec<[u64; 6]> = SmallVec::from_elem(0, 6);
        let mut total: SmallVec<[u64; 6]> = SmallVec::from_elem(0, 6);
        this_file[GAS.index()] = self.split(self.gas, file);
        this_file[STAR.index()] = self.split(self.stars, file);
        total[GAS.index()] = self.gas;
        total[STAR.index()] = self.stars;
        RawHeader {
            num_part_this_file: this_file,
            num_part_total: total,
            mass_table: SmallVec::from_elem(0.0, 6),
            num_files: self.files as u32,
            time: 0.5,
            redshift: 1.0,
            box_size: 25_000.0,
            omega0: 0.3,
            omega_lambda: 0.7,
            hubble_param: 0.7,
            flags: HeaderFlags {
                cooling: true,
                stellar_age: true,
                metals: true,
                ..HeaderFlags::default()
            },
        }
    }

    /// Build the raw store. Gas carries masses, positions, density,
    /// electron abundance, internal energy and two metallicity columns;
    /// stars carry masses, positions and formation scale factors.
    ///
    /// Each dataset draws from its own seeded stream, advanced across files,
    /// so the concatenated values do not depend on `files`.
    pub fn store(&self) -> Result<MemoryStore, StoreError> {
        let mut gas = gas_columns();
        let mut stars = star_columns();
        let mut store = MemoryStore::default();
        for file in 0..self.files {
            let mut mem = MemoryFile::new(self.header(file));
            for (ptype, columns, n) in [
                (GAS, &mut gas, self.split(self.gas, file)),
                (STAR, &mut stars, self.split(self.stars, file)),
            ] {
                if n == 0 {
                    continue;
                }
                for col in columns.iter_mut() {
                    mem.insert(ptype, col.name, col.next_rows(n)?);
                }
            }
            store.push(mem);
        }
        Ok(store)
    }

    /// Open the profile with the GIZMO spec and default derived fields.
    pub fn open(&self) -> Result<Snapshot, OpenError> {
        Snapshot::from_store(self.store()?, &OpenOptions::new())
    }
}

/// One synthetic dataset: a seeded uniform stream mapped per component.
struct Column {
    name: &'static str,
    components: u32,
    rng: ChaCha8Rng,
    sample: fn(f64, u32) -> f64,
}

impl Column {
    fn new(name: &'static str, components: u32, seed: u64, sample: fn(f64, u32) -> f64) -> Self {
        Self {
            name,
            components,
            rng: ChaCha8Rng::seed_from_u64(seed),
            sample,
        }
    }

    fn next_rows(&mut self, rows: u64) -> Result<RawArray, StoreError> {
        let (components, sample, rng) = (self.components, self.sample, &mut self.rng);
        let values = (0..rows)
            .flat_map(|_| 0..components)
            .map(|c| sample(rng.random::<f64>(), c))
            .collect();
        RawArray::new(values, components)
    }
}

fn gas_columns() -> Vec<Column> {
    vec![
        Column::new("Masses", 1, 1, |u, _| 1e-4 * (1.0 + u)),
        Column::new("Coordinates", 3, 2, |u, _| 25_000.0 * u),
        Column::new("Density", 1, 3, |u, _| u.powi(3)),
        Column::new("ElectronAbundance", 1, 4, |u, _| 1.2 * u),
        Column::new("InternalEnergy", 1, 5, |u, _| 10.0 + 1e4 * u),
        // Total metals, then helium.
        Column::new("Metallicity", 2, 6, |u, c| if c == 0 { 0.02 * u } else { 0.25 + 0.03 * u }),
    ]
}

fn star_columns() -> Vec<Column> {
    vec![
        Column::new("Masses", 1, 10, |u, _| 5e-5 * (1.0 + u)),
        Column::new("Coordinates", 3, 11, |u, _| 25_000.0 * u),
        Column::new("StellarFormationTime", 1, 12, |u, _| 0.05 + 0.45 * u),
    ]
}

/// Refinement mask of length `len` keeping every `n`-th particle.
pub fn every_nth(len: usize, n: usize) -> Vec<bool> {
    (0..len).map(|i| i % n.max(1) == 0).collect()
}
