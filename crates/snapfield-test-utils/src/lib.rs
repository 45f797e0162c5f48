//! Test fixtures for snapfield development.
//!
//! [`SnapshotFixture`] builds small multi-file snapshots with deterministic
//! data, either in memory ([`MemoryStore`]) or as container files on disk.
//! [`fixtures`] holds derived fields that count their calls, refer to
//! themselves, or return the wrong number of rows.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::fs::File;
use std::path::{Path, PathBuf};

use smallvec::SmallVec;
use snapfield_core::{FormatSpec, HeaderFlags, ParticleType, RawArray, RawHeader, StoreError};
use snapfield_snapshot::{NoDefaults, OpenError, OpenOptions, Snapshot};
use snapfield_store::{ContainerWriter, MemoryFile, MemoryStore};

pub use fixtures::{
    chained_field, counting_field, self_referential_field, wrong_length_field, CallCounter,
};

struct FixtureField {
    particle_type: ParticleType,
    name: String,
    components: u32,
    values: Vec<f64>,
}

/// Builder for test snapshots.
///
/// Particle counts are split as evenly as possible across files, earlier
/// files taking the remainder. A file holding no particles of a type stores
/// no datasets for it.
pub struct SnapshotFixture {
    spec: FormatSpec,
    counts: Vec<u64>,
    files: usize,
    time: f64,
    redshift: f64,
    hubble: f64,
    gizmo_defaults: bool,
    fields: Vec<FixtureField>,
}

impl SnapshotFixture {
    /// Empty GIZMO snapshot in one file at `a = 1`, `z = 0`.
    pub fn gizmo() -> Self {
        let mut fixture = Self::with_spec(FormatSpec::gizmo());
        fixture.gizmo_defaults = true;
        fixture
    }

    pub fn with_spec(spec: FormatSpec) -> Self {
        let slots = spec.slot_count();
        Self {
            spec,
            counts: vec![0; slots],
            files: 1,
            time: 1.0,
            redshift: 0.0,
            hubble: 0.7,
            gizmo_defaults: false,
            fields: Vec::new(),
        }
    }

    pub fn particles(mut self, particle_type: ParticleType, count: u64) -> Self {
        self.counts[particle_type.index()] = count;
        self
    }

    pub fn files(mut self, files: usize) -> Self {
        self.files = files.max(1);
        self
    }

    /// Cosmological run at scale factor `a`.
    pub fn scale_factor(mut self, a: f64) -> Self {
        self.time = a;
        self.redshift = 1.0 / a - 1.0;
        self
    }

    /// Non-cosmological run; `time` is the raw header time (Gyr times h).
    pub fn time(mut self, time: f64) -> Self {
        self.time = time;
        self.redshift = 0.0;
        self
    }

    pub fn hubble(mut self, h: f64) -> Self {
        self.hubble = h;
        self
    }

    /// Store a dataset with `components` values per particle, row-major
    /// over the type's global index.
    pub fn field(
        mut self,
        particle_type: ParticleType,
        name: &str,
        components: u32,
        values: Vec<f64>,
    ) -> Self {
        self.fields.push(FixtureField {
            particle_type,
            name: name.to_string(),
            components,
            values,
        });
        self
    }

    pub fn scalar(self, particle_type: ParticleType, name: &str, values: Vec<f64>) -> Self {
        self.field(particle_type, name, 1, values)
    }

    /// `0, 1, 2, ...` scaled by `step` and shifted by `start`, one per particle.
    pub fn ramp(self, particle_type: ParticleType, name: &str, start: f64, step: f64) -> Self {
        let n = self.counts[particle_type.index()] as usize;
        let values = (0..n).map(|i| start + step * i as f64).collect();
        self.scalar(particle_type, name, values)
    }

    pub fn spec(&self) -> &FormatSpec {
        &self.spec
    }

    fn per_file(&self, file: usize) -> SmallVec<[u64; 6]> {
        self.counts
            .iter()
            .map(|&n| {
                let k = self.files as u64;
                n / k + u64::from((file as u64) < n % k)
            })
            .collect()
    }

    fn offset(&self, file: usize, particle_type: ParticleType) -> usize {
        (0..file)
            .map(|f| self.per_file(f)[particle_type.index()] as usize)
            .sum()
    }

    pub fn header(&self, file: usize) -> RawHeader {
        RawHeader {
            num_part_this_file: self.per_file(file),
            num_part_total: self.counts.iter().copied().collect(),
            mass_table: self.counts.iter().map(|_| 0.0).collect(),
            num_files: self.files as u32,
            time: self.time,
            redshift: self.redshift,
            box_size: 1000.0,
            omega0: 0.3,
            omega_lambda: 0.7,
            hubble_param: self.hubble,
            flags: HeaderFlags::default(),
        }
    }

    /// `(particle_type, name, part)` for every dataset stored in one file.
    fn file_parts(&self, file: usize) -> Result<Vec<(ParticleType, &str, RawArray)>, StoreError> {
        let counts = self.per_file(file);
        let mut out = Vec::new();
        for field in &self.fields {
            let n = counts[field.particle_type.index()] as usize;
            if n == 0 {
                continue;
            }
            let c = field.components as usize;
            let start = self.offset(file, field.particle_type) * c;
            let values = field.values[start..start + n * c].to_vec();
            out.push((
                field.particle_type,
                field.name.as_str(),
                RawArray::new(values, field.components)?,
            ));
        }
        Ok(out)
    }

    pub fn store(&self) -> MemoryStore {
        let mut store = MemoryStore::default();
        for file in 0..self.files {
            let mut mem = MemoryFile::new(self.header(file));
            let parts = self
                .file_parts(file)
                .unwrap_or_else(|e| panic!("fixture field is malformed: {e}"));
            for (pt, name, array) in parts {
                mem.insert(pt, name, array);
            }
            store.push(mem);
        }
        store
    }

    /// Options carrying the fixture's spec. Only GIZMO fixtures register
    /// the GIZMO default derived fields.
    pub fn options(&self) -> OpenOptions {
        let options = OpenOptions::new().spec(self.spec.clone());
        if self.gizmo_defaults {
            options
        } else {
            options.defaults(NoDefaults)
        }
    }

    pub fn open(&self) -> Result<Snapshot, OpenError> {
        Snapshot::from_store(self.store(), &self.options())
    }

    pub fn open_with(&self, options: &OpenOptions) -> Result<Snapshot, OpenError> {
        Snapshot::from_store(self.store(), options)
    }

    /// Write `{stem}.{i}.snap` container files into `dir`.
    pub fn write_files(&self, dir: &Path, stem: &str) -> Result<Vec<PathBuf>, StoreError> {
        let mut paths = Vec::with_capacity(self.files);
        for file in 0..self.files {
            let path = dir.join(format!("{stem}.{file}.snap"));
            let mut writer = ContainerWriter::new(File::create(&path)?, &self.header(file))?;
            for (pt, name, array) in self.file_parts(file)? {
                writer.write_dataset(pt, name, &array)?;
            }
            writer.finish()?;
            paths.push(path);
        }
        Ok(paths)
    }
}

// Slots of `two_type_spec`.
pub const GAS: ParticleType = ParticleType(0);
pub const DM: ParticleType = ParticleType(1);

/// A two-slot spec (`gas`, `dm`) declaring `Masses` (`m`) and
/// `Coordinates` (`p`) for both types, and `Density` (`rho`) for gas only.
pub fn two_type_spec() -> FormatSpec {
    FormatSpec::from_toml_str(
        r#"
        name = "pair"

        [[shared_fields]]
        raw_name = "Masses"
        alias = "m"
        unit = "code_mass"

        [[shared_fields]]
        raw_name = "Coordinates"
        alias = "p"
        unit = "code_length"

        [[slots]]
        raw_name = "PartType0"
        alias = "gas"
        fields = [{ raw_name = "Density", alias = "rho", unit = "code_mass / code_length**3" }]

        [[slots]]
        raw_name = "PartType1"
        alias = "dm"
        "#,
    )
    .unwrap_or_else(|e| panic!("fixture spec is invalid: {e}"))
}

/// Ten gas and five dark-matter particles over two files, with masses,
/// positions and gas density.
pub fn ten_and_five() -> SnapshotFixture {
    ten_and_five_with(two_type_spec())
}

/// [`ten_and_five`] under another two-slot spec.
pub fn ten_and_five_with(spec: FormatSpec) -> SnapshotFixture {
    let gas_pos: Vec<f64> = (0..30).map(|i| i as f64).collect();
    let dm_pos: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
    SnapshotFixture::with_spec(spec)
        .particles(GAS, 10)
        .particles(DM, 5)
        .files(2)
        .ramp(GAS, "Masses", 1.0, 1.0)
        .ramp(DM, "Masses", 50.0, 10.0)
        .field(GAS, "Coordinates", 3, gas_pos)
        .field(DM, "Coordinates", 3, dm_pos)
        .ramp(GAS, "Density", 0.0, 0.25)
}
