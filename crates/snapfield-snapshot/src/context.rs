//! Read-only state shared by every selector of one snapshot.

use std::fmt;

use indexmap::IndexSet;
use snapfield_core::{FormatSpec, ParticleType, RawStore, SnapshotInstanceId};
use snapfield_units::UnitRegistry;
use tracing::debug;

use crate::error::OpenError;
use crate::header::Header;

/// Header, format spec and raw store of one opened snapshot.
///
/// Held behind an `Arc` by every [`ParticleSelector`](crate::ParticleSelector).
/// The set of on-disk fields per type is read once, from the first file
/// holding particles of that type.
pub struct SnapshotContext {
    id: SnapshotInstanceId,
    header: Header,
    spec: FormatSpec,
    store: Box<dyn RawStore>,
    disk_fields: Vec<IndexSet<String>>,
}

impl SnapshotContext {
    /// Read headers and field listings from `store`.
    pub fn new(store: Box<dyn RawStore>, spec: FormatSpec) -> Result<Self, OpenError> {
        let records = store.read_headers()?;
        let header = Header::from_records(&records, spec.code_units(), spec.slot_count())?;

        let mut disk_fields = Vec::with_capacity(header.type_count());
        for i in 0..header.type_count() {
            let pt = ParticleType(i as u32);
            let first = (0..header.file_count()).find(|&f| header.file_type_count(f, pt) > 0);
            let names: IndexSet<String> = match first {
                Some(file) => store.field_names(file, pt)?.into_iter().collect(),
                None => IndexSet::new(),
            };
            disk_fields.push(names);
        }

        let id = SnapshotInstanceId::next();
        debug!(
            %id,
            spec = spec.name(),
            files = header.file_count(),
            particles = header.total(),
            "snapshot context ready"
        );
        Ok(Self {
            id,
            header,
            spec,
            store,
            disk_fields,
        })
    }

    /// Identity of this snapshot instance.
    pub fn id(&self) -> SnapshotInstanceId {
        self.id
    }

    /// Parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Format spec the snapshot was opened with.
    pub fn spec(&self) -> &FormatSpec {
        &self.spec
    }

    /// The raw store.
    pub fn store(&self) -> &dyn RawStore {
        self.store.as_ref()
    }

    /// The snapshot's unit registry.
    pub fn units(&self) -> &UnitRegistry {
        self.header.units()
    }

    /// Number of particle-type slots.
    pub fn type_count(&self) -> usize {
        self.header.type_count()
    }

    /// Raw dataset names stored for a type, in file order.
    pub fn disk_fields(&self, particle_type: ParticleType) -> impl Iterator<Item = &str> {
        self.disk_fields
            .get(particle_type.index())
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    /// Whether a raw dataset is stored for a type.
    pub fn on_disk(&self, particle_type: ParticleType, raw_name: &str) -> bool {
        self.disk_field(particle_type, raw_name).is_some()
    }

    /// The stored dataset name equal to `raw_name`, if any.
    pub fn disk_field(&self, particle_type: ParticleType, raw_name: &str) -> Option<&str> {
        self.disk_fields
            .get(particle_type.index())?
            .get(raw_name)
            .map(String::as_str)
    }

    /// Keys that resolve directly from disk for a type.
    ///
    /// Each stored dataset contributes its raw name and, when declared with
    /// a non-empty alias, the alias.
    pub fn direct_keys(&self, particle_type: ParticleType) -> Vec<String> {
        let mut keys = Vec::new();
        for raw in self.disk_fields(particle_type) {
            keys.push(raw.to_string());
            if let Some(entry) = self.spec.lookup(particle_type, raw) {
                if !entry.alias.is_empty() && entry.alias != raw {
                    keys.push(entry.alias.clone());
                }
            }
        }
        keys
    }
}

impl fmt::Debug for SnapshotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotContext")
            .field("id", &self.id)
            .field("spec", &self.spec.name())
            .field("files", &self.header.file_count())
            .field("counts", self.header.counts())
            .finish_non_exhaustive()
    }
}
