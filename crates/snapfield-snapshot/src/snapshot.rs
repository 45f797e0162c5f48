//! The opened snapshot and its default selectors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use snapfield_core::{FormatSpec, ParticleType, RawStore, SnapshotInstanceId};
use snapfield_store::{discover, CachedStore, FileStore};
use tracing::debug;

use crate::context::SnapshotContext;
use crate::error::{OpenError, SelectError};
use crate::header::Header;
use crate::options::OpenOptions;
use crate::selector::ParticleSelector;

/// Name of the selector spanning every particle type.
pub const ALL: &str = "all";

/// A snapshot opened for field access.
///
/// Opening reads every file's header and the dataset listing of each
/// particle type, but no field data. The default selectors are built then:
/// one per non-empty type, keyed by the slot alias (or raw name when the
/// alias is empty), plus [`ALL`].
pub struct Snapshot {
    ctx: Arc<SnapshotContext>,
    paths: Vec<PathBuf>,
    selectors: IndexMap<String, ParticleSelector>,
}

impl Snapshot {
    /// Open the files matching `prefix` with default options.
    pub fn open(prefix: impl AsRef<Path>) -> Result<Self, OpenError> {
        Self::open_with(prefix, &OpenOptions::default())
    }

    /// Open the files matching `prefix` and `options.suffix`.
    pub fn open_with(prefix: impl AsRef<Path>, options: &OpenOptions) -> Result<Self, OpenError> {
        options.validate()?;
        let prefix = prefix.as_ref();
        let paths = discover(prefix, &options.suffix)?;
        if paths.is_empty() {
            return Err(OpenError::NoFiles {
                prefix: prefix.to_path_buf(),
                suffix: options.suffix.clone(),
            });
        }

        let files = FileStore::open(&paths)?;
        let store: Box<dyn RawStore> = if options.cache {
            Box::new(CachedStore::new(files))
        } else {
            Box::new(files)
        };
        let mut snap = Self::from_store(store, options)?;
        snap.paths = paths;
        Ok(snap)
    }

    /// Build a snapshot over an existing store. Discovery options are ignored.
    pub fn from_store(
        store: impl RawStore + 'static,
        options: &OpenOptions,
    ) -> Result<Self, OpenError> {
        options.validate()?;
        let ctx = Arc::new(SnapshotContext::new(Box::new(store), options.spec.clone())?);

        let mut selectors = IndexMap::new();
        for (pt, slot) in ctx.spec().slots() {
            if ctx.header().count(pt) == 0 {
                continue;
            }
            let name = if slot.alias().is_empty() {
                slot.raw_name()
            } else {
                slot.alias()
            };
            selectors.insert(
                name.to_string(),
                ParticleSelector::from_types(Arc::clone(&ctx), &[pt]),
            );
        }
        let every: Vec<ParticleType> = ctx.spec().slots().map(|(pt, _)| pt).collect();
        selectors.insert(
            ALL.to_string(),
            ParticleSelector::from_types(Arc::clone(&ctx), &every),
        );

        if options.register_defaults {
            for (name, selector) in selectors.iter_mut() {
                for (key, field) in options.defaults.fields_for(name) {
                    selector.register(key, field);
                }
            }
        }

        debug!(
            id = %ctx.id(),
            selectors = ?selectors.keys().collect::<Vec<_>>(),
            cosmological = ctx.header().is_cosmological(),
            "opened snapshot"
        );
        Ok(Self {
            ctx,
            paths: Vec::new(),
            selectors,
        })
    }

    /// Identity of this instance.
    pub fn id(&self) -> SnapshotInstanceId {
        self.ctx.id()
    }

    /// Parsed header.
    pub fn header(&self) -> &Header {
        self.ctx.header()
    }

    /// Format spec in use.
    pub fn spec(&self) -> &FormatSpec {
        self.ctx.spec()
    }

    /// Files composing the snapshot (empty for [`from_store`](Self::from_store)).
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Particle type for a slot raw name or alias.
    pub fn pt(&self, name: &str) -> Option<ParticleType> {
        self.ctx.spec().particle_type(name)
    }

    /// Default selectors by name.
    pub fn selectors(&self) -> &IndexMap<String, ParticleSelector> {
        &self.selectors
    }

    /// The default selector with the given name.
    pub fn selector(&self, name: &str) -> Option<&ParticleSelector> {
        self.selectors.get(name)
    }

    /// Every particle of every type.
    pub fn all(&self) -> &ParticleSelector {
        // `from_store` always inserts ALL.
        &self.selectors[ALL]
    }

    /// Every particle not in `selector`.
    pub fn complement(&self, selector: &ParticleSelector) -> Result<ParticleSelector, SelectError> {
        self.all().difference(selector)
    }

    /// A fresh selector over every particle of the listed types, with no
    /// derived fields.
    pub fn selector_for(&self, types: &[ParticleType]) -> ParticleSelector {
        ParticleSelector::from_types(Arc::clone(&self.ctx), types)
    }

    /// `(type, raw name)` of every stored dataset, by slot, as listed by the
    /// first file holding that type.
    pub fn raw_keys(&self) -> Vec<(ParticleType, String)> {
        self.ctx
            .spec()
            .slots()
            .flat_map(|(pt, _)| self.ctx.disk_fields(pt).map(move |n| (pt, n.to_string())))
            .collect()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("context", &self.ctx)
            .field("paths", &self.paths)
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .finish()
    }
}
