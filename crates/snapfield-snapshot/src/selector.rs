//! Particle selections with dict-like field access and set algebra.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use snapfield_core::{ParticleType, SnapshotInstanceId};
use snapfield_units::UnitArray;

use crate::context::SnapshotContext;
use crate::derived::DerivedField;
use crate::error::{FieldError, SelectError};
use crate::header::Header;
use crate::mask::ParticleMask;
use crate::resolver;

/// Derived fields by key, in registration order.
pub type Registry = IndexMap<String, DerivedField>;

/// A set of particles of one snapshot.
///
/// Holds one [`ParticleMask`] per particle type, sized to the type's global
/// count, so types outside the selection carry an all-false mask. Field
/// values are always returned in ascending type order, and within a type
/// in file order.
///
/// Refinement and set operations return new selectors; masks are never
/// modified in place. The derived-field registry is shared between a
/// selector and the selectors made from it until one of them registers or
/// removes a field, which copies the registry for that selector only.
///
/// ```
/// # use snapfield_snapshot::Snapshot;
/// # fn demo(snap: &Snapshot) -> Result<(), Box<dyn std::error::Error>> {
/// let gas = &snap.selectors()["gas"];
/// let dense = gas.filter("rho", |row| row[0] > 1.0)?;
/// let rest = gas.difference(&dense)?;
/// assert_eq!(dense.count() + rest.count(), gas.count());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ParticleSelector {
    ctx: Arc<SnapshotContext>,
    masks: Vec<ParticleMask>,
    registry: Arc<Registry>,
    chain: Vec<(ParticleType, String)>,
}

impl ParticleSelector {
    /// Select every particle of the listed types.
    pub(crate) fn from_types(ctx: Arc<SnapshotContext>, types: &[ParticleType]) -> Self {
        let masks = (0..ctx.type_count())
            .map(|i| {
                let pt = ParticleType(i as u32);
                let len = ctx.header().count(pt) as usize;
                if types.contains(&pt) {
                    ParticleMask::full(len)
                } else {
                    ParticleMask::empty(len)
                }
            })
            .collect();
        Self {
            ctx,
            masks,
            registry: Arc::new(Registry::new()),
            chain: Vec::new(),
        }
    }

    fn with_masks(&self, masks: Vec<ParticleMask>) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            masks,
            registry: Arc::clone(&self.registry),
            chain: self.chain.clone(),
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Identity of the snapshot this selector belongs to.
    pub fn snapshot_id(&self) -> SnapshotInstanceId {
        self.ctx.id()
    }

    /// Shared snapshot state.
    pub fn context(&self) -> &SnapshotContext {
        &self.ctx
    }

    /// The snapshot header.
    pub fn header(&self) -> &Header {
        self.ctx.header()
    }

    /// Number of selected particles over all types.
    pub fn count(&self) -> usize {
        self.masks.iter().map(ParticleMask::count).sum()
    }

    /// Number of selected particles of one type.
    pub fn count_of(&self, particle_type: ParticleType) -> usize {
        self.mask(particle_type).map_or(0, ParticleMask::count)
    }

    /// Whether no particle is selected.
    pub fn is_empty(&self) -> bool {
        self.masks.iter().all(ParticleMask::none)
    }

    /// Types with at least one selected particle, ascending.
    pub fn active_types(&self) -> Vec<ParticleType> {
        self.masks
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.none())
            .map(|(i, _)| ParticleType(i as u32))
            .collect()
    }

    /// The mask of one type.
    pub fn mask(&self, particle_type: ParticleType) -> Option<&ParticleMask> {
        self.masks.get(particle_type.index())
    }

    // ── Field access ───────────────────────────────────────────────

    /// Values of `key` for the selected particles, one row each.
    ///
    /// Each active type is resolved over its full count, masked, and
    /// appended in ascending type order. Parts whose units differ in scale
    /// only are converted to the first part's unit.
    pub fn get(&self, key: &str) -> Result<UnitArray, FieldError> {
        let active = self.active_types();
        if active.is_empty() {
            return Err(FieldError::EmptySelection {
                key: key.to_string(),
            });
        }

        let mut parts = Vec::with_capacity(active.len());
        for pt in active {
            let values = resolver::resolve(self, pt, key)?;
            let mask = &self.masks[pt.index()];
            if mask.is_full() {
                parts.push(values);
            } else {
                parts.push(values.filter_rows(|i| mask.get(i)));
            }
        }
        UnitArray::concat(parts).map_err(|source| FieldError::Incompatible {
            key: key.to_string(),
            source,
        })
    }

    /// Keys that resolve for every active type, in the first active type's order.
    pub fn keys(&self) -> Vec<String> {
        let mut per_type = self.active_types().into_iter().map(|pt| {
            let spec = self.ctx.spec();
            let mut keys: IndexSet<String> = self.ctx.direct_keys(pt).into_iter().collect();
            keys.extend(
                self.registry
                    .keys()
                    .filter(|k| spec.lookup(pt, k).is_none())
                    .cloned(),
            );
            keys
        });
        let Some(first) = per_type.next() else {
            return Vec::new();
        };
        let rest: Vec<_> = per_type.collect();
        first
            .into_iter()
            .filter(|k| rest.iter().all(|set| set.contains(k)))
            .collect()
    }

    /// Whether `key` is among [`keys`](Self::keys).
    pub fn contains_key(&self, key: &str) -> bool {
        let active = self.active_types();
        !active.is_empty()
            && active.into_iter().all(|pt| {
                !matches!(
                    resolver::classify(self, pt, key),
                    resolver::Resolution::Unresolved
                )
            })
    }

    // ── Refinement ─────────────────────────────────────────────────

    /// Keep the particles whose entry in `keep` is true.
    ///
    /// `keep` covers the selected particles in field order, so
    /// `keep.len()` must equal [`count`](Self::count).
    pub fn select(&self, keep: &[bool]) -> Result<Self, SelectError> {
        let expected = self.count();
        if keep.len() != expected {
            return Err(SelectError::ShapeMismatch {
                expected,
                found: keep.len(),
            });
        }
        Ok(self.refine(keep))
    }

    /// Keep the particles whose row of `key` satisfies `predicate`.
    pub fn filter(
        &self,
        key: &str,
        predicate: impl Fn(&[f64]) -> bool,
    ) -> Result<Self, FieldError> {
        let values = self.get(key)?;
        let width = values.components() as usize;
        let keep: Vec<bool> = values.values().chunks_exact(width).map(predicate).collect();
        Ok(self.refine(&keep))
    }

    fn refine(&self, keep: &[bool]) -> Self {
        let mut offset = 0;
        let masks = self
            .masks
            .iter()
            .map(|mask| {
                let n = mask.count();
                let end = (offset + n).min(keep.len());
                let segment = &keep[offset.min(end)..end];
                offset += n;
                mask.refine(segment)
            })
            .collect();
        self.with_masks(masks)
    }

    // ── Set algebra ────────────────────────────────────────────────

    /// Particles in either selector.
    pub fn union(&self, other: &Self) -> Result<Self, SelectError> {
        self.combine(other, ParticleMask::union)
    }

    /// Particles in both selectors.
    pub fn intersection(&self, other: &Self) -> Result<Self, SelectError> {
        self.combine(other, ParticleMask::intersection)
    }

    /// Particles in `self` but not in `other`.
    pub fn difference(&self, other: &Self) -> Result<Self, SelectError> {
        self.combine(other, ParticleMask::difference)
    }

    /// Particles in exactly one of the selectors.
    pub fn symmetric_difference(&self, other: &Self) -> Result<Self, SelectError> {
        self.combine(other, ParticleMask::symmetric_difference)
    }

    fn combine(
        &self,
        other: &Self,
        op: impl Fn(&ParticleMask, &ParticleMask) -> ParticleMask,
    ) -> Result<Self, SelectError> {
        if self.snapshot_id() != other.snapshot_id() {
            return Err(SelectError::IncompatibleSelector {
                left: self.snapshot_id(),
                right: other.snapshot_id(),
            });
        }
        let masks = self
            .masks
            .iter()
            .zip(&other.masks)
            .map(|(a, b)| op(a, b))
            .collect();

        let registry = if Arc::ptr_eq(&self.registry, &other.registry) {
            Arc::clone(&self.registry)
        } else {
            let shared: Registry = self
                .registry
                .iter()
                .filter(|(k, f)| other.registry.get(*k).is_some_and(|g| g.ptr_eq(f)))
                .map(|(k, f)| (k.clone(), f.clone()))
                .collect();
            Arc::new(shared)
        };

        Ok(Self {
            ctx: Arc::clone(&self.ctx),
            masks,
            registry,
            chain: self.chain.clone(),
        })
    }

    // ── Derived-field registry ─────────────────────────────────────

    /// Register a derived field computed by `f`, replacing any previous one.
    pub fn register_field<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: Fn(&ParticleSelector) -> Result<UnitArray, FieldError> + Send + Sync + 'static,
    {
        self.register(key, DerivedField::new(f));
    }

    /// Register an existing derived field handle.
    pub fn register(&mut self, key: impl Into<String>, field: DerivedField) {
        Arc::make_mut(&mut self.registry).insert(key.into(), field);
    }

    /// Remove a derived field, returning it if it was registered.
    pub fn unregister_field(&mut self, key: &str) -> Option<DerivedField> {
        if !self.registry.contains_key(key) {
            return None;
        }
        Arc::make_mut(&mut self.registry).shift_remove(key)
    }

    /// The derived field registered under `key`.
    pub fn derived(&self, key: &str) -> Option<&DerivedField> {
        self.registry.get(key)
    }

    /// Keys of the registered derived fields.
    pub fn derived_keys(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    pub(crate) fn chain(&self) -> &[(ParticleType, String)] {
        &self.chain
    }

    /// All particles of one type, entering `frame` of derived evaluation.
    pub(crate) fn restricted(&self, particle_type: ParticleType, frame: (ParticleType, String)) -> Self {
        let masks = self
            .masks
            .iter()
            .enumerate()
            .map(|(i, m)| {
                if i == particle_type.index() {
                    ParticleMask::full(m.len())
                } else {
                    ParticleMask::empty(m.len())
                }
            })
            .collect();
        let mut chain = self.chain.clone();
        chain.push(frame);
        Self {
            ctx: Arc::clone(&self.ctx),
            masks,
            registry: Arc::clone(&self.registry),
            chain,
        }
    }
}

impl PartialEq for ParticleSelector {
    /// Same snapshot instance and the same particles.
    fn eq(&self, other: &Self) -> bool {
        self.snapshot_id() == other.snapshot_id() && self.masks == other.masks
    }
}

impl fmt::Debug for ParticleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleSelector")
            .field("snapshot", &self.snapshot_id())
            .field("masks", &self.masks)
            .field("derived", &self.registry.keys().collect::<Vec<_>>())
            .finish()
    }
}
