//! Declarative snapshot format specifications.
//!
//! A [`FormatSpec`] lists the particle-type slots of a snapshot format and,
//! per slot, the `(raw_name, alias, unit)` triples of the fields that may be
//! stored on disk. Specs are plain immutable values: customizing one means
//! building a new spec through [`FormatSpec::edit`], never mutating a spec
//! that a snapshot already holds.
//!
//! # Examples
//!
//! ```
//! use snapfield_core::{FieldEntry, FormatSpec, ParticleType, SlotScope};
//!
//! let gizmo = FormatSpec::gizmo();
//! let custom = gizmo
//!     .edit()
//!     .name("gizmo-tracers")
//!     .field(SlotScope::Only(ParticleType(0)), FieldEntry::new("TracerMass", "mtr", "code_mass"))
//!     .build()
//!     .unwrap();
//!
//! assert!(custom.lookup(ParticleType(0), "mtr").is_some());
//! assert!(gizmo.lookup(ParticleType(0), "mtr").is_none());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::id::ParticleType;

/// One declared field: raw on-disk name, short alias, native unit expression.
///
/// An empty `unit` means dimensionless. An empty `alias` means the field is
/// only addressable by its raw name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Dataset name inside the container.
    pub raw_name: String,
    /// Short human-facing key.
    #[serde(default)]
    pub alias: String,
    /// Unit expression over code-unit symbols (e.g. `"code_mass / code_length**3"`).
    #[serde(default)]
    pub unit: String,
}

impl FieldEntry {
    /// Create a field entry.
    pub fn new(raw_name: impl Into<String>, alias: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            alias: alias.into(),
            unit: unit.into(),
        }
    }
}

/// Code-unit constants of a snapshot format, in CGS.
///
/// These are the values the simulation code was compiled with; the unit
/// system later folds in the expansion factor and Hubble parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeUnits {
    /// Code length in centimetres (before `a / h` scaling).
    pub length_cm: f64,
    /// Code mass in grams (before `1 / h` scaling).
    pub mass_g: f64,
    /// Code velocity in cm/s (before `sqrt(a)` scaling).
    pub velocity_cm_per_s: f64,
    /// Code magnetic field in gauss.
    pub magnetic_field_gauss: f64,
    /// Solar metal mass fraction used for `code_metallicity`.
    pub solar_abundance: f64,
}

impl Default for CodeUnits {
    fn default() -> Self {
        Self {
            length_cm: 3.085678e21,
            mass_g: 1.989e43,
            velocity_cm_per_s: 1e5,
            magnetic_field_gauss: 1.0,
            solar_abundance: 0.02,
        }
    }
}

/// One particle-type slot and its declared fields.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSlot {
    raw_name: String,
    alias: String,
    fields: IndexMap<String, FieldEntry>,
    /// alias -> index into `fields`
    aliases: IndexMap<String, usize>,
}

impl TypeSlot {
    /// Build a slot, checking that raw names and aliases are unique.
    pub fn new(
        raw_name: impl Into<String>,
        alias: impl Into<String>,
        entries: impl IntoIterator<Item = FieldEntry>,
    ) -> Result<Self, SpecError> {
        let mut slot = Self {
            raw_name: raw_name.into(),
            alias: alias.into(),
            fields: IndexMap::new(),
            aliases: IndexMap::new(),
        };
        for entry in entries {
            if slot.fields.contains_key(&entry.raw_name) {
                return Err(SpecError::DuplicateRawName {
                    slot: slot.raw_name,
                    name: entry.raw_name,
                });
            }
            if !entry.alias.is_empty() && slot.aliases.contains_key(&entry.alias) {
                return Err(SpecError::DuplicateAlias {
                    slot: slot.raw_name,
                    alias: entry.alias,
                });
            }
            let index = slot.fields.len();
            if !entry.alias.is_empty() {
                slot.aliases.insert(entry.alias.clone(), index);
            }
            slot.fields.insert(entry.raw_name.clone(), entry);
        }
        Ok(slot)
    }

    /// Group name of this slot inside a container (e.g. `"PartType0"`).
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Short name of this slot (e.g. `"gas"`).
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Find a field by raw name first, then by alias.
    pub fn lookup(&self, key: &str) -> Option<&FieldEntry> {
        self.fields.get(key).or_else(|| {
            let index = *self.aliases.get(key)?;
            self.fields.get_index(index).map(|(_, entry)| entry)
        })
    }

    /// Declared fields in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &FieldEntry> {
        self.fields.values()
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the slot declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A complete snapshot format description.
#[derive(Clone, Debug, PartialEq)]
pub struct FormatSpec {
    name: String,
    code_units: CodeUnits,
    slots: Vec<TypeSlot>,
}

impl FormatSpec {
    /// Assemble a spec from validated slots.
    ///
    /// Slot raw names and aliases must be unique across the whole spec.
    pub fn new(
        name: impl Into<String>,
        code_units: CodeUnits,
        slots: Vec<TypeSlot>,
    ) -> Result<Self, SpecError> {
        if slots.is_empty() {
            return Err(SpecError::NoSlots);
        }
        let mut seen: Vec<&str> = Vec::with_capacity(slots.len() * 2);
        for slot in &slots {
            for name in [slot.raw_name.as_str(), slot.alias.as_str()] {
                if name.is_empty() {
                    continue;
                }
                if seen.contains(&name) {
                    return Err(SpecError::DuplicateSlot { name: name.into() });
                }
                seen.push(name);
            }
        }
        Ok(Self {
            name: name.into(),
            code_units,
            slots,
        })
    }

    /// The GIZMO snapshot format: six slots sharing one field table.
    pub fn gizmo() -> Self {
        const SLOTS: [(&str, &str); 6] = [
            ("PartType0", "gas"),
            ("PartType1", "hdm"),
            ("PartType2", "ldm"),
            ("PartType3", "dum"),
            ("PartType4", "star"),
            ("PartType5", "bh"),
        ];
        const FIELDS: [(&str, &str, &str); 18] = [
            ("Coordinates", "p", "code_length"),
            ("Velocities", "v", "code_velocity"),
            ("ParticleIDs", "id", ""),
            ("Masses", "m", "code_mass"),
            ("InternalEnergy", "u", "code_specific_energy"),
            ("Density", "rho", "code_mass / code_length**3"),
            ("SmoothingLength", "h", "code_length"),
            ("ElectronAbundance", "ne", ""),
            ("NeutralHydrogenAbundance", "nh", ""),
            ("StarFormationRate", "sfr", "Msun / yr"),
            ("Metallicity", "z", "code_metallicity"),
            ("ArtificialViscosity", "alpha", ""),
            ("MagneticField", "b", "code_magnetic_field"),
            ("DivergenceOfMagneticField", "divb", "code_magnetic_field / code_length"),
            ("StellarFormationTime", "sft", ""),
            ("BH_Mass", "mbh", "code_mass"),
            ("BH_Mdot", "mdot", "code_mass / code_time"),
            ("BH_Mass_AlphaDisk", "mad", "code_mass"),
        ];

        let slots = SLOTS
            .iter()
            .map(|&(raw, alias)| {
                let mut fields = IndexMap::with_capacity(FIELDS.len());
                let mut aliases = IndexMap::with_capacity(FIELDS.len());
                for (i, &(name, short, unit)) in FIELDS.iter().enumerate() {
                    fields.insert(name.to_string(), FieldEntry::new(name, short, unit));
                    aliases.insert(short.to_string(), i);
                }
                TypeSlot {
                    raw_name: raw.into(),
                    alias: alias.into(),
                    fields,
                    aliases,
                }
            })
            .collect();

        Self {
            name: "gizmo".into(),
            code_units: CodeUnits::default(),
            slots,
        }
    }

    /// Parse a spec from a TOML document.
    ///
    /// ```
    /// use snapfield_core::{FormatSpec, ParticleType};
    ///
    /// let spec = FormatSpec::from_toml_str(r#"
    ///     name = "tiny"
    ///
    ///     [[shared_fields]]
    ///     raw_name = "Coordinates"
    ///     alias = "p"
    ///     unit = "code_length"
    ///
    ///     [[slots]]
    ///     raw_name = "PartType0"
    ///     alias = "gas"
    ///
    ///     [[slots]]
    ///     raw_name = "PartType1"
    ///     alias = "dm"
    /// "#).unwrap();
    ///
    /// assert_eq!(spec.slot_count(), 2);
    /// assert_eq!(spec.lookup(ParticleType(1), "p").unwrap().raw_name, "Coordinates");
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, SpecError> {
        let doc: SpecDocument = toml::from_str(source).map_err(|e| SpecError::Parse {
            reason: e.to_string(),
        })?;
        doc.into_spec()
    }

    /// Render the spec as a TOML document with every slot's fields spelled out.
    pub fn to_toml_string(&self) -> Result<String, SpecError> {
        let doc = SpecDocument {
            name: self.name.clone(),
            code_units: self.code_units,
            shared_fields: Vec::new(),
            slots: self
                .slots
                .iter()
                .map(|slot| SlotDocument {
                    raw_name: slot.raw_name.clone(),
                    alias: slot.alias.clone(),
                    fields: slot.entries().cloned().collect(),
                })
                .collect(),
        };
        toml::to_string(&doc).map_err(|e| SpecError::Parse {
            reason: e.to_string(),
        })
    }

    /// Format name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Code-unit constants.
    pub fn code_units(&self) -> &CodeUnits {
        &self.code_units
    }

    /// Number of particle-type slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The slot for a particle type.
    pub fn slot(&self, particle_type: ParticleType) -> Option<&TypeSlot> {
        self.slots.get(particle_type.index())
    }

    /// All slots with their particle types, in ascending type order.
    pub fn slots(&self) -> impl Iterator<Item = (ParticleType, &TypeSlot)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (ParticleType(i as u32), slot))
    }

    /// Find a particle type by slot raw name or alias.
    pub fn particle_type(&self, name: &str) -> Option<ParticleType> {
        self.slots
            .iter()
            .position(|slot| slot.raw_name == name || slot.alias == name)
            .map(|i| ParticleType(i as u32))
    }

    /// Look up a declared field of one particle type by raw name or alias.
    pub fn lookup(&self, particle_type: ParticleType, key: &str) -> Option<&FieldEntry> {
        self.slot(particle_type)?.lookup(key)
    }

    /// Start a copy-and-edit of this spec. `self` is left untouched.
    pub fn edit(&self) -> SpecEdit {
        SpecEdit {
            name: self.name.clone(),
            code_units: self.code_units,
            slots: self
                .slots
                .iter()
                .map(|slot| SlotDraft {
                    raw_name: slot.raw_name.clone(),
                    alias: slot.alias.clone(),
                    fields: slot.entries().cloned().collect(),
                })
                .collect(),
            error: None,
        }
    }
}

/// Which slots an edit applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotScope {
    /// Every slot of the spec.
    All,
    /// A single slot.
    Only(ParticleType),
}

impl From<ParticleType> for SlotScope {
    fn from(pt: ParticleType) -> Self {
        SlotScope::Only(pt)
    }
}

#[derive(Clone, Debug)]
struct SlotDraft {
    raw_name: String,
    alias: String,
    fields: Vec<FieldEntry>,
}

/// Builder producing a new [`FormatSpec`] from an existing one.
///
/// Edits are applied in call order to a private draft. The first failing
/// edit is remembered and reported by [`build`](Self::build); later edits
/// are ignored.
#[derive(Clone, Debug)]
pub struct SpecEdit {
    name: String,
    code_units: CodeUnits,
    slots: Vec<SlotDraft>,
    error: Option<SpecError>,
}

impl SpecEdit {
    /// Rename the spec.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the code-unit constants.
    pub fn code_units(mut self, code_units: CodeUnits) -> Self {
        self.code_units = code_units;
        self
    }

    /// Append a new particle-type slot.
    pub fn slot(
        mut self,
        raw_name: impl Into<String>,
        alias: impl Into<String>,
        fields: impl IntoIterator<Item = FieldEntry>,
    ) -> Self {
        if self.error.is_none() {
            self.slots.push(SlotDraft {
                raw_name: raw_name.into(),
                alias: alias.into(),
                fields: fields.into_iter().collect(),
            });
        }
        self
    }

    /// Declare a field, replacing any entry with the same raw name.
    pub fn field(mut self, scope: impl Into<SlotScope>, entry: FieldEntry) -> Self {
        let targets = match self.targets(scope.into()) {
            Some(t) => t,
            None => return self,
        };
        for i in targets {
            let fields = &mut self.slots[i].fields;
            match fields.iter_mut().find(|f| f.raw_name == entry.raw_name) {
                Some(existing) => *existing = entry.clone(),
                None => fields.push(entry.clone()),
            }
        }
        self
    }

    /// Remove a declared field.
    pub fn remove_field(mut self, scope: impl Into<SlotScope>, raw_name: &str) -> Self {
        let scope = scope.into();
        let targets = match self.targets(scope) {
            Some(t) => t,
            None => return self,
        };
        let mut removed = false;
        for &i in &targets {
            let fields = &mut self.slots[i].fields;
            let before = fields.len();
            fields.retain(|f| f.raw_name != raw_name);
            removed |= fields.len() != before;
        }
        if !removed {
            self.fail_unknown_field(&targets, raw_name);
        }
        self
    }

    /// Change the alias of a declared field.
    pub fn alias(self, scope: impl Into<SlotScope>, raw_name: &str, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.modify(scope.into(), raw_name, |entry| entry.alias = alias.clone())
    }

    /// Change the unit expression of a declared field.
    pub fn unit(self, scope: impl Into<SlotScope>, raw_name: &str, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        self.modify(scope.into(), raw_name, |entry| entry.unit = unit.clone())
    }

    /// Validate the draft and produce the new spec.
    pub fn build(self) -> Result<FormatSpec, SpecError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let slots = self
            .slots
            .into_iter()
            .map(|d| TypeSlot::new(d.raw_name, d.alias, d.fields))
            .collect::<Result<Vec<_>, _>>()?;
        FormatSpec::new(self.name, self.code_units, slots)
    }

    fn modify(mut self, scope: SlotScope, raw_name: &str, f: impl Fn(&mut FieldEntry)) -> Self {
        let targets = match self.targets(scope) {
            Some(t) => t,
            None => return self,
        };
        let mut touched = false;
        for &i in &targets {
            if let Some(entry) = self.slots[i]
                .fields
                .iter_mut()
                .find(|e| e.raw_name == raw_name)
            {
                f(entry);
                touched = true;
            }
        }
        if !touched {
            self.fail_unknown_field(&targets, raw_name);
        }
        self
    }

    /// Slot indices covered by `scope`, or `None` if the edit must be skipped.
    fn targets(&mut self, scope: SlotScope) -> Option<Vec<usize>> {
        if self.error.is_some() {
            return None;
        }
        match scope {
            SlotScope::All => Some((0..self.slots.len()).collect()),
            SlotScope::Only(pt) if pt.index() < self.slots.len() => Some(vec![pt.index()]),
            SlotScope::Only(pt) => {
                self.error = Some(SpecError::UnknownSlot { slot: pt });
                None
            }
        }
    }

    fn fail_unknown_field(&mut self, targets: &[usize], raw_name: &str) {
        let slot = targets
            .first()
            .map(|&i| self.slots[i].raw_name.clone())
            .unwrap_or_default();
        self.error = Some(SpecError::UnknownField {
            slot,
            name: raw_name.into(),
        });
    }
}

// ── TOML documents ─────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct SpecDocument {
    name: String,
    #[serde(default)]
    code_units: CodeUnits,
    /// Fields declared for every slot before slot-specific ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    shared_fields: Vec<FieldEntry>,
    slots: Vec<SlotDocument>,
}

#[derive(Serialize, Deserialize)]
struct SlotDocument {
    raw_name: String,
    #[serde(default)]
    alias: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldEntry>,
}

impl SpecDocument {
    fn into_spec(self) -> Result<FormatSpec, SpecError> {
        let shared = self.shared_fields;
        let slots = self
            .slots
            .into_iter()
            .map(|doc| {
                // Slot-specific entries replace shared ones with the same raw name.
                let mut fields: Vec<FieldEntry> = shared
                    .iter()
                    .filter(|s| !doc.fields.iter().any(|f| f.raw_name == s.raw_name))
                    .cloned()
                    .collect();
                fields.extend(doc.fields);
                TypeSlot::new(doc.raw_name, doc.alias, fields)
            })
            .collect::<Result<Vec<_>, _>>()?;
        FormatSpec::new(self.name, self.code_units, slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gizmo_has_six_valid_slots() {
        let spec = FormatSpec::gizmo();
        assert_eq!(spec.slot_count(), 6);
        // Rebuilding through the validating path must succeed.
        let rebuilt = spec.edit().build().unwrap();
        assert_eq!(rebuilt, spec);
        assert_eq!(spec.particle_type("star"), Some(ParticleType(4)));
        assert_eq!(spec.particle_type("PartType5"), Some(ParticleType(5)));
    }

    #[test]
    fn lookup_by_raw_name_and_alias_agree() {
        let spec = FormatSpec::gizmo();
        let by_raw = spec.lookup(ParticleType(0), "Density").unwrap();
        let by_alias = spec.lookup(ParticleType(0), "rho").unwrap();
        assert_eq!(by_raw, by_alias);
        assert_eq!(by_raw.unit, "code_mass / code_length**3");
        assert!(spec.lookup(ParticleType(0), "nope").is_none());
        assert!(spec.lookup(ParticleType(9), "rho").is_none());
    }

    #[test]
    fn duplicate_alias_in_one_slot_rejected() {
        let err = TypeSlot::new(
            "PartType0",
            "gas",
            [
                FieldEntry::new("Masses", "m", "code_mass"),
                FieldEntry::new("Metals", "m", ""),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SpecError::DuplicateAlias { alias, .. } if alias == "m"));
    }

    #[test]
    fn duplicate_raw_name_in_one_slot_rejected() {
        let err = TypeSlot::new(
            "PartType0",
            "gas",
            [
                FieldEntry::new("Masses", "m", "code_mass"),
                FieldEntry::new("Masses", "mass", "code_mass"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SpecError::DuplicateRawName { .. }));
    }

    #[test]
    fn same_alias_may_differ_across_slots() {
        let a = TypeSlot::new("A", "a", [FieldEntry::new("Temp", "t", "K")]).unwrap();
        let b = TypeSlot::new("B", "b", [FieldEntry::new("FormationTime", "t", "")]).unwrap();
        let spec = FormatSpec::new("mixed", CodeUnits::default(), vec![a, b]).unwrap();
        assert_eq!(spec.lookup(ParticleType(0), "t").unwrap().raw_name, "Temp");
        assert_eq!(
            spec.lookup(ParticleType(1), "t").unwrap().raw_name,
            "FormationTime"
        );
    }

    #[test]
    fn duplicate_slot_names_rejected() {
        let a = TypeSlot::new("PartType0", "gas", []).unwrap();
        let b = TypeSlot::new("PartType1", "gas", []).unwrap();
        let err = FormatSpec::new("bad", CodeUnits::default(), vec![a, b]).unwrap_err();
        assert_eq!(err, SpecError::DuplicateSlot { name: "gas".into() });
        assert_eq!(
            FormatSpec::new("empty", CodeUnits::default(), vec![]).unwrap_err(),
            SpecError::NoSlots
        );
    }

    #[test]
    fn edit_leaves_original_untouched() {
        let base = FormatSpec::gizmo();
        let edited = base
            .edit()
            .alias(SlotScope::All, "Coordinates", "pos")
            .unit(ParticleType(4), "StellarFormationTime", "Gyr")
            .remove_field(SlotScope::All, "BH_Mass_AlphaDisk")
            .build()
            .unwrap();

        assert!(base.lookup(ParticleType(0), "p").is_some());
        assert!(edited.lookup(ParticleType(0), "p").is_none());
        assert!(edited.lookup(ParticleType(3), "pos").is_some());
        assert_eq!(edited.lookup(ParticleType(4), "sft").unwrap().unit, "Gyr");
        assert_eq!(edited.lookup(ParticleType(0), "sft").unwrap().unit, "");
        assert!(edited.lookup(ParticleType(5), "mad").is_none());
        assert!(base.lookup(ParticleType(5), "mad").is_some());
    }

    #[test]
    fn edit_reports_first_error() {
        let err = FormatSpec::gizmo()
            .edit()
            .unit(ParticleType(0), "NoSuchField", "K")
            .unit(ParticleType(42), "Masses", "g")
            .build()
            .unwrap_err();
        assert!(matches!(err, SpecError::UnknownField { name, .. } if name == "NoSuchField"));

        let err = FormatSpec::gizmo()
            .edit()
            .field(ParticleType(42), FieldEntry::new("X", "x", ""))
            .build()
            .unwrap_err();
        assert_eq!(err, SpecError::UnknownSlot { slot: ParticleType(42) });
    }

    #[test]
    fn edit_can_introduce_alias_collision() {
        let err = FormatSpec::gizmo()
            .edit()
            .alias(ParticleType(0), "Velocities", "p")
            .build()
            .unwrap_err();
        assert!(matches!(err, SpecError::DuplicateAlias { alias, .. } if alias == "p"));
    }

    #[test]
    fn toml_slot_fields_override_shared() {
        let spec = FormatSpec::from_toml_str(
            r#"
            name = "override"

            [code_units]
            length_cm = 3.085678e24

            [[shared_fields]]
            raw_name = "Masses"
            alias = "m"
            unit = "code_mass"

            [[slots]]
            raw_name = "PartType0"
            alias = "gas"

            [[slots]]
            raw_name = "PartType1"
            alias = "dm"
            fields = [{ raw_name = "Masses", alias = "mass", unit = "Msun" }]
            "#,
        )
        .unwrap();
        assert_eq!(spec.code_units().length_cm, 3.085678e24);
        assert_eq!(spec.code_units().mass_g, CodeUnits::default().mass_g);
        assert_eq!(spec.lookup(ParticleType(0), "m").unwrap().unit, "code_mass");
        assert!(spec.lookup(ParticleType(1), "m").is_none());
        assert_eq!(spec.lookup(ParticleType(1), "mass").unwrap().unit, "Msun");
    }

    #[test]
    fn toml_rendering_reloads_to_same_spec() {
        let spec = FormatSpec::gizmo();
        let text = spec.to_toml_string().unwrap();
        assert_eq!(FormatSpec::from_toml_str(&text).unwrap(), spec);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = FormatSpec::from_toml_str("name = ").unwrap_err();
        assert!(matches!(err, SpecError::Parse { .. }));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn edits_never_touch_the_base_spec(
                slot in 0u32..6,
                alias in "[a-z]{1,6}",
                unit in "(cm|g|s|K)",
            ) {
                let base = FormatSpec::gizmo();
                let before = base.clone();
                let _ = base
                    .edit()
                    .field(ParticleType(slot), FieldEntry::new("Extra", alias.clone(), unit.clone()))
                    .unit(SlotScope::All, "Masses", unit)
                    .build();
                prop_assert_eq!(base, before);
            }

            #[test]
            fn every_gizmo_alias_resolves_to_its_raw_entry(slot in 0u32..6) {
                let spec = FormatSpec::gizmo();
                let pt = ParticleType(slot);
                for entry in spec.slot(pt).unwrap().entries() {
                    prop_assert_eq!(spec.lookup(pt, &entry.alias), Some(entry));
                    prop_assert_eq!(spec.lookup(pt, &entry.raw_name), Some(entry));
                }
            }
        }
    }
}
