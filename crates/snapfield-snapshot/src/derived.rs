//! Derived fields and the per-format default set.

use std::fmt;
use std::sync::Arc;

use snapfield_units::registry::{BOLTZMANN, PROTON_MASS};
use snapfield_units::{Dimensions, Unit, UnitArray};

use crate::error::FieldError;
use crate::selector::ParticleSelector;

type DeriveFn = dyn Fn(&ParticleSelector) -> Result<UnitArray, FieldError> + Send + Sync;

/// A computation producing one field from other fields of a selector.
///
/// The function is always called with a selector restricted to a single
/// particle type with an all-true mask, and must return one row per
/// particle of that type. It may look up any other key on that selector.
#[derive(Clone)]
pub struct DerivedField(Arc<DeriveFn>);

impl DerivedField {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ParticleSelector) -> Result<UnitArray, FieldError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the computation.
    pub fn evaluate(&self, selector: &ParticleSelector) -> Result<UnitArray, FieldError> {
        (self.0)(selector)
    }

    /// Whether two handles share the same computation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DerivedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedField(..)")
    }
}

/// Source of the derived fields registered on a snapshot's default selectors.
///
/// `selector` is the default selector's name: a slot alias such as `"gas"`,
/// or `"all"`.
pub trait DerivedDefaults: Send + Sync {
    /// Fields to register on the named default selector.
    fn fields_for(&self, selector: &str) -> Vec<(String, DerivedField)>;
}

/// No default derived fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDefaults;

impl DerivedDefaults for NoDefaults {
    fn fields_for(&self, _selector: &str) -> Vec<(String, DerivedField)> {
        Vec::new()
    }
}

/// GIZMO defaults: gas temperature `t` and stellar `age`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GizmoDefaults;

impl DerivedDefaults for GizmoDefaults {
    fn fields_for(&self, selector: &str) -> Vec<(String, DerivedField)> {
        match selector {
            "gas" => vec![("t".to_string(), temperature())],
            "star" => vec![("age".to_string(), stellar_age())],
            _ => Vec::new(),
        }
    }
}

/// Adiabatic index of a monatomic ideal gas.
const GAMMA: f64 = 5.0 / 3.0;

/// Gas temperature in K from `ne`, `u` and the helium column of `z`.
///
/// `y = z_He / (4 (1 - z_He))`, `mu = (1 + 4y) / (1 + y + ne)` and
/// `T = mu m_p (gamma - 1) u / k_B`.
pub fn temperature() -> DerivedField {
    DerivedField::new(|sel| {
        let ne = sel.get("ne")?;
        let si = Unit::new("m**2/s**2", 1.0, Dimensions::new(2, 0, -2, 0, 0));
        let u = sel.get("u")?.to(&si)?;
        let z_he = sel.get("z")?.component(1)?;

        let values = ne
            .values()
            .iter()
            .zip(u.values())
            .zip(z_he.values())
            .map(|((&ne, &u), &zhe)| {
                let y = zhe / (4.0 * (1.0 - zhe));
                let mu = (1.0 + 4.0 * y) / (1.0 + y + ne);
                mu * PROTON_MASS * (GAMMA - 1.0) * u / BOLTZMANN
            })
            .collect();
        let kelvin = sel.context().units().parse("K")?;
        Ok(UnitArray::scalar(values, kelvin))
    })
}

/// Stellar age in Gyr from `sft`.
///
/// In a cosmological run `sft` is the formation scale factor; otherwise it
/// is the formation time in code time.
pub fn stellar_age() -> DerivedField {
    DerivedField::new(|sel| {
        let sft = sel.get("sft")?;
        let header = sel.header();
        let units = sel.context().units();
        let gyr = units.parse("Gyr")?;
        let now = header.time().to(&gyr)?.value();

        let values = if header.is_cosmological() {
            let cosmo = header.cosmology();
            sft.values()
                .iter()
                .map(|&a| now - cosmo.age_at_scale_factor(a))
                .collect()
        } else {
            let factor = units.parse("code_time")?.factor_to(&gyr)?;
            sft.values().iter().map(|&t| now - t * factor).collect()
        };
        Ok(UnitArray::scalar(values, gyr))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gizmo_defaults_by_selector() {
        let d = GizmoDefaults;
        let gas: Vec<String> = d.fields_for("gas").into_iter().map(|(k, _)| k).collect();
        assert_eq!(gas, vec!["t"]);
        let star: Vec<String> = d.fields_for("star").into_iter().map(|(k, _)| k).collect();
        assert_eq!(star, vec!["age"]);
        assert!(d.fields_for("all").is_empty());
        assert!(d.fields_for("bh").is_empty());
        assert!(NoDefaults.fields_for("gas").is_empty());
    }

    #[test]
    fn clones_share_the_computation() {
        let a = temperature();
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&temperature()));
    }
}
