//! The unit-system seam used by field resolution.

use crate::array::UnitArray;
use crate::error::UnitError;
use crate::registry::UnitRegistry;
use crate::unit::Unit;

/// Resolves unit expressions and converts arrays between units.
///
/// The snapshot layer only depends on this trait, so a format can bring its
/// own symbol table.
pub trait UnitSystem: Send + Sync {
    /// Resolve a unit expression to a concrete unit.
    fn resolve(&self, expr: &str) -> Result<Unit, UnitError>;

    /// Convert an array to the unit named by `target`.
    fn convert(&self, array: &UnitArray, target: &str) -> Result<UnitArray, UnitError> {
        let unit = self.resolve(target)?;
        array.to(&unit)
    }
}

impl UnitSystem for UnitRegistry {
    fn resolve(&self, expr: &str) -> Result<Unit, UnitError> {
        self.parse(expr)
    }
}
