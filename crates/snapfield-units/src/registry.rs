//! Symbol tables for unit expressions.

use indexmap::IndexMap;
use snapfield_core::CodeUnits;

use crate::array::{Quantity, UnitArray};
use crate::dims::Dimensions;
use crate::error::UnitError;
use crate::parse::parse_expr;
use crate::unit::Unit;

const CM: f64 = 1e-2;
const GRAM: f64 = 1e-3;
const YEAR: f64 = 31_557_600.0;
const PARSEC: f64 = 3.085_677_581_491_367e16;
const MSUN: f64 = 1.988_415_86e30;

/// Boltzmann constant, J/K.
pub const BOLTZMANN: f64 = 1.380_649e-23;
/// Proton mass, kg.
pub const PROTON_MASS: f64 = 1.672_621_923_69e-27;

/// Maps unit symbols to concrete units and parses expressions over them.
///
/// [`UnitRegistry::new`] carries the built-in SI, CGS and astronomical
/// symbols plus the constants `kb` and `mp`. [`UnitRegistry::code`] adds the
/// simulation code units of one snapshot.
#[derive(Clone, Debug)]
pub struct UnitRegistry {
    symbols: IndexMap<String, Unit>,
}

impl UnitRegistry {
    /// Registry with the built-in symbols only.
    pub fn new() -> Self {
        let mut reg = Self {
            symbols: IndexMap::new(),
        };
        let l = Dimensions::LENGTH;
        let m = Dimensions::MASS;
        let t = Dimensions::TIME;
        let energy = Dimensions::new(2, 1, -2, 0, 0);

        reg.insert("dimensionless", 1.0, Dimensions::DIMENSIONLESS);
        reg.insert("m", 1.0, l);
        reg.insert("cm", CM, l);
        reg.insert("km", 1e3, l);
        reg.insert("AU", 1.495_978_707e11, l);
        reg.insert("pc", PARSEC, l);
        reg.insert("kpc", PARSEC * 1e3, l);
        reg.insert("Mpc", PARSEC * 1e6, l);
        reg.insert("g", GRAM, m);
        reg.insert("kg", 1.0, m);
        reg.insert("Msun", MSUN, m);
        reg.insert("s", 1.0, t);
        reg.insert("yr", YEAR, t);
        reg.insert("Myr", YEAR * 1e6, t);
        reg.insert("Gyr", YEAR * 1e9, t);
        reg.insert("K", 1.0, Dimensions::TEMPERATURE);
        reg.insert("A", 1.0, Dimensions::CURRENT);
        reg.insert("gauss", 1e-4, Dimensions::new(0, 1, -2, 0, -1));
        reg.insert("erg", 1e-7, energy);
        reg.insert("J", 1.0, energy);
        reg.insert("kb", BOLTZMANN, energy.checked_div(Dimensions::TEMPERATURE).expect("kb dimensions fit in i8"));
        reg.insert("mp", PROTON_MASS, m);
        reg
    }

    /// Registry with the built-ins plus the code units of a snapshot.
    ///
    /// `a` is the expansion factor and `h` the reduced Hubble parameter:
    ///
    /// | symbol | definition |
    /// |---|---|
    /// | `code_length` | `length_cm * a / h` cm |
    /// | `code_mass` | `mass_g / h` g |
    /// | `code_velocity` | `velocity_cm_per_s * sqrt(a)` cm/s |
    /// | `code_time` | `code_length / code_velocity` |
    /// | `code_specific_energy` | `velocity_cm_per_s**2` (cm/s)² |
    /// | `code_magnetic_field` | `magnetic_field_gauss` gauss |
    /// | `code_metallicity` | `solar_abundance` (dimensionless) |
    pub fn code(units: &CodeUnits, a: f64, h: f64) -> Self {
        let mut reg = Self::new();
        let d = Dimensions::DIMENSIONLESS;
        let length = units.length_cm * a / h * CM;
        let velocity = units.velocity_cm_per_s * a.sqrt() * CM;

        reg.insert("a", a, d);
        reg.insert("h", h, d);
        reg.insert("code_metallicity", units.solar_abundance, d);
        reg.insert("code_length", length, Dimensions::LENGTH);
        reg.insert("code_mass", units.mass_g / h * GRAM, Dimensions::MASS);
        reg.insert("code_velocity", velocity, Dimensions::new(1, 0, -1, 0, 0));
        reg.insert(
            "code_magnetic_field",
            units.magnetic_field_gauss * 1e-4,
            Dimensions::new(0, 1, -2, 0, -1),
        );
        reg.insert(
            "code_specific_energy",
            (units.velocity_cm_per_s * CM).powi(2),
            Dimensions::new(2, 0, -2, 0, 0),
        );
        reg.insert("code_time", length / velocity, Dimensions::TIME);
        reg
    }

    fn insert(&mut self, symbol: &str, scale: f64, dims: Dimensions) {
        self.symbols
            .insert(symbol.to_string(), Unit::new(symbol, scale, dims));
    }

    /// Define `symbol` as `factor` times the unit expression `expr`.
    pub fn define(&mut self, symbol: &str, factor: f64, expr: &str) -> Result<(), UnitError> {
        if self.symbols.contains_key(symbol) {
            return Err(UnitError::DuplicateSymbol {
                symbol: symbol.to_string(),
            });
        }
        let base = self.parse(expr)?;
        self.insert(symbol, factor * base.scale(), base.dims());
        Ok(())
    }

    /// Look up a single symbol.
    pub fn get(&self, symbol: &str) -> Option<&Unit> {
        self.symbols.get(symbol)
    }

    /// Whether `symbol` is defined.
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    /// Defined symbols in definition order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    /// Parse a unit expression. The empty expression is dimensionless.
    ///
    /// The resulting unit is labelled with the trimmed expression.
    pub fn parse(&self, expr: &str) -> Result<Unit, UnitError> {
        let unit = parse_expr(expr, |s| self.symbols.get(s).cloned())?;
        Ok(unit.relabel(expr.trim()))
    }

    /// Tag flat values with the unit of `expr`.
    pub fn array(&self, values: Vec<f64>, components: u32, expr: &str) -> Result<UnitArray, UnitError> {
        UnitArray::new(values, components, self.parse(expr)?)
    }

    /// Tag a single value with the unit of `expr`.
    pub fn quantity(&self, value: f64, expr: &str) -> Result<Quantity, UnitError> {
        Ok(Quantity::new(value, self.parse(expr)?))
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
    }

    #[test]
    fn code_length_scales_with_a_over_h() {
        let units = CodeUnits::default();
        let reg = UnitRegistry::code(&units, 0.5, 0.7);
        let cl = reg.get("code_length").unwrap();
        assert!(close(cl.scale(), 3.085678e21 * 0.5 / 0.7 * 1e-2));
        let kpc = reg.get("kpc").unwrap();
        // 1 code_length ~ a/h kpc for the default GIZMO units.
        assert!(close(cl.factor_to(kpc).unwrap(), 0.5 / 0.7 * 3.085678e21 / 3.085677581491367e21));
    }

    #[test]
    fn code_time_is_length_over_velocity() {
        let reg = UnitRegistry::code(&CodeUnits::default(), 1.0, 1.0);
        let t = reg.parse("code_time").unwrap();
        let derived = reg.parse("code_length / code_velocity").unwrap();
        assert_eq!(t, derived);
        // kpc / (km/s) is about 0.978 Gyr.
        let gyr = reg.get("Gyr").unwrap();
        let f = t.factor_to(gyr).unwrap();
        assert!((f - 0.9778).abs() < 1e-3, "{f}");
    }

    #[test]
    fn specific_energy_ignores_expansion() {
        let a1 = UnitRegistry::code(&CodeUnits::default(), 1.0, 0.7);
        let a2 = UnitRegistry::code(&CodeUnits::default(), 0.25, 0.7);
        assert_eq!(
            a1.get("code_specific_energy"),
            a2.get("code_specific_energy")
        );
        assert_ne!(a1.get("code_velocity"), a2.get("code_velocity"));
    }

    #[test]
    fn declared_gizmo_expressions_parse() {
        let reg = UnitRegistry::code(&CodeUnits::default(), 1.0, 0.7);
        for expr in [
            "code_length",
            "code_velocity",
            "",
            "code_mass",
            "code_specific_energy",
            "code_mass / code_length**3",
            "Msun / yr",
            "code_metallicity",
            "code_magnetic_field",
            "code_magnetic_field / code_length",
            "code_mass / code_time",
        ] {
            assert!(reg.parse(expr).is_ok(), "{expr}");
        }
    }

    #[test]
    fn define_rejects_existing_symbols() {
        let mut reg = UnitRegistry::new();
        reg.define("ly", 9.4607e15, "m").unwrap();
        assert!(close(reg.get("ly").unwrap().scale(), 9.4607e15));
        assert_eq!(
            reg.define("cm", 1.0, "m").unwrap_err(),
            UnitError::DuplicateSymbol { symbol: "cm".into() }
        );
    }

    #[test]
    fn out_of_range_exponents_fail_to_parse() {
        let reg = UnitRegistry::code(&CodeUnits::default(), 1.0, 0.7);
        assert!(matches!(
            reg.parse("cm**100 * cm**100"),
            Err(UnitError::ExponentOverflow { .. })
        ));
        let mut custom = UnitRegistry::new();
        assert!(matches!(
            custom.define("huge", 1.0, "m**127 * m"),
            Err(UnitError::ExponentOverflow { .. })
        ));
        assert!(!custom.contains("huge"));
    }

    #[test]
    fn parse_keeps_expression_as_label() {
        let reg = UnitRegistry::new();
        assert_eq!(reg.parse(" Msun / yr ").unwrap().label(), "Msun / yr");
    }
}
