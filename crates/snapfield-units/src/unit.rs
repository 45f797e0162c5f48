//! Concrete units: a label, an SI scale and dimensions.

use std::fmt;

use crate::dims::Dimensions;
use crate::error::UnitError;

/// Relative tolerance when comparing unit scales.
const SCALE_RTOL: f64 = 1e-12;

/// A resolved unit.
///
/// `scale` is the size of one unit in SI base units of its dimensions, so
/// `cm` is `(0.01, L)` and `code_mass` with `h = 0.7` is
/// `(1.989e40 / 0.7, M)`. The label is for display only; equality compares
/// dimensions and scale.
#[derive(Clone, Debug)]
pub struct Unit {
    label: String,
    scale: f64,
    dims: Dimensions,
}

impl Unit {
    /// Create a unit.
    pub fn new(label: impl Into<String>, scale: f64, dims: Dimensions) -> Self {
        Self {
            label: label.into(),
            scale,
            dims,
        }
    }

    /// The dimensionless unit with scale 1.
    pub fn dimensionless() -> Self {
        Self::new("", 1.0, Dimensions::DIMENSIONLESS)
    }

    /// Display label (empty for dimensionless).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Size of one unit in SI base units.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Physical dimensions.
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Same unit under a different label.
    pub fn relabel(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Whether the unit has no dimensions (scale may differ from 1).
    pub fn is_dimensionless(&self) -> bool {
        self.dims.is_dimensionless()
    }

    /// Whether values in `self` can be converted to `other`.
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dims == other.dims
    }

    /// Multiplier taking a value in `self` to a value in `target`.
    pub fn factor_to(&self, target: &Unit) -> Result<f64, UnitError> {
        if !self.is_compatible(target) {
            return Err(UnitError::Incompatible {
                from: self.describe(),
                to: target.describe(),
            });
        }
        Ok(self.scale / target.scale)
    }

    /// Raise to an integer power.
    pub fn powi(&self, n: i8) -> Result<Unit, UnitError> {
        let label = match n {
            0 => String::new(),
            1 => self.label.clone(),
            _ if self.label.is_empty() => String::new(),
            _ => format!("{}**{n}", grouped(&self.label)),
        };
        let dims = self.dims.checked_powi(n).ok_or_else(|| overflow(&label))?;
        Ok(Unit::new(label, self.scale.powi(n as i32), dims))
    }

    /// Product of two units.
    pub fn mul(&self, rhs: &Unit) -> Result<Unit, UnitError> {
        let label = match (self.label.is_empty(), rhs.label.is_empty()) {
            (true, _) => rhs.label.clone(),
            (_, true) => self.label.clone(),
            _ => format!("{}*{}", self.label, grouped(&rhs.label)),
        };
        let dims = self.dims.checked_mul(rhs.dims).ok_or_else(|| overflow(&label))?;
        Ok(Unit::new(label, self.scale * rhs.scale, dims))
    }

    /// Quotient of two units.
    pub fn div(&self, rhs: &Unit) -> Result<Unit, UnitError> {
        let label = match (self.label.is_empty(), rhs.label.is_empty()) {
            (_, true) => self.label.clone(),
            (true, false) => format!("1/{}", grouped(&rhs.label)),
            _ => format!("{}/{}", self.label, grouped(&rhs.label)),
        };
        let dims = self.dims.checked_div(rhs.dims).ok_or_else(|| overflow(&label))?;
        Ok(Unit::new(label, self.scale / rhs.scale, dims))
    }

    fn describe(&self) -> String {
        let label = if self.label.is_empty() {
            "dimensionless"
        } else {
            &self.label
        };
        format!("'{label}' [{}]", self.dims)
    }
}

fn overflow(label: &str) -> UnitError {
    UnitError::ExponentOverflow {
        expr: label.to_string(),
    }
}

/// Wrap compound labels in parentheses.
fn grouped(label: &str) -> String {
    if label.contains(['*', '/', ' ']) {
        format!("({label})")
    } else {
        label.to_string()
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims
            && (self.scale - other.scale).abs() <= SCALE_RTOL * self.scale.abs().max(other.scale.abs())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "dimensionless")
        } else {
            write!(f, "{}", self.label)
        }
    }
}
