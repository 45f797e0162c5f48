//! Unit-tagged numeric arrays and scalars.

use std::fmt;

use snapfield_core::RawArray;

use crate::error::UnitError;
use crate::unit::Unit;

/// A flat row-major `f64` buffer with a per-row component count and a unit.
///
/// One row per particle. Elementwise arithmetic requires equal row counts;
/// a one-component operand broadcasts across the other's components.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitArray {
    values: Vec<f64>,
    components: u32,
    unit: Unit,
}

impl UnitArray {
    /// Wrap flat values. Fails if `components` is zero or does not divide the length.
    pub fn new(values: Vec<f64>, components: u32, unit: Unit) -> Result<Self, UnitError> {
        if components == 0 || values.len() % components as usize != 0 {
            return Err(UnitError::Ragged {
                len: values.len(),
                components,
            });
        }
        Ok(Self {
            values,
            components,
            unit,
        })
    }

    /// A one-component array.
    pub fn scalar(values: Vec<f64>, unit: Unit) -> Self {
        Self {
            values,
            components: 1,
            unit,
        }
    }

    /// An array with zero rows.
    pub fn empty(components: u32, unit: Unit) -> Self {
        Self {
            values: Vec::new(),
            components: components.max(1),
            unit,
        }
    }

    /// Tag a raw on-disk array.
    pub fn from_raw(raw: RawArray, unit: Unit) -> Self {
        let components = raw.components();
        Self {
            values: raw.into_values(),
            components,
            unit,
        }
    }

    /// The flat row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the array, returning its flat values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Values per row.
    pub fn components(&self) -> u32 {
        self.components
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.values.len() / self.components as usize
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The unit of every value.
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// One row's values.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let c = self.components as usize;
        self.values.get(index * c..(index + 1) * c)
    }

    fn shape(&self) -> (usize, u32) {
        (self.rows(), self.components)
    }

    /// Convert to a compatible unit.
    pub fn to(&self, target: &Unit) -> Result<UnitArray, UnitError> {
        let factor = self.unit.factor_to(target)?;
        Ok(Self {
            values: self.values.iter().map(|v| v * factor).collect(),
            components: self.components,
            unit: target.clone(),
        })
    }

    /// Extract one column as a one-component array.
    pub fn component(&self, index: u32) -> Result<UnitArray, UnitError> {
        if index >= self.components {
            return Err(UnitError::ComponentOutOfRange {
                index,
                components: self.components,
            });
        }
        let values = self
            .values
            .chunks_exact(self.components as usize)
            .map(|row| row[index as usize])
            .collect();
        Ok(Self::scalar(values, self.unit.clone()))
    }

    /// Keep the rows for which `keep(row_index)` holds, in order.
    pub fn filter_rows(&self, mut keep: impl FnMut(usize) -> bool) -> UnitArray {
        let c = self.components as usize;
        let mut values = Vec::new();
        for (i, row) in self.values.chunks_exact(c).enumerate() {
            if keep(i) {
                values.extend_from_slice(row);
            }
        }
        Self {
            values,
            components: self.components,
            unit: self.unit.clone(),
        }
    }

    /// Multiply every value by a dimensionless factor.
    pub fn scale(&self, factor: f64) -> UnitArray {
        self.map(|v| v * factor)
    }

    /// Apply `f` to every value, keeping the unit.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> UnitArray {
        Self {
            values: self.values.iter().map(|&v| f(v)).collect(),
            components: self.components,
            unit: self.unit.clone(),
        }
    }

    /// Elementwise product; units multiply.
    pub fn mul(&self, other: &UnitArray) -> Result<UnitArray, UnitError> {
        let unit = self.unit.mul(&other.unit)?;
        self.zip_with(other, unit, |a, b| a * b)
    }

    /// Elementwise quotient; units divide.
    pub fn div(&self, other: &UnitArray) -> Result<UnitArray, UnitError> {
        let unit = self.unit.div(&other.unit)?;
        self.zip_with(other, unit, |a, b| a / b)
    }

    /// Elementwise sum in `self`'s unit. Dimensions must match.
    pub fn add(&self, other: &UnitArray) -> Result<UnitArray, UnitError> {
        let other = other.to(&self.unit)?;
        self.zip_with(&other, self.unit.clone(), |a, b| a + b)
    }

    /// Elementwise difference in `self`'s unit. Dimensions must match.
    pub fn sub(&self, other: &UnitArray) -> Result<UnitArray, UnitError> {
        let other = other.to(&self.unit)?;
        self.zip_with(&other, self.unit.clone(), |a, b| a - b)
    }

    fn zip_with(
        &self,
        other: &UnitArray,
        unit: Unit,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<UnitArray, UnitError> {
        if self.rows() != other.rows() {
            return Err(UnitError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        let values: Vec<f64> = match (self.components, other.components) {
            (a, b) if a == b => self
                .values
                .iter()
                .zip(&other.values)
                .map(|(&x, &y)| f(x, y))
                .collect(),
            (a, 1) => self
                .values
                .chunks_exact(a as usize)
                .zip(&other.values)
                .flat_map(|(row, &y)| row.iter().map(move |&x| (x, y)))
                .map(|(x, y)| f(x, y))
                .collect(),
            (1, b) => other
                .values
                .chunks_exact(b as usize)
                .zip(&self.values)
                .flat_map(|(row, &x)| row.iter().map(move |&y| (x, y)))
                .map(|(x, y)| f(x, y))
                .collect(),
            _ => {
                return Err(UnitError::ShapeMismatch {
                    left: self.shape(),
                    right: other.shape(),
                })
            }
        };
        let components = self.components.max(other.components);
        Ok(Self {
            values,
            components,
            unit,
        })
    }

    /// Concatenate arrays row-wise, converting each part to the first part's unit.
    ///
    /// Fails on an empty input, on differing component counts, and on
    /// units whose dimensions differ.
    pub fn concat(parts: Vec<UnitArray>) -> Result<UnitArray, UnitError> {
        let mut iter = parts.into_iter();
        let mut acc = iter.next().ok_or(UnitError::EmptyConcat)?;
        for part in iter {
            if part.components != acc.components {
                return Err(UnitError::ShapeMismatch {
                    left: acc.shape(),
                    right: part.shape(),
                });
            }
            let factor = part.unit.factor_to(&acc.unit)?;
            if factor == 1.0 {
                acc.values.extend(part.values);
            } else {
                acc.values.extend(part.values.into_iter().map(|v| v * factor));
            }
        }
        Ok(acc)
    }
}

/// A single value with a unit, used for header attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    /// Create a quantity.
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// The numeric value in [`unit`](Self::unit).
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The unit.
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Convert to a compatible unit.
    pub fn to(&self, target: &Unit) -> Result<Quantity, UnitError> {
        Ok(Self::new(self.value * self.unit.factor_to(target)?, target.clone()))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.label().is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}
