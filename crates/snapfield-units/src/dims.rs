//! Physical dimensions as integer exponents over SI base quantities.

use std::fmt;

/// Exponents of length, mass, time, temperature and electric current.
///
/// Magnetic fields are expressed through the current dimension (SI), which
/// keeps every exponent integral; gauss is `1e-4 kg A^-1 s^-2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Length exponent.
    pub length: i8,
    /// Mass exponent.
    pub mass: i8,
    /// Time exponent.
    pub time: i8,
    /// Temperature exponent.
    pub temperature: i8,
    /// Electric current exponent.
    pub current: i8,
}

impl Dimensions {
    /// No dimensions.
    pub const DIMENSIONLESS: Self = Self::new(0, 0, 0, 0, 0);
    /// Length.
    pub const LENGTH: Self = Self::new(1, 0, 0, 0, 0);
    /// Mass.
    pub const MASS: Self = Self::new(0, 1, 0, 0, 0);
    /// Time.
    pub const TIME: Self = Self::new(0, 0, 1, 0, 0);
    /// Temperature.
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1, 0);
    /// Electric current.
    pub const CURRENT: Self = Self::new(0, 0, 0, 0, 1);

    /// Build from explicit exponents.
    pub const fn new(length: i8, mass: i8, time: i8, temperature: i8, current: i8) -> Self {
        Self {
            length,
            mass,
            time,
            temperature,
            current,
        }
    }

    /// Whether every exponent is zero.
    pub fn is_dimensionless(self) -> bool {
        self == Self::DIMENSIONLESS
    }

    /// Raise to an integer power, or `None` if an exponent leaves `i8`.
    pub fn checked_powi(self, n: i8) -> Option<Self> {
        self.zip_map(self, |a, _| a.checked_mul(n))
    }

    /// Product of two dimensions, or `None` if an exponent leaves `i8`.
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        self.zip_map(rhs, i8::checked_add)
    }

    /// Quotient of two dimensions, or `None` if an exponent leaves `i8`.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        self.zip_map(rhs, i8::checked_sub)
    }

    fn zip_map(self, rhs: Self, f: impl Fn(i8, i8) -> Option<i8>) -> Option<Self> {
        Some(Self::new(
            f(self.length, rhs.length)?,
            f(self.mass, rhs.mass)?,
            f(self.time, rhs.time)?,
            f(self.temperature, rhs.temperature)?,
            f(self.current, rhs.current)?,
        ))
    }

    fn exponents(self) -> [(&'static str, i8); 5] {
        [
            ("L", self.length),
            ("M", self.mass),
            ("T", self.time),
            ("K", self.temperature),
            ("I", self.current),
        ]
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }
        let mut first = true;
        for (symbol, exp) in self.exponents() {
            if exp == 0 {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            if exp == 1 {
                write!(f, "{symbol}")?;
            } else {
                write!(f, "{symbol}^{exp}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_dimensions() {
        let volume = Dimensions::LENGTH.checked_powi(3).unwrap();
        let rho = Dimensions::MASS.checked_div(volume).unwrap();
        assert_eq!(rho, Dimensions::new(-3, 1, 0, 0, 0));
        assert_eq!(rho.to_string(), "L^-3 M");
    }

    #[test]
    fn quotient_of_equal_dimensions_is_dimensionless() {
        let v = Dimensions::LENGTH.checked_div(Dimensions::TIME).unwrap();
        assert!(v.checked_div(v).unwrap().is_dimensionless());
        assert_eq!(Dimensions::DIMENSIONLESS.to_string(), "1");
    }

    #[test]
    fn exponent_overflow_is_none() {
        let big = Dimensions::new(100, 0, 0, 0, 0);
        assert_eq!(big.checked_mul(big), None);
        assert_eq!(big.checked_powi(2), None);
        assert_eq!(Dimensions::new(0, i8::MIN, 0, 0, 0).checked_powi(-1), None);
        assert_eq!(Dimensions::DIMENSIONLESS.checked_div(Dimensions::new(0, 0, i8::MIN, 0, 0)), None);
        assert_eq!(big.checked_div(big), Some(Dimensions::DIMENSIONLESS));
    }
}
