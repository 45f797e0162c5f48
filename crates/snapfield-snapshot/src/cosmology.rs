//! Lambda-CDM cosmic age.

/// Hubble time in Gyr for H0 = 1 km/s/Mpc.
const HUBBLE_TIME_GYR: f64 = 977.792_221_680_789_1;

/// Simpson intervals for the age integral (must be even).
const INTERVALS: usize = 512;

/// A matter plus cosmological-constant universe, curvature allowed.
///
/// Radiation is neglected. Built from header fields on demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LambdaCdm {
    h0: f64,
    omega_m: f64,
    omega_de: f64,
}

impl LambdaCdm {
    /// `h0` in km/s/Mpc; `omega_m` and `omega_de` at z = 0.
    pub fn new(h0: f64, omega_m: f64, omega_de: f64) -> Self {
        Self {
            h0,
            omega_m,
            omega_de,
        }
    }

    /// Hubble constant in km/s/Mpc.
    pub fn h0(&self) -> f64 {
        self.h0
    }

    /// Matter density parameter.
    pub fn omega_m(&self) -> f64 {
        self.omega_m
    }

    /// Dark energy density parameter.
    pub fn omega_de(&self) -> f64 {
        self.omega_de
    }

    /// Curvature density parameter, `1 - omega_m - omega_de`.
    pub fn omega_k(&self) -> f64 {
        1.0 - self.omega_m - self.omega_de
    }

    /// `1 / H0` in Gyr.
    pub fn hubble_time(&self) -> f64 {
        HUBBLE_TIME_GYR / self.h0
    }

    /// Age of the universe at redshift `z`, in Gyr.
    pub fn age(&self, z: f64) -> f64 {
        self.age_at_scale_factor(1.0 / (1.0 + z))
    }

    /// Age of the universe at scale factor `a`, in Gyr. Zero for `a <= 0`.
    ///
    /// Integrates `dt = da / (a H(a))` with the substitution `a = u²`, which
    /// removes the square-root cusp at `a = 0`.
    pub fn age_at_scale_factor(&self, a: f64) -> f64 {
        if a <= 0.0 {
            return 0.0;
        }
        let ok = self.omega_k();
        let integrand = |u: f64| {
            if u == 0.0 {
                return 0.0;
            }
            let u2 = u * u;
            2.0 * u2 / (self.omega_m + ok * u2 + self.omega_de * u2 * u2 * u2).sqrt()
        };
        self.hubble_time() * simpson(integrand, 0.0, a.sqrt(), INTERVALS)
    }
}

fn simpson(f: impl Fn(f64) -> f64, lo: f64, hi: f64, n: usize) -> f64 {
    let h = (hi - lo) / n as f64;
    let mut acc = f(lo) + f(hi);
    for i in 1..n {
        let x = lo + i as f64 * h;
        acc += if i % 2 == 1 { 4.0 * f(x) } else { 2.0 * f(x) };
    }
    acc * h / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn einstein_de_sitter_closed_form() {
        let c = LambdaCdm::new(70.0, 1.0, 0.0);
        for z in [0.0, 0.5, 3.0, 10.0] {
            let expected = 2.0 / 3.0 * c.hubble_time() / (1.0f64 + z).powf(1.5);
            assert!((c.age(z) - expected).abs() < 1e-9, "z = {z}");
        }
    }

    #[test]
    fn flat_lambda_closed_form() {
        let (om, ol) = (0.3, 0.7);
        let c = LambdaCdm::new(70.0, om, ol);
        for z in [0.0, 1.0, 6.0] {
            let a: f64 = 1.0 / (1.0 + z);
            let expected = 2.0 / (3.0 * ol.sqrt())
                * ((ol / om).sqrt() * a.powf(1.5)).asinh()
                * c.hubble_time();
            assert!((c.age(z) - expected).abs() < 1e-6, "z = {z}");
        }
        assert!((c.age(0.0) - 13.467).abs() < 1e-2);
    }

    #[test]
    fn age_grows_with_scale_factor() {
        let c = LambdaCdm::new(67.7, 0.31, 0.69);
        assert_eq!(c.age_at_scale_factor(0.0), 0.0);
        assert_eq!(c.age_at_scale_factor(-1.0), 0.0);
        let mut last = 0.0;
        for i in 1..=10 {
            let t = c.age_at_scale_factor(i as f64 / 10.0);
            assert!(t > last);
            last = t;
        }
    }
}
