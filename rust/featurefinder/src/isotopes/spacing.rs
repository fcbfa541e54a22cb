//! Isotope spacing checks between hills.
//!
//! Two hills may be neighboring isotopologues at charge `c` if their m/z
//! differ by `NEUTRON_DELTA_MASS / c`, within a tolerance combining the
//! natural spread of the spacing and the m/z uncertainty of both hills.

use crate::constants::{
    ISOTOPE_STD_TOL,
    M_PROTON,
    NEUTRON_DELTA_MASS,
};

#[inline]
fn spacing_tolerance(error1: f64, error2: f64, charge: u8, mass_range: f64) -> f64 {
    let c = charge as f64;
    ((ISOTOPE_STD_TOL / c).powi(2) + (error1 * mass_range).powi(2) + (error2 * mass_range).powi(2))
        .sqrt()
}

/// Whether two m/z values are one isotope apart at the given charge, in
/// either direction.
///
/// # Example
///
/// ```
/// use featurefinder::isotopes::spacing::check_isotope_pattern;
///
/// assert!(check_isotope_pattern(500.0, 500.0 + 1.00286864 / 2.0, 0.0, 0.0, 2, 5.0));
/// assert!(!check_isotope_pattern(500.0, 505.0, 0.0, 0.0, 1, 5.0));
/// ```
pub fn check_isotope_pattern(
    mz1: f64,
    mz2: f64,
    error1: f64,
    error2: f64,
    charge: u8,
    mass_range: f64,
) -> bool {
    let lhs = ((mz1 - mz2).abs() - NEUTRON_DELTA_MASS / charge as f64).abs();
    lhs <= spacing_tolerance(error1, error2, charge, mass_range)
}

/// Whether `mz1 - mz2` is `index` isotopes apart at the given charge.
///
/// A negative `index` means `mz2` is the heavier of the two.
pub fn check_isotope_pattern_directed(
    mz1: f64,
    mz2: f64,
    error1: f64,
    error2: f64,
    charge: u8,
    index: i32,
    mass_range: f64,
) -> bool {
    let lhs = (mz1 - mz2 - index as f64 * NEUTRON_DELTA_MASS / charge as f64).abs();
    lhs <= spacing_tolerance(error1, error2, charge, mass_range)
}

/// Neutral mass of an ion.
pub fn mz_to_mass(mz: f64, charge: u8) -> f64 {
    let c = charge as f64;
    mz * c - c * M_PROTON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_isotope_apart_for_every_charge() {
        let m = 612.3;
        for charge in 1..=6u8 {
            let next = m + NEUTRON_DELTA_MASS / charge as f64;
            assert!(check_isotope_pattern(m, next, 0.0, 0.0, charge, 5.0));
            assert!(check_isotope_pattern(next, m, 0.0, 0.0, charge, 5.0));
        }
    }

    #[test]
    fn test_far_masses_rejected() {
        assert!(!check_isotope_pattern(612.3, 617.3, 0.0, 0.0, 1, 5.0));
    }

    #[test]
    fn test_wrong_charge_rejected() {
        let m = 612.3;
        let next = m + NEUTRON_DELTA_MASS / 2.0;
        assert!(!check_isotope_pattern(m, next, 0.0, 0.0, 1, 5.0));
        assert!(!check_isotope_pattern(m, next, 0.0, 0.0, 3, 5.0));
    }

    #[test]
    fn test_errors_widen_the_tolerance() {
        let m = 612.3;
        let off = m + NEUTRON_DELTA_MASS + 0.05;
        assert!(!check_isotope_pattern(m, off, 0.0, 0.0, 1, 5.0));
        assert!(check_isotope_pattern(m, off, 0.01, 0.01, 1, 5.0));
    }

    #[test]
    fn test_directed() {
        let m = 700.0;
        let heavier = m + 2.0 * NEUTRON_DELTA_MASS / 3.0;
        assert!(check_isotope_pattern_directed(m, heavier, 0.0, 0.0, 3, -2, 5.0));
        assert!(check_isotope_pattern_directed(heavier, m, 0.0, 0.0, 3, 2, 5.0));
        assert!(!check_isotope_pattern_directed(m, heavier, 0.0, 0.0, 3, 2, 5.0));
        assert!(!check_isotope_pattern_directed(m, heavier, 0.0, 0.0, 3, -1, 5.0));
    }

    #[test]
    fn test_mz_to_mass() {
        assert!((mz_to_mass(500.0 + M_PROTON, 1) - 500.0).abs() < 1e-9);
        assert!((mz_to_mass(250.0 + M_PROTON, 2) - 500.0).abs() < 1e-9);
    }
}
