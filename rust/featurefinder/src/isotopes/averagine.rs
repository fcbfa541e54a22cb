//! Theoretical isotope envelopes from the averagine model.
//!
//! A peptide of a given mass is approximated by a multiple of the averagine
//! residue, whose element counts define the isotope envelope by convolving
//! the natural abundances of each element.

use crate::constants::{
    M_HYDROGEN,
    NEUTRON_DELTA_MASS,
};

/// Number of isotopes tracked while convolving.
const MAX_ISOTOPES: usize = 20;

/// Isotopes below this fraction of the most abundant one are cut off.
const MIN_RELATIVE_ABUNDANCE: f64 = 1e-3;

const AVERAGINE_RESIDUE_MASS: f64 = 111.1254;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    C,
    H,
    N,
    O,
    S,
}

/// Natural isotopes of an element.
#[derive(Debug, Clone, Copy)]
pub struct ElementIsotopes {
    pub monoisotopic_mass: f64,
    /// Relative abundances by nominal mass shift from the lightest isotope.
    pub abundances: &'static [f64],
}

impl Element {
    pub const ALL: [Element; 5] = [Element::C, Element::H, Element::N, Element::O, Element::S];

    pub const fn isotopes(&self) -> ElementIsotopes {
        match self {
            Element::C => ElementIsotopes {
                monoisotopic_mass: 12.0,
                abundances: &[0.9893, 0.0107, 0.0],
            },
            Element::H => ElementIsotopes {
                monoisotopic_mass: 1.007940,
                abundances: &[0.999885, 0.000115, 0.0],
            },
            Element::N => ElementIsotopes {
                monoisotopic_mass: 14.0030740052,
                abundances: &[0.99636, 0.00364],
            },
            Element::O => ElementIsotopes {
                monoisotopic_mass: 15.9949146221,
                abundances: &[0.99757, 0.00038, 0.00205],
            },
            Element::S => ElementIsotopes {
                monoisotopic_mass: 31.97207069,
                abundances: &[0.9499, 0.0075, 0.0425, 0.0001],
            },
        }
    }

    /// Atoms per averagine residue.
    const fn per_residue(&self) -> f64 {
        match self {
            Element::C => 4.9384,
            Element::H => 7.7583,
            Element::N => 1.3577,
            Element::O => 1.4773,
            Element::S => 0.0417,
        }
    }
}

/// Element counts of an averagine molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    pub counts: Vec<(Element, u32)>,
}

impl Formula {
    pub fn monoisotopic_mass(&self) -> f64 {
        self.counts
            .iter()
            .map(|(e, n)| e.isotopes().monoisotopic_mass * *n as f64)
            .sum()
    }

    pub fn count(&self, element: Element) -> u32 {
        self.counts
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Averagine formula closest to the given neutral mass.
///
/// Element counts are floored, then hydrogens are added to make up the
/// remaining mass.
pub fn averagine_formula(mass: f64) -> Formula {
    let residues = mass.max(0.0) / AVERAGINE_RESIDUE_MASS;
    let mut formula = Formula {
        counts: Element::ALL
            .iter()
            .map(|e| (*e, (e.per_residue() * residues).floor() as u32))
            .collect(),
    };
    let missing = mass - formula.monoisotopic_mass();
    let extra_h = (missing / M_HYDROGEN).round();
    for (e, n) in formula.counts.iter_mut() {
        if *e == Element::H {
            *n = (*n as f64 + extra_h).max(0.0) as u32;
        }
    }
    formula
}

fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    let len = (a.len() + b.len()).saturating_sub(1).min(MAX_ISOTOPES);
    let mut out = vec![0.0; len];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            if i + j < len {
                out[i + j] += x * y;
            }
        }
    }
    out
}

fn convolve_power(base: &[f64], mut exponent: u32) -> Vec<f64> {
    let mut result = vec![1.0];
    let mut base = base.to_vec();
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = convolve(&result, &base);
        }
        exponent >>= 1;
        if exponent > 0 {
            base = convolve(&base, &base);
        }
    }
    result
}

/// Isotope abundances of a formula by nominal mass shift, scaled to a
/// maximum of 1 and cut after the last isotope above
/// [MIN_RELATIVE_ABUNDANCE].
pub fn isotope_distribution(formula: &Formula) -> Vec<f64> {
    let mut dist = vec![1.0];
    for (element, n) in formula.counts.iter() {
        if *n > 0 {
            dist = convolve(&dist, &convolve_power(element.isotopes().abundances, *n));
        }
    }

    let max = dist.iter().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return vec![1.0];
    }
    let last = dist
        .iter()
        .rposition(|x| *x / max >= MIN_RELATIVE_ABUNDANCE)
        .unwrap_or(0);
    dist.truncate(last + 1);
    dist.iter_mut().for_each(|x| *x /= max);
    dist
}

/// Theoretical envelope `(masses, abundances)` of an averagine peptide
/// whose monoisotopic neutral mass is `mass`.
pub fn averagine_envelope(mass: f64) -> (Vec<f64>, Vec<f64>) {
    let abundances = isotope_distribution(&averagine_formula(mass));
    let masses = (0..abundances.len())
        .map(|k| mass + k as f64 * NEUTRON_DELTA_MASS)
        .collect();
    (masses, abundances)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_matches_mass() {
        for mass in [500.0, 1500.0, 3000.0] {
            let formula = averagine_formula(mass);
            assert!(
                (formula.monoisotopic_mass() - mass).abs() < 1.0,
                "{} vs {}",
                formula.monoisotopic_mass(),
                mass
            );
        }
        let formula = averagine_formula(1111.254);
        assert_eq!(formula.count(Element::C), 49);
        assert_eq!(formula.count(Element::N), 13);
        assert_eq!(formula.count(Element::O), 14);
        assert_eq!(formula.count(Element::S), 0);
    }

    #[test]
    fn test_convolve_power() {
        let res = convolve_power(&[0.5, 0.5], 3);
        assert_eq!(res, vec![0.125, 0.375, 0.375, 0.125]);
        assert_eq!(convolve_power(&[0.9, 0.1], 0), vec![1.0]);
    }

    #[test]
    fn test_envelope_shape() {
        // Small peptides are dominated by the monoisotopic peak.
        let (masses, small) = averagine_envelope(800.0);
        assert_eq!(masses[0], 800.0);
        assert_eq!(small[0], 1.0);
        assert!(small[1] > 0.3 && small[1] < 0.6, "{:?}", small);
        assert!(small[2] < small[1]);

        // Large ones peak later.
        let (_, large) = averagine_envelope(4000.0);
        let apex = large
            .iter()
            .enumerate()
            .fold((0, 0.0), |acc, (i, &x)| if x > acc.1 { (i, x) } else { acc })
            .0;
        assert!(apex >= 1);
        assert!(large.len() > small.len());
    }
}
