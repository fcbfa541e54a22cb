/// Mass difference between consecutive isotopologues of a peptide, the
/// averagine-weighted mix of the 13C and other heavy isotope shifts.
pub const NEUTRON_DELTA_MASS: f64 = 1.00286864;

/// Spread of the isotope spacing around [NEUTRON_DELTA_MASS].
pub const ISOTOPE_STD_TOL: f64 = 0.0109135;

pub const M_PROTON: f64 = 1.00727646687;
pub const M_HYDROGEN: f64 = 1.00782503223;
