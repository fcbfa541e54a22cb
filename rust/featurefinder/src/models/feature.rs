use serde::{
    Deserialize,
    Serialize,
};

/// A row of the feature table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub mz: f64,
    pub mz_std: f64,
    pub most_abundant_mz: f64,
    pub charge: u8,
    pub rt_start: f64,
    pub rt_apex: f64,
    pub rt_end: f64,
    pub fwhm: f64,
    pub n_isotopes: usize,
    pub n_scans: usize,
    pub neutral_mass: f64,
    pub intensity_apex: f64,
    pub intensity_sum: f64,
}

/// Sorts features by retention time start, then m/z.
pub fn sort_features(features: &mut [Feature]) {
    features.sort_by(|a, b| {
        a.rt_start
            .total_cmp(&b.rt_start)
            .then(a.mz.total_cmp(&b.mz))
    });
}
