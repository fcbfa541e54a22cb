//! Conversion of isotope patterns into feature table rows.

use std::collections::BTreeMap;

use crate::isotopes::mz_to_mass;
use crate::models::{
    Feature,
    IsotopePattern,
    SortedHills,
};
use crate::utils::smoothing::smooth;

fn first_argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn first_argmin_by_key(values: &[f64], key: impl Fn(f64) -> f64) -> usize {
    let mut best = 0;
    for i in 1..values.len() {
        if key(values[i]) < key(values[best]) {
            best = i;
        }
    }
    best
}

/// Full width at half maximum of an elution profile.
///
/// The profile is smoothed first, then the points closest to half the
/// apex on either side of it bound the width.
pub fn fwhm(retention_times: &[f64], intensities: &[f64], smoothing_window: usize) -> f64 {
    if intensities.is_empty() {
        return 0.0;
    }
    let smoothed = smooth(intensities, smoothing_window);
    let apex = first_argmax(&smoothed);
    let half = smoothed[apex] / 2.0;
    let distance = |x: f64| (x - half).abs();
    let left = first_argmin_by_key(&smoothed[..=apex], distance);
    let right = apex + first_argmin_by_key(&smoothed[apex..], distance);
    retention_times[right] - retention_times[left]
}

/// Describes one isotope pattern as a feature.
pub fn pattern_to_feature(
    pattern: &IsotopePattern,
    hills: &SortedHills,
    smoothing_window: usize,
) -> Option<Feature> {
    let mono = pattern.monoisotopic_hill()?;
    let mz = hills.stats[mono].mz_avg;

    let errors: Vec<f64> = pattern.hills.iter().map(|&i| hills.stats[i].mz_error).collect();
    let mean_error = errors.iter().sum::<f64>() / errors.len() as f64;
    let mz_std = (errors.iter().map(|e| (e - mean_error).powi(2)).sum::<f64>()
        / errors.len() as f64)
        .sqrt();

    let mut rt_start = f64::INFINITY;
    let mut rt_end = f64::NEG_INFINITY;
    let mut apex: Option<(f64, f64, f64)> = None;
    let mut intensity_sum = 0.0;
    // scan -> (summed intensity, retention time)
    let mut profile: BTreeMap<u32, (f64, f64)> = BTreeMap::new();

    for &h in pattern.hills.iter() {
        let data = &hills.data[h];
        for k in 0..data.len() {
            let (cmz, int, scan, rt) = (
                data.mz[k],
                data.intensity[k],
                data.scan_index[k],
                data.retention_time[k],
            );
            rt_start = rt_start.min(rt);
            rt_end = rt_end.max(rt);
            intensity_sum += int;
            if apex.map_or(true, |(best, _, _)| int > best) {
                apex = Some((int, rt, cmz));
            }
            let entry = profile.entry(scan).or_insert((0.0, rt));
            entry.0 += int;
        }
    }
    let (intensity_apex, rt_apex, most_abundant_mz) = apex?;

    let (profile_ints, profile_rts): (Vec<f64>, Vec<f64>) = profile.into_values().unzip();

    Some(Feature {
        mz,
        mz_std,
        most_abundant_mz,
        charge: pattern.charge,
        rt_start,
        rt_apex,
        rt_end,
        fwhm: fwhm(&profile_rts, &profile_ints, smoothing_window),
        n_isotopes: pattern.len(),
        n_scans: pattern
            .hills
            .iter()
            .map(|&i| hills.hills[i].len())
            .max()
            .unwrap_or(0),
        neutral_mass: mz_to_mass(mz, pattern.charge),
        intensity_apex,
        intensity_sum,
    })
}

/// One feature per isotope pattern, in pattern order.
pub fn feature_finder_report(
    patterns: &[IsotopePattern],
    hills: &SortedHills,
    smoothing_window: usize,
) -> Vec<Feature> {
    patterns
        .iter()
        .filter_map(|p| pattern_to_feature(p, hills, smoothing_window))
        .collect()
}
