//! Extraction of charge-consistent isotope patterns from pre-patterns.
//!
//! Inside a pre-pattern every hill, in order of decreasing intensity, is
//! used as a seed to grow an isotope trail for every charge. The longest
//! trail that still looks like an averagine envelope wins, is removed, and
//! the search restarts on the remaining hills.

use std::collections::VecDeque;

use tracing::debug;

use crate::constants::{
    ISOTOPE_STD_TOL,
    NEUTRON_DELTA_MASS,
};
use crate::isotopes::{
    averagine_envelope,
    check_isotope_pattern_directed,
    mz_to_mass,
};
use crate::models::{
    IsotopePattern,
    SortedHills,
};
use crate::utils::correlation::{
    aligned_cosine,
    elution_cosine,
};

#[derive(Debug, Clone)]
pub struct IsolatorParams {
    /// Charges to test, ascending.
    pub charges: Vec<u8>,
    pub isotope_mass_range: f64,
    pub trail_cc_cutoff: f64,
    pub averagine_cc_cutoff: f64,
    pub iso_split_level: f64,
    pub seed_masses: usize,
    pub low_mass_cutoff: f64,
    pub min_profile_overlap: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Lighter,
    Heavier,
}

impl Direction {
    fn step(&self) -> isize {
        match self {
            Direction::Lighter => -1,
            Direction::Heavier => 1,
        }
    }
}

fn hill_cosine(hills: &SortedHills, a: usize, b: usize, min_overlap: u32) -> f64 {
    let (a, b) = (&hills.data[a], &hills.data[b]);
    elution_cosine(
        &a.scan_index,
        &a.intensity,
        &b.scan_index,
        &b.intensity,
        min_overlap,
    )
}

// Walks away from the seed over the mass sorted `pattern`, collecting one
// hill per isotope step until the mass gap cannot be closed anymore.
fn grow(
    trail: &mut VecDeque<usize>,
    seed: usize,
    direction: Direction,
    pattern: &[usize],
    hills: &SortedHills,
    charge: u8,
    params: &IsolatorParams,
) {
    let x = pattern[seed];
    let s1 = &hills.stats[x];
    let mut k: i32 = 1;
    let mut pos = seed as isize + direction.step();

    while pos >= 0 && (pos as usize) < pattern.len() {
        let y = pattern[pos as usize];
        let s2 = &hills.stats[y];

        if hill_cosine(hills, x, y, params.min_profile_overlap) > params.trail_cc_cutoff
            && check_isotope_pattern_directed(
                s1.mz_avg,
                s2.mz_avg,
                s1.mz_error,
                s2.mz_error,
                charge,
                -(direction.step() as i32) * k,
                params.isotope_mass_range,
            )
        {
            match direction {
                Direction::Lighter => trail.push_front(y),
                Direction::Heavier => trail.push_back(y),
            }
            k += 1;
        }

        if (s1.mz_avg - s2.mz_avg).abs() > (NEUTRON_DELTA_MASS + ISOTOPE_STD_TOL) * k as f64 {
            break;
        }
        pos += direction.step();
    }
}

/// Isotope trail of a seed at one charge, in increasing mass order.
///
/// `seed` is a position within `pattern`, which must be sorted by m/z.
pub fn grow_trail(
    seed: usize,
    pattern: &[usize],
    hills: &SortedHills,
    charge: u8,
    params: &IsolatorParams,
) -> Vec<usize> {
    let mut trail = VecDeque::from([pattern[seed]]);
    grow(&mut trail, seed, Direction::Lighter, pattern, hills, charge, params);
    grow(&mut trail, seed, Direction::Heavier, pattern, hills, charge, params);
    trail.into()
}

/// Strict local minima whose lower surrounding maximum is more than
/// `split` times deeper.
pub fn get_minpos(y: &[f64], split: f64) -> Vec<usize> {
    let max_of = |s: &[f64]| s.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (1..y.len().saturating_sub(1))
        .filter(|&i| y[i - 1] > y[i] && y[i + 1] > y[i])
        .filter(|&i| max_of(&y[..i]).min(max_of(&y[i..])) > split * y[i])
        .collect()
}

/// Range of the trail kept around the seed: from the closest qualifying
/// minimum on its left to the closest one on its right, both included.
pub fn truncate(profile: &[f64], seedpos: usize, split: f64) -> std::ops::Range<usize> {
    let minima = get_minpos(profile, split);
    let start = minima
        .iter()
        .rev()
        .find(|&&m| m < seedpos)
        .copied()
        .unwrap_or(0);
    let end = minima
        .iter()
        .find(|&&m| m > seedpos)
        .map(|&m| m + 1)
        .unwrap_or(profile.len());
    start..end
}

/// Cosine similarity between a trail, read as neutral masses at `charge`,
/// and the averagine envelope starting at its lightest mass.
pub fn check_averagine(hills: &SortedHills, trail: &[usize], charge: u8) -> f64 {
    let mut observed: Vec<(f64, f64)> = trail
        .iter()
        .map(|&i| {
            let s = &hills.stats[i];
            (mz_to_mass(s.mz_avg, charge), s.intensity_sum)
        })
        .collect();
    observed.sort_by(|a, b| a.0.total_cmp(&b.0));
    let Some(&(mono, _)) = observed.first() else {
        return 0.0;
    };

    let (theo_masses, theo_ints) = averagine_envelope(mono);
    let obs_bins: Vec<i64> = observed.iter().map(|x| x.0.floor() as i64).collect();
    let obs_ints: Vec<f64> = observed.iter().map(|x| x.1).collect();
    let theo_bins: Vec<i64> = theo_masses.iter().map(|m| m.floor() as i64).collect();

    aligned_cosine(&obs_bins, &obs_ints, &theo_bins, &theo_ints)
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Best isotope pattern of a pre-pattern, if any trail passes the
/// averagine check.
pub fn isolate_isotope_pattern(
    pre_pattern: &[usize],
    hills: &SortedHills,
    params: &IsolatorParams,
) -> Option<IsotopePattern> {
    let mut sorted = pre_pattern.to_vec();
    sorted.sort_by(|&a, &b| hills.stats[a].mz_avg.total_cmp(&hills.stats[b].mz_avg));

    let mut seeds: Vec<usize> = (0..sorted.len()).collect();
    seeds.sort_by(|&a, &b| {
        hills.stats[sorted[b]]
            .intensity_sum
            .total_cmp(&hills.stats[sorted[a]].intensity_sum)
    });
    seeds.truncate(params.seed_masses);

    let mut champion: Option<IsotopePattern> = None;
    let mut longest = 0;

    for seed in seeds {
        let seed_hill = sorted[seed];
        let seed_mz = hills.stats[seed_hill].mz_avg;

        for &charge in params.charges.iter() {
            let trail = grow_trail(seed, &sorted, hills, charge, params);
            if trail.len() <= longest {
                continue;
            }

            let profile: Vec<f64> = trail
                .iter()
                .map(|&i| hills.stats[i].intensity_sum)
                .collect();
            let seedpos = trail.iter().position(|&i| i == seed_hill).unwrap_or(0);
            let range = truncate(&profile, seedpos, params.iso_split_level);
            let mut kept = &trail[range.clone()];

            if charge as f64 * seed_mz < params.low_mass_cutoff {
                kept = &kept[argmax(&profile[range])..];
            }

            if kept.len() > longest
                && check_averagine(hills, kept, charge) > params.averagine_cc_cutoff
            {
                longest = kept.len();
                champion = Some(IsotopePattern {
                    hills: kept.to_vec(),
                    charge,
                });
            }
        }
    }
    champion
}

/// Repeatedly isolates patterns from every pre-pattern until fewer than
/// two hills remain or nothing longer than a single hill is found.
pub fn get_isotope_patterns(
    pre_patterns: &[Vec<usize>],
    hills: &SortedHills,
    params: &IsolatorParams,
) -> Vec<IsotopePattern> {
    let mut out = Vec::new();
    for pre_pattern in pre_patterns {
        let mut remaining = pre_pattern.clone();
        while remaining.len() > 1 {
            match isolate_isotope_pattern(&remaining, hills, params) {
                Some(pattern) if pattern.len() > 1 => {
                    remaining.retain(|i| !pattern.hills.contains(i));
                    out.push(pattern);
                }
                _ => break,
            }
        }
    }
    debug!(
        "Isolated {} isotope patterns from {} pre-patterns",
        out.len(),
        pre_patterns.len()
    );
    out
}
