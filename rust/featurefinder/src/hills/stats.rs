//! Summary statistics of hills and their canonical ordering.

use rand::{
    Rng,
    SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::models::{
    Centroid,
    Hill,
    HillData,
    HillStats,
    SortedHills,
};

fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return values.iter().sum::<f64>() / values.len() as f64;
    }
    values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total
}

/// Bootstrapped intensity-weighted m/z of a hill.
///
/// Draws `min(len, nboot_max)` points with replacement, `nboot` times, and
/// returns the mean and sample standard deviation of the draws. A spread
/// that is zero or undefined is reported as `f64::EPSILON` so it can be
/// used as a tolerance later on.
pub fn bootstrap_mz(
    mz: &[f64],
    intensity: &[f64],
    nboot: usize,
    nboot_max: usize,
    rng: &mut impl Rng,
) -> (f64, f64) {
    debug_assert!(!mz.is_empty());
    let bootsize = mz.len().min(nboot_max);
    let mut boot_mz = Vec::with_capacity(bootsize);
    let mut boot_int = Vec::with_capacity(bootsize);

    let mut averages = Vec::with_capacity(nboot);
    for _ in 0..nboot {
        boot_mz.clear();
        boot_int.clear();
        for _ in 0..bootsize {
            let idx = rng.gen_range(0..mz.len());
            boot_mz.push(mz[idx]);
            boot_int.push(intensity[idx]);
        }
        averages.push(weighted_mean(&boot_mz, &boot_int));
    }

    let mean = averages.iter().sum::<f64>() / nboot as f64;
    let error = if nboot > 1 {
        let ss: f64 = averages.iter().map(|x| (x - mean).powi(2)).sum();
        (ss / (nboot - 1) as f64).sqrt()
    } else {
        0.0
    };

    if error > 0.0 && error.is_finite() {
        (mean, error)
    } else {
        (mean, f64::EPSILON)
    }
}

pub fn hill_stats(data: &HillData, nboot: usize, nboot_max: usize, rng: &mut impl Rng) -> HillStats {
    let (mz_avg, mz_error) = bootstrap_mz(&data.mz, &data.intensity, nboot, nboot_max, rng);
    let rts = data.retention_time.iter().copied();
    HillStats {
        mz_avg,
        mz_error,
        rt_min: rts.clone().fold(f64::INFINITY, f64::min),
        rt_max: rts.fold(f64::NEG_INFINITY, f64::max),
        intensity_sum: data.intensity.iter().sum(),
        intensity_apex: data.intensity.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Computes the statistics of every hill and sorts all three collections
/// by `rt_min`.
///
/// Bootstrap draws come from a single generator seeded with `seed`, so the
/// output is reproducible for a given input.
pub fn compute_sorted_hills(
    hills: Vec<Hill>,
    centroids: &[Vec<Centroid>],
    nboot: usize,
    nboot_max: usize,
    seed: u64,
) -> SortedHills {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows: Vec<(Hill, HillStats, HillData)> = hills
        .into_iter()
        .filter(|h| !h.is_empty())
        .map(|hill| {
            let data = HillData::from_hill(&hill, centroids);
            let stats = hill_stats(&data, nboot, nboot_max, &mut rng);
            (hill, stats, data)
        })
        .collect();

    rows.sort_by(|a, b| a.1.rt_min.total_cmp(&b.1.rt_min));

    let mut out = SortedHills {
        hills: Vec::with_capacity(rows.len()),
        stats: Vec::with_capacity(rows.len()),
        data: Vec::with_capacity(rows.len()),
    };
    for (hill, stats, data) in rows {
        out.hills.push(hill);
        out.stats.push(stats);
        out.data.push(data);
    }
    debug!("Computed statistics for {} hills", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CentroidRef;

    fn hill_at(mz: f64, first_scan: u32, ints: &[f64], centroids: &mut Vec<Vec<Centroid>>) -> Hill {
        let mut refs = Vec::new();
        for (k, &intensity) in ints.iter().enumerate() {
            let scan = first_scan + k as u32;
            while centroids.len() <= scan as usize {
                centroids.push(Vec::new());
            }
            let position = centroids[scan as usize].len() as u32;
            centroids[scan as usize].push(Centroid {
                mz: mz + k as f64 * 1e-4,
                intensity,
                scan_index: scan,
                retention_time: scan as f64 * 0.5,
            });
            refs.push(CentroidRef::new(scan, position));
        }
        Hill::new(refs)
    }

    #[test]
    fn test_constant_mz_has_epsilon_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (avg, err) = bootstrap_mz(&[500.0; 5], &[1.0, 2.0, 3.0, 2.0, 1.0], 20, 300, &mut rng);
        assert!((avg - 500.0).abs() < 1e-9);
        assert_eq!(err, f64::EPSILON);
    }

    #[test]
    fn test_single_boot_has_epsilon_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (_, err) = bootstrap_mz(&[500.0, 500.1], &[1.0, 1.0], 1, 300, &mut rng);
        assert_eq!(err, f64::EPSILON);
    }

    #[test]
    fn test_zero_weights_use_plain_mean() {
        assert_eq!(weighted_mean(&[1.0, 3.0], &[0.0, 0.0]), 2.0);
        assert_eq!(weighted_mean(&[1.0, 3.0], &[1.0, 3.0]), 2.5);
    }

    #[test]
    fn test_bootstrap_stays_within_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mz = [500.0, 500.001, 500.002, 500.003];
        let (avg, err) = bootstrap_mz(&mz, &[1.0, 5.0, 5.0, 1.0], 150, 300, &mut rng);
        assert!(avg > 500.0 && avg < 500.003);
        assert!(err > 0.0 && err < 0.003);
    }

    #[test]
    fn test_sorted_by_rt_min_and_reproducible() {
        let mut centroids = Vec::new();
        let late = hill_at(600.0, 10, &[1.0, 4.0, 2.0], &mut centroids);
        let early = hill_at(700.0, 2, &[3.0, 9.0, 3.0, 1.0], &mut centroids);

        let sorted = compute_sorted_hills(
            vec![late.clone(), early.clone()],
            &centroids,
            50,
            300,
            42,
        );
        assert_eq!(sorted.hills, vec![early, late]);
        assert_eq!(sorted.stats[0].rt_min, 1.0);
        assert_eq!(sorted.stats[0].rt_max, 2.5);
        assert_eq!(sorted.stats[0].intensity_sum, 16.0);
        assert_eq!(sorted.stats[0].intensity_apex, 9.0);
        assert_eq!(sorted.data[1].scan_index, vec![10, 11, 12]);

        let first = compute_sorted_hills(sorted.hills.clone(), &centroids, 50, 300, 42);
        let second = compute_sorted_hills(sorted.hills.clone(), &centroids, 50, 300, 42);
        assert_eq!(first.stats, second.stats);
    }
}
