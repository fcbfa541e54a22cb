//! Splitting of hills at intensity valleys and removal of noise hills.

use tracing::debug;

use crate::models::{
    Centroid,
    CentroidRef,
    Hill,
};
use crate::utils::smoothing::smooth;

/// Local minima of a trace, tolerating plateaus of up to three points.
///
/// Only positions `2..len-2` are considered, so both sides of a minimum
/// always hold at least two points.
pub fn find_minima(y: &[f64]) -> Vec<usize> {
    let mut minima = Vec::new();
    for i in 2..y.len().saturating_sub(2) {
        let v = y[i];
        let is_min = (y[i - 1] > v && y[i + 1] > v)
            || (y[i - 1] > v && y[i + 1] == v && y[i + 2] > v)
            || (y[i - 2] > v && y[i - 1] == v && y[i + 1] > v)
            || (y[i - 2] > v && y[i - 1] == v && y[i + 1] == v && y[i + 2] > v);
        if is_min {
            minima.push(i);
        }
    }
    minima
}

fn max_of(y: &[f64]) -> f64 {
    y.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

// Splits at the deepest qualifying minimum and recurses on both halves,
// reusing the slices of the smoothed trace.
fn split_recursive(
    hill: &[CentroidRef],
    y_smooth: &[f64],
    split_level: f64,
    out: &mut Vec<Hill>,
) {
    let mut minima = find_minima(y_smooth);
    minima.sort_by(|&a, &b| y_smooth[a].total_cmp(&y_smooth[b]));

    for minpos in minima {
        let mut minval = y_smooth[minpos];
        if minval == 0.0 {
            minval = f64::EPSILON;
        }
        let lower_max = max_of(&y_smooth[..minpos]).min(max_of(&y_smooth[minpos..]));
        if lower_max / minval > split_level {
            split_recursive(&hill[..minpos], &y_smooth[..minpos], split_level, out);
            split_recursive(&hill[minpos..], &y_smooth[minpos..], split_level, out);
            return;
        }
    }
    out.push(Hill::new(hill.to_vec()));
}

/// Splits a hill at every valley deeper than `split_level`.
///
/// Always returns at least one hill, the input itself if no valley
/// qualifies.
pub fn split_hill(
    hill: &Hill,
    centroids: &[Vec<Centroid>],
    smoothing_window: usize,
    split_level: f64,
) -> Vec<Hill> {
    let y_smooth = smooth(&hill.intensities(centroids), smoothing_window);
    let mut out = Vec::new();
    split_recursive(&hill.centroids, &y_smooth, split_level, &mut out);
    out
}

/// Splits every hill, longest results first.
pub fn split_hills(
    hills: &[Hill],
    centroids: &[Vec<Centroid>],
    smoothing_window: usize,
    split_level: f64,
) -> Vec<Hill> {
    let mut out: Vec<Hill> = hills
        .iter()
        .flat_map(|h| split_hill(h, centroids, smoothing_window, split_level))
        .collect();
    out.sort_by(|a, b| b.len().cmp(&a.len()));
    debug!("Split {} hills into {}", hills.len(), out.len());
    out
}

/// Parameters of the hill filter.
#[derive(Debug, Clone, Copy)]
pub struct HillFilterParams {
    pub min_hill_length: usize,
    pub hill_peak_min_length: usize,
    pub hill_peak_factor: f64,
    pub smoothing_window: usize,
}

/// Whether a hill looks like an elution peak.
///
/// Hills shorter than `hill_peak_min_length` are trusted as they are,
/// longer ones must rise `hill_peak_factor` times above both ends.
pub fn keep_hill(hill: &Hill, centroids: &[Vec<Centroid>], params: &HillFilterParams) -> bool {
    if hill.len() < params.min_hill_length {
        return false;
    }
    if hill.len() < params.hill_peak_min_length {
        return true;
    }
    let y_smooth = smooth(&hill.intensities(centroids), params.smoothing_window);
    let (Some(&first), Some(&last)) = (y_smooth.first(), y_smooth.last()) else {
        return false;
    };
    let apex = max_of(&y_smooth);
    apex > params.hill_peak_factor * first && apex > params.hill_peak_factor * last
}

pub fn filter_hills(
    hills: Vec<Hill>,
    centroids: &[Vec<Centroid>],
    params: &HillFilterParams,
) -> Vec<Hill> {
    let n_in = hills.len();
    let out: Vec<Hill> = hills
        .into_iter()
        .filter(|h| keep_hill(h, centroids, params))
        .collect();
    debug!("Kept {} of {} hills after filtering", out.len(), n_in);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hill(intensities: &[f64]) -> (Hill, Vec<Vec<Centroid>>) {
        let centroids: Vec<Vec<Centroid>> = intensities
            .iter()
            .enumerate()
            .map(|(i, &intensity)| {
                vec![Centroid {
                    mz: 500.0,
                    intensity,
                    scan_index: i as u32,
                    retention_time: i as f64,
                }]
            })
            .collect();
        let hill = Hill::new(
            (0..intensities.len() as u32)
                .map(|i| CentroidRef::new(i, 0))
                .collect(),
        );
        (hill, centroids)
    }

    #[test]
    fn test_minima() {
        assert_eq!(find_minima(&[5.0, 4.0, 3.0, 4.0, 5.0]), vec![2]);
        // Plateau of two equal values, both ends are reported.
        assert_eq!(find_minima(&[5.0, 4.0, 3.0, 3.0, 4.0, 5.0]), vec![2, 3]);
        // Plateau of three, only the middle qualifies.
        assert_eq!(
            find_minima(&[5.0, 4.0, 3.0, 3.0, 3.0, 4.0, 5.0]),
            vec![3]
        );
        assert!(find_minima(&[1.0, 0.0, 1.0]).is_empty());
    }

    #[test]
    fn test_split_two_peaks() {
        let ints = [1.0, 3.0, 6.0, 9.0, 6.0, 3.0, 1.0, 3.0, 6.0, 9.0, 6.0, 3.0, 1.0];
        let (hill, centroids) = make_hill(&ints);
        let parts = split_hills(&[hill], &centroids, 1, 1.3);
        assert_eq!(parts.len(), 2);
        // Longest first.
        assert_eq!(parts[0].len(), 7);
        assert_eq!(parts[0].centroids[0].scan, 6);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[1].centroids[0].scan, 0);
    }

    #[test]
    fn test_split_is_idempotent() {
        let ints = [1.0, 3.0, 6.0, 9.0, 6.0, 3.0, 1.0, 3.0, 6.0, 9.0, 6.0, 3.0, 1.0];
        let (hill, centroids) = make_hill(&ints);
        let parts = split_hill(&hill, &centroids, 1, 1.3);
        for part in parts {
            let again = split_hill(&part, &centroids, 1, 1.3);
            assert_eq!(again, vec![part]);
        }
    }

    #[test]
    fn test_shallow_valley_is_not_split() {
        let ints = [1.0, 3.0, 6.0, 9.0, 8.0, 8.5, 9.0, 6.0, 3.0, 1.0];
        let (hill, centroids) = make_hill(&ints);
        let parts = split_hill(&hill, &centroids, 1, 1.3);
        assert_eq!(parts, vec![hill]);
    }

    #[test]
    fn test_filter() {
        let params = HillFilterParams {
            min_hill_length: 3,
            hill_peak_min_length: 40,
            hill_peak_factor: 2.0,
            smoothing_window: 1,
        };

        let (short, c) = make_hill(&[1.0, 2.0]);
        assert!(!keep_hill(&short, &c, &params));

        let (flat_medium, c) = make_hill(&[100.0; 10]);
        assert!(keep_hill(&flat_medium, &c, &params));

        let (flat_long, c) = make_hill(&[100.0; 50]);
        assert!(!keep_hill(&flat_long, &c, &params));

        let peaked: Vec<f64> = (0..50)
            .map(|i| 1000.0 * (-((i as f64 - 25.0).powi(2)) / 50.0).exp())
            .collect();
        let (peaked_long, c) = make_hill(&peaked);
        assert!(keep_hill(&peaked_long, &c, &params));
    }
}
