//! Conversion of profile spectra into centroids.
//!
//! Peaks are found on the discrete gradient of the intensity trace. The
//! state machine tracks a `start` (last point of the preceding descent),
//! a `center` (last rising point) and an `end` (last falling point); a
//! peak is emitted when the trace stops falling after having risen.
//!
//! The m/z of each peak is then estimated from its points: a single point
//! is taken as-is, two points are averaged by intensity and wider peaks
//! use a three-point gaussian fit around the apex.

use tracing::debug;

use crate::models::{
    Centroid,
    Ms1Data,
};
use crate::pipeline::ProgressSink;

/// Bounds of a detected peak.
///
/// The peak spans the points `start + 1 ..= end - 1`, `start` and `end`
/// are the (excluded) boundary points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakBounds {
    pub start: usize,
    pub center: usize,
    pub end: usize,
}

impl PeakBounds {
    pub fn width(&self) -> usize {
        self.end - self.start - 1
    }
}

/// Finds the local maxima of an intensity trace.
pub fn find_peaks(intensity: &[f64]) -> Vec<PeakBounds> {
    let mut peaks = Vec::new();
    // Gradient positions, `start` may point before the first point.
    let mut start: isize = -1;
    let mut center: Option<usize> = None;
    let mut end: Option<usize> = None;

    let to_bounds = |start: isize, center: usize, end: usize| PeakBounds {
        start: (start + 1) as usize,
        center: center + 1,
        end: end + 1,
    };

    for (i, w) in intensity.windows(2).enumerate() {
        let grad = w[1] - w[0];

        if end.is_none() && center.is_none() {
            if grad <= 0.0 {
                start = i as isize;
            } else {
                center = Some(i);
            }
        }

        if end.is_none() && center.is_some() {
            if grad >= 0.0 {
                center = Some(i);
            } else {
                end = Some(i);
            }
        }

        if let (Some(c), Some(e)) = (center, end) {
            if grad < 0.0 {
                end = Some(i);
            } else {
                peaks.push(to_bounds(start, c, e));
                start = e as isize;
                center = None;
                end = None;
            }
        }
    }

    if let (Some(c), Some(e)) = (center, end) {
        peaks.push(to_bounds(start, c, e));
    }

    peaks
}

/// Three-point gaussian estimator of the apex position.
///
/// Fits a parabola through the log intensities of the apex and its two
/// neighbors. If a neighbor has zero intensity the log is undefined and
/// the intensity-weighted average of the apex and the other neighbor is
/// used instead.
pub fn gaussian_estimator(center: usize, mz: &[f64], intensity: &[f64]) -> f64 {
    let (m1, m2, m3) = (mz[center - 1], mz[center], mz[center + 1]);
    let (i1, i2, i3) = (
        intensity[center - 1],
        intensity[center],
        intensity[center + 1],
    );

    if i1 == 0.0 {
        (m2 * i2 + m3 * i3) / (i2 + i3)
    } else if i3 == 0.0 {
        (m1 * i1 + m2 * i2) / (i1 + i2)
    } else {
        let (l1, l2, l3) = (i1.ln(), i2.ln(), i3.ln());
        let numerator = (l2 - l3) * m1 * m1 + (l3 - l1) * m2 * m2 + (l1 - l2) * m3 * m3;
        let denominator = (l2 - l3) * m1 + (l3 - l1) * m2 + (l1 - l2) * m3;
        numerator / denominator / 2.0
    }
}

/// Estimates the (m/z, summed intensity) of a peak.
pub fn get_centroid(peak: &PeakBounds, mz: &[f64], intensity: &[f64]) -> (f64, f64) {
    let first = peak.start + 1;
    let last = peak.end - 1;
    let summed: f64 = intensity[first..=last].iter().sum();

    let center_mz = match peak.width() {
        1 => mz[peak.center],
        2 => {
            (mz[first] * intensity[first] + mz[last] * intensity[last])
                / (intensity[first] + intensity[last])
        }
        _ => gaussian_estimator(peak.center, mz, intensity),
    };

    (center_mz, summed)
}

/// Centroids a single profile spectrum, output sorted by m/z.
pub fn centroid_spectrum(
    mz: &[f64],
    intensity: &[f64],
    scan_index: u32,
    retention_time: f64,
) -> Vec<Centroid> {
    let mut out: Vec<Centroid> = find_peaks(intensity)
        .iter()
        .map(|peak| get_centroid(peak, mz, intensity))
        .filter(|(cmz, int)| cmz.is_finite() && *int > 0.0)
        .map(|(cmz, int)| Centroid {
            mz: cmz,
            intensity: int,
            scan_index,
            retention_time,
        })
        .collect();
    out.sort_by(|a, b| a.mz.total_cmp(&b.mz));
    out
}

/// Centroids every scan of the run.
///
/// The scan coordinate of each centroid is the position of its scan in
/// the MS1 list. Progress is reported after every scan.
pub fn centroid_scans(data: &Ms1Data, progress: &dyn ProgressSink) -> Vec<Vec<Centroid>> {
    let n = data.num_scans();
    let mut out = Vec::with_capacity(n);
    for (i, (mzs, ints)) in data
        .mz_arrays
        .iter()
        .zip(data.intensity_arrays.iter())
        .enumerate()
    {
        out.push(centroid_spectrum(
            mzs,
            ints,
            i as u32,
            data.retention_times[i],
        ));
        progress.update((i + 1) as f64 / n as f64);
    }
    debug!(
        "Centroided {} scans into {} centroids",
        n,
        out.iter().map(|x| x.len()).sum::<usize>()
    );
    out
}
