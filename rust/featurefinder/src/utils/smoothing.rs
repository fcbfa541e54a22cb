//! Median and mean filters over a symmetric window.
//!
//! The window at position `i` spans `i - window ..= i + window`, clipped
//! to the bounds of the trace, so the edges are smoothed over fewer points.

fn window_bounds(i: usize, window: usize, len: usize) -> (usize, usize) {
    (i.saturating_sub(window), (i + window + 1).min(len))
}

pub fn smooth_mean(y: &[f64], window: usize) -> Vec<f64> {
    (0..y.len())
        .map(|i| {
            let (lo, hi) = window_bounds(i, window, y.len());
            let slice = &y[lo..hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

pub fn smooth_median(y: &[f64], window: usize) -> Vec<f64> {
    let mut buffer = Vec::with_capacity(2 * window + 1);
    (0..y.len())
        .map(|i| {
            let (lo, hi) = window_bounds(i, window, y.len());
            buffer.clear();
            buffer.extend_from_slice(&y[lo..hi]);
            median_in_place(&mut buffer)
        })
        .collect()
}

/// Median smoothing followed by mean smoothing.
pub fn smooth(y: &[f64], window: usize) -> Vec<f64> {
    smooth_mean(&smooth_median(y, window), window)
}

// Even-length slices average the two middle values.
fn median_in_place(values: &mut [f64]) -> f64 {
    debug_assert!(!values.is_empty());
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
