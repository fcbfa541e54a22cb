/// Calculates the cosine similarity between two vectors of the same size.
///
/// Degenerate inputs (empty or zero-magnitude vectors) have a similarity
/// of 0, since they are expected at the edges of traces.
///
/// # Example
///
/// ```
/// use featurefinder::utils::correlation::cosine_similarity;
///
/// let a = vec![1.0, 2.0, 3.0];
/// let b = vec![4.0, 5.0, 6.0];
/// let result = cosine_similarity(&a, &b);
/// assert!((result - 0.974_631_8).abs() < 1e-6);
/// ```
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must be of the same length");

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    let magnitude_a: f64 = a.iter().map(|&x| x * x).sum::<f64>().sqrt();
    let magnitude_b: f64 = b.iter().map(|&x| x * x).sum::<f64>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }
    dot_product / (magnitude_a * magnitude_b)
}

// Places values on a dense zero-filled axis starting at `offset`.
// Values landing on the same slot are added.
fn scatter(positions: &[i64], values: &[f64], offset: i64, len: usize) -> Vec<f64> {
    let mut out = vec![0.0; len];
    for (&pos, &val) in positions.iter().zip(values.iter()) {
        out[(pos - offset) as usize] += val;
    }
    out
}

/// Cosine similarity of two sparse profiles after zero-padding both to the
/// union of their position ranges.
///
/// Positions must be sorted ascending.
pub fn aligned_cosine(
    positions_a: &[i64],
    values_a: &[f64],
    positions_b: &[i64],
    values_b: &[f64],
) -> f64 {
    let (Some(&first_a), Some(&last_a)) = (positions_a.first(), positions_a.last()) else {
        return 0.0;
    };
    let (Some(&first_b), Some(&last_b)) = (positions_b.first(), positions_b.last()) else {
        return 0.0;
    };
    let lo = first_a.min(first_b);
    let hi = last_a.max(last_b);
    let len = (hi - lo + 1) as usize;

    let a = scatter(positions_a, values_a, lo, len);
    let b = scatter(positions_b, values_b, lo, len);
    cosine_similarity(&a, &b)
}

/// Cosine similarity of two elution profiles indexed by scan.
///
/// Profiles whose scan spans do not overlap by at least `min_overlap`
/// scans are not comparable and score 0.
pub fn elution_cosine(
    scans_a: &[u32],
    intensities_a: &[f64],
    scans_b: &[u32],
    intensities_b: &[f64],
    min_overlap: u32,
) -> f64 {
    let (Some(&min_a), Some(&max_a)) = (scans_a.first(), scans_a.last()) else {
        return 0.0;
    };
    let (Some(&min_b), Some(&max_b)) = (scans_b.first(), scans_b.last()) else {
        return 0.0;
    };
    if min_a as u64 + min_overlap as u64 > max_b as u64
        || min_b as u64 + min_overlap as u64 > max_a as u64
    {
        return 0.0;
    }

    let pos_a: Vec<i64> = scans_a.iter().map(|&x| x as i64).collect();
    let pos_b: Vec<i64> = scans_b.iter().map(|&x| x as i64).collect();
    aligned_cosine(&pos_a, intensities_a, &pos_b, intensities_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let a = vec![1.0, 1.0, 1.0];
        let result = cosine_similarity(&a, &a);
        assert!((result - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_empty_vectors() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(aligned_cosine(&[], &[], &[1], &[1.0]), 0.0);
    }

    #[test]
    fn test_elution_cosine_shifted_profiles() {
        let scans_a = [10, 11, 12, 13, 14];
        let scans_b = [11, 12, 13, 14, 15];
        let ints = [1.0, 2.0, 3.0, 2.0, 1.0];
        let same = elution_cosine(&scans_a, &ints, &scans_a, &ints, 3);
        assert!((same - 1.0).abs() < 1e-12);

        // Shifted by one scan: [1,2,3,2,1,0] . [0,1,2,3,2,1] = 2+6+6+2 = 16
        let shifted = elution_cosine(&scans_a, &ints, &scans_b, &ints, 3);
        assert!((shifted - 16.0 / 19.0).abs() < 1e-12, "{}", shifted);
    }

    #[test]
    fn test_elution_cosine_requires_overlap() {
        let scans_a = [0, 1, 2];
        let scans_b = [2, 3, 4];
        let ints = [1.0, 1.0, 1.0];
        assert_eq!(elution_cosine(&scans_a, &ints, &scans_b, &ints, 3), 0.0);
        assert!(elution_cosine(&scans_a, &ints, &scans_b, &ints, 0) > 0.0);
    }

    #[test]
    fn test_aligned_cosine_sums_collisions() {
        let res = aligned_cosine(&[5, 5], &[1.0, 1.0], &[5], &[3.0]);
        assert!((res - 1.0).abs() < 1e-12);
    }
}
