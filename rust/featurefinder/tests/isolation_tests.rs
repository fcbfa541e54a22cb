use featurefinder::constants::NEUTRON_DELTA_MASS;
use featurefinder::isotopes::{
    averagine_envelope,
    mz_to_mass,
};
use featurefinder::patterns::{
    get_isotope_patterns,
    get_pre_patterns,
    GrapherParams,
    IsolatorParams,
};
use featurefinder::{
    CentroidRef,
    Hill,
    HillData,
    HillStats,
    SortedHills,
};

fn elution_profile(n: usize) -> Vec<f64> {
    let center = (n as f64 - 1.0) / 2.0;
    (0..n)
        .map(|i| 1e6 * (-(i as f64 - center).powi(2) / 8.0).exp())
        .collect()
}

// Appends a hill eluting over scans 0..10 with its apex scaled by `scale`.
fn push_hill(hills: &mut SortedHills, mz: f64, scale: f64) {
    let elution = elution_profile(10);
    let scans: Vec<u32> = (0..10).collect();
    let rts: Vec<f64> = scans.iter().map(|&s| s as f64 * 0.1).collect();
    let position = hills.len() as u32;
    let intensity: Vec<f64> = elution.iter().map(|x| x * scale).collect();

    hills.hills.push(Hill::new(
        scans.iter().map(|&s| CentroidRef::new(s, position)).collect(),
    ));
    hills.stats.push(HillStats {
        mz_avg: mz,
        mz_error: f64::EPSILON,
        rt_min: rts[0],
        rt_max: rts[9],
        intensity_sum: intensity.iter().sum(),
        intensity_apex: intensity.iter().copied().fold(0.0, f64::max),
    });
    hills.data.push(HillData {
        mz: vec![mz; 10],
        intensity,
        scan_index: scans,
        retention_time: rts,
    });
}

/// Appends the hills of one species at the given charge, all eluting together.
fn push_envelope(hills: &mut SortedHills, mono_mz: f64, charge: u8, n_isotopes: usize) {
    let (_, abundances) = averagine_envelope(mz_to_mass(mono_mz, charge));
    assert!(abundances.len() >= n_isotopes);
    for (k, abundance) in abundances.iter().take(n_isotopes).enumerate() {
        let mz = mono_mz + k as f64 * NEUTRON_DELTA_MASS / charge as f64;
        push_hill(hills, mz, *abundance);
    }
}

fn synthetic_envelope(mono_mz: f64, charge: u8, n_isotopes: usize) -> SortedHills {
    let mut hills = SortedHills::default();
    push_envelope(&mut hills, mono_mz, charge, n_isotopes);
    hills
}

fn grapher_params() -> GrapherParams {
    GrapherParams {
        charges: (1..=6).collect(),
        isotope_mass_range: 5.0,
        cc_cutoff: 0.6,
        min_profile_overlap: 3,
    }
}

fn isolator_params() -> IsolatorParams {
    IsolatorParams {
        charges: (1..=6).collect(),
        isotope_mass_range: 5.0,
        trail_cc_cutoff: 0.6,
        averagine_cc_cutoff: 0.6,
        iso_split_level: 1.3,
        seed_masses: 100,
        low_mass_cutoff: 1000.0,
        min_profile_overlap: 3,
    }
}

#[test]
fn test_charge_two_envelope_is_isolated() {
    let hills = synthetic_envelope(801.0, 2, 4);
    let pre_patterns = get_pre_patterns(&hills, &grapher_params());
    assert_eq!(pre_patterns, vec![vec![0, 1, 2, 3]]);

    let patterns = get_isotope_patterns(&pre_patterns, &hills, &isolator_params());
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].charge, 2);
    assert_eq!(patterns[0].len(), 4);
    assert_eq!(patterns[0].hills, vec![0, 1, 2, 3]);
}

#[test]
fn test_charge_three_envelope_is_isolated() {
    let hills = synthetic_envelope(650.0, 3, 4);
    let pre_patterns = get_pre_patterns(&hills, &grapher_params());
    let patterns = get_isotope_patterns(&pre_patterns, &hills, &isolator_params());
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].charge, 3);
    assert_eq!(patterns[0].len(), 4);
}

#[test]
fn test_unrelated_hill_is_left_out() {
    let mut hills = synthetic_envelope(801.0, 2, 4);
    // Co-eluting, but off any isotope step of the envelope.
    let stray_mz = 801.0 + 0.23;
    hills.hills.push(hills.hills[0].clone());
    hills.stats.push(HillStats {
        mz_avg: stray_mz,
        ..hills.stats[0]
    });
    let mut data = hills.data[0].clone();
    data.mz = vec![stray_mz; data.len()];
    hills.data.push(data);

    let pre_patterns = get_pre_patterns(&hills, &grapher_params());
    let patterns = get_isotope_patterns(&pre_patterns, &hills, &isolator_params());
    assert_eq!(patterns.len(), 1);
    assert!(!patterns[0].hills.contains(&4));
}

#[test]
fn test_overlapping_envelopes_are_isolated_separately() {
    // A charge 1 species starting right after the last isotope of a
    // charge 2 one, both eluting together.
    let mut hills = synthetic_envelope(801.0, 2, 4);
    push_envelope(&mut hills, 801.0 + 4.0 * NEUTRON_DELTA_MASS / 2.0, 1, 3);

    let pre_patterns = get_pre_patterns(&hills, &grapher_params());
    assert_eq!(pre_patterns, vec![vec![0, 1, 2, 3, 4, 5, 6]]);

    let patterns = get_isotope_patterns(&pre_patterns, &hills, &isolator_params());
    assert_eq!(patterns.len(), 2);
    assert_eq!(patterns[0].hills, vec![0, 1, 2, 3]);
    assert_eq!(patterns[0].charge, 2);
    assert_eq!(patterns[1].hills, vec![4, 5, 6]);
    assert_eq!(patterns[1].charge, 1);
}

fn low_mass_envelope_with_lighter_neighbor() -> SortedHills {
    let mut hills = SortedHills::default();
    let (_, abundances) = averagine_envelope(mz_to_mass(600.0, 1));
    // Weaker co-eluting hill one isotope step below the monoisotopic peak.
    push_hill(&mut hills, 600.0 - NEUTRON_DELTA_MASS, 0.3 * abundances[0]);
    push_envelope(&mut hills, 600.0, 1, 3);
    hills
}

#[test]
fn test_low_mass_pattern_starts_at_apex() {
    let hills = low_mass_envelope_with_lighter_neighbor();
    let pre_patterns = get_pre_patterns(&hills, &grapher_params());
    assert_eq!(pre_patterns, vec![vec![0, 1, 2, 3]]);

    let patterns = get_isotope_patterns(&pre_patterns, &hills, &isolator_params());
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].charge, 1);
    assert_eq!(patterns[0].hills, vec![1, 2, 3]);
}

#[test]
fn test_lighter_neighbor_kept_without_low_mass_rule() {
    // Keeping the lighter hill breaks the averagine match.
    let hills = low_mass_envelope_with_lighter_neighbor();
    let pre_patterns = get_pre_patterns(&hills, &grapher_params());
    let params = IsolatorParams {
        low_mass_cutoff: 0.0,
        ..isolator_params()
    };
    let patterns = get_isotope_patterns(&pre_patterns, &hills, &params);
    assert!(patterns.is_empty());
}
