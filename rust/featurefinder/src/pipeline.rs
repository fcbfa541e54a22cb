//! End to end feature finding over one run, and over many in parallel.

use rayon::prelude::*;
use std::time::Instant;
use tracing::{
    info,
    warn,
};

use crate::centroiding::centroid_scans;
use crate::config::FeatureFinderConfig;
use crate::errors::Result;
use crate::hills::{
    build_hills,
    compute_sorted_hills,
    filter_hills,
    split_hills,
    HillBuilderParams,
    HillFilterParams,
};
use crate::models::{
    Feature,
    Ms1Data,
    SortedHills,
};
use crate::patterns::{
    get_isotope_patterns,
    get_pre_patterns,
    GrapherParams,
    IsolatorParams,
};
use crate::report::feature_finder_report;

/// Receives the fraction of work done, non-decreasing within `[0, 1]`.
pub trait ProgressSink: Sync {
    fn update(&self, fraction: f64);
}

impl<F: Fn(f64) + Sync> ProgressSink for F {
    fn update(&self, fraction: f64) {
        self(fraction)
    }
}

/// Discards progress updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _fraction: f64) {}
}

// Maps the progress of a phase onto its share of the whole run.
struct PhaseProgress<'a> {
    inner: &'a dyn ProgressSink,
    start: f64,
    end: f64,
}

impl ProgressSink for PhaseProgress<'_> {
    fn update(&self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        self.inner
            .update(self.start + (self.end - self.start) * fraction);
    }
}

// Progress reported once each phase is done.
const CENTROIDING_DONE: f64 = 0.3;
const HILLS_DONE: f64 = 0.5;
const SPLITTING_DONE: f64 = 0.55;
const FILTERING_DONE: f64 = 0.6;
const STATS_DONE: f64 = 0.7;
const GRAPH_DONE: f64 = 0.8;
const ISOLATION_DONE: f64 = 0.95;

#[derive(Debug, Clone, Default)]
pub struct FeatureFinderOutput {
    pub features: Vec<Feature>,
    /// Hills with their statistics, in the order the features refer to.
    pub sorted_hills: SortedHills,
}

impl FeatureFinderConfig {
    fn grapher_params(&self) -> GrapherParams {
        GrapherParams {
            charges: self.charges().collect(),
            isotope_mass_range: self.isotope_mass_range,
            cc_cutoff: self.cc_cutoff,
            min_profile_overlap: self.min_profile_overlap,
        }
    }

    fn isolator_params(&self) -> IsolatorParams {
        IsolatorParams {
            charges: self.charges().collect(),
            isotope_mass_range: self.isotope_mass_range,
            trail_cc_cutoff: self.trail_cc_cutoff,
            averagine_cc_cutoff: self.averagine_cc_cutoff,
            iso_split_level: self.iso_split_level,
            seed_masses: self.seed_masses,
            low_mass_cutoff: self.low_mass_cutoff,
            min_profile_overlap: self.min_profile_overlap,
        }
    }

    fn filter_params(&self) -> HillFilterParams {
        HillFilterParams {
            min_hill_length: self.min_hill_length,
            hill_peak_min_length: self.hill_peak_min_length,
            hill_peak_factor: self.hill_peak_factor,
            smoothing_window: self.smoothing_window,
        }
    }
}

fn mean_len<T>(items: &[T], len: impl Fn(&T) -> usize) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    items.iter().map(len).sum::<usize>() as f64 / items.len() as f64
}

/// Finds the features of a single run.
///
/// Both the configuration and the data are checked before any work is
/// done. Finding nothing is not an error, the output is then empty.
pub fn find_features(
    data: &Ms1Data,
    config: &FeatureFinderConfig,
    progress: &dyn ProgressSink,
) -> Result<FeatureFinderOutput> {
    config.validate()?;
    data.validate()?;
    let start = Instant::now();

    let centroids = centroid_scans(
        data,
        &PhaseProgress {
            inner: progress,
            start: 0.0,
            end: CENTROIDING_DONE,
        },
    );
    info!(
        "Loaded {} centroids from {} scans",
        centroids.iter().map(|x| x.len()).sum::<usize>(),
        centroids.len()
    );

    let hills = build_hills(&centroids, &HillBuilderParams::from(config));
    info!(
        "A total of {} hills extracted, average hill length {:.2}",
        hills.len(),
        mean_len(&hills, |h| h.len())
    );
    progress.update(HILLS_DONE);

    let split = split_hills(
        &hills,
        &centroids,
        config.smoothing_window,
        config.split_level,
    );
    info!("Split {} hills into {} hills", hills.len(), split.len());
    progress.update(SPLITTING_DONE);

    let n_split = split.len();
    let filtered = filter_hills(split, &centroids, &config.filter_params());
    info!(
        "Filtered {} hills, remaining {} hills",
        n_split,
        filtered.len()
    );
    progress.update(FILTERING_DONE);

    let sorted_hills = compute_sorted_hills(
        filtered,
        &centroids,
        config.hill_nboot,
        config.hill_nboot_max,
        config.bootstrap_seed,
    );
    progress.update(STATS_DONE);

    let pre_patterns = get_pre_patterns(&sorted_hills, &config.grapher_params());
    info!("Found {} pre isotope patterns", pre_patterns.len());
    progress.update(GRAPH_DONE);

    let patterns = get_isotope_patterns(&pre_patterns, &sorted_hills, &config.isolator_params());
    info!("Extracted {} isotope patterns", patterns.len());
    progress.update(ISOLATION_DONE);

    let features = feature_finder_report(&patterns, &sorted_hills, config.smoothing_window);
    progress.update(1.0);
    info!(
        "Reported {} features in {:?}",
        features.len(),
        start.elapsed()
    );

    Ok(FeatureFinderOutput {
        features,
        sorted_hills,
    })
}

/// Runs [find_features] over independent runs in parallel.
///
/// Results come back in input order, paired with their key. A failing run
/// does not affect the others.
pub fn find_features_batch<K: Send>(
    inputs: Vec<(K, Ms1Data)>,
    config: &FeatureFinderConfig,
) -> Vec<(K, Result<FeatureFinderOutput>)> {
    inputs
        .into_par_iter()
        .map(|(key, data)| {
            let res = find_features(&data, config, &NoProgress);
            if let Err(e) = &res {
                warn!("Feature finding failed: {}", e);
            }
            (key, res)
        })
        .collect()
}
