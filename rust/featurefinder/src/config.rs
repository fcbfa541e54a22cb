use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::ConfigError;

/// Tolerance used to link centroids between scans.
///
/// Only ppm is meaningful for the symmetric relative error used when
/// linking centroids, absolute tolerances parse but are rejected by
/// [FeatureFinderConfig::validate].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum MzTolerance {
    #[serde(rename = "da")]
    Absolute(f64),
    #[serde(rename = "ppm")]
    Ppm(f64),
}

impl Default for MzTolerance {
    fn default() -> Self {
        MzTolerance::Ppm(8.0)
    }
}

/// All the knobs of the feature finding engine.
///
/// Every field has a sensible default, so a
/// partial JSON document is enough to override a handful of them.
///
/// Example:
/// ```
/// use featurefinder::FeatureFinderConfig;
///
/// let config: FeatureFinderConfig =
///     serde_json::from_str(r#"{"max_gap": 3, "mz_tolerance": {"ppm": 10.0}}"#).unwrap();
/// assert_eq!(config.max_gap, 3);
/// assert_eq!(config.min_charge, 1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeatureFinderConfig {
    // --- Hill building ---
    /// Maximum number of skipped scans when linking centroids.
    pub max_gap: usize,
    pub mz_tolerance: MzTolerance,
    /// Minimum number of centroids for a trace to be kept as a hill.
    pub min_hill_length: usize,
    /// Number of scans between evictions of finished components.
    pub buffer_size: usize,
    /// Keep only links found both when sweeping forward and backward.
    pub require_bidirectional_links: bool,

    // --- Hill refinement ---
    pub split_level: f64,
    /// Half width of the median/mean smoothing window.
    pub smoothing_window: usize,
    pub hill_peak_factor: f64,
    /// Hills at least this long must look like a peak to survive filtering.
    pub hill_peak_min_length: usize,

    // --- Hill statistics ---
    pub hill_nboot: usize,
    pub hill_nboot_max: usize,
    pub bootstrap_seed: u64,

    // --- Isotope patterns ---
    pub min_charge: i32,
    pub max_charge: i32,
    /// Multiplier applied to the hill m/z error in the spacing check.
    pub isotope_mass_range: f64,
    /// Minimum elution-profile cosine for an edge in the pattern graph.
    pub cc_cutoff: f64,
    /// Minimum elution-profile cosine between a seed and a trail member.
    pub trail_cc_cutoff: f64,
    /// Minimum cosine against the averagine envelope.
    pub averagine_cc_cutoff: f64,
    /// Split ratio used when truncating a trail at intensity minima.
    pub iso_split_level: f64,
    /// Number of most intense hills tried as seeds per pre-pattern.
    pub seed_masses: usize,
    /// Below this `charge * mz` the isotopes before the apex are dropped.
    pub low_mass_cutoff: f64,
    /// Minimum shared scan span for two profiles to be compared.
    pub min_profile_overlap: u32,
}

impl Default for FeatureFinderConfig {
    fn default() -> Self {
        Self {
            max_gap: 2,
            mz_tolerance: MzTolerance::default(),
            min_hill_length: 3,
            buffer_size: 2000,
            require_bidirectional_links: true,
            split_level: 1.3,
            smoothing_window: 1,
            hill_peak_factor: 2.0,
            hill_peak_min_length: 40,
            hill_nboot: 150,
            hill_nboot_max: 300,
            bootstrap_seed: 42,
            min_charge: 1,
            max_charge: 6,
            isotope_mass_range: 5.0,
            cc_cutoff: 0.6,
            trail_cc_cutoff: 0.6,
            averagine_cc_cutoff: 0.6,
            iso_split_level: 1.3,
            seed_masses: 100,
            low_mass_cutoff: 1000.0,
            min_profile_overlap: 3,
        }
    }
}

fn check_finite_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("expected a finite non-negative number, got {}", value),
        });
    }
    Ok(())
}

fn check_non_zero(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: "must be larger than zero".to_string(),
        });
    }
    Ok(())
}

impl FeatureFinderConfig {
    /// Checks the configuration before any data is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_charge < 1 || self.max_charge < self.min_charge {
            return Err(ConfigError::InvalidChargeRange {
                min: self.min_charge,
                max: self.max_charge,
            });
        }
        match self.mz_tolerance {
            MzTolerance::Absolute(_) => {
                return Err(ConfigError::UnsupportedTolerance {
                    unit: "da",
                    context: "centroid linking requires a ppm tolerance".to_string(),
                });
            }
            MzTolerance::Ppm(ppm) => {
                if !ppm.is_finite() || ppm <= 0.0 {
                    return Err(ConfigError::InvalidParameter {
                        name: "mz_tolerance",
                        reason: format!("ppm tolerance must be positive, got {}", ppm),
                    });
                }
            }
        }
        check_non_zero("buffer_size", self.buffer_size)?;
        check_non_zero("hill_nboot", self.hill_nboot)?;
        check_non_zero("hill_nboot_max", self.hill_nboot_max)?;
        check_non_zero("seed_masses", self.seed_masses)?;
        check_finite_non_negative("split_level", self.split_level)?;
        check_finite_non_negative("hill_peak_factor", self.hill_peak_factor)?;
        check_finite_non_negative("isotope_mass_range", self.isotope_mass_range)?;
        check_finite_non_negative("cc_cutoff", self.cc_cutoff)?;
        check_finite_non_negative("trail_cc_cutoff", self.trail_cc_cutoff)?;
        check_finite_non_negative("averagine_cc_cutoff", self.averagine_cc_cutoff)?;
        check_finite_non_negative("iso_split_level", self.iso_split_level)?;
        check_finite_non_negative("low_mass_cutoff", self.low_mass_cutoff)?;
        Ok(())
    }

    /// The ppm tolerance, only meaningful on a validated config.
    pub fn ppm_tol(&self) -> f64 {
        match self.mz_tolerance {
            MzTolerance::Ppm(x) => x,
            MzTolerance::Absolute(_) => 0.0,
        }
    }

    /// Charges to try, in ascending order.
    pub fn charges(&self) -> impl Iterator<Item = u8> + Clone {
        let min = self.min_charge.clamp(1, u8::MAX as i32) as u8;
        let max = self.max_charge.clamp(0, u8::MAX as i32) as u8;
        min..=max
    }
}
