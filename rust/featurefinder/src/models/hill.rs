use serde::{
    Deserialize,
    Serialize,
};

use super::centroid::{
    Centroid,
    CentroidRef,
};

/// An elution trace: centroids of the same species in increasing scan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hill {
    pub centroids: Vec<CentroidRef>,
}

impl Hill {
    pub fn new(centroids: Vec<CentroidRef>) -> Self {
        debug_assert!(
            centroids.windows(2).all(|w| w[0].scan < w[1].scan),
            "Hill centroids must be strictly increasing in scan"
        );
        Self { centroids }
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    pub fn intensities(&self, centroids: &[Vec<Centroid>]) -> Vec<f64> {
        self.centroids
            .iter()
            .map(|c| c.resolve(centroids).intensity)
            .collect()
    }
}

/// Summary descriptors of a single hill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HillStats {
    pub mz_avg: f64,
    pub mz_error: f64,
    pub rt_min: f64,
    pub rt_max: f64,
    pub intensity_sum: f64,
    pub intensity_apex: f64,
}

/// The centroids of a hill materialized as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HillData {
    pub mz: Vec<f64>,
    pub intensity: Vec<f64>,
    pub scan_index: Vec<u32>,
    pub retention_time: Vec<f64>,
}

impl HillData {
    pub fn from_hill(hill: &Hill, centroids: &[Vec<Centroid>]) -> Self {
        let mut out = Self {
            mz: Vec::with_capacity(hill.len()),
            intensity: Vec::with_capacity(hill.len()),
            scan_index: Vec::with_capacity(hill.len()),
            retention_time: Vec::with_capacity(hill.len()),
        };
        for c in hill.centroids.iter().map(|r| r.resolve(centroids)) {
            out.mz.push(c.mz);
            out.intensity.push(c.intensity);
            out.scan_index.push(c.scan_index);
            out.retention_time.push(c.retention_time);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }
}

/// Hills, their statistics and their data, indexed in parallel and sorted
/// by `rt_min`. The index into these vectors is the hill id used by every
/// later stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortedHills {
    pub hills: Vec<Hill>,
    pub stats: Vec<HillStats>,
    pub data: Vec<HillData>,
}

impl SortedHills {
    pub fn len(&self) -> usize {
        self.hills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hills.is_empty()
    }
}
