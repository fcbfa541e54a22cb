use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::DataProcessingError;

/// Raw MS1 data of a single run, as parallel arrays.
///
/// `mz_arrays[i]` and `intensity_arrays[i]` hold the profile points of the
/// scan `scan_indices[i]`, acquired at `retention_times[i]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ms1Data {
    pub scan_indices: Vec<u32>,
    pub retention_times: Vec<f64>,
    pub mz_arrays: Vec<Vec<f64>>,
    pub intensity_arrays: Vec<Vec<f64>>,
}

fn check_same_length(
    expected: usize,
    other: usize,
    context: &str,
) -> Result<(), DataProcessingError> {
    if expected != other {
        return Err(DataProcessingError::ExpectedSlicesSameLength {
            expected,
            other,
            context: context.to_string(),
        });
    }
    Ok(())
}

fn check_finite(values: &[f64], context: &str) -> Result<(), DataProcessingError> {
    match values.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(DataProcessingError::ExpectedFiniteData {
            index,
            context: context.to_string(),
        }),
        None => Ok(()),
    }
}

impl Ms1Data {
    pub fn num_scans(&self) -> usize {
        self.scan_indices.len()
    }

    /// Checks the array shape contract, failing on the first violation.
    pub fn validate(&self) -> Result<(), DataProcessingError> {
        if self.scan_indices.is_empty() {
            return Err(DataProcessingError::ExpectedNonEmptyData {
                context: Some("no MS1 scans".to_string()),
            });
        }
        let n = self.scan_indices.len();
        check_same_length(n, self.retention_times.len(), "scan indices vs retention times")?;
        check_same_length(n, self.mz_arrays.len(), "scan indices vs m/z arrays")?;
        check_same_length(
            n,
            self.intensity_arrays.len(),
            "scan indices vs intensity arrays",
        )?;
        check_finite(&self.retention_times, "retention times")?;

        for (i, (mzs, ints)) in self
            .mz_arrays
            .iter()
            .zip(self.intensity_arrays.iter())
            .enumerate()
        {
            let ctx = format!(" in scan {}", self.scan_indices[i]);
            check_same_length(mzs.len(), ints.len(), "m/z vs intensity")
                .map_err(|e| e.append_to_context(&ctx))?;
            check_finite(mzs, "m/z").map_err(|e| e.append_to_context(&ctx))?;
            check_finite(ints, "intensity").map_err(|e| e.append_to_context(&ctx))?;
            if let Some(pos) = mzs.windows(2).position(|w| w[1] < w[0]) {
                return Err(DataProcessingError::ExpectedSortedData {
                    index: pos + 1,
                    context: format!("m/z{}", ctx),
                });
            }
        }
        Ok(())
    }
}

/// A single resolved peak of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub mz: f64,
    pub intensity: f64,
    /// Position of the scan within the MS1 scan list.
    pub scan_index: u32,
    pub retention_time: f64,
}

/// Locator of a centroid: (position of the scan, position within the scan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CentroidRef {
    pub scan: u32,
    pub position: u32,
}

impl CentroidRef {
    pub fn new(scan: u32, position: u32) -> Self {
        Self { scan, position }
    }

    /// Packs the locator into a single integer, ordered like the locator itself.
    pub fn key(&self) -> u64 {
        ((self.scan as u64) << 32) | self.position as u64
    }

    pub fn from_key(key: u64) -> Self {
        Self {
            scan: (key >> 32) as u32,
            position: (key & 0xFFFF_FFFF) as u32,
        }
    }

    pub fn resolve<'a>(&self, centroids: &'a [Vec<Centroid>]) -> &'a Centroid {
        &centroids[self.scan as usize][self.position as usize]
    }
}
