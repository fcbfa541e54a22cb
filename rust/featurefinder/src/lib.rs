pub mod centroiding;
pub mod config;
pub mod constants;
pub mod errors;
pub mod hills;
pub mod isotopes;
pub mod models;
pub mod patterns;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use config::{
    FeatureFinderConfig,
    MzTolerance,
};
pub use errors::{
    ConfigError,
    DataProcessingError,
    FeatureFinderError,
    Result,
};
pub use models::{
    Centroid,
    CentroidRef,
    Feature,
    Hill,
    HillData,
    HillStats,
    IsotopePattern,
    Ms1Data,
    SortedHills,
    sort_features,
};
pub use pipeline::{
    find_features,
    find_features_batch,
    FeatureFinderOutput,
    NoProgress,
    ProgressSink,
};
