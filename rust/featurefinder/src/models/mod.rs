pub mod centroid;
pub mod feature;
pub mod hill;
pub mod pattern;

pub use centroid::{
    Centroid,
    CentroidRef,
    Ms1Data,
};
pub use feature::{
    sort_features,
    Feature,
};
pub use hill::{
    Hill,
    HillData,
    HillStats,
    SortedHills,
};
pub use pattern::IsotopePattern;
