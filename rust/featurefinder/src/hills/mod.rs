pub mod building;
pub mod refining;
pub mod stats;

pub use building::{
    build_hills,
    HillBuilderParams,
};
pub use refining::{
    filter_hills,
    split_hills,
    HillFilterParams,
};
pub use stats::compute_sorted_hills;
