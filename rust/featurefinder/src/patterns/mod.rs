pub mod grapher;
pub mod isolation;

pub use grapher::{
    get_pre_patterns,
    GrapherParams,
};
pub use isolation::{
    get_isotope_patterns,
    IsolatorParams,
};
