pub mod averagine;
pub mod spacing;

pub use averagine::averagine_envelope;
pub use spacing::{
    check_isotope_pattern,
    check_isotope_pattern_directed,
    mz_to_mass,
};
