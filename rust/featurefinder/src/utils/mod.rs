pub mod correlation;
pub mod smoothing;
pub mod union_find;
