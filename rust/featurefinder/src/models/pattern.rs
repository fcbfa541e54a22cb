use serde::{
    Deserialize,
    Serialize,
};

/// Hills believed to be isotopologues of one species at one charge.
///
/// `hills` are indices into [crate::models::SortedHills], ordered by
/// increasing mass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsotopePattern {
    pub hills: Vec<usize>,
    pub charge: u8,
}

impl IsotopePattern {
    pub fn len(&self) -> usize {
        self.hills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hills.is_empty()
    }

    pub fn monoisotopic_hill(&self) -> Option<usize> {
        self.hills.first().copied()
    }
}
