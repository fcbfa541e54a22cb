//! Candidate isotope links between hills and their connected components.

use tracing::debug;

use crate::constants::{
    ISOTOPE_STD_TOL,
    NEUTRON_DELTA_MASS,
};
use crate::isotopes::check_isotope_pattern;
use crate::models::SortedHills;
use crate::utils::correlation::elution_cosine;
use crate::utils::union_find::UnionFind;

/// Parameters of the pattern grapher.
#[derive(Debug, Clone)]
pub struct GrapherParams {
    /// Charges to test, ascending.
    pub charges: Vec<u8>,
    pub isotope_mass_range: f64,
    pub cc_cutoff: f64,
    pub min_profile_overlap: u32,
}

/// For every hill, the index of the first hill (in `rt_min` order) that
/// starts strictly after it ends.
fn upper_bounds(hills: &SortedHills) -> Vec<usize> {
    hills
        .stats
        .iter()
        .map(|s| hills.stats.partition_point(|x| x.rt_min <= s.rt_max))
        .collect()
}

/// Pairs of co-eluting hills whose m/z spacing fits an isotope step at
/// some charge, before any elution shape check.
pub fn candidate_edges(hills: &SortedHills, params: &GrapherParams) -> Vec<(usize, usize)> {
    let max_offset = NEUTRON_DELTA_MASS + ISOTOPE_STD_TOL;
    let upper = upper_bounds(hills);
    let mut edges = Vec::new();
    for (i, s1) in hills.stats.iter().enumerate() {
        for j in (i + 1)..upper[i] {
            let s2 = &hills.stats[j];
            if (s2.mz_avg - s1.mz_avg).abs() > max_offset {
                continue;
            }
            let fits = params.charges.iter().any(|&c| {
                check_isotope_pattern(
                    s1.mz_avg,
                    s2.mz_avg,
                    s1.mz_error,
                    s2.mz_error,
                    c,
                    params.isotope_mass_range,
                )
            });
            if fits {
                edges.push((i, j));
            }
        }
    }
    edges
}

/// Candidate edges whose hills also share their elution shape.
pub fn get_edges(hills: &SortedHills, params: &GrapherParams) -> Vec<(usize, usize)> {
    let candidates = candidate_edges(hills, params);
    let n_candidates = candidates.len();
    let edges: Vec<(usize, usize)> = candidates
        .into_iter()
        .filter(|&(i, j)| {
            let (a, b) = (&hills.data[i], &hills.data[j]);
            elution_cosine(
                &a.scan_index,
                &a.intensity,
                &b.scan_index,
                &b.intensity,
                params.min_profile_overlap,
            ) > params.cc_cutoff
        })
        .collect();
    debug!(
        "Kept {} of {} candidate isotope edges",
        edges.len(),
        n_candidates
    );
    edges
}

/// Groups hills linked by edges, largest group first.
///
/// Members of a group are sorted ascending, groups of equal size keep the
/// order of their smallest member. Unlinked hills form no group.
pub fn pre_patterns(num_hills: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(num_hills);
    let mut linked = vec![false; num_hills];
    for &(i, j) in edges {
        uf.union(i, j);
        linked[i] = true;
        linked[j] = true;
    }
    let members = (0..num_hills).filter(|&i| linked[i]);
    let mut groups = uf.groups(members);
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    groups
}

pub fn get_pre_patterns(hills: &SortedHills, params: &GrapherParams) -> Vec<Vec<usize>> {
    let edges = get_edges(hills, params);
    pre_patterns(hills.len(), &edges)
}
