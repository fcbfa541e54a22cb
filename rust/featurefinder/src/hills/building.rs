//! Linking of centroids across scans into hills.
//!
//! Every scan is compared with the `max_gap + 1` scans that follow it.
//! Matching centroids become edges of an undirected graph whose connected
//! components are the hills. The graph is evicted every `buffer_size`
//! scans, so only components that can still grow are held in memory.

use nohash_hasher::BuildNoHashHasher;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use tracing::debug;

use crate::config::FeatureFinderConfig;
use crate::models::{
    Centroid,
    CentroidRef,
    Hill,
};

type NodeMap<V> = HashMap<u64, V, BuildNoHashHasher<u64>>;

/// Relative m/z difference of two values, in ppm of their mean.
#[inline]
pub fn ppm_delta(mz1: f64, mz2: f64) -> f64 {
    2e6 * (mz1 - mz2).abs() / (mz1 + mz2)
}

/// Greedy two-pointer matching of two m/z sorted centroid lists.
///
/// Returns `(position_in_a, position_in_b, ppm_delta)` for every accepted
/// pair. Each centroid of `a` is matched at most once, a centroid of `b`
/// can be matched by several centroids of `a`.
pub fn match_centroids(a: &[Centroid], b: &[Centroid], ppm_tol: f64) -> Vec<(u32, u32, f64)> {
    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let diff = a[i].mz - b[j].mz;
        let delta = ppm_delta(a[i].mz, b[j].mz);
        if delta < ppm_tol {
            pairs.push((i as u32, j as u32, delta));
            i += 1;
        } else if diff > 0.0 {
            j += 1;
        } else {
            i += 1;
        }
    }
    pairs
}

/// Links of the centroids of an earlier scan to a later one.
///
/// Returns `(position_in_earlier, position_in_later)` pairs. When
/// `bidirectional` is set a link is only kept if sweeping the later scan
/// against the earlier one (keeping the closest match per earlier
/// centroid) yields the same pair.
pub fn link_scans(
    earlier: &[Centroid],
    later: &[Centroid],
    ppm_tol: f64,
    bidirectional: bool,
) -> Vec<(u32, u32)> {
    let forward = match_centroids(earlier, later, ppm_tol);
    if !bidirectional {
        return forward.into_iter().map(|(i, j, _)| (i, j)).collect();
    }

    let mut backward: Vec<Option<(u32, f64)>> = vec![None; earlier.len()];
    for (j, i, delta) in match_centroids(later, earlier, ppm_tol) {
        let slot = &mut backward[i as usize];
        match slot {
            Some((_, best)) if *best <= delta => {}
            _ => *slot = Some((j, delta)),
        }
    }

    forward
        .into_iter()
        .filter(|(i, j, _)| matches!(backward[*i as usize], Some((bj, _)) if bj == *j))
        .map(|(i, j, _)| (i, j))
        .collect()
}

/// Parameters of the hill builder.
#[derive(Debug, Clone, Copy)]
pub struct HillBuilderParams {
    pub max_gap: usize,
    pub ppm_tol: f64,
    pub min_hill_length: usize,
    /// Scans between evictions, zero never evicts.
    pub buffer_size: usize,
    pub require_bidirectional_links: bool,
}

impl From<&FeatureFinderConfig> for HillBuilderParams {
    fn from(config: &FeatureFinderConfig) -> Self {
        Self {
            max_gap: config.max_gap,
            ppm_tol: config.ppm_tol(),
            min_hill_length: config.min_hill_length,
            buffer_size: config.buffer_size,
            require_bidirectional_links: config.require_bidirectional_links,
        }
    }
}

/// Undirected centroid graph restricted to the scans still being linked.
#[derive(Debug, Default)]
struct ActiveGraph {
    adjacency: NodeMap<Vec<u64>>,
}

impl ActiveGraph {
    fn new() -> Self {
        Self {
            adjacency: HashMap::with_hasher(BuildHasherDefault::default()),
        }
    }

    fn add_edge(&mut self, a: u64, b: u64) {
        self.adjacency.entry(a).or_default().push(b);
        self.adjacency.entry(b).or_default().push(a);
    }

    fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Connected components, each sorted by node key.
    /// Components are ordered by their first node.
    fn components(&self) -> Vec<Vec<u64>> {
        let mut starts: Vec<u64> = self.adjacency.keys().copied().collect();
        starts.sort_unstable();

        let mut seen: NodeMap<()> = HashMap::with_hasher(BuildHasherDefault::default());
        let mut out = Vec::new();
        let mut stack = Vec::new();
        for start in starts {
            if let Entry::Vacant(e) = seen.entry(start) {
                e.insert(());
            } else {
                continue;
            }
            let mut component = vec![start];
            stack.push(start);
            while let Some(node) = stack.pop() {
                for &next in self.adjacency.get(&node).into_iter().flatten() {
                    if let Entry::Vacant(e) = seen.entry(next) {
                        e.insert(());
                        component.push(next);
                        stack.push(next);
                    }
                }
            }
            component.sort_unstable();
            out.push(component);
        }
        out
    }

    fn remove(&mut self, nodes: &[u64]) {
        for node in nodes {
            self.adjacency.remove(node);
        }
    }
}

/// Turns a component into a hill, keeping the most intense centroid of
/// every scan. Nodes must be sorted by key.
fn component_to_hill(nodes: &[u64], centroids: &[Vec<Centroid>]) -> Hill {
    let mut out: Vec<CentroidRef> = Vec::with_capacity(nodes.len());
    for cref in nodes.iter().map(|&k| CentroidRef::from_key(k)) {
        match out.last_mut() {
            Some(last) if last.scan == cref.scan => {
                if cref.resolve(centroids).intensity > last.resolve(centroids).intensity {
                    *last = cref;
                }
            }
            _ => out.push(cref),
        }
    }
    Hill::new(out)
}

/// Extracts the hills of a run from its per-scan centroids.
///
/// `centroids[i]` must hold the m/z sorted centroids of the i-th scan.
pub fn build_hills(centroids: &[Vec<Centroid>], params: &HillBuilderParams) -> Vec<Hill> {
    let n_scans = centroids.len();
    let mut graph = ActiveGraph::new();
    let mut hills = Vec::new();
    let mut num_dropped = 0;
    let mut max_active = 0;

    let mut finalize = |component: &[u64], hills: &mut Vec<Hill>| {
        let hill = component_to_hill(component, centroids);
        if hill.len() >= params.min_hill_length {
            hills.push(hill);
        } else {
            num_dropped += 1;
        }
    };

    for i in 0..n_scans {
        for gap in 0..=params.max_gap {
            let j = i + gap + 1;
            if j >= n_scans {
                break;
            }
            for (pi, pj) in link_scans(
                &centroids[i],
                &centroids[j],
                params.ppm_tol,
                params.require_bidirectional_links,
            ) {
                graph.add_edge(
                    CentroidRef::new(i as u32, pi).key(),
                    CentroidRef::new(j as u32, pj).key(),
                );
            }
        }

        if params.buffer_size > 0
            && (i + 1) % params.buffer_size == 0
            && i > params.max_gap
        {
            max_active = max_active.max(graph.len());
            let horizon = (i - params.max_gap) as u32;
            for component in graph.components() {
                let last_scan = component
                    .last()
                    .map(|&k| CentroidRef::from_key(k).scan)
                    .unwrap_or(0);
                if last_scan < horizon {
                    graph.remove(&component);
                    finalize(&component, &mut hills);
                }
            }
        }
    }

    max_active = max_active.max(graph.len());
    for component in graph.components() {
        finalize(&component, &mut hills);
    }

    debug!(
        "Built {} hills, dropped {} short components, at most {} active nodes",
        hills.len(),
        num_dropped,
        max_active
    );
    hills
}
