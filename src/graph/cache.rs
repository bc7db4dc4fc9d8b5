use std::collections::HashMap;

use log::{debug, warn};

use crate::config::GraphBuild;
use crate::graph::ThresholdGraph;
use crate::spatial::KDTree;
use crate::Coordinate;

/// Threshold graphs built so far, keyed by the exact bit pattern of their
/// threshold.
///
/// Lookups never reuse a graph built for a merely close threshold. Entries
/// carry the catalog version they were built or last patched against, and a
/// version mismatch forces a rebuild.
///
/// Nothing is evicted: every distinct threshold queried keeps a full
/// adjacency alive until [`GraphCache::clear`]. Long sessions that sweep
/// many radii should clear it periodically (`Catalog::clear_graph_cache`).
#[derive(Debug, Default)]
pub struct GraphCache {
    graphs: HashMap<u64, ThresholdGraph>,
}

fn cache_key(threshold: f64) -> u64 {
    // folds -0.0 onto 0.0
    (threshold + 0.0).to_bits()
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn contains(&self, threshold: f64) -> bool {
        self.graphs.contains_key(&cache_key(threshold))
    }

    pub fn clear(&mut self) {
        self.graphs.clear();
    }

    /// Returns the graph for `threshold`, building it over `points` if no
    /// entry exists or the cached one predates `version`.
    pub fn get_or_build(
        &mut self,
        threshold: f64,
        points: &[Coordinate],
        tree: &KDTree,
        version: u64,
        strategy: GraphBuild,
    ) -> &ThresholdGraph {
        let key = cache_key(threshold);
        if let Some(cached) = self.graphs.get(&key) {
            if cached.version() == version {
                debug!("threshold graph cache hit at {threshold}");
            } else {
                warn!(
                    "discarding threshold graph at {} built against version {}, catalog is at {}",
                    threshold,
                    cached.version(),
                    version
                );
                self.graphs.remove(&key);
            }
        }

        self.graphs.entry(key).or_insert_with(|| match strategy {
            GraphBuild::Indexed => ThresholdGraph::build_indexed(points, tree, threshold, version),
            GraphBuild::Scan => ThresholdGraph::build_scan(points, threshold, version),
        })
    }

    /// Brings every cached graph up to date with `points`, which must be an
    /// append-only extension of the points they were built from.
    pub fn patch(&mut self, points: &[Coordinate], version: u64) {
        for graph in self.graphs.values_mut() {
            debug!(
                "patching threshold graph at {} to {} vertices",
                graph.threshold(),
                points.len()
            );
            graph.extend_to(points, version);
        }
    }
}
