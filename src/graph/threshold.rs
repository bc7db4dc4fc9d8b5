use log::debug;

use crate::error::{check_threshold, Result};
use crate::graph::Graph;
use crate::spatial::KDTree;
use crate::Coordinate;

/// Entry in a vertex's adjacency list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// Adjacency-list graph linking every pair of points at most `threshold`
/// apart.
///
/// `adjacency[i]` lists the neighbours of point `i` sorted by distance, then
/// index, which lets the graph answer radius queries for any smaller
/// threshold as a prefix of that list.
#[derive(Clone, Debug)]
pub struct ThresholdGraph {
    threshold: f64,
    version: u64,
    adjacency: Vec<Vec<Neighbor>>,
    edge_count: usize,
}

impl ThresholdGraph {
    fn empty(threshold: f64, version: u64, capacity: usize) -> Self {
        ThresholdGraph {
            threshold,
            version,
            adjacency: Vec::with_capacity(capacity),
            edge_count: 0,
        }
    }

    /// Pairwise scan over every unordered pair.
    pub fn build_scan(points: &[Coordinate], threshold: f64, version: u64) -> Self {
        debug!(
            "scanning {} points for threshold graph at {}",
            points.len(),
            threshold
        );
        let mut graph = Self::empty(threshold, version, points.len());
        graph.extend_to(points, version);
        graph
    }

    /// One radius query per vertex against `tree`, which must index exactly
    /// `points`.
    pub fn build_indexed(
        points: &[Coordinate],
        tree: &KDTree,
        threshold: f64,
        version: u64,
    ) -> Self {
        debug!(
            "querying k-d tree for threshold graph at {} over {} points",
            threshold,
            points.len()
        );
        let mut graph = Self::empty(threshold, version, points.len());
        let mut directed = 0usize;
        for (idx, p) in points.iter().enumerate() {
            let neighbours: Vec<Neighbor> = tree
                .within_radius(p, threshold)
                .into_iter()
                .filter(|&(other, _)| other != idx)
                .map(|(index, distance)| Neighbor { index, distance })
                .collect();
            directed += neighbours.len();
            graph.adjacency.push(neighbours);
        }
        graph.edge_count = directed / 2;
        graph
    }

    /// Adds vertices for `points[self.vertex_count()..]`, testing each one
    /// against every vertex already present, and stamps the graph with
    /// `version`.
    pub fn extend_to(&mut self, points: &[Coordinate], version: u64) {
        while self.adjacency.len() < points.len() {
            let new = self.adjacency.len();
            let p = points[new];
            let mut own = Vec::new();
            for (idx, q) in points[..new].iter().enumerate() {
                let distance = p.distance(q);
                if distance <= self.threshold {
                    insert_sorted(&mut self.adjacency[idx], Neighbor { index: new, distance });
                    own.push(Neighbor { index: idx, distance });
                }
            }
            own.sort_by(neighbor_order);
            self.edge_count += own.len();
            self.adjacency.push(own);
        }
        self.version = version;
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Catalog version this graph is consistent with.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Each edge once, as `(lower, higher)` sorted ascending.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, list)| {
                list.iter()
                    .filter(move |n| n.index > a)
                    .map(move |n| (a, n.index))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Full adjacency of `v`, nearest first.
    pub fn adjacency(&self, v: usize) -> &[Neighbor] {
        self.adjacency.get(v).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Neighbours of `v` within `threshold`, which may not exceed the
    /// threshold the graph was built for.
    pub fn neighbors_within(&self, v: usize, threshold: f64) -> Result<&[Neighbor]> {
        let threshold = check_threshold(threshold, Some(self.threshold))?;
        let list = self.adjacency(v);
        let end = list.partition_point(|n| n.distance <= threshold);
        Ok(&list[..end])
    }

    pub fn nearest_within(&self, v: usize, threshold: f64) -> Result<Option<Neighbor>> {
        Ok(self.neighbors_within(v, threshold)?.first().copied())
    }
}

impl Graph for ThresholdGraph {
    fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency(v).iter().map(|n| n.index)
    }
}

fn neighbor_order(a: &Neighbor, b: &Neighbor) -> std::cmp::Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.index.cmp(&b.index))
}

fn insert_sorted(list: &mut Vec<Neighbor>, n: Neighbor) {
    let pos = list.partition_point(|m| neighbor_order(m, &n).is_lt());
    list.insert(pos, n);
}
