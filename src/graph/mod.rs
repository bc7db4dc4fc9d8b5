//! Graph views over the catalog and the traversals that run on them.
//!
//! Vertices are catalog arena indices `0..vertex_count()`. Traversals in
//! [`pathfinder`] and [`components`] only see the [`Graph`] trait, so they run
//! unchanged over the complete catalog graph and over any threshold graph.

pub mod cache;
pub mod complete;
pub mod components;
pub mod pathfinder;
pub mod threshold;

use std::ops::Range;

pub use cache::GraphCache;
pub use complete::CompleteGraph;
pub use components::{connected_components, reachable};
pub use pathfinder::shortest_hop_path;
pub use threshold::ThresholdGraph;

/// Undirected graph over vertices `0..vertex_count()`.
pub trait Graph {
    fn vertex_count(&self) -> usize;

    fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_;

    fn vertices(&self) -> Range<usize> {
        0..self.vertex_count()
    }
}
