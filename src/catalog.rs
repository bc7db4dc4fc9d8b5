use std::collections::HashMap;
use std::slice;

use log::{debug, warn};

use crate::config::CatalogConfig;
use crate::error::{check_threshold, Error, Result};
use crate::graph::{
    connected_components, reachable, shortest_hop_path, CompleteGraph, GraphCache, ThresholdGraph,
};
use crate::spatial::KDTree;
use crate::trilateration::{self, Sample};
use crate::{Coordinate, Jump, Star, StarList, StarSet};

/// Smallest tree size for which incremental inserts trigger a rebuild.
const TREE_REBUILD_FLOOR: usize = 64;

/// Anything that can be resolved to a catalog member: a name, or a `Star`
/// whose name and coordinate both match a member.
pub trait StarRef {
    fn resolve(&self, catalog: &Catalog) -> Result<usize>;
}

impl StarRef for str {
    fn resolve(&self, catalog: &Catalog) -> Result<usize> {
        catalog
            .name_index
            .get(self)
            .copied()
            .ok_or_else(|| Error::NotFound(self.to_string()))
    }
}

impl StarRef for String {
    fn resolve(&self, catalog: &Catalog) -> Result<usize> {
        self.as_str().resolve(catalog)
    }
}

impl StarRef for Star {
    fn resolve(&self, catalog: &Catalog) -> Result<usize> {
        match catalog.name_index.get(&self.name) {
            Some(&idx) if catalog.stars[idx] == *self => Ok(idx),
            _ => Err(Error::NotFound(self.name.clone())),
        }
    }
}

impl<T: StarRef + ?Sized> StarRef for &T {
    fn resolve(&self, catalog: &Catalog) -> Result<usize> {
        (**self).resolve(catalog)
    }
}

/// The authoritative set of stars.
///
/// Stars live in an insertion-ordered arena; the name index, the k-d tree and
/// every cached threshold graph refer to them by arena index. Names are
/// unique and the first insert for a name wins: later inserts reusing the
/// name are ignored. Stars with a NaN or infinite coordinate are refused.
///
/// Graph queries (`path`, `reachable`, `connected_components`, `jumps`,
/// `threshold_graph`) take `&mut self` because they populate the threshold
/// graph cache on first use of a threshold.
#[derive(Debug, Default)]
pub struct Catalog {
    config: CatalogConfig,
    stars: Vec<Star>,
    points: Vec<Coordinate>,
    name_index: HashMap<String, usize>,
    tree: KDTree,
    tree_built_len: usize,
    version: u64,
    graphs: GraphCache,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CatalogConfig) -> Self {
        Catalog {
            config,
            ..Self::default()
        }
    }

    pub fn from_stars<I: IntoIterator<Item = Star>>(stars: I) -> Self {
        Self::from_stars_with_config(stars, CatalogConfig::default())
    }

    pub fn from_stars_with_config<I: IntoIterator<Item = Star>>(
        stars: I,
        config: CatalogConfig,
    ) -> Self {
        let mut catalog = Self::with_config(config);
        catalog.extend(stars);
        catalog
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Stars in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, Star> {
        self.stars.iter()
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn get(&self, index: usize) -> Option<&Star> {
        self.stars.get(index)
    }

    /// Incremented by every successful insert.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Adds `star` unless its name is already taken or its coordinate is not
    /// finite. Returns whether it was added. Cached threshold graphs are patched with the new vertex.
    pub fn insert(&mut self, star: Star) -> bool {
        if !self.push(star) {
            return false;
        }
        let index = self.stars.len() - 1;
        self.tree.insert(self.points[index], index);
        self.version += 1;
        self.graphs.patch(&self.points, self.version);

        if self.tree.len() > 2 * self.tree_built_len.max(TREE_REBUILD_FLOOR) {
            self.rebuild_tree();
        }
        true
    }

    /// Inserts every star under the same first-wins policy, rebuilding the
    /// spatial index once at the end. Returns how many were added.
    pub fn extend<I: IntoIterator<Item = Star>>(&mut self, stars: I) -> usize {
        let mut added = 0;
        for star in stars {
            if self.push(star) {
                added += 1;
            }
        }
        if added > 0 {
            self.version += 1;
            self.graphs.patch(&self.points, self.version);
            self.rebuild_tree();
        }
        added
    }

    fn push(&mut self, star: Star) -> bool {
        if !star.coordinate.is_finite() {
            warn!(
                "rejecting star {:?} with non-finite coordinate {:?}",
                star.name, star.coordinate
            );
            return false;
        }
        if let Some(&existing) = self.name_index.get(&star.name) {
            debug!(
                "ignoring duplicate star {:?}; keeping entry {} at {:?}",
                star.name, existing, self.stars[existing].coordinate
            );
            return false;
        }
        self.name_index.insert(star.name.clone(), self.stars.len());
        self.points.push(star.coordinate);
        self.stars.push(star);
        true
    }

    fn rebuild_tree(&mut self) {
        self.tree = KDTree::build(&self.points);
        self.tree_built_len = self.points.len();
    }

    /// Sets a property on a member, returning the previous value. Identity
    /// is untouched, so cached graphs stay valid.
    pub fn set_property<S: StarRef + ?Sized>(
        &mut self,
        star: &S,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>> {
        let idx = star.resolve(self)?;
        Ok(self.stars[idx].properties.insert(key.into(), value.into()))
    }

    pub fn index_of<S: StarRef + ?Sized>(&self, star: &S) -> Result<usize> {
        star.resolve(self)
    }

    pub fn get_star<S: StarRef + ?Sized>(&self, star: &S) -> Result<&Star> {
        Ok(&self.stars[star.resolve(self)?])
    }

    pub fn sorted_by_name(&self) -> Vec<&Star> {
        let mut sorted: Vec<&Star> = self.stars.iter().collect();
        sorted.sort();
        sorted
    }

    fn validate_threshold(&self, threshold: f64) -> Result<f64> {
        check_threshold(threshold, self.config.max_query_radius)
    }

    /// Closest other member within `threshold`, or `None` if there is none.
    /// Equidistant candidates resolve to the earlier-inserted star.
    pub fn nearest_neighbor<S: StarRef + ?Sized>(
        &self,
        star: &S,
        threshold: f64,
    ) -> Result<Option<&Star>> {
        let idx = star.resolve(self)?;
        let threshold = self.validate_threshold(threshold)?;
        Ok(self
            .tree
            .nearest_within_radius(&self.points[idx], threshold, Some(idx))
            .map(|(other, _)| &self.stars[other]))
    }

    /// Every other member within `threshold`.
    pub fn neighbors<S: StarRef + ?Sized>(&self, star: &S, threshold: f64) -> Result<StarSet> {
        let idx = star.resolve(self)?;
        let threshold = self.validate_threshold(threshold)?;
        Ok(self
            .tree
            .within_radius(&self.points[idx], threshold)
            .into_iter()
            .filter(|&(other, _)| other != idx)
            .map(|(other, _)| self.stars[other].clone())
            .collect())
    }

    /// The cached graph linking members at most `threshold` apart, built on
    /// first request.
    pub fn threshold_graph(&mut self, threshold: f64) -> Result<&ThresholdGraph> {
        let threshold = self.validate_threshold(threshold)?;
        Ok(self.graphs.get_or_build(
            threshold,
            &self.points,
            &self.tree,
            self.version,
            self.config.graph_build,
        ))
    }

    fn with_graph<R>(&mut self, threshold: f64, f: impl FnOnce(&ThresholdGraph) -> R) -> R {
        let graph = self.graphs.get_or_build(
            threshold,
            &self.points,
            &self.tree,
            self.version,
            self.config.graph_build,
        );
        f(graph)
    }

    pub fn cached_thresholds(&self) -> usize {
        self.graphs.len()
    }

    /// Drops every cached threshold graph.
    pub fn clear_graph_cache(&mut self) {
        self.graphs.clear();
    }

    /// The catalog as a complete graph over its arena indices.
    pub fn complete_graph(&self) -> CompleteGraph {
        CompleteGraph::new(self.stars.len())
    }

    /// Edges of the threshold graph, each directed from the
    /// earlier-inserted star to the later one.
    pub fn jumps(&mut self, threshold: f64) -> Result<Vec<Jump>> {
        let threshold = self.validate_threshold(threshold)?;
        let edges = self.with_graph(threshold, ThresholdGraph::edges);
        Ok(edges
            .into_iter()
            .map(|(a, b)| Jump::new(self.stars[a].clone(), self.stars[b].clone()))
            .collect())
    }

    /// Route from `from` to `to` with the fewest jumps of at most
    /// `threshold`, both ends included. `[from]` when they coincide, empty
    /// when `to` is unreachable.
    pub fn path<A, B>(&mut self, from: &A, to: &B, threshold: f64) -> Result<StarList>
    where
        A: StarRef + ?Sized,
        B: StarRef + ?Sized,
    {
        let from = from.resolve(self)?;
        let to = to.resolve(self)?;
        let threshold = self.validate_threshold(threshold)?;
        let route = self.with_graph(threshold, |g| shortest_hop_path(g, from, to));
        Ok(route
            .unwrap_or_default()
            .into_iter()
            .map(|idx| self.stars[idx].clone())
            .collect())
    }

    /// Every member reachable from `star` through jumps of at most
    /// `threshold`, `star` included.
    pub fn reachable<S: StarRef + ?Sized>(&mut self, star: &S, threshold: f64) -> Result<StarSet> {
        let idx = star.resolve(self)?;
        let threshold = self.validate_threshold(threshold)?;
        let members = self.with_graph(threshold, |g| reachable(g, idx));
        Ok(members
            .into_iter()
            .map(|i| self.stars[i].clone())
            .collect())
    }

    /// Partition of the catalog into components linked by jumps of at most
    /// `threshold`. Components are seeded in name order, so the result is
    /// ordered by each component's smallest star.
    pub fn connected_components(&mut self, threshold: f64) -> Result<Vec<StarSet>> {
        let threshold = self.validate_threshold(threshold)?;
        let mut order: Vec<usize> = (0..self.stars.len()).collect();
        order.sort_by(|&a, &b| self.stars[a].cmp(&self.stars[b]));

        let components = self.with_graph(threshold, |g| connected_components(g, order));
        Ok(components
            .into_iter()
            .map(|members| members.into_iter().map(|i| self.stars[i].clone()).collect())
            .collect())
    }

    /// Trilaterates from `(star name, measured distance)` samples.
    pub fn trilaterate<N: AsRef<str>>(&self, samples: &[(N, f64)]) -> Result<Coordinate> {
        if samples.len() < 3 {
            return Err(Error::TooFewSamples(samples.len()));
        }
        let resolved = samples
            .iter()
            .map(|(name, distance)| {
                let idx = name.as_ref().resolve(self)?;
                Ok(Sample::new(self.points[idx], *distance))
            })
            .collect::<Result<Vec<Sample>>>()?;
        trilateration::trilaterate(&resolved)
    }

    pub fn center_of_mass(&self) -> Option<Coordinate> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(Coordinate::ORIGIN, |acc, p| acc + *p);
        Some(sum * (1.0 / self.points.len() as f64))
    }

    /// Largest distance of any member from the centre of mass.
    pub fn extent(&self) -> f64 {
        let Some(center) = self.center_of_mass() else {
            return 0.0;
        };
        self.points
            .iter()
            .map(|p| p.distance(&center))
            .fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Star;
    type IntoIter = slice::Iter<'a, Star>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Star> for Catalog {
    fn from_iter<I: IntoIterator<Item = Star>>(iter: I) -> Self {
        Catalog::from_stars(iter)
    }
}
