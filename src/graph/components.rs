use std::collections::{BTreeSet, VecDeque};

use crate::graph::Graph;

/// Every vertex connected to `start`, including `start` itself.
pub fn reachable<G: Graph>(graph: &G, start: usize) -> BTreeSet<usize> {
    let mut seen = BTreeSet::new();
    if start >= graph.vertex_count() {
        return seen;
    }

    seen.insert(start);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for neighbor in graph.neighbors(current) {
            if seen.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    seen
}

/// Partitions the graph into connected components.
///
/// Seeds are taken from `order`, which must list every vertex exactly once;
/// components come back in the order their first seed appears there.
pub fn connected_components<G, I>(graph: &G, order: I) -> Vec<BTreeSet<usize>>
where
    G: Graph,
    I: IntoIterator<Item = usize>,
{
    let mut assigned = vec![false; graph.vertex_count()];
    let mut components = Vec::new();

    for seed in order {
        if assigned[seed] {
            continue;
        }
        let component = reachable(graph, seed);
        for &v in &component {
            assigned[v] = true;
        }
        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CompleteGraph, ThresholdGraph};
    use crate::Coordinate;

    fn clusters() -> ThresholdGraph {
        let pts: Vec<Coordinate> = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [50.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [51.0, 0.0, 0.0],
            [100.0, 0.0, 0.0],
        ]
        .into_iter()
        .map(Coordinate::from)
        .collect();
        ThresholdGraph::build_scan(&pts, 1.0, 0)
    }

    #[test]
    fn reachable_includes_start() {
        let g = clusters();
        assert_eq!(reachable(&g, 0), BTreeSet::from([0, 1, 3]));
        assert_eq!(reachable(&g, 4), BTreeSet::from([2, 4]));
        assert_eq!(reachable(&g, 5), BTreeSet::from([5]));
        assert!(reachable(&g, 42).is_empty());
    }

    #[test]
    fn components_follow_seed_order() {
        let g = clusters();
        let forward = connected_components(&g, 0..6);
        assert_eq!(
            forward,
            vec![
                BTreeSet::from([0, 1, 3]),
                BTreeSet::from([2, 4]),
                BTreeSet::from([5]),
            ]
        );

        let backward = connected_components(&g, (0..6).rev());
        assert_eq!(backward[0], BTreeSet::from([5]));
        assert_eq!(backward.len(), 3);
    }

    #[test]
    fn complete_graph_is_one_component() {
        let g = CompleteGraph::new(4);
        assert_eq!(
            connected_components(&g, 0..4),
            vec![BTreeSet::from([0, 1, 2, 3])]
        );
    }
}
