use std::collections::VecDeque;

use crate::graph::Graph;

/// Breadth-first search from `start` to `goal`.
/// Cost model: every jump counts 1 regardless of its length, so the route
/// returned has the fewest hops, not the shortest travelled distance.
///
/// Returns the vertices from `start` to `goal` inclusive, or `None` when
/// `goal` is unreachable.
pub fn shortest_hop_path<G: Graph>(graph: &G, start: usize, goal: usize) -> Option<Vec<usize>> {
    if start == goal {
        return Some(vec![start]);
    }

    let n = graph.vertex_count();
    if start >= n || goal >= n {
        return None;
    }

    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    visited[start] = true;

    let mut open = VecDeque::from([start]);
    while let Some(current) = open.pop_front() {
        for neighbor in graph.neighbors(current) {
            if visited[neighbor] {
                continue;
            }
            visited[neighbor] = true;
            came_from[neighbor] = Some(current);
            if neighbor == goal {
                return Some(reconstruct_path(&came_from, goal));
            }
            open.push_back(neighbor);
        }
    }

    None
}

fn reconstruct_path(came_from: &[Option<usize>], mut current: usize) -> Vec<usize> {
    let mut total_path = vec![current];
    while let Some(prev) = came_from[current] {
        current = prev;
        total_path.push(current);
    }
    total_path.reverse();
    total_path
}
