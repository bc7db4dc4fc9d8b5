use crate::graph::Graph;

/// The catalog seen as a complete graph: every pair of distinct stars is
/// linked.
#[derive(Clone, Copy, Debug)]
pub struct CompleteGraph {
    len: usize,
}

impl CompleteGraph {
    pub fn new(len: usize) -> Self {
        CompleteGraph { len }
    }

    pub fn edge_count(&self) -> usize {
        self.len * self.len.saturating_sub(1) / 2
    }

    /// Each unordered pair once, as `(lower, higher)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.len).flat_map(move |a| (a + 1..self.len).map(move |b| (a, b)))
    }
}

impl Graph for CompleteGraph {
    fn vertex_count(&self) -> usize {
        self.len
    }

    fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&u| u != v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_pair_once() {
        let g = CompleteGraph::new(6);
        assert_eq!(g.edge_count(), 15);
        assert_eq!(g.edges().count(), 15);
        assert!(g.edges().all(|(a, b)| a < b));
        assert_eq!(g.neighbors(2).collect::<Vec<_>>(), vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn degenerate_sizes() {
        assert_eq!(CompleteGraph::new(0).edge_count(), 0);
        assert_eq!(CompleteGraph::new(1).edges().count(), 0);
        assert_eq!(CompleteGraph::new(1).neighbors(0).count(), 0);
    }
}
