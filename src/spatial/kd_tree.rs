use crate::Coordinate;

/// Node in a 3D k-d tree.
#[derive(Debug, Clone)]
pub struct KDNode {
    pub point: Coordinate,
    pub index: usize,
    pub axis: usize,
    pub left: Option<Box<KDNode>>,
    pub right: Option<Box<KDNode>>,
}

/// 3D k-d tree over catalog indices supporting radius and nearest-neighbour
/// queries.
///
/// Points inserted after `build` are appended as leaves; the tree stays
/// correct but loses balance, so bulk loads should rebuild.
#[derive(Debug, Clone, Default)]
pub struct KDTree {
    pub root: Option<Box<KDNode>>,
    len: usize,
}

impl KDTree {
    pub fn build(points: &[Coordinate]) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let root = Self::build_recursive(points, &mut indices, 0);
        KDTree {
            root,
            len: points.len(),
        }
    }

    fn build_recursive(
        points: &[Coordinate],
        idx: &mut [usize],
        depth: usize,
    ) -> Option<Box<KDNode>> {
        if idx.is_empty() {
            return None;
        }

        let axis = depth % 3;
        idx.sort_by(|&a, &b| points[a].axis(axis).total_cmp(&points[b].axis(axis)));
        let mid = idx.len() / 2;
        let median = idx[mid];

        Some(Box::new(KDNode {
            point: points[median],
            index: median,
            axis,
            left: Self::build_recursive(points, &mut idx[..mid], depth + 1),
            right: Self::build_recursive(points, &mut idx[mid + 1..], depth + 1),
        }))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, point: Coordinate, index: usize) {
        let mut slot = &mut self.root;
        let mut depth = 0;
        while let Some(node) = slot {
            slot = if point.axis(node.axis) < node.point.axis(node.axis) {
                &mut node.left
            } else {
                &mut node.right
            };
            depth += 1;
        }
        *slot = Some(Box::new(KDNode {
            point,
            index,
            axis: depth % 3,
            left: None,
            right: None,
        }));
        self.len += 1;
    }

    /// Every indexed point within `radius` of `target` (inclusive), as
    /// `(index, distance)` pairs sorted ascending by distance, then index.
    pub fn within_radius(&self, target: &Coordinate, radius: f64) -> Vec<(usize, f64)> {
        let mut results = Vec::new();
        Self::search_recursive(&self.root, target, radius, &mut results);
        results.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        results
    }

    fn search_recursive(
        node: &Option<Box<KDNode>>,
        target: &Coordinate,
        radius: f64,
        results: &mut Vec<(usize, f64)>,
    ) {
        if let Some(noderef) = node {
            let dist = noderef.point.distance(target);
            if dist <= radius {
                results.push((noderef.index, dist));
            }

            let axis = noderef.axis;
            let delta = target.axis(axis) - noderef.point.axis(axis);
            let (first, second) = if delta < 0.0 {
                (&noderef.left, &noderef.right)
            } else {
                (&noderef.right, &noderef.left)
            };

            Self::search_recursive(first, target, radius, results);
            // a NaN split cannot bound either side
            if delta.is_nan() || delta.abs() <= radius {
                Self::search_recursive(second, target, radius, results);
            }
        }
    }

    /// Closest indexed point within `radius` of `target` whose index is not
    /// `exclude`. Equal distances resolve to the lower index.
    pub fn nearest_within_radius(
        &self,
        target: &Coordinate,
        radius: f64,
        exclude: Option<usize>,
    ) -> Option<(usize, f64)> {
        let mut best = None;
        Self::nearest_recursive(&self.root, target, radius, exclude, &mut best);
        best
    }

    fn nearest_recursive(
        node: &Option<Box<KDNode>>,
        target: &Coordinate,
        radius: f64,
        exclude: Option<usize>,
        best: &mut Option<(usize, f64)>,
    ) {
        let Some(noderef) = node else {
            return;
        };

        if exclude != Some(noderef.index) {
            let dist = noderef.point.distance(target);
            let better = match *best {
                None => dist <= radius,
                Some((idx, d)) => dist < d || (dist == d && noderef.index < idx),
            };
            if better {
                *best = Some((noderef.index, dist));
            }
        }

        let axis = noderef.axis;
        let delta = target.axis(axis) - noderef.point.axis(axis);
        let (first, second) = if delta < 0.0 {
            (&noderef.left, &noderef.right)
        } else {
            (&noderef.right, &noderef.left)
        };

        Self::nearest_recursive(first, target, radius, exclude, best);
        let bound = best.map_or(radius, |(_, d)| d);
        if delta.is_nan() || delta.abs() <= bound {
            Self::nearest_recursive(second, target, radius, exclude, best);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::KDTree;
    use crate::Coordinate;

    fn pts() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0, 0.0),
            Coordinate::new(1.0, 0.0, 0.0),
            Coordinate::new(2.0, 2.0, 0.0),
            Coordinate::new(0.0, 2.0, 0.0),
        ]
    }

    #[test]
    fn within_radius_basic() {
        let kd = KDTree::build(&pts());
        let res = kd.within_radius(&Coordinate::new(0.0, 0.0, 0.0), 1.5);
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].0, 0);
        assert_eq!(res[1].0, 1);
    }

    #[test]
    fn radius_is_inclusive() {
        let kd = KDTree::build(&pts());
        let res = kd.within_radius(&Coordinate::new(0.0, 0.0, 0.0), 2.0);
        let idx: Vec<usize> = res.iter().map(|r| r.0).collect();
        assert_eq!(idx, vec![0, 1, 3]);
    }

    #[test]
    fn nearest_skips_excluded_index() {
        let kd = KDTree::build(&pts());
        let origin = Coordinate::new(0.0, 0.0, 0.0);
        assert_eq!(kd.nearest_within_radius(&origin, 5.0, None).map(|r| r.0), Some(0));
        assert_eq!(kd.nearest_within_radius(&origin, 5.0, Some(0)).map(|r| r.0), Some(1));
        assert_eq!(kd.nearest_within_radius(&origin, 0.5, Some(0)), None);
    }

    #[test]
    fn nearest_ties_resolve_to_lower_index() {
        let points = vec![
            Coordinate::new(0.0, 0.0, 0.0),
            Coordinate::new(1.0, 0.0, 0.0),
            Coordinate::new(-1.0, 0.0, 0.0),
        ];
        let kd = KDTree::build(&points);
        let hit = kd.nearest_within_radius(&points[0], 1.0, Some(0));
        assert_eq!(hit.map(|r| r.0), Some(1));
    }

    #[test]
    fn inserted_points_match_rebuilt_tree() {
        let mut points = pts();
        let mut kd = KDTree::build(&points);
        for (i, p) in [
            Coordinate::new(-3.0, 1.0, 4.0),
            Coordinate::new(1.0, 1.0, 1.0),
            Coordinate::new(0.5, -0.5, 0.0),
        ]
        .into_iter()
        .enumerate()
        {
            kd.insert(p, points.len() + i);
        }
        points.extend([
            Coordinate::new(-3.0, 1.0, 4.0),
            Coordinate::new(1.0, 1.0, 1.0),
            Coordinate::new(0.5, -0.5, 0.0),
        ]);
        let rebuilt = KDTree::build(&points);
        assert_eq!(kd.len(), rebuilt.len());

        for target in &points {
            for radius in [0.0, 0.75, 1.5, 3.0, 10.0] {
                assert_eq!(
                    kd.within_radius(target, radius),
                    rebuilt.within_radius(target, radius)
                );
            }
        }
    }

    #[test]
    fn nan_split_does_not_hide_finite_points() {
        let points = vec![
            Coordinate::new(0.0, 0.0, 0.0),
            Coordinate::new(1.0, 0.0, 0.0),
            Coordinate::new(f64::NAN, 0.0, 0.0),
            Coordinate::new(f64::NAN, 0.0, 0.0),
            Coordinate::new(f64::NAN, 0.0, 0.0),
        ];
        let kd = KDTree::build(&points);
        assert_eq!(kd.within_radius(&points[0], 2.0), vec![(0, 0.0), (1, 1.0)]);
        assert_eq!(kd.nearest_within_radius(&points[0], 2.0, Some(0)), Some((1, 1.0)));

        let mut grown = KDTree::default();
        for (i, p) in points.iter().enumerate().rev() {
            grown.insert(*p, i);
        }
        assert_eq!(grown.within_radius(&points[0], 2.0), vec![(0, 0.0), (1, 1.0)]);
        assert_eq!(grown.nearest_within_radius(&points[0], 2.0, Some(0)), Some((1, 1.0)));
    }

    #[test]
    fn empty_tree() {
        let kd = KDTree::build(&[]);
        assert!(kd.is_empty());
        assert!(kd.within_radius(&Coordinate::ORIGIN, 100.0).is_empty());
        assert_eq!(kd.nearest_within_radius(&Coordinate::ORIGIN, 100.0, None), None);
    }
}
