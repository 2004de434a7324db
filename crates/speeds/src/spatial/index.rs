//! R-tree index for nearest vehicle-position search.
//!
//! One index is built per trip (per excluded direction) over the candidate
//! vehicle positions, queried once per stop, and dropped with the trip's
//! worker. Nothing is shared across trips.

use geo::Point;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Default number of nearest candidates considered per stop.
pub const DEFAULT_K_NEIGHBORS: usize = 5;

#[derive(Clone)]
struct CandidateNode {
    /// Index into the candidate slice the index was built from.
    slot: usize,
    point: [f64; 2],
}

impl RTreeObject for CandidateNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CandidateNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over a fixed cloud of candidate positions.
pub struct NearestPositionIndex {
    tree: RTree<CandidateNode>,
    len: usize,
}

impl NearestPositionIndex {
    pub fn new(points: &[Point]) -> Self {
        let nodes = points
            .iter()
            .enumerate()
            .map(|(slot, p)| CandidateNode {
                slot,
                point: [p.x(), p.y()],
            })
            .collect();
        Self {
            tree: RTree::bulk_load(nodes),
            len: points.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Up to `k` candidate slots ordered by increasing distance to `query`.
    ///
    /// Search backends may pad short results with out-of-range sentinel
    /// slots; anything at or past the candidate count is dropped here before
    /// the caller ever sees it.
    pub fn k_nearest(&self, query: Point, k: usize) -> Vec<usize> {
        self.tree
            .nearest_neighbor_iter(&[query.x(), query.y()])
            .take(k)
            .map(|node| node.slot)
            .filter(|&slot| slot < self.len)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> NearestPositionIndex {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(40.0, 0.0),
            Point::new(50.0, 0.0),
        ];
        NearestPositionIndex::new(&points)
    }

    #[test]
    fn test_k_nearest_ordered_by_distance() {
        let idx = index();
        let got = idx.k_nearest(Point::new(21.0, 0.0), 3);
        assert_eq!(got, vec![2, 3, 1]);
    }

    #[test]
    fn test_k_larger_than_candidate_count() {
        let idx = index();
        let got = idx.k_nearest(Point::new(0.0, 0.0), 50);
        assert_eq!(got.len(), 6);
        assert!(got.iter().all(|&slot| slot < idx.len()));
    }

    #[test]
    fn test_empty_index() {
        let idx = NearestPositionIndex::new(&[]);
        assert!(idx.is_empty());
        assert!(idx.k_nearest(Point::new(1.0, 1.0), 5).is_empty());
    }
}
