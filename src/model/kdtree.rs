//! Static k-d tree for bounded neighbor queries over a small point set.
//!
//! The tree is stored implicitly: the points are permuted in place so that every
//! subrange `[lo, hi)` keeps its median along the splitting axis at `(lo + hi) / 2`,
//! with smaller coordinates to the left. No node allocations are needed.

use super::store::AtomStore;
use super::types::Point;
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct KdTree {
    /// Caller-facing index of each point, permuted alongside `points`.
    indices: Vec<u32>,
    points: Vec<[f32; 3]>,
}

impl KdTree {
    /// Builds a tree over a contiguous range of atoms; results report atom indices.
    pub fn from_atoms(atoms: &AtomStore, range: Range<usize>) -> Self {
        let items = range
            .map(|i| (i as u32, [atoms.x[i], atoms.y[i], atoms.z[i]]))
            .collect();
        Self::build(items)
    }

    /// Builds a tree over arbitrary points; results report positions in `points`.
    pub fn from_points(points: &[[f32; 3]]) -> Self {
        let items = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u32, *p))
            .collect();
        Self::build(items)
    }

    fn build(mut items: Vec<(u32, [f32; 3])>) -> Self {
        split(&mut items, 0);
        let (indices, points) = items.into_iter().unzip();
        Self { indices, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points with squared distance at most `max_dist_sq`, unordered.
    pub fn within(&self, point: &Point, max_dist_sq: f32) -> Vec<(usize, f32)> {
        let query = [point.x as f32, point.y as f32, point.z as f32];
        let mut out = Vec::new();
        self.search(&query, max_dist_sq, 0, self.points.len(), 0, &mut out);
        out
    }

    /// Up to `max_nodes` closest points within `max_dist_sq`, nearest first.
    pub fn nearest(&self, point: &Point, max_nodes: usize, max_dist_sq: f32) -> Vec<(usize, f32)> {
        let mut found = self.within(point, max_dist_sq);
        found.sort_by(|a, b| a.1.total_cmp(&b.1));
        found.truncate(max_nodes);
        found
    }

    fn search(
        &self,
        query: &[f32; 3],
        max_dist_sq: f32,
        lo: usize,
        hi: usize,
        depth: usize,
        out: &mut Vec<(usize, f32)>,
    ) {
        if lo >= hi {
            return;
        }
        let mid = (lo + hi) / 2;
        let p = &self.points[mid];
        let d2 = (p[0] - query[0]).powi(2) + (p[1] - query[1]).powi(2) + (p[2] - query[2]).powi(2);
        if d2 <= max_dist_sq {
            out.push((self.indices[mid] as usize, d2));
        }

        let axis = depth % 3;
        let diff = query[axis] - p[axis];
        let (near, far) = if diff < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };
        self.search(query, max_dist_sq, near.0, near.1, depth + 1, out);
        if diff * diff <= max_dist_sq {
            self.search(query, max_dist_sq, far.0, far.1, depth + 1, out);
        }
    }
}

fn split(items: &mut [(u32, [f32; 3])], depth: usize) {
    if items.len() <= 1 {
        return;
    }
    let axis = depth % 3;
    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, |a, b| a.1[axis].total_cmp(&b.1[axis]));
    let (left, right) = items.split_at_mut(mid);
    split(left, depth + 1);
    split(&mut right[1..], depth + 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice() -> Vec<[f32; 3]> {
        let mut points = Vec::new();
        for x in 0..5 {
            for y in 0..5 {
                for z in 0..5 {
                    points.push([x as f32 * 1.1, y as f32 * 0.9 + 0.05 * x as f32, z as f32 * 1.3]);
                }
            }
        }
        points
    }

    fn brute_force(points: &[[f32; 3]], q: &[f32; 3], max_dist_sq: f32) -> Vec<usize> {
        let mut hits: Vec<_> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2) + (p[2] - q[2]).powi(2)
                    <= max_dist_sq
            })
            .map(|(i, _)| i)
            .collect();
        hits.sort_unstable();
        hits
    }

    #[test]
    fn within_matches_brute_force() {
        let points = lattice();
        let tree = KdTree::from_points(&points);
        assert_eq!(tree.len(), points.len());

        for (q, r2) in [([2.2, 1.8, 2.6], 2.0), ([0.0, 0.0, 0.0], 1.5), ([4.4, 3.6, 5.2], 6.0)] {
            let mut hits: Vec<_> = tree
                .within(&Point::new(q[0] as f64, q[1] as f64, q[2] as f64), r2)
                .into_iter()
                .map(|(i, _)| i)
                .collect();
            hits.sort_unstable();
            assert_eq!(hits, brute_force(&points, &q, r2));
        }
    }

    #[test]
    fn nearest_orders_by_distance_and_truncates() {
        let points = [[0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let tree = KdTree::from_points(&points);
        let found = tree.nearest(&Point::new(0.1, 0.0, 0.0), 2, 100.0);
        assert_eq!(found.iter().map(|&(i, _)| i).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn from_atoms_reports_atom_indices() {
        let mut atoms = AtomStore::with_capacity(4);
        for x in [0.0, 10.0, 10.5, 30.0] {
            let i = atoms.push_row();
            atoms.set_position(i, &Point::new(x, 0.0, 0.0));
        }
        let tree = KdTree::from_atoms(&atoms, 1..4);
        let mut hits: Vec<_> = tree
            .within(&Point::new(10.0, 0.0, 0.0), 1.0)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        hits.sort_unstable();
        assert_eq!(hits, vec![1, 2]);
    }

    #[test]
    fn empty_tree_returns_nothing() {
        let tree = KdTree::from_points(&[]);
        assert!(tree.is_empty());
        assert!(tree.within(&Point::origin(), 10.0).is_empty());
    }
}
