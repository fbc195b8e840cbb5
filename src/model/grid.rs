//! Uniform spatial hash over atom coordinates for fixed-radius queries.
//!
//! The hash partitions the bounding box of the atoms into cubic cells and stores, for
//! every cell, the contiguous run of atom indices that fall into it. Queries visit only
//! the cells overlapping the search sphere.

use super::store::AtomStore;
use super::types::Point;

/// Default cell edge in Ångström.
pub const DEFAULT_CELL_SIZE: f32 = 8.0;

/// A spatial hash keyed by quantized `(x, y, z)` cell coordinates.
///
/// The hash copies the coordinates it was built from and is not updated incrementally;
/// rebuild it after coordinates change.
///
/// # Performance
///
/// - Construction: **O(N)** in the number of atoms.
/// - Radius queries: **O(k)** in the number of atoms inside the visited cells.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    origin: [f32; 3],
    dims: [usize; 3],
    /// Start of each cell's run in `items`; one extra trailing entry closes the last run.
    cell_start: Vec<u32>,
    /// Atom indices grouped by cell.
    items: Vec<u32>,
    positions: Vec<[f32; 3]>,
}

impl SpatialHash {
    /// Builds a hash over the first `atoms.count()` atoms with the default cell size.
    pub fn from_atoms(atoms: &AtomStore) -> Self {
        let positions = (0..atoms.count())
            .map(|i| [atoms.x[i], atoms.y[i], atoms.z[i]])
            .collect();
        Self::new(positions, DEFAULT_CELL_SIZE)
    }

    /// Builds a hash over explicit positions; item `i` refers to `positions[i]`.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is non-positive.
    pub fn new(positions: Vec<[f32; 3]>, cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "Cell size must be positive");

        if positions.is_empty() {
            return Self {
                cell_size,
                origin: [0.0; 3],
                dims: [0; 3],
                cell_start: vec![0],
                items: Vec::new(),
                positions,
            };
        }

        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in &positions {
            for k in 0..3 {
                min[k] = min[k].min(p[k]);
                max[k] = max[k].max(p[k]);
            }
        }

        let dims = [0, 1, 2].map(|k| ((max[k] - min[k]) / cell_size).floor() as usize + 1);
        let total_cells = dims[0] * dims[1] * dims[2];

        let cell_of: Vec<usize> = positions
            .iter()
            .map(|p| {
                let c = [0, 1, 2].map(|k| {
                    (((p[k] - min[k]) / cell_size).floor() as usize).min(dims[k] - 1)
                });
                c[0] + c[1] * dims[0] + c[2] * dims[0] * dims[1]
            })
            .collect();

        let mut cell_start = vec![0u32; total_cells + 1];
        for &cell in &cell_of {
            cell_start[cell + 1] += 1;
        }
        for i in 0..total_cells {
            cell_start[i + 1] += cell_start[i];
        }

        let mut fill = cell_start.clone();
        let mut items = vec![0u32; positions.len()];
        for (atom, &cell) in cell_of.iter().enumerate() {
            items[fill[cell] as usize] = atom as u32;
            fill[cell] += 1;
        }

        Self {
            cell_size,
            origin: min,
            dims,
            cell_start,
            items,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterates over atoms in every cell overlapping the query sphere.
    ///
    /// Candidates may lie outside the sphere; call [`Neighborhood::exact`] to filter by
    /// Euclidean distance.
    pub fn neighbors(&self, center: &Point, radius: f64) -> Neighborhood<'_> {
        let c = [center.x as f32, center.y as f32, center.z as f32];
        let r = radius as f32;

        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        let mut empty = self.is_empty();
        for k in 0..3 {
            if empty {
                break;
            }
            let low = ((c[k] - r - self.origin[k]) / self.cell_size).floor();
            let high = ((c[k] + r - self.origin[k]) / self.cell_size).floor();
            if high < 0.0 || low >= self.dims[k] as f32 {
                empty = true;
                break;
            }
            lo[k] = low.max(0.0) as usize;
            hi[k] = (high as usize).min(self.dims[k] - 1);
        }

        Neighborhood {
            hash: self,
            lo,
            hi,
            cell: lo,
            cursor: 0,
            end: 0,
            done: empty,
            center: c,
            radius_sq: r * r,
        }
    }

    /// Atom indices within `radius` of `center`, in cell order.
    pub fn within(&self, center: &Point, radius: f64) -> Vec<usize> {
        self.neighbors(center, radius).exact().collect()
    }

    /// Calls `f(atom_index, distance_squared)` for every atom within `radius`.
    pub fn each_within<F>(&self, center: &Point, radius: f64, mut f: F)
    where
        F: FnMut(usize, f32),
    {
        let c = [center.x as f32, center.y as f32, center.z as f32];
        for atom in self.neighbors(center, radius).exact() {
            f(atom, self.distance_squared(atom, &c));
        }
    }

    /// Checks whether any atom accepted by `predicate` lies within `radius` of `point`.
    pub fn has_neighbor<F>(&self, point: &Point, radius: f64, mut predicate: F) -> bool
    where
        F: FnMut(usize) -> bool,
    {
        self.neighbors(point, radius).exact().any(|atom| predicate(atom))
    }

    fn distance_squared(&self, atom: usize, c: &[f32; 3]) -> f32 {
        let p = self.positions[atom];
        let (dx, dy, dz) = (p[0] - c[0], p[1] - c[1], p[2] - c[2]);
        dx * dx + dy * dy + dz * dz
    }
}

/// Iterator over candidate atoms in the cells overlapping a query sphere.
pub struct Neighborhood<'a> {
    hash: &'a SpatialHash,
    lo: [usize; 3],
    hi: [usize; 3],
    cell: [usize; 3],
    cursor: usize,
    end: usize,
    done: bool,
    center: [f32; 3],
    radius_sq: f32,
}

impl<'a> Neighborhood<'a> {
    /// Restricts the iterator to atoms with distance at most the query radius.
    pub fn exact(self) -> impl Iterator<Item = usize> + 'a {
        let hash = self.hash;
        let center = self.center;
        let radius_sq = self.radius_sq;
        self.filter(move |&atom| hash.distance_squared(atom, &center) <= radius_sq)
    }

    fn advance_cell(&mut self) {
        self.cell[0] += 1;
        if self.cell[0] > self.hi[0] {
            self.cell[0] = self.lo[0];
            self.cell[1] += 1;
        }
        if self.cell[1] > self.hi[1] {
            self.cell[1] = self.lo[1];
            self.cell[2] += 1;
        }
        if self.cell[2] > self.hi[2] {
            self.done = true;
        }
    }
}

impl Iterator for Neighborhood<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor < self.end {
                let atom = self.hash.items[self.cursor] as usize;
                self.cursor += 1;
                return Some(atom);
            }
            if self.done {
                return None;
            }

            let dims = self.hash.dims;
            let idx = self.cell[0] + self.cell[1] * dims[0] + self.cell[2] * dims[0] * dims[1];
            self.cursor = self.hash.cell_start[idx] as usize;
            self.end = self.hash.cell_start[idx + 1] as usize;
            self.advance_cell();
        }
    }
}
