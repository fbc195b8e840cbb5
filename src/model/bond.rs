//! Bond tables and the per-atom bond index derived from them.

use super::atom_map::AtomMap;
use super::store::{AtomStore, grown_capacity};
use std::collections::HashMap;

/// Squared distance under which two coarse-grained beads count as bonded.
const CG_BOND_DISTANCE_SQ: f32 = 48.0;
/// Lower tolerance subtracted from the summed covalent radii.
const BOND_TOLERANCE_LOW: f32 = 0.5;
/// Upper tolerance added to the summed covalent radii.
const BOND_TOLERANCE_HIGH: f32 = 0.3;

/// Tests whether atoms `i` and `j` are close enough to be covalently bonded.
///
/// Atoms carrying two different, non-blank alternate-location codes are never connected.
/// When the first atom belongs to a coarse-grained residue, `cg` should be `true`, which
/// additionally accepts any pair closer than a flat bead-distance cutoff.
pub fn covalently_connected(
    atoms: &AtomStore,
    atom_map: &AtomMap,
    i: usize,
    j: usize,
    cg: bool,
) -> bool {
    let altloc1 = atoms.altloc[i];
    let altloc2 = atoms.altloc[j];
    let blank = |code: u8| code == 0 || code == b' ';
    if !blank(altloc1) && !blank(altloc2) && altloc1 != altloc2 {
        return false;
    }

    let dist_sq = atoms.distance_squared(i, j);

    if cg && dist_sq < CG_BOND_DISTANCE_SQ {
        return true;
    }

    let covalent1 = atom_map.get(atoms.atom_type_id[i]).covalent;
    let covalent2 = atom_map.get(atoms.atom_type_id[j]).covalent;
    let d = covalent1 + covalent2;
    let low = d - BOND_TOLERANCE_LOW;
    let high = d + BOND_TOLERANCE_HIGH;

    low * low < dist_sq && dist_sq < high * high
}

/// One row per bond, with `atom_index1 < atom_index2` on every row.
///
/// A canonical pair can be stored at most once; repeated inserts are ignored, which
/// makes every bonding pass idempotent.
#[derive(Debug, Clone, Default)]
pub struct BondStore {
    count: usize,
    length: usize,
    pub atom_index1: Vec<u32>,
    pub atom_index2: Vec<u32>,
    pub bond_order: Vec<u8>,
    pairs: HashMap<(u32, u32), u32>,
}

impl BondStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(length: usize) -> Self {
        let mut store = Self::default();
        store.resize(length);
        store
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sets the physical length to exactly `length` rows, keeping rows below it.
    pub fn resize(&mut self, length: usize) {
        if length < self.count {
            for row in length..self.count {
                self.pairs
                    .remove(&(self.atom_index1[row], self.atom_index2[row]));
            }
            self.count = length;
        }
        self.atom_index1.resize(length, 0);
        self.atom_index2.resize(length, 0);
        self.bond_order.resize(length, 0);
        self.length = length;
    }

    pub fn grow_if_full(&mut self) {
        if self.count >= self.length {
            self.resize(grown_capacity(self.length));
        }
    }

    /// Adds a bond between two atoms in either order.
    ///
    /// Returns the row index when a new bond was stored, or `None` for self-bonds and
    /// pairs that are already present.
    pub fn add_bond(&mut self, atom1: usize, atom2: usize, order: u8) -> Option<usize> {
        if atom1 == atom2 {
            return None;
        }
        let key = canonical_pair(atom1, atom2);
        if self.pairs.contains_key(&key) {
            return None;
        }

        self.grow_if_full();
        let row = self.count;
        self.atom_index1[row] = key.0;
        self.atom_index2[row] = key.1;
        self.bond_order[row] = order;
        self.pairs.insert(key, row as u32);
        self.count += 1;
        Some(row)
    }

    /// Adds a bond only when the two atoms pass the covalent distance test.
    pub fn add_bond_if_connected(
        &mut self,
        atoms: &AtomStore,
        atom_map: &AtomMap,
        atom1: usize,
        atom2: usize,
        order: u8,
    ) -> Option<usize> {
        if covalently_connected(atoms, atom_map, atom1, atom2, false) {
            self.add_bond(atom1, atom2, order)
        } else {
            None
        }
    }

    /// Row index of the bond between two atoms, in either order.
    pub fn find(&self, atom1: usize, atom2: usize) -> Option<usize> {
        self.pairs
            .get(&canonical_pair(atom1, atom2))
            .map(|&row| row as usize)
    }

    pub fn contains(&self, atom1: usize, atom2: usize) -> bool {
        self.find(atom1, atom2).is_some()
    }

    pub fn set_order(&mut self, row: usize, order: u8) {
        self.bond_order[row] = order;
    }

    /// Iterates `(atom_index1, atom_index2, order)` over the stored rows.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        (0..self.count).map(move |row| {
            (
                self.atom_index1[row] as usize,
                self.atom_index2[row] as usize,
                self.bond_order[row],
            )
        })
    }

    pub fn clear(&mut self) {
        self.count = 0;
        self.pairs.clear();
    }
}

fn canonical_pair(atom1: usize, atom2: usize) -> (u32, u32) {
    if atom1 < atom2 {
        (atom1 as u32, atom2 as u32)
    } else {
        (atom2 as u32, atom1 as u32)
    }
}

/// Compressed per-atom view of a [`BondStore`].
///
/// For atom `a`, `index_array[offset_array[a]..offset_array[a] + count_array[a]]` lists
/// the rows of every bond touching `a`, in row order. The hash is a snapshot: bonds
/// added to the store afterwards are not reflected until it is rebuilt.
#[derive(Debug, Clone, Default)]
pub struct BondHash {
    pub count_array: Vec<u32>,
    pub offset_array: Vec<u32>,
    pub index_array: Vec<u32>,
}

impl BondHash {
    pub fn new(bonds: &BondStore, atom_count: usize) -> Self {
        let mut count_array = vec![0u32; atom_count];
        for (a1, a2, _) in bonds.iter() {
            count_array[a1] += 1;
            count_array[a2] += 1;
        }

        let mut offset_array = vec![0u32; atom_count];
        let mut running = 0u32;
        for (offset, &count) in offset_array.iter_mut().zip(&count_array) {
            *offset = running;
            running += count;
        }

        let mut fill = vec![0u32; atom_count];
        let mut index_array = vec![0u32; running as usize];
        for (row, (a1, a2, _)) in bonds.iter().enumerate() {
            for atom in [a1, a2] {
                let slot = offset_array[atom] + fill[atom];
                index_array[slot as usize] = row as u32;
                fill[atom] += 1;
            }
        }

        Self {
            count_array,
            offset_array,
            index_array,
        }
    }

    /// Bond rows touching `atom`.
    pub fn bonds_of(&self, atom: usize) -> &[u32] {
        let offset = self.offset_array[atom] as usize;
        let count = self.count_array[atom] as usize;
        &self.index_array[offset..offset + count]
    }

    pub fn atom_count(&self) -> usize {
        self.count_array.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{Element, Point};

    fn two_atoms(distance: f64, e1: Element, e2: Element) -> (AtomStore, AtomMap) {
        let mut map = AtomMap::new();
        let t1 = map.add("A1", e1);
        let t2 = map.add("A2", e2);
        let mut atoms = AtomStore::with_capacity(2);
        for (t, x) in [(t1, 0.0), (t2, distance)] {
            let i = atoms.push_row();
            atoms.atom_type_id[i] = t;
            atoms.set_position(i, &Point::new(x, 0.0, 0.0));
        }
        (atoms, map)
    }

    #[test]
    fn add_bond_canonicalizes_and_suppresses_duplicates() {
        let mut store = BondStore::new();
        assert_eq!(store.add_bond(7, 3, 1), Some(0));
        assert_eq!(store.add_bond(3, 7, 2), None);
        assert_eq!(store.count(), 1);
        assert_eq!(store.atom_index1[0], 3);
        assert_eq!(store.atom_index2[0], 7);
        assert_eq!(store.bond_order[0], 1);
        assert_eq!(store.find(7, 3), Some(0));
    }

    #[test]
    fn add_bond_rejects_self_bonds() {
        let mut store = BondStore::new();
        assert_eq!(store.add_bond(4, 4, 1), None);
        assert!(store.is_empty());
    }

    #[test]
    fn add_bond_grows_past_initial_capacity() {
        let mut store = BondStore::with_capacity(2);
        for i in 0..600 {
            store.add_bond(i, i + 1, 1);
        }
        assert_eq!(store.count(), 600);
        assert!(store.capacity() >= 600);
        assert_eq!(store.atom_index1[599], 599);
        assert_eq!(store.atom_index2[599], 600);
    }

    #[test]
    fn resize_below_count_forgets_truncated_pairs() {
        let mut store = BondStore::new();
        store.add_bond(0, 1, 1);
        store.add_bond(1, 2, 1);
        store.resize(1);
        assert_eq!(store.count(), 1);
        assert!(store.contains(0, 1));
        assert!(!store.contains(1, 2));
        assert_eq!(store.add_bond(2, 1, 1), Some(1));
    }

    #[test]
    fn covalently_connected_accepts_typical_c_c_bond() {
        let (atoms, map) = two_atoms(1.53, Element::C, Element::C);
        assert!(covalently_connected(&atoms, &map, 0, 1, false));
    }

    #[test]
    fn covalently_connected_rejects_too_close_and_too_far() {
        let (atoms, map) = two_atoms(0.9, Element::C, Element::C);
        assert!(!covalently_connected(&atoms, &map, 0, 1, false));
        let (atoms, map) = two_atoms(2.2, Element::C, Element::C);
        assert!(!covalently_connected(&atoms, &map, 0, 1, false));
    }

    #[test]
    fn covalently_connected_respects_altloc_mismatch() {
        let (mut atoms, map) = two_atoms(1.53, Element::C, Element::C);
        atoms.altloc[0] = b'A';
        atoms.altloc[1] = b'B';
        assert!(!covalently_connected(&atoms, &map, 0, 1, false));
        atoms.altloc[1] = b' ';
        assert!(covalently_connected(&atoms, &map, 0, 1, false));
        atoms.altloc[1] = b'A';
        assert!(covalently_connected(&atoms, &map, 0, 1, false));
    }

    #[test]
    fn covalently_connected_uses_flat_cutoff_for_coarse_grained_beads() {
        let (atoms, map) = two_atoms(3.8, Element::C, Element::C);
        assert!(!covalently_connected(&atoms, &map, 0, 1, false));
        assert!(covalently_connected(&atoms, &map, 0, 1, true));
        let (atoms, map) = two_atoms(7.0, Element::C, Element::C);
        assert!(!covalently_connected(&atoms, &map, 0, 1, true));
    }

    #[test]
    fn add_bond_if_connected_skips_distant_pairs() {
        let (atoms, map) = two_atoms(3.0, Element::C, Element::N);
        let mut store = BondStore::new();
        assert_eq!(store.add_bond_if_connected(&atoms, &map, 0, 1, 1), None);
        let (atoms, map) = two_atoms(1.47, Element::C, Element::N);
        assert_eq!(store.add_bond_if_connected(&atoms, &map, 0, 1, 1), Some(0));
    }

    #[test]
    fn bond_hash_lists_every_bond_per_atom() {
        let mut store = BondStore::new();
        store.add_bond(0, 1, 1);
        store.add_bond(1, 2, 2);
        store.add_bond(3, 1, 1);

        let hash = BondHash::new(&store, 5);
        assert_eq!(hash.bonds_of(0), &[0]);
        assert_eq!(hash.bonds_of(1), &[0, 1, 2]);
        assert_eq!(hash.bonds_of(2), &[1]);
        assert_eq!(hash.bonds_of(3), &[2]);
        assert!(hash.bonds_of(4).is_empty());
        assert_eq!(hash.atom_count(), 5);
    }
}
