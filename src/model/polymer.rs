//! Contiguous runs of backbone-connected residues within one chain.

use super::proxy::{AtomProxy, ResidueProxy};
use super::structure::Structure;
use std::ops::Range;

/// Which landmark atom of a residue to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark<'n> {
    Trace,
    Direction1,
    Direction2,
    Name(&'n str),
}

#[derive(Debug, Clone, Copy)]
pub struct Polymer<'a> {
    structure: &'a Structure,
    residue_start: usize,
    /// Inclusive.
    residue_end: usize,
    is_prev_connected: bool,
    is_next_connected: bool,
    is_next_next_connected: bool,
    is_cyclic: bool,
}

impl<'a> Polymer<'a> {
    /// A polymer spanning residues `residue_start..=residue_end`.
    pub fn new(structure: &'a Structure, residue_start: usize, residue_end: usize) -> Self {
        let first = ResidueProxy::new(structure, residue_start);
        let last = ResidueProxy::new(structure, residue_end);
        let next = last.next_connected();
        Self {
            structure,
            residue_start,
            residue_end,
            is_prev_connected: first.previous_connected().is_some(),
            is_next_connected: next.is_some(),
            is_next_next_connected: next.and_then(|r| r.next_connected()).is_some(),
            is_cyclic: last.connected_to(&first),
        }
    }

    pub fn structure(&self) -> &'a Structure {
        self.structure
    }

    pub fn residue_start(&self) -> usize {
        self.residue_start
    }

    pub fn residue_end(&self) -> usize {
        self.residue_end
    }

    pub fn residue_count(&self) -> usize {
        self.residue_end - self.residue_start + 1
    }

    pub fn residue_range(&self) -> Range<usize> {
        self.residue_start..self.residue_end + 1
    }

    pub fn residues(&self) -> impl Iterator<Item = ResidueProxy<'a>> + 'a {
        let structure = self.structure;
        self.residue_range()
            .map(move |i| ResidueProxy::new(structure, i))
    }

    pub fn chain_index(&self) -> usize {
        self.structure.residue_store.chain_index[self.residue_start] as usize
    }

    pub fn is_prev_connected(&self) -> bool {
        self.is_prev_connected
    }

    pub fn is_next_connected(&self) -> bool {
        self.is_next_connected
    }

    pub fn is_cyclic(&self) -> bool {
        self.is_cyclic
    }

    pub fn is_protein(&self) -> bool {
        ResidueProxy::new(self.structure, self.residue_start).is_protein()
    }

    pub fn is_nucleic(&self) -> bool {
        ResidueProxy::new(self.structure, self.residue_start).is_nucleic()
    }

    pub fn is_cg(&self) -> bool {
        ResidueProxy::new(self.structure, self.residue_start).is_cg()
    }

    /// Atom index of `landmark` in the residue at polymer position `index`.
    ///
    /// Positions one past either end wrap around for cyclic polymers and clamp to the
    /// end residue otherwise, unless the neighbor outside the polymer is connected.
    pub fn atom_index_by_landmark(&self, index: isize, landmark: Landmark) -> Option<usize> {
        let count = self.residue_count() as isize;
        let mut index = index;
        if self.is_cyclic {
            if index == -1 {
                index = count - 1;
            } else if index == count {
                index = 0;
            }
        } else {
            if index == -1 && !self.is_prev_connected {
                index += 1;
            }
            if index == count && !self.is_next_next_connected {
                index -= 1;
            }
        }

        let residue_index = self.residue_start as isize + index;
        if residue_index < 0 || residue_index as usize >= self.structure.residue_count() {
            return None;
        }
        let rp = ResidueProxy::new(self.structure, residue_index as usize);
        let atom = match landmark {
            Landmark::Trace => rp.trace_atom(),
            Landmark::Direction1 => rp.direction1_atom(),
            Landmark::Direction2 => rp.direction2_atom(),
            Landmark::Name(name) => rp.atom_by_name(name),
        };
        atom.map(|a| a.index())
    }

    /// Trace atoms of every residue, in order. Residues without one are skipped.
    pub fn trace_atoms(&self) -> impl Iterator<Item = AtomProxy<'a>> + 'a {
        self.residues().filter_map(|r| r.trace_atom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    #[test]
    fn polymer_counts_inclusive_range() {
        let structure = fixtures::helix_peptide(6);
        let polymer = Polymer::new(&structure, 0, 5);
        assert_eq!(polymer.residue_count(), 6);
        assert_eq!(polymer.trace_atoms().count(), 6);
        assert!(polymer.is_protein());
        assert!(!polymer.is_cg());
        assert!(!polymer.is_cyclic());
    }

    #[test]
    fn atom_index_by_landmark_clamps_open_ends() {
        let structure = fixtures::helix_peptide(6);
        let polymer = Polymer::new(&structure, 0, 5);
        assert_eq!(polymer.atom_index_by_landmark(-1, Landmark::Trace), Some(1));
        assert_eq!(polymer.atom_index_by_landmark(6, Landmark::Trace), Some(21));
        assert_eq!(polymer.atom_index_by_landmark(2, Landmark::Name("O")), Some(11));
    }

    #[test]
    fn inner_polymer_sees_connected_neighbors() {
        let structure = fixtures::helix_peptide(8);
        let polymer = Polymer::new(&structure, 2, 5);
        assert!(polymer.is_prev_connected());
        assert!(polymer.is_next_connected());
        assert_eq!(polymer.atom_index_by_landmark(-1, Landmark::Trace), Some(5));
    }
}
