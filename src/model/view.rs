//! Selection-filtered access to a structure without copying its stores.

use super::bounds::BoundingBox;
use super::proxy::{AtomProxy, ChainProxy, ModelProxy, ResidueProxy};
use super::structure::Structure;
use crate::utils::bitarray::BitArray;

/// A structure restricted to the atoms set in `atom_set`.
///
/// Residues, chains, and models are visible when at least one of their atoms is.
/// Iteration follows the parent's row order. The view borrows its parent and becomes
/// meaningless if the parent's stores are rebuilt.
#[derive(Debug, Clone)]
pub struct StructureView<'a> {
    structure: &'a Structure,
    atom_set: BitArray,
}

impl<'a> StructureView<'a> {
    /// # Panics
    ///
    /// Panics if `atom_set` does not have one bit per atom of `structure`.
    pub fn new(structure: &'a Structure, atom_set: BitArray) -> Self {
        assert_eq!(
            atom_set.len(),
            structure.atom_count(),
            "atom set length does not match atom count"
        );
        Self {
            structure,
            atom_set,
        }
    }

    pub fn structure(&self) -> &'a Structure {
        self.structure
    }

    pub fn atom_set(&self) -> &BitArray {
        &self.atom_set
    }

    pub fn contains_atom(&self, index: usize) -> bool {
        self.atom_set.get(index)
    }

    /// Narrows the view to atoms also set in `other`.
    pub fn restrict(&self, other: &BitArray) -> StructureView<'a> {
        let mut atom_set = self.atom_set.clone();
        atom_set.intersect_with(other);
        StructureView::new(self.structure, atom_set)
    }

    pub fn atoms(&self) -> impl Iterator<Item = AtomProxy<'a>> + '_ {
        let structure = self.structure;
        self.atom_set
            .iter_ones()
            .map(move |i| AtomProxy::new(structure, i))
    }

    pub fn residues(&self) -> impl Iterator<Item = ResidueProxy<'a>> + '_ {
        let structure = self.structure;
        (0..structure.residue_count())
            .filter(move |&ri| self.atom_set.any_in(structure.residue_atom_range(ri)))
            .map(move |ri| ResidueProxy::new(structure, ri))
    }

    pub fn chains(&self) -> impl Iterator<Item = ChainProxy<'a>> + '_ {
        let structure = self.structure;
        (0..structure.chain_count())
            .filter(move |&ci| self.atom_set.any_in(structure.chain_atom_range(ci)))
            .map(move |ci| ChainProxy::new(structure, ci))
    }

    pub fn models(&self) -> impl Iterator<Item = ModelProxy<'a>> + '_ {
        let structure = self.structure;
        (0..structure.model_count())
            .filter(move |&mi| self.atom_set.any_in(structure.model_atom_range(mi)))
            .map(move |mi| ModelProxy::new(structure, mi))
    }

    pub fn each_atom<F: FnMut(AtomProxy<'a>)>(&self, f: F) {
        self.atoms().for_each(f);
    }

    pub fn each_residue<F: FnMut(ResidueProxy<'a>)>(&self, f: F) {
        self.residues().for_each(f);
    }

    pub fn each_chain<F: FnMut(ChainProxy<'a>)>(&self, f: F) {
        self.chains().for_each(f);
    }

    pub fn each_model<F: FnMut(ModelProxy<'a>)>(&self, f: F) {
        self.models().for_each(f);
    }

    pub fn atom_count(&self) -> usize {
        self.atom_set.count_ones()
    }

    pub fn residue_count(&self) -> usize {
        self.residues().count()
    }

    pub fn chain_count(&self) -> usize {
        self.chains().count()
    }

    pub fn model_count(&self) -> usize {
        self.models().count()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.atoms().map(|a| a.position()))
    }
}
