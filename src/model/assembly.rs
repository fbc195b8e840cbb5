//! Named sets of affine transforms that replicate chains into assemblies.
//!
//! An [`Assembly`] never copies atoms. It records, per [`AssemblyPart`], which chains
//! are replicated and by which 4x4 matrices; consumers combine that with the parent
//! [`Structure`] to derive instance counts and extents.

use super::bounds::BoundingBox;
use super::structure::Structure;
use super::types::Point;
use super::view::StructureView;
use crate::utils::bitarray::BitArray;
use nalgebra::Matrix4;
use smol_str::SmolStr;

const IDENTITY_TOLERANCE: f64 = 1e-9;

/// A list of transforms applied to a subset of chains.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyPart {
    pub matrices: Vec<Matrix4<f64>>,
    /// Chain names this part applies to; empty means every chain.
    pub chain_names: Vec<SmolStr>,
}

impl AssemblyPart {
    pub fn new(matrices: Vec<Matrix4<f64>>, chain_names: Vec<SmolStr>) -> Self {
        Self {
            matrices,
            chain_names,
        }
    }

    /// Whether chain `chain_name` is replicated by this part.
    pub fn applies_to(&self, chain_name: &str) -> bool {
        self.chain_names.is_empty() || self.chain_names.iter().any(|c| c == chain_name)
    }

    fn selected_chains<'a>(&'a self, structure: &'a Structure) -> impl Iterator<Item = usize> + 'a {
        (0..structure.chain_count())
            .filter(move |&ci| self.applies_to(&structure.chain_store.chain_name[ci]))
    }

    /// Atoms covered by one instance of this part.
    pub fn selection_atom_count(&self, structure: &Structure) -> usize {
        self.selected_chains(structure)
            .map(|ci| structure.chain_atom_count(ci))
            .sum()
    }

    /// Atoms generated by every instance of this part.
    pub fn atom_count(&self, structure: &Structure) -> usize {
        self.matrices.len() * self.selection_atom_count(structure)
    }

    pub fn residue_count(&self, structure: &Structure) -> usize {
        let per_instance: usize = self
            .selected_chains(structure)
            .map(|ci| structure.chain_store.residue_count[ci] as usize)
            .sum();
        self.matrices.len() * per_instance
    }

    /// Atom selection of the chains this part replicates.
    pub fn atom_set(&self, structure: &Structure) -> BitArray {
        let mut set = BitArray::new(structure.atom_count(), false);
        for ci in self.selected_chains(structure) {
            set.set_range(structure.chain_atom_range(ci));
        }
        set
    }

    /// A view over the chains this part replicates.
    pub fn view<'a>(&self, structure: &'a Structure) -> StructureView<'a> {
        StructureView::new(structure, self.atom_set(structure))
    }

    /// Union of the selection's bounding box under every matrix.
    pub fn bounding_box(&self, structure: &Structure) -> BoundingBox {
        let set = self.atom_set(structure);
        let local = BoundingBox::from_points(set.iter_ones().map(|i| structure.atom_store.position(i)));
        self.matrices
            .iter()
            .fold(BoundingBox::empty(), |acc, m| acc.union(&local.transformed(m)))
    }

    /// `(instance index within this part, matrix)` pairs.
    pub fn instances(&self) -> impl Iterator<Item = (usize, &Matrix4<f64>)> {
        self.matrices.iter().enumerate()
    }
}

/// A named list of parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub name: SmolStr,
    parts: Vec<AssemblyPart>,
}

impl Assembly {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            parts: Vec::new(),
        }
    }

    /// A single identity part over all chains.
    pub fn identity(name: impl Into<SmolStr>) -> Self {
        let mut assembly = Self::new(name);
        assembly.add_part(vec![Matrix4::identity()], Vec::new());
        assembly
    }

    pub fn add_part(&mut self, matrices: Vec<Matrix4<f64>>, chain_names: Vec<SmolStr>) -> &mut AssemblyPart {
        self.parts.push(AssemblyPart::new(matrices, chain_names));
        let last = self.parts.len() - 1;
        &mut self.parts[last]
    }

    pub fn parts(&self) -> &[AssemblyPart] {
        &self.parts
    }

    pub fn atom_count(&self, structure: &Structure) -> usize {
        self.parts.iter().map(|p| p.atom_count(structure)).sum()
    }

    pub fn residue_count(&self, structure: &Structure) -> usize {
        self.parts.iter().map(|p| p.residue_count(structure)).sum()
    }

    /// Total number of transformed copies across all parts.
    pub fn instance_count(&self) -> usize {
        self.parts.iter().map(|p| p.matrices.len()).sum()
    }

    /// Whether applying this assembly reproduces the structure unchanged.
    ///
    /// True for one part carrying one identity matrix whose chain list is empty or
    /// names every chain of the structure.
    pub fn is_identity(&self, structure: &Structure) -> bool {
        let [part] = self.parts.as_slice() else {
            return false;
        };
        let [matrix] = part.matrices.as_slice() else {
            return false;
        };
        if (matrix - Matrix4::identity()).amax() > IDENTITY_TOLERANCE {
            return false;
        }
        part.chain_names.is_empty()
            || (0..structure.chain_count())
                .all(|ci| part.applies_to(&structure.chain_store.chain_name[ci]))
    }

    pub fn bounding_box(&self, structure: &Structure) -> BoundingBox {
        self.parts
            .iter()
            .fold(BoundingBox::empty(), |acc, p| acc.union(&p.bounding_box(structure)))
    }

    pub fn center(&self, structure: &Structure) -> Point {
        self.bounding_box(structure).center()
    }
}

/// Assemblies keyed by name, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiomolDict {
    entries: Vec<Assembly>,
}

impl BiomolDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `assembly`, replacing any existing entry with the same name in place.
    pub fn insert(&mut self, assembly: Assembly) {
        match self.entries.iter_mut().find(|a| a.name == assembly.name) {
            Some(slot) => *slot = assembly,
            None => self.entries.push(assembly),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Assembly> {
        self.entries.iter().find(|a| a.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Assembly> {
        self.entries.iter_mut().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|a| a.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assembly> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
