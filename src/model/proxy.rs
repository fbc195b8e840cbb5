//! Lightweight `(structure, row)` handles over the columnar stores.
//!
//! Proxies are `Copy` and never own data. Their accessors index the store columns
//! directly, so a proxy built for a row at or beyond the store's count reads
//! unspecified values or panics.

use super::atom_map::AtomType;
use super::bond::{BondStore, covalently_connected};
use super::polymer::Polymer;
use super::residue_type::ResidueType;
use super::structure::Structure;
use super::types::{BackboneType, BondOrder, Element, MoleculeType, Point, SecondaryStructure};
use std::ops::Range;

#[derive(Debug, Clone, Copy)]
pub struct AtomProxy<'a> {
    structure: &'a Structure,
    index: usize,
}

impl<'a> AtomProxy<'a> {
    pub fn new(structure: &'a Structure, index: usize) -> Self {
        Self { structure, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn structure(&self) -> &'a Structure {
        self.structure
    }

    pub fn x(&self) -> f32 {
        self.structure.atom_store.x[self.index]
    }

    pub fn y(&self) -> f32 {
        self.structure.atom_store.y[self.index]
    }

    pub fn z(&self) -> f32 {
        self.structure.atom_store.z[self.index]
    }

    pub fn position(&self) -> Point {
        self.structure.atom_store.position(self.index)
    }

    pub fn serial(&self) -> i32 {
        self.structure.atom_store.serial[self.index]
    }

    pub fn bfactor(&self) -> f32 {
        self.structure.atom_store.bfactor[self.index]
    }

    pub fn occupancy(&self) -> f32 {
        self.structure.atom_store.occupancy[self.index]
    }

    pub fn altloc(&self) -> Option<char> {
        match self.structure.atom_store.altloc[self.index] {
            0 | b' ' => None,
            code => Some(code as char),
        }
    }

    pub fn atom_type(&self) -> &'a AtomType {
        self.structure
            .atom_map
            .get(self.structure.atom_store.atom_type_id[self.index])
    }

    pub fn atom_name(&self) -> &'a str {
        self.atom_type().name.as_str()
    }

    pub fn element(&self) -> Element {
        self.atom_type().element
    }

    pub fn covalent(&self) -> f32 {
        self.atom_type().covalent
    }

    pub fn is_metal(&self) -> bool {
        self.atom_type().is_metal
    }

    pub fn residue_index(&self) -> usize {
        self.structure.atom_store.residue_index[self.index] as usize
    }

    pub fn residue(&self) -> ResidueProxy<'a> {
        ResidueProxy::new(self.structure, self.residue_index())
    }

    pub fn residue_type(&self) -> &'a ResidueType {
        self.structure.residue_type(self.residue_index())
    }

    pub fn res_name(&self) -> &'a str {
        self.residue_type().res_name.as_str()
    }

    pub fn resno(&self) -> i32 {
        self.residue().resno()
    }

    pub fn inscode(&self) -> Option<char> {
        self.residue().inscode()
    }

    pub fn hetero(&self) -> bool {
        self.residue_type().hetero
    }

    pub fn sstruc(&self) -> SecondaryStructure {
        self.residue().sstruc()
    }

    pub fn chain_index(&self) -> usize {
        self.residue().chain_index()
    }

    pub fn chain(&self) -> ChainProxy<'a> {
        self.residue().chain()
    }

    pub fn chain_name(&self) -> &'a str {
        self.chain().chain_name()
    }

    pub fn chain_id(&self) -> &'a str {
        self.chain().chain_id()
    }

    pub fn model_index(&self) -> usize {
        self.chain().model_index()
    }

    /// Offset of this atom within its residue.
    pub fn residue_atom_offset(&self) -> usize {
        self.index - self.structure.residue_store.atom_offset[self.residue_index()] as usize
    }

    pub fn is_backbone(&self) -> bool {
        let offset = self.residue_atom_offset() as u32;
        self.residue_type().backbone_indices.contains(&offset)
    }

    pub fn is_trace(&self) -> bool {
        self.residue_type().trace_atom_index == Some(self.residue_atom_offset() as u32)
    }

    pub fn distance_to(&self, other: &AtomProxy) -> f64 {
        self.position().coords.metric_distance(&other.position().coords)
    }

    /// Whether the two atoms are within covalent bonding distance.
    ///
    /// Coarse-grained residues also accept the bead distance cutoff.
    pub fn connected_to(&self, other: &AtomProxy) -> bool {
        covalently_connected(
            &self.structure.atom_store,
            &self.structure.atom_map,
            self.index,
            other.index,
            self.residue_type().is_cg(),
        )
    }

    /// Bonds touching this atom. Empty until the bond hash has been built.
    pub fn bonds(&self) -> impl Iterator<Item = BondProxy<'a>> + 'a {
        let structure = self.structure;
        let rows: &'a [u32] = match &structure.bond_hash {
            Some(hash) if self.index < hash.atom_count() => hash.bonds_of(self.index),
            _ => &[],
        };
        rows.iter()
            .map(move |&row| BondProxy::new(structure, &structure.bond_store, row as usize))
    }

    /// Indices of atoms bonded to this one.
    pub fn bonded_atom_indices(&self) -> impl Iterator<Item = usize> + 'a {
        let index = self.index;
        self.bonds().map(move |bond| bond.partner_of(index))
    }

    pub fn has_bond_to(&self, other: usize) -> bool {
        self.structure.bond_store.contains(self.index, other)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResidueProxy<'a> {
    structure: &'a Structure,
    index: usize,
}

impl<'a> ResidueProxy<'a> {
    pub fn new(structure: &'a Structure, index: usize) -> Self {
        Self { structure, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn residue_type(&self) -> &'a ResidueType {
        self.structure.residue_type(self.index)
    }

    pub fn res_name(&self) -> &'a str {
        self.residue_type().res_name.as_str()
    }

    pub fn resno(&self) -> i32 {
        self.structure.residue_store.resno[self.index]
    }

    pub fn inscode(&self) -> Option<char> {
        self.structure.residue_store.inscode_char(self.index)
    }

    pub fn sstruc(&self) -> SecondaryStructure {
        SecondaryStructure::from_code(self.structure.residue_store.sstruc[self.index])
    }

    pub fn hetero(&self) -> bool {
        self.residue_type().hetero
    }

    pub fn molecule_type(&self) -> MoleculeType {
        self.residue_type().molecule_type
    }

    pub fn backbone_type(&self) -> BackboneType {
        self.residue_type().backbone_type
    }

    pub fn backbone_start_type(&self) -> BackboneType {
        self.residue_type().backbone_start_type
    }

    pub fn backbone_end_type(&self) -> BackboneType {
        self.residue_type().backbone_end_type
    }

    pub fn is_protein(&self) -> bool {
        self.residue_type().is_protein()
    }

    pub fn is_nucleic(&self) -> bool {
        self.residue_type().is_nucleic()
    }

    pub fn is_polymer(&self) -> bool {
        self.residue_type().is_polymer()
    }

    pub fn is_water(&self) -> bool {
        self.residue_type().is_water()
    }

    pub fn is_cg(&self) -> bool {
        self.residue_type().is_cg()
    }

    pub fn atom_offset(&self) -> usize {
        self.structure.residue_store.atom_offset[self.index] as usize
    }

    pub fn atom_count(&self) -> usize {
        self.structure.residue_store.atom_count[self.index] as usize
    }

    pub fn atom_range(&self) -> Range<usize> {
        self.structure.residue_atom_range(self.index)
    }

    pub fn atoms(&self) -> impl Iterator<Item = AtomProxy<'a>> + 'a {
        let structure = self.structure;
        self.atom_range().map(move |i| AtomProxy::new(structure, i))
    }

    pub fn chain_index(&self) -> usize {
        self.structure.residue_store.chain_index[self.index] as usize
    }

    pub fn chain(&self) -> ChainProxy<'a> {
        ChainProxy::new(self.structure, self.chain_index())
    }

    pub fn chain_name(&self) -> &'a str {
        self.chain().chain_name()
    }

    pub fn model_index(&self) -> usize {
        self.chain().model_index()
    }

    fn landmark(&self, offset: Option<u32>) -> Option<AtomProxy<'a>> {
        offset.map(|o| AtomProxy::new(self.structure, self.atom_offset() + o as usize))
    }

    pub fn trace_atom(&self) -> Option<AtomProxy<'a>> {
        self.landmark(self.residue_type().trace_atom_index)
    }

    pub fn direction1_atom(&self) -> Option<AtomProxy<'a>> {
        self.landmark(self.residue_type().direction1_atom_index)
    }

    pub fn direction2_atom(&self) -> Option<AtomProxy<'a>> {
        self.landmark(self.residue_type().direction2_atom_index)
    }

    pub fn backbone_start_atom(&self) -> Option<AtomProxy<'a>> {
        self.landmark(self.residue_type().backbone_start_atom_index)
    }

    pub fn backbone_end_atom(&self) -> Option<AtomProxy<'a>> {
        self.landmark(self.residue_type().backbone_end_atom_index)
    }

    pub fn rung_end_atom(&self) -> Option<AtomProxy<'a>> {
        self.landmark(self.residue_type().rung_end_atom_index)
    }

    pub fn atom_by_name(&self, name: &str) -> Option<AtomProxy<'a>> {
        let offset = self
            .residue_type()
            .atom_index_by_name(&self.structure.atom_map, &[name]);
        self.landmark(offset)
    }

    /// Whether this residue's backbone end is bonded by distance to `next`'s backbone start.
    pub fn connected_to(&self, next: &ResidueProxy) -> bool {
        match (self.backbone_end_atom(), next.backbone_start_atom()) {
            (Some(end), Some(start)) => end.connected_to(&start),
            _ => false,
        }
    }

    /// The following residue of the same chain when connected; wraps to the chain's
    /// first residue for cyclic chains.
    pub fn next_connected(&self) -> Option<ResidueProxy<'a>> {
        let range = self.structure.chain_residue_range(self.chain_index());
        let next = if self.index + 1 < range.end {
            self.index + 1
        } else {
            range.start
        };
        let next = ResidueProxy::new(self.structure, next);
        self.connected_to(&next).then_some(next)
    }

    /// The preceding residue of the same chain when connected; wraps to the chain's
    /// last residue for cyclic chains.
    pub fn previous_connected(&self) -> Option<ResidueProxy<'a>> {
        let range = self.structure.chain_residue_range(self.chain_index());
        let prev = if self.index > range.start {
            self.index - 1
        } else {
            range.end - 1
        };
        let prev = ResidueProxy::new(self.structure, prev);
        prev.connected_to(self).then_some(prev)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChainProxy<'a> {
    structure: &'a Structure,
    index: usize,
}

impl<'a> ChainProxy<'a> {
    pub fn new(structure: &'a Structure, index: usize) -> Self {
        Self { structure, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn chain_name(&self) -> &'a str {
        self.structure.chain_store.chain_name[self.index].as_str()
    }

    pub fn chain_id(&self) -> &'a str {
        self.structure.chain_store.chain_id[self.index].as_str()
    }

    pub fn model_index(&self) -> usize {
        self.structure.chain_store.model_index[self.index] as usize
    }

    pub fn model(&self) -> ModelProxy<'a> {
        ModelProxy::new(self.structure, self.model_index())
    }

    pub fn entity_index(&self) -> usize {
        self.structure.chain_store.entity_index[self.index] as usize
    }

    pub fn residue_offset(&self) -> usize {
        self.structure.chain_store.residue_offset[self.index] as usize
    }

    pub fn residue_count(&self) -> usize {
        self.structure.chain_store.residue_count[self.index] as usize
    }

    pub fn residue_range(&self) -> Range<usize> {
        self.structure.chain_residue_range(self.index)
    }

    pub fn residues(&self) -> impl Iterator<Item = ResidueProxy<'a>> + 'a {
        let structure = self.structure;
        self.residue_range()
            .map(move |i| ResidueProxy::new(structure, i))
    }

    pub fn atom_range(&self) -> Range<usize> {
        self.structure.chain_atom_range(self.index)
    }

    pub fn atom_count(&self) -> usize {
        self.atom_range().len()
    }

    pub fn atoms(&self) -> impl Iterator<Item = AtomProxy<'a>> + 'a {
        let structure = self.structure;
        self.atom_range().map(move |i| AtomProxy::new(structure, i))
    }

    /// Runs of at least three consecutive, backbone-connected residues sharing a known
    /// backbone type.
    pub fn polymers(&self) -> Vec<Polymer<'a>> {
        let structure = self.structure;
        let range = self.residue_range();
        let mut polymers = Vec::new();
        if range.len() < 2 {
            return polymers;
        }

        let mut start = range.start;
        let mut next = range.start;
        for i in range.start + 1..range.end {
            let rp1 = ResidueProxy::new(structure, i - 1);
            let rp2 = ResidueProxy::new(structure, i);
            let type1 = if i - 1 == range.start {
                rp1.backbone_end_type()
            } else {
                rp1.backbone_type()
            };
            next = i;

            let compatible = type1.is_known() && type1 == rp2.backbone_type();
            if !compatible || !rp1.connected_to(&rp2) {
                if type1.is_known() && rp1.index() - start > 1 {
                    polymers.push(Polymer::new(structure, start, rp1.index()));
                }
                start = next;
            }
        }

        if next - start > 1
            && ResidueProxy::new(structure, start)
                .backbone_end_type()
                .is_known()
        {
            polymers.push(Polymer::new(structure, start, next));
        }
        polymers
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ModelProxy<'a> {
    structure: &'a Structure,
    index: usize,
}

impl<'a> ModelProxy<'a> {
    pub fn new(structure: &'a Structure, index: usize) -> Self {
        Self { structure, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn chain_offset(&self) -> usize {
        self.structure.model_store.chain_offset[self.index] as usize
    }

    pub fn chain_count(&self) -> usize {
        self.structure.model_store.chain_count[self.index] as usize
    }

    pub fn chains(&self) -> impl Iterator<Item = ChainProxy<'a>> + 'a {
        let structure = self.structure;
        structure
            .model_chain_range(self.index)
            .map(move |i| ChainProxy::new(structure, i))
    }

    pub fn residue_range(&self) -> Range<usize> {
        self.structure.model_residue_range(self.index)
    }

    pub fn residue_count(&self) -> usize {
        self.residue_range().len()
    }

    pub fn atom_range(&self) -> Range<usize> {
        self.structure.model_atom_range(self.index)
    }

    pub fn atom_count(&self) -> usize {
        self.atom_range().len()
    }

    pub fn polymers(&self) -> Vec<Polymer<'a>> {
        self.chains().flat_map(|chain| chain.polymers()).collect()
    }
}

/// A row of one of the structure's bond stores.
#[derive(Debug, Clone, Copy)]
pub struct BondProxy<'a> {
    structure: &'a Structure,
    store: &'a BondStore,
    index: usize,
}

impl<'a> BondProxy<'a> {
    pub fn new(structure: &'a Structure, store: &'a BondStore, index: usize) -> Self {
        Self {
            structure,
            store,
            index,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn atom_index1(&self) -> usize {
        self.store.atom_index1[self.index] as usize
    }

    pub fn atom_index2(&self) -> usize {
        self.store.atom_index2[self.index] as usize
    }

    pub fn atom1(&self) -> AtomProxy<'a> {
        AtomProxy::new(self.structure, self.atom_index1())
    }

    pub fn atom2(&self) -> AtomProxy<'a> {
        AtomProxy::new(self.structure, self.atom_index2())
    }

    pub fn bond_order(&self) -> BondOrder {
        BondOrder::from_value(self.store.bond_order[self.index])
    }

    pub fn length(&self) -> f64 {
        self.atom1().distance_to(&self.atom2())
    }

    /// The other endpoint of the bond as seen from `atom_index`.
    pub fn partner_of(&self, atom_index: usize) -> usize {
        if self.atom_index1() == atom_index {
            self.atom_index2()
        } else {
            self.atom_index1()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use crate::ops;

    #[test]
    fn atom_proxy_navigates_to_residue_chain_and_model() {
        let structure = fixtures::two_chain_peptide();
        let last = structure.atom(structure.atom_count() - 1);
        assert_eq!(last.chain_name(), "B");
        assert_eq!(last.chain_index(), 1);
        assert_eq!(last.model_index(), 0);
        assert_eq!(last.res_name(), "GLY");
        assert_eq!(last.atom_name(), "O");
        assert_eq!(last.element(), Element::O);
        assert_eq!(last.residue().chain().model().index(), 0);
    }

    #[test]
    fn residue_proxy_exposes_landmark_atoms() {
        let structure = fixtures::helix_peptide(4);
        let residue = structure.residue(1);
        assert_eq!(residue.trace_atom().map(|a| a.atom_name()), Some("CA"));
        assert_eq!(residue.backbone_start_atom().map(|a| a.atom_name()), Some("N"));
        assert_eq!(residue.backbone_end_atom().map(|a| a.atom_name()), Some("C"));
        assert_eq!(residue.direction2_atom().map(|a| a.atom_name()), Some("O"));
        assert_eq!(residue.atom_by_name("CA").map(|a| a.index()), Some(5));
        assert!(residue.atom_by_name("CB").is_none());
    }

    #[test]
    fn residue_connected_to_follows_peptide_geometry() {
        let structure = fixtures::helix_peptide(4);
        assert!(structure.residue(0).connected_to(&structure.residue(1)));
        assert!(!structure.residue(1).connected_to(&structure.residue(0)));
        assert_eq!(structure.residue(0).next_connected().map(|r| r.index()), Some(1));
        assert!(structure.residue(3).next_connected().is_none());
        assert!(structure.residue(0).previous_connected().is_none());
    }

    #[test]
    fn chain_polymers_split_at_chain_breaks() {
        let structure = fixtures::peptide_with_break(5, 4);
        let polymers = structure.chain(0).polymers();
        assert_eq!(polymers.len(), 2);
        assert_eq!(polymers[0].residue_range(), 0..5);
        assert_eq!(polymers[1].residue_range(), 5..9);
        assert!(!polymers[0].is_cyclic());
    }

    #[test]
    fn structure_polymers_cover_each_peptide_chain() {
        let structure = fixtures::two_chain_peptide();
        let polymers = structure.polymers();
        assert_eq!(polymers.len(), 2);
        assert!(polymers.iter().all(|p| p.is_protein()));
    }

    #[test]
    fn atom_bonds_use_bond_hash() {
        let mut structure = fixtures::helix_peptide(2);
        ops::calculate_bonds(&mut structure, &ops::BondConfig::default()).unwrap();
        let ca = structure.atom(1);
        assert_eq!(ca.bonds().count(), 0);

        structure.finalize_bonds();
        let ca = structure.atom(1);
        let mut partners: Vec<_> = ca.bonded_atom_indices().collect();
        partners.sort_unstable();
        assert_eq!(partners, vec![0, 2]);
        assert!(ca.has_bond_to(2));
        let bond = ca.bonds().next().unwrap();
        assert!(bond.length() > 1.3 && bond.length() < 1.6);
        assert_eq!(bond.bond_order(), BondOrder::Single);
    }

    #[test]
    fn atom_is_backbone_and_trace_flags() {
        let structure = fixtures::helix_peptide(2);
        assert!(structure.atom(1).is_trace());
        assert!(structure.atom(1).is_backbone());
        assert!(!structure.atom(0).is_trace());
    }
}
