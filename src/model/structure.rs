use super::assembly::{Assembly, BiomolDict};
use super::atom_map::AtomMap;
use super::bond::{BondHash, BondStore};
use super::bounds::BoundingBox;
use super::grid::SpatialHash;
use super::polymer::Polymer;
use super::proxy::{AtomProxy, BondProxy, ChainProxy, ModelProxy, ResidueProxy};
use super::residue_map::ResidueMap;
use super::residue_type::ResidueType;
use super::store::{AtomStore, ChainStore, ModelStore, ResidueStore};
use super::types::Point;
use super::unitcell::Unitcell;
use super::view::StructureView;
use crate::utils::bitarray::BitArray;
use smol_str::SmolStr;
use std::fmt;
use std::ops::Range;

/// Kind of molecular entity a group of chains belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityType {
    Polymer,
    NonPolymer,
    Macrolide,
    Water,
    #[default]
    Unknown,
}

impl EntityType {
    /// Parses the entity type names used by mmCIF and MMTF, ignoring case.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "polymer" => EntityType::Polymer,
            "non-polymer" => EntityType::NonPolymer,
            "macrolide" => EntityType::Macrolide,
            "water" => EntityType::Water,
            _ => EntityType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    pub description: String,
    pub entity_type: EntityType,
    pub chain_indices: Vec<u32>,
}

/// A residue addressed the way annotation records address it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueRef {
    pub chain_name: SmolStr,
    pub resno: i32,
    /// Insertion code; `0` when absent.
    pub inscode: u8,
}

impl ResidueRef {
    pub fn new(chain_name: &str, resno: i32, inscode: Option<char>) -> Self {
        Self {
            chain_name: SmolStr::new(chain_name),
            resno,
            inscode: inscode.map_or(0, |c| c as u8),
        }
    }

    pub(crate) fn matches(&self, resno: i32, inscode: u8) -> bool {
        let blank = |c: u8| c == 0 || c == b' ';
        self.resno == resno && (self.inscode == inscode || (blank(self.inscode) && blank(inscode)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelixAnnotation {
    pub start: ResidueRef,
    pub end: ResidueRef,
    /// Numeric helix class of the source record (1 = right-handed alpha).
    pub helix_class: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetAnnotation {
    pub start: ResidueRef,
    pub end: ResidueRef,
}

/// Helix and strand ranges parsed from the input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecondaryAnnotations {
    pub helices: Vec<HelixAnnotation>,
    pub sheets: Vec<SheetAnnotation>,
}

impl SecondaryAnnotations {
    pub fn is_empty(&self) -> bool {
        self.helices.is_empty() && self.sheets.is_empty()
    }
}

/// A finalized molecular structure: columnar stores plus everything derived from them.
///
/// All stores are owned here. Proxies and views borrow the structure and never copy
/// store columns.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    pub id: String,
    pub title: String,

    pub atom_store: AtomStore,
    pub residue_store: ResidueStore,
    pub chain_store: ChainStore,
    pub model_store: ModelStore,
    pub atom_map: AtomMap,
    pub residue_map: ResidueMap,

    pub bond_store: BondStore,
    /// Trace-to-trace pseudo-bonds between consecutive polymer residues.
    pub backbone_bond_store: BondStore,
    /// Trace-to-rung-end pseudo-bonds of nucleotides.
    pub rung_bond_store: BondStore,
    pub bond_hash: Option<BondHash>,
    pub atom_hash: Option<SpatialHash>,
    pub backbone_atom_set: BitArray,
    pub rung_atom_set: BitArray,

    pub bounding_box: BoundingBox,
    pub center: Point,
    pub unitcell: Option<Unitcell>,
    pub biomol_dict: BiomolDict,
    pub entity_list: Vec<Entity>,
    pub secondary_annotations: SecondaryAnnotations,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom_count(&self) -> usize {
        self.atom_store.count()
    }

    pub fn residue_count(&self) -> usize {
        self.residue_store.count()
    }

    pub fn chain_count(&self) -> usize {
        self.chain_store.count()
    }

    pub fn model_count(&self) -> usize {
        self.model_store.count()
    }

    pub fn bond_count(&self) -> usize {
        self.bond_store.count()
    }

    pub fn is_empty(&self) -> bool {
        self.atom_count() == 0
    }

    /// Computes the bounding box, center, and spatial hash from the atom coordinates.
    ///
    /// Must be called again whenever coordinates change.
    pub fn finalize_atoms(&mut self) {
        let n = self.atom_count();
        self.bounding_box =
            BoundingBox::from_points((0..n).map(|i| self.atom_store.position(i)));
        self.center = self.bounding_box.center();
        self.atom_hash = Some(SpatialHash::from_atoms(&self.atom_store));
    }

    /// Builds the per-atom bond index. Bonds added afterwards need another call.
    pub fn finalize_bonds(&mut self) {
        self.bond_hash = Some(BondHash::new(&self.bond_store, self.atom_count()));
    }

    /// Registers the asymmetric unit as the identity assembly `AU`.
    pub fn add_asymmetric_unit(&mut self) {
        self.biomol_dict.insert(Assembly::identity("AU"));
    }

    pub fn residue_type(&self, residue_index: usize) -> &ResidueType {
        self.residue_map
            .get(self.residue_store.residue_type_id[residue_index])
    }

    pub fn residue_atom_range(&self, residue_index: usize) -> Range<usize> {
        let offset = self.residue_store.atom_offset[residue_index] as usize;
        offset..offset + self.residue_store.atom_count[residue_index] as usize
    }

    pub fn chain_residue_range(&self, chain_index: usize) -> Range<usize> {
        let offset = self.chain_store.residue_offset[chain_index] as usize;
        offset..offset + self.chain_store.residue_count[chain_index] as usize
    }

    pub fn chain_atom_range(&self, chain_index: usize) -> Range<usize> {
        let residues = self.chain_residue_range(chain_index);
        if residues.is_empty() {
            return 0..0;
        }
        let start = self.residue_atom_range(residues.start).start;
        let end = self.residue_atom_range(residues.end - 1).end;
        start..end
    }

    pub fn chain_atom_count(&self, chain_index: usize) -> usize {
        self.chain_atom_range(chain_index).len()
    }

    pub fn model_chain_range(&self, model_index: usize) -> Range<usize> {
        let offset = self.model_store.chain_offset[model_index] as usize;
        offset..offset + self.model_store.chain_count[model_index] as usize
    }

    pub fn model_residue_range(&self, model_index: usize) -> Range<usize> {
        let chains = self.model_chain_range(model_index);
        if chains.is_empty() {
            return 0..0;
        }
        let start = self.chain_residue_range(chains.start).start;
        let end = self.chain_residue_range(chains.end - 1).end;
        start..end
    }

    pub fn model_atom_range(&self, model_index: usize) -> Range<usize> {
        let residues = self.model_residue_range(model_index);
        if residues.is_empty() {
            return 0..0;
        }
        let start = self.residue_atom_range(residues.start).start;
        let end = self.residue_atom_range(residues.end - 1).end;
        start..end
    }

    pub fn atom(&self, index: usize) -> AtomProxy<'_> {
        AtomProxy::new(self, index)
    }

    pub fn residue(&self, index: usize) -> ResidueProxy<'_> {
        ResidueProxy::new(self, index)
    }

    pub fn chain(&self, index: usize) -> ChainProxy<'_> {
        ChainProxy::new(self, index)
    }

    pub fn model(&self, index: usize) -> ModelProxy<'_> {
        ModelProxy::new(self, index)
    }

    pub fn bond(&self, index: usize) -> BondProxy<'_> {
        BondProxy::new(self, &self.bond_store, index)
    }

    pub fn atoms(&self) -> impl Iterator<Item = AtomProxy<'_>> {
        (0..self.atom_count()).map(move |i| self.atom(i))
    }

    pub fn residues(&self) -> impl Iterator<Item = ResidueProxy<'_>> {
        (0..self.residue_count()).map(move |i| self.residue(i))
    }

    pub fn chains(&self) -> impl Iterator<Item = ChainProxy<'_>> {
        (0..self.chain_count()).map(move |i| self.chain(i))
    }

    pub fn models(&self) -> impl Iterator<Item = ModelProxy<'_>> {
        (0..self.model_count()).map(move |i| self.model(i))
    }

    pub fn bonds(&self) -> impl Iterator<Item = BondProxy<'_>> {
        (0..self.bond_count()).map(move |i| self.bond(i))
    }

    pub fn backbone_bonds(&self) -> impl Iterator<Item = BondProxy<'_>> {
        (0..self.backbone_bond_store.count())
            .map(move |i| BondProxy::new(self, &self.backbone_bond_store, i))
    }

    pub fn rung_bonds(&self) -> impl Iterator<Item = BondProxy<'_>> {
        (0..self.rung_bond_store.count())
            .map(move |i| BondProxy::new(self, &self.rung_bond_store, i))
    }

    /// Polymers of every chain, in chain order.
    pub fn polymers(&self) -> Vec<Polymer<'_>> {
        self.chains().flat_map(|chain| chain.polymers()).collect()
    }

    /// A bit array over all atoms, initialized to `value`.
    pub fn atom_set(&self, value: bool) -> BitArray {
        BitArray::new(self.atom_count(), value)
    }

    pub fn view(&self, atom_set: BitArray) -> StructureView<'_> {
        StructureView::new(self, atom_set)
    }

    /// A view that shows every atom.
    pub fn full_view(&self) -> StructureView<'_> {
        self.view(self.atom_set(true))
    }

    /// Chain names in first-occurrence order without duplicates.
    pub fn unique_chain_names(&self) -> Vec<SmolStr> {
        let mut names: Vec<SmolStr> = Vec::new();
        for name in &self.chain_store.chain_name[..self.chain_count()] {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Structure {} ({} models, {} chains, {} residues, {} atoms, {} bonds)",
            if self.id.is_empty() { "<unnamed>" } else { &self.id },
            self.model_count(),
            self.chain_count(),
            self.residue_count(),
            self.atom_count(),
            self.bond_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use approx::assert_relative_eq;

    #[test]
    fn counts_partition_residues_and_atoms() {
        let structure = fixtures::two_chain_peptide();
        let chain_residues: usize = (0..structure.chain_count())
            .map(|ci| structure.chain_store.residue_count[ci] as usize)
            .sum();
        let residue_atoms: usize = (0..structure.residue_count())
            .map(|ri| structure.residue_store.atom_count[ri] as usize)
            .sum();
        assert_eq!(chain_residues, structure.residue_count());
        assert_eq!(residue_atoms, structure.atom_count());
    }

    #[test]
    fn residue_atom_slices_are_contiguous_and_disjoint() {
        let structure = fixtures::two_chain_peptide();
        let mut expected_start = 0;
        for ri in 0..structure.residue_count() {
            let range = structure.residue_atom_range(ri);
            assert_eq!(range.start, expected_start);
            assert!(!range.is_empty());
            for ai in range.clone() {
                assert_eq!(structure.atom_store.residue_index[ai] as usize, ri);
            }
            expected_start = range.end;
        }
        assert_eq!(expected_start, structure.atom_count());
    }

    #[test]
    fn finalize_atoms_sets_bounds_center_and_hash() {
        let mut structure = fixtures::helix_peptide(6);
        structure.atom_hash = None;
        structure.finalize_atoms();

        let bbox = structure.bounding_box;
        for i in 0..structure.atom_count() {
            let p = structure.atom_store.position(i);
            assert!(p.x >= bbox.min.x - 1e-6 && p.x <= bbox.max.x + 1e-6);
        }
        assert_relative_eq!(structure.center, bbox.center());
        assert_eq!(
            structure.atom_hash.as_ref().map(SpatialHash::len),
            Some(structure.atom_count())
        );
    }

    #[test]
    fn model_and_chain_ranges_cover_structure() {
        let structure = fixtures::two_chain_peptide();
        assert_eq!(structure.model_count(), 1);
        assert_eq!(structure.model_chain_range(0), 0..2);
        assert_eq!(structure.model_atom_range(0), 0..structure.atom_count());
        let a = structure.chain_atom_range(0);
        let b = structure.chain_atom_range(1);
        assert_eq!(a.end, b.start);
    }

    #[test]
    fn unique_chain_names_drops_repeats_in_first_seen_order() {
        let (phi, psi) = fixtures::HELIX_PHI_PSI;
        let residues = fixtures::backbone(2, phi, psi);
        let mut builder = crate::model::builder::StructureBuilder::new();
        for (k, chain) in ["B", "A", "B"].into_iter().enumerate() {
            let offset = nalgebra::Vector3::new(20.0 * k as f64, 0.0, 0.0);
            fixtures::push_backbone(&mut builder, chain, 1 + 10 * k as i32, &residues, offset);
        }
        let structure = fixtures::finish(builder);

        assert_eq!(structure.chain_count(), 3);
        let names = structure.unique_chain_names();
        assert_eq!(names.iter().map(|n| n.as_str()).collect::<Vec<_>>(), ["B", "A"]);
    }

    #[test]
    fn add_asymmetric_unit_registers_identity() {
        let mut structure = fixtures::two_chain_peptide();
        structure.add_asymmetric_unit();
        let au = structure.biomol_dict.get("AU").unwrap();
        assert!(au.is_identity(&structure));
    }

    #[test]
    fn residue_ref_treats_blank_inscodes_as_equal() {
        let r = ResidueRef::new("A", 10, None);
        assert!(r.matches(10, 0));
        assert!(r.matches(10, b' '));
        assert!(!r.matches(10, b'A'));
        assert!(!r.matches(11, 0));
    }

    #[test]
    fn entity_type_parses_known_names() {
        assert_eq!(EntityType::from_name("Non-Polymer"), EntityType::NonPolymer);
        assert_eq!(EntityType::from_name("water"), EntityType::Water);
        assert_eq!(EntityType::from_name("branched"), EntityType::Unknown);
    }
}
