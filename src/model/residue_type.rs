//! Classification and landmark lookup for one interned residue composition.
//!
//! A [`ResidueType`] is computed once per distinct `(name, atoms, hetero, component)`
//! tuple and shared by every residue with that composition. Atom positions inside a
//! type are expressed as offsets from the residue's first atom.

use super::atom_map::AtomMap;
use super::types::{BackboneType, MoleculeType};
use crate::db;
use smol_str::SmolStr;

/// Phosphate-side atoms shared by RNA and DNA backbones.
const NUCLEIC_LINK: &[&str] = &["P", "O3'", "O3*"];
const RIBOSE_C4: &[&str] = &["C4'", "C4*"];
const RIBOSE_C3: &[&str] = &["C3'", "C3*"];
/// 2'-hydroxyl (or 2'-fluoro) atoms that distinguish RNA from DNA.
const RIBOSE_O2: &[&str] = &["O2'", "O2*", "F2'", "F2*"];

const CG_PROTEIN_MAX_ATOMS: usize = 7;
const CG_NUCLEIC_MAX_ATOMS: usize = 11;

/// Intra-residue template bonds as residue-local atom offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResidueBonds {
    pub atom_indices1: Vec<u32>,
    pub atom_indices2: Vec<u32>,
    pub bond_orders: Vec<u8>,
}

impl ResidueBonds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, offset1: u32, offset2: u32, order: u8) {
        self.atom_indices1.push(offset1);
        self.atom_indices2.push(offset2);
        self.bond_orders.push(order);
    }

    pub fn len(&self) -> usize {
        self.atom_indices1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atom_indices1.is_empty()
    }

    /// Position of the bond between two offsets, in either order.
    pub fn find(&self, offset1: u32, offset2: u32) -> Option<usize> {
        (0..self.len()).find(|&i| {
            let (a, b) = (self.atom_indices1[i], self.atom_indices2[i]);
            (a == offset1 && b == offset2) || (a == offset2 && b == offset1)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, u8)> + '_ {
        (0..self.len()).map(move |i| {
            (
                self.atom_indices1[i],
                self.atom_indices2[i],
                self.bond_orders[i],
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResidueType {
    pub res_name: SmolStr,
    pub atom_type_ids: Vec<u32>,
    pub hetero: bool,
    /// Chemical component type from the source file; `None` when not supplied.
    pub chem_comp_type: Option<SmolStr>,

    pub molecule_type: MoleculeType,
    /// Backbone type of a residue in the middle of a polymer.
    pub backbone_type: BackboneType,
    /// Backbone type when the residue ends a polymer.
    pub backbone_end_type: BackboneType,
    /// Backbone type when the residue starts a polymer.
    pub backbone_start_type: BackboneType,
    /// Offsets of backbone atoms, by the protein or nucleic backbone name list.
    pub backbone_indices: Vec<u32>,

    pub trace_atom_index: Option<u32>,
    pub direction1_atom_index: Option<u32>,
    pub direction2_atom_index: Option<u32>,
    pub backbone_start_atom_index: Option<u32>,
    pub backbone_end_atom_index: Option<u32>,
    /// `N1` for purines and `N3` otherwise; anchors the depiction-only rung bond.
    pub rung_end_atom_index: Option<u32>,

    bonds: Option<ResidueBonds>,
}

/// Atom names of a residue, resolved once for classification.
struct Composition<'a> {
    names: Vec<&'a str>,
}

impl<'a> Composition<'a> {
    fn index_of<S: AsRef<str>>(&self, candidates: &[S]) -> Option<u32> {
        self.names
            .iter()
            .position(|name| candidates.iter().any(|c| c.as_ref() == *name))
            .map(|i| i as u32)
    }

    fn has(&self, candidates: &[&str]) -> bool {
        self.index_of(candidates).is_some()
    }

    /// Every non-empty candidate list must match at least one atom.
    fn has_all(&self, lists: &[&[String]]) -> bool {
        lists
            .iter()
            .filter(|list| !list.is_empty())
            .all(|list| self.index_of(list).is_some())
    }
}

impl ResidueType {
    pub fn new(
        atom_map: &AtomMap,
        res_name: &str,
        atom_type_ids: Vec<u32>,
        hetero: bool,
        chem_comp_type: Option<&str>,
        bonds: Option<ResidueBonds>,
    ) -> Self {
        let chem_comp_type = chem_comp_type
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(SmolStr::new);

        let composition = Composition {
            names: atom_type_ids
                .iter()
                .map(|&id| atom_map.get(id).name.as_str())
                .collect(),
        };

        let mut residue_type = Self {
            res_name: SmolStr::new(res_name),
            atom_type_ids: Vec::new(),
            hetero,
            chem_comp_type,
            molecule_type: MoleculeType::Unknown,
            backbone_type: BackboneType::Unknown,
            backbone_end_type: BackboneType::Unknown,
            backbone_start_type: BackboneType::Unknown,
            backbone_indices: Vec::new(),
            trace_atom_index: None,
            direction1_atom_index: None,
            direction2_atom_index: None,
            backbone_start_atom_index: None,
            backbone_end_atom_index: None,
            rung_end_atom_index: None,
            bonds,
        };

        residue_type.molecule_type = residue_type.classify(&composition);
        residue_type.backbone_type = residue_type.backbone_at(&composition, 0);
        residue_type.backbone_end_type = residue_type.backbone_at(&composition, -1);
        residue_type.backbone_start_type = residue_type.backbone_at(&composition, 1);
        residue_type.backbone_indices = residue_type.backbone_atom_offsets(&composition);

        if let Some(marks) = db::landmarks(residue_type.backbone_type) {
            residue_type.trace_atom_index = composition.index_of(&marks.trace);
            residue_type.direction1_atom_index = composition.index_of(&marks.direction1);
            residue_type.direction2_atom_index = composition.index_of(&marks.direction2);
        }
        if let Some(marks) = db::landmarks(residue_type.backbone_start_type) {
            residue_type.backbone_start_atom_index =
                composition.index_of(&marks.backbone_start);
        }
        if let Some(marks) = db::landmarks(residue_type.backbone_end_type) {
            residue_type.backbone_end_atom_index = composition.index_of(&marks.backbone_end);
        }

        let rung_end = if db::is_purine(res_name) { "N1" } else { "N3" };
        residue_type.rung_end_atom_index = composition.index_of(&[rung_end]);

        residue_type.atom_type_ids = atom_type_ids;
        residue_type
    }

    pub fn atom_count(&self) -> usize {
        self.atom_type_ids.len()
    }

    /// Offset of the first atom whose name appears in `names`.
    pub fn atom_index_by_name(&self, atom_map: &AtomMap, names: &[&str]) -> Option<u32> {
        self.atom_type_ids
            .iter()
            .position(|&id| names.contains(&atom_map.get(id).name.as_str()))
            .map(|i| i as u32)
    }

    pub fn is_protein(&self) -> bool {
        self.molecule_type == MoleculeType::Protein
    }

    pub fn is_rna(&self) -> bool {
        self.molecule_type == MoleculeType::Rna
    }

    pub fn is_dna(&self) -> bool {
        self.molecule_type == MoleculeType::Dna
    }

    pub fn is_nucleic(&self) -> bool {
        self.is_rna() || self.is_dna()
    }

    pub fn is_polymer(&self) -> bool {
        self.is_protein() || self.is_nucleic()
    }

    pub fn is_water(&self) -> bool {
        self.molecule_type == MoleculeType::Water
    }

    pub fn is_ion(&self) -> bool {
        self.molecule_type == MoleculeType::Ion
    }

    pub fn is_saccharide(&self) -> bool {
        self.molecule_type == MoleculeType::Saccharide
    }

    pub fn is_hetero(&self) -> bool {
        self.hetero
    }

    pub fn is_cg(&self) -> bool {
        self.backbone_type.is_cg()
    }

    pub fn is_standard_amino_acid(&self) -> bool {
        db::is_amino_acid(&self.res_name)
    }

    pub fn is_standard_base(&self) -> bool {
        db::is_base(&self.res_name)
    }

    /// Cached template bonds, if they have been computed or assigned.
    pub fn bonds(&self) -> Option<&ResidueBonds> {
        self.bonds.as_ref()
    }

    pub fn bonds_mut(&mut self) -> Option<&mut ResidueBonds> {
        self.bonds.as_mut()
    }

    pub fn has_bonds(&self) -> bool {
        self.bonds.is_some()
    }

    pub fn set_bonds(&mut self, bonds: ResidueBonds) {
        self.bonds = Some(bonds);
    }

    fn classify(&self, c: &Composition) -> MoleculeType {
        if self.looks_protein(c) {
            MoleculeType::Protein
        } else if self.looks_rna(c) {
            MoleculeType::Rna
        } else if self.looks_dna(c) {
            MoleculeType::Dna
        } else if db::is_water(&self.res_name) {
            MoleculeType::Water
        } else if db::is_ion(&self.res_name) {
            MoleculeType::Ion
        } else if self.looks_saccharide() {
            MoleculeType::Saccharide
        } else {
            MoleculeType::Unknown
        }
    }

    fn looks_protein(&self, c: &Composition) -> bool {
        match &self.chem_comp_type {
            Some(cc) => db::is_protein_chem_comp(cc),
            None => {
                (c.has(&["CA"]) && c.has(&["C"]) && c.has(&["N"]))
                    || db::is_amino_acid(&self.res_name)
            }
        }
    }

    fn looks_rna(&self, c: &Composition) -> bool {
        match &self.chem_comp_type {
            Some(cc) => db::is_rna_chem_comp(cc),
            None if self.hetero => false,
            None => {
                (c.has(NUCLEIC_LINK) && c.has(RIBOSE_C4) && c.has(RIBOSE_O2))
                    || (db::is_rna_base(&self.res_name) && c.has(RIBOSE_O2))
            }
        }
    }

    fn looks_dna(&self, c: &Composition) -> bool {
        match &self.chem_comp_type {
            Some(cc) => db::is_dna_chem_comp(cc),
            None if self.hetero => false,
            None => {
                (c.has(NUCLEIC_LINK) && c.has(RIBOSE_C3) && !c.has(RIBOSE_O2))
                    || db::is_dna_base(&self.res_name)
            }
        }
    }

    fn looks_saccharide(&self) -> bool {
        match &self.chem_comp_type {
            Some(cc) => db::is_saccharide_chem_comp(cc),
            None => db::is_saccharide(&self.res_name),
        }
    }

    /// Backbone type assuming the residue sits at `position` in a polymer: `-1` for the
    /// last residue, `0` for an interior residue, `1` for the first residue.
    fn backbone_at(&self, c: &Composition, position: i8) -> BackboneType {
        let protein = self.looks_protein(c);
        let rna = self.looks_rna(c);
        let dna = self.looks_dna(c);
        let n = c.names.len();

        let candidates = [
            (BackboneType::Protein, protein),
            (BackboneType::Rna, rna),
            (BackboneType::Dna, dna),
            (BackboneType::CgProtein, n < CG_PROTEIN_MAX_ATOMS && protein),
            (BackboneType::CgRna, n < CG_NUCLEIC_MAX_ATOMS && rna),
            (BackboneType::CgDna, n < CG_NUCLEIC_MAX_ATOMS && dna),
        ];

        candidates
            .into_iter()
            .find(|&(ty, eligible)| eligible && Self::has_backbone_atoms(c, position, ty))
            .map(|(ty, _)| ty)
            .unwrap_or(BackboneType::Unknown)
    }

    fn has_backbone_atoms(c: &Composition, position: i8, ty: BackboneType) -> bool {
        let Some(marks) = db::landmarks(ty) else {
            return false;
        };
        match position {
            -1 => c.has_all(&[
                &marks.trace,
                &marks.backbone_end,
                &marks.direction1,
                &marks.direction2,
            ]),
            0 => c.has_all(&[&marks.trace, &marks.direction1, &marks.direction2]),
            _ => c.has_all(&[
                &marks.trace,
                &marks.backbone_start,
                &marks.direction1,
                &marks.direction2,
            ]),
        }
    }

    fn backbone_atom_offsets(&self, c: &Composition) -> Vec<u32> {
        let is_backbone: fn(&str) -> bool = match self.molecule_type {
            MoleculeType::Protein => db::is_protein_backbone_atom,
            MoleculeType::Rna | MoleculeType::Dna => db::is_nucleic_backbone_atom,
            _ => return Vec::new(),
        };
        c.names
            .iter()
            .enumerate()
            .filter(|(_, name)| is_backbone(name))
            .map(|(i, _)| i as u32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Element;

    fn build(res_name: &str, atoms: &[(&str, Element)], hetero: bool) -> ResidueType {
        build_with_chem_comp(res_name, atoms, hetero, None)
    }

    fn build_with_chem_comp(
        res_name: &str,
        atoms: &[(&str, Element)],
        hetero: bool,
        chem_comp: Option<&str>,
    ) -> ResidueType {
        let mut map = AtomMap::new();
        let ids = atoms.iter().map(|(n, e)| map.add(n, *e)).collect();
        ResidueType::new(&map, res_name, ids, hetero, chem_comp, None)
    }

    const ALA: &[(&str, Element)] = &[
        ("N", Element::N),
        ("CA", Element::C),
        ("C", Element::C),
        ("O", Element::O),
        ("CB", Element::C),
    ];

    const ADENOSINE: &[(&str, Element)] = &[
        ("P", Element::P),
        ("OP1", Element::O),
        ("OP2", Element::O),
        ("O5'", Element::O),
        ("C5'", Element::C),
        ("C4'", Element::C),
        ("O4'", Element::O),
        ("C3'", Element::C),
        ("O3'", Element::O),
        ("C2'", Element::C),
        ("O2'", Element::O),
        ("C1'", Element::C),
        ("N9", Element::N),
        ("C8", Element::C),
        ("N7", Element::N),
        ("C5", Element::C),
        ("C6", Element::C),
        ("N6", Element::N),
        ("N1", Element::N),
        ("C2", Element::C),
        ("N3", Element::N),
        ("C4", Element::C),
    ];

    #[test]
    fn alanine_classifies_as_protein_with_landmarks() {
        let ty = build("ALA", ALA, false);
        assert_eq!(ty.molecule_type, MoleculeType::Protein);
        assert_eq!(ty.backbone_type, BackboneType::Protein);
        assert_eq!(ty.backbone_start_type, BackboneType::Protein);
        assert_eq!(ty.backbone_end_type, BackboneType::Protein);
        assert_eq!(ty.trace_atom_index, Some(1));
        assert_eq!(ty.direction1_atom_index, Some(2));
        assert_eq!(ty.direction2_atom_index, Some(3));
        assert_eq!(ty.backbone_start_atom_index, Some(0));
        assert_eq!(ty.backbone_end_atom_index, Some(2));
        assert_eq!(ty.backbone_indices, vec![0, 1, 2, 3]);
        assert!(ty.is_polymer());
        assert!(!ty.is_cg());
        assert!(ty.is_standard_amino_acid());
        assert!(!ty.is_standard_base());
    }

    #[test]
    fn unknown_name_with_peptide_atoms_is_protein() {
        let ty = build("XYZ", ALA, true);
        assert!(ty.is_protein());
        assert!(!ty.is_standard_amino_acid());
    }

    #[test]
    fn lone_alpha_carbon_is_coarse_grained_protein() {
        let ty = build("GLY", &[("CA", Element::C)], false);
        assert_eq!(ty.molecule_type, MoleculeType::Protein);
        assert_eq!(ty.backbone_type, BackboneType::CgProtein);
        assert_eq!(ty.trace_atom_index, Some(0));
        assert_eq!(ty.backbone_start_atom_index, Some(0));
        assert_eq!(ty.backbone_end_atom_index, Some(0));
        assert!(ty.is_cg());
    }

    #[test]
    fn adenosine_classifies_as_rna_with_purine_rung_end() {
        let ty = build("A", ADENOSINE, false);
        assert_eq!(ty.molecule_type, MoleculeType::Rna);
        assert_eq!(ty.backbone_type, BackboneType::Rna);
        assert_eq!(ty.trace_atom_index, Some(5));
        assert_eq!(ty.backbone_start_atom_index, Some(0));
        assert_eq!(ty.backbone_end_atom_index, Some(8));
        assert_eq!(ty.rung_end_atom_index, Some(18));
        assert!(ty.is_standard_base());
        assert!(!ty.is_standard_amino_acid());
    }

    #[test]
    fn deoxy_nucleotide_without_o2_is_dna() {
        let atoms: Vec<_> = ADENOSINE
            .iter()
            .copied()
            .filter(|(name, _)| *name != "O2'")
            .collect();
        let ty = build("DA", &atoms, false);
        assert_eq!(ty.molecule_type, MoleculeType::Dna);
        assert_eq!(ty.backbone_type, BackboneType::Dna);
        assert_eq!(ty.trace_atom_index, Some(7));
    }

    #[test]
    fn hetero_nucleotide_is_not_nucleic_without_chem_comp() {
        let ty = build("ATP", ADENOSINE, true);
        assert!(!ty.is_nucleic());
    }

    #[test]
    fn chem_comp_type_overrides_atom_based_detection() {
        let ty = build_with_chem_comp("MSE", &[("SE", Element::Se)], true, Some("L-peptide linking"));
        assert!(ty.is_protein());

        let ty = build_with_chem_comp("ALA", ALA, false, Some("non-polymer"));
        assert!(!ty.is_protein());
    }

    #[test]
    fn water_ion_and_saccharide_use_name_lists() {
        assert!(build("HOH", &[("O", Element::O)], true).is_water());
        assert!(build("ZN", &[("ZN", Element::Zn)], true).is_ion());
        assert!(build("NAG", &[("C1", Element::C)], true).is_saccharide());
        let unknown = build("LIG", &[("C1", Element::C)], true);
        assert_eq!(unknown.molecule_type, MoleculeType::Unknown);
        assert_eq!(unknown.backbone_type, BackboneType::Unknown);
        assert_eq!(unknown.trace_atom_index, None);
    }

    #[test]
    fn residue_missing_carbonyl_oxygen_has_no_backbone() {
        let ty = build(
            "ALA",
            &[("N", Element::N), ("CA", Element::C), ("C", Element::C)],
            false,
        );
        assert!(ty.is_protein());
        assert_eq!(ty.backbone_type, BackboneType::CgProtein);
    }

    #[test]
    fn residue_bonds_find_matches_either_order() {
        let mut bonds = ResidueBonds::new();
        bonds.push(0, 1, 1);
        bonds.push(2, 3, 2);
        assert_eq!(bonds.find(3, 2), Some(1));
        assert_eq!(bonds.find(0, 3), None);
        assert_eq!(bonds.len(), 2);
    }

    #[test]
    fn set_bonds_caches_template() {
        let mut ty = build("ALA", ALA, false);
        assert!(!ty.has_bonds());
        let mut bonds = ResidueBonds::new();
        bonds.push(0, 1, 1);
        ty.set_bonds(bonds);
        assert_eq!(ty.bonds().map(ResidueBonds::len), Some(1));
    }
}
