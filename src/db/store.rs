use super::loader;
use super::schema::LandmarkTable;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

pub struct DataStore {
    pub amino_acids: HashSet<String>,
    pub rna_bases: HashSet<String>,
    pub dna_bases: HashSet<String>,
    pub purine_bases: HashSet<String>,
    pub water: HashSet<String>,
    pub ions: HashSet<String>,
    pub saccharides: HashSet<String>,
    pub chem_comp_protein: HashSet<String>,
    pub chem_comp_rna: HashSet<String>,
    pub chem_comp_dna: HashSet<String>,
    pub chem_comp_saccharide: HashSet<String>,
    pub protein_backbone_atoms: HashSet<String>,
    pub nucleic_backbone_atoms: HashSet<String>,
    pub landmarks: LandmarkTable,
    /// `"RES|ATOM1|ATOM2"` with sorted atom names mapped to bond order.
    pub double_bonds: HashMap<String, u8>,
    /// Normalized symbol or alias mapped to the canonical symbol.
    pub space_groups: HashMap<String, String>,
    /// Canonical symbol mapped to its operator strings.
    pub operators: HashMap<String, Vec<String>>,
}

static STORE: OnceLock<DataStore> = OnceLock::new();

pub fn get_store() -> &'static DataStore {
    STORE.get_or_init(loader::load_tables)
}
