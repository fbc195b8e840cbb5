use super::schema::{ResidueTablesFile, SpaceGroupFile};
use super::store::DataStore;
use std::collections::{HashMap, HashSet};

pub fn load_tables() -> DataStore {
    macro_rules! load_table {
        ($ty:ty, $path:literal) => {{
            let content = include_str!(concat!("../../data/", $path));
            toml::from_str::<$ty>(content)
                .unwrap_or_else(|e| panic!("Failed to parse data table '{}': {}", $path, e))
        }};
    }

    let residues = load_table!(ResidueTablesFile, "residues.toml");
    let space_group_file = load_table!(SpaceGroupFile, "spacegroups.toml");

    let mut space_groups = HashMap::new();
    let mut operators = HashMap::new();
    for entry in space_group_file.space_groups {
        if operators.contains_key(&entry.symbol) {
            panic!("Duplicate space group symbol found: {}", entry.symbol);
        }
        for alias in &entry.aliases {
            space_groups.insert(super::normalize_symbol(alias), entry.symbol.clone());
        }
        space_groups.insert(super::normalize_symbol(&entry.symbol), entry.symbol.clone());
        operators.insert(entry.symbol, entry.operators);
    }

    let set = |names: &[String]| names.iter().cloned().collect::<HashSet<_>>();

    let double_bonds = residues
        .double_bonds
        .iter()
        .flat_map(|(res, pairs)| {
            pairs
                .iter()
                .map(move |[a, b]| (format!("{}|{}|{}", res, a, b), 2u8))
        })
        .collect();

    DataStore {
        amino_acids: set(&residues.names.amino_acids),
        rna_bases: set(&residues.names.rna_bases),
        dna_bases: set(&residues.names.dna_bases),
        purine_bases: set(&residues.names.purine_bases),
        water: set(&residues.names.water),
        ions: set(&residues.names.ions),
        saccharides: set(&residues.names.saccharides),
        chem_comp_protein: set(&residues.chem_comp.protein),
        chem_comp_rna: set(&residues.chem_comp.rna),
        chem_comp_dna: set(&residues.chem_comp.dna),
        chem_comp_saccharide: set(&residues.chem_comp.saccharide),
        protein_backbone_atoms: set(&residues.backbone_atoms.protein),
        nucleic_backbone_atoms: set(&residues.backbone_atoms.nucleic),
        landmarks: residues.landmarks,
        double_bonds,
        space_groups,
        operators,
    }
}
