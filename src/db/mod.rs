//! Embedded reference tables: residue vocabularies, backbone landmark atoms, known double
//! bonds, and crystallographic space-group operators.
//!
//! The tables are compiled into the binary as TOML and parsed once on first access.

mod loader;
mod schema;
mod store;

pub use schema::Landmarks;

use crate::model::types::BackboneType;

/// Canonical lookup key for a Hermann-Mauguin symbol: upper-case, single-spaced.
pub(crate) fn normalize_symbol(symbol: &str) -> String {
    symbol
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

pub fn is_amino_acid(res_name: &str) -> bool {
    store::get_store().amino_acids.contains(res_name)
}

pub fn is_rna_base(res_name: &str) -> bool {
    store::get_store().rna_bases.contains(res_name)
}

pub fn is_dna_base(res_name: &str) -> bool {
    store::get_store().dna_bases.contains(res_name)
}

/// Standard RNA or DNA base names.
pub fn is_base(res_name: &str) -> bool {
    is_rna_base(res_name) || is_dna_base(res_name)
}

pub fn is_purine(res_name: &str) -> bool {
    store::get_store().purine_bases.contains(res_name)
}

pub fn is_water(res_name: &str) -> bool {
    store::get_store().water.contains(res_name)
}

pub fn is_ion(res_name: &str) -> bool {
    store::get_store().ions.contains(res_name)
}

pub fn is_saccharide(res_name: &str) -> bool {
    store::get_store().saccharides.contains(res_name)
}

pub fn is_protein_chem_comp(chem_comp_type: &str) -> bool {
    store::get_store()
        .chem_comp_protein
        .contains(&chem_comp_type.to_uppercase())
}

pub fn is_rna_chem_comp(chem_comp_type: &str) -> bool {
    store::get_store()
        .chem_comp_rna
        .contains(&chem_comp_type.to_uppercase())
}

pub fn is_dna_chem_comp(chem_comp_type: &str) -> bool {
    store::get_store()
        .chem_comp_dna
        .contains(&chem_comp_type.to_uppercase())
}

pub fn is_saccharide_chem_comp(chem_comp_type: &str) -> bool {
    store::get_store()
        .chem_comp_saccharide
        .contains(&chem_comp_type.to_uppercase())
}

pub fn is_protein_backbone_atom(atom_name: &str) -> bool {
    store::get_store().protein_backbone_atoms.contains(atom_name)
}

pub fn is_nucleic_backbone_atom(atom_name: &str) -> bool {
    store::get_store().nucleic_backbone_atoms.contains(atom_name)
}

/// Landmark atom names for a backbone type; `None` for [`BackboneType::Unknown`].
pub fn landmarks(backbone: BackboneType) -> Option<&'static Landmarks> {
    let table = &store::get_store().landmarks;
    match backbone {
        BackboneType::Unknown => None,
        BackboneType::Protein => Some(&table.protein),
        BackboneType::Rna => Some(&table.rna),
        BackboneType::Dna => Some(&table.dna),
        BackboneType::CgProtein => Some(&table.cg_protein),
        BackboneType::CgRna => Some(&table.cg_rna),
        BackboneType::CgDna => Some(&table.cg_dna),
    }
}

/// Bond order for an intra-residue bond between two named atoms.
///
/// Peptide carbonyls and nucleotide phosphate `P=OP1` bonds are double, as are the
/// tabulated aromatic and carboxyl bonds of standard residues; everything else is single.
pub fn bond_order_from_table(res_name: &str, atom_name1: &str, atom_name2: &str) -> u8 {
    let (a1, a2) = if atom_name1 < atom_name2 {
        (atom_name1, atom_name2)
    } else {
        (atom_name2, atom_name1)
    };

    if is_amino_acid(res_name) && a1 == "C" && a2 == "O" {
        return 2;
    }
    if is_base(res_name) && a1 == "OP1" && a2 == "P" {
        return 2;
    }

    store::get_store()
        .double_bonds
        .get(&format!("{}|{}|{}", res_name, a1, a2))
        .copied()
        .unwrap_or(1)
}

/// Resolves a space-group symbol or alias to its canonical symbol.
pub fn canonical_space_group(symbol: &str) -> Option<&'static str> {
    store::get_store()
        .space_groups
        .get(&normalize_symbol(symbol))
        .map(String::as_str)
}

/// Operator strings (e.g. `"-x,y+1/2,-z"`) of a space group, looked up by symbol or alias.
pub fn space_group_operators(symbol: &str) -> Option<&'static [String]> {
    let canonical = canonical_space_group(symbol)?;
    store::get_store()
        .operators
        .get(canonical)
        .map(Vec::as_slice)
}

/// Canonical symbols of every space group in the embedded table, sorted.
pub fn space_group_symbols() -> Vec<&'static str> {
    let mut symbols: Vec<&'static str> = store::get_store()
        .operators
        .keys()
        .map(String::as_str)
        .collect();
    symbols.sort_unstable();
    symbols
}
