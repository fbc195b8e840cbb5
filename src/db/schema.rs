use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ResidueTablesFile {
    pub names: ResidueNames,
    pub chem_comp: ChemCompTypes,
    pub backbone_atoms: BackboneAtoms,
    pub landmarks: LandmarkTable,
    #[serde(default)]
    pub double_bonds: HashMap<String, Vec<[String; 2]>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ResidueNames {
    pub amino_acids: Vec<String>,
    pub rna_bases: Vec<String>,
    pub dna_bases: Vec<String>,
    pub purine_bases: Vec<String>,
    pub water: Vec<String>,
    pub ions: Vec<String>,
    pub saccharides: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ChemCompTypes {
    pub protein: Vec<String>,
    pub rna: Vec<String>,
    pub dna: Vec<String>,
    pub saccharide: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BackboneAtoms {
    pub protein: Vec<String>,
    pub nucleic: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct LandmarkTable {
    pub protein: Landmarks,
    pub rna: Landmarks,
    pub dna: Landmarks,
    pub cg_protein: Landmarks,
    pub cg_rna: Landmarks,
    pub cg_dna: Landmarks,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Landmarks {
    #[serde(default)]
    pub trace: Vec<String>,
    #[serde(default)]
    pub direction1: Vec<String>,
    #[serde(default)]
    pub direction2: Vec<String>,
    #[serde(default)]
    pub backbone_start: Vec<String>,
    #[serde(default)]
    pub backbone_end: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SpaceGroupFile {
    pub space_groups: Vec<SpaceGroupEntry>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SpaceGroupEntry {
    pub symbol: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub operators: Vec<String>,
}
