//! # molcore
//!
//! **molcore** is a columnar molecular structure engine. Parsers feed atoms into a
//! [`StructureBuilder`], which lays them out as struct-of-arrays stores with interned atom
//! and residue types. The [`ops`] pipeline then derives everything a viewer or analysis
//! tool needs from raw coordinates: covalent bonds, backbone and rung pseudo-bonds,
//! secondary structure, generated chain names, and crystallographic assemblies.
//!
//! ## Features
//!
//! - **Columnar stores** – Atoms, residues, chains, models, and bonds live in growable
//!   parallel columns; [`AtomProxy`] and friends read them without copying.
//! - **Interned types** – Atom names and residue compositions are stored once and shared
//!   by id, with residue classification (protein, nucleic acid, water, ion, saccharide,
//!   coarse-grained) computed at interning time.
//! - **Spatial indices** – A uniform grid answers radius queries for ligand bonding and a
//!   k-d tree handles bonding inside large residues.
//! - **Bond inference** – Per-residue-type templates, backbone links, nucleotide rungs,
//!   explicit connection records, and ligand contacts.
//! - **Secondary structure** – Annotation records, a geometric helix and strand
//!   classifier, and a helix-orientation path for coarse-grained chains.
//! - **Symmetry** – Unit cells, space-group operators, and `UNITCELL`/`SUPERCELL`
//!   assemblies with optional NCS expansion.
//!
//! With the default `parallel` feature, per-residue work runs on `rayon`; results are
//! identical without it.

mod db;
pub mod model;
pub mod ops;
mod utils;

pub use model::assembly::{Assembly, AssemblyPart, BiomolDict};
pub use model::builder::{AtomRecord, ResidueSite, StructureBuilder};
pub use model::polymer::Polymer;
pub use model::proxy::{AtomProxy, BondProxy, ChainProxy, ModelProxy, ResidueProxy};
pub use model::structure::Structure;
pub use model::types::{
    BackboneType, BondOrder, Element, MoleculeType, Point, SecondaryStructure,
};
pub use model::unitcell::{Unitcell, UnitcellParams};
pub use model::view::StructureView;
pub use utils::bitarray::BitArray;
