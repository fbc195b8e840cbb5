//! Derived computations over a built structure.
//!
//! Each stage of the processing pipeline is exposed on its own: covalent bond inference,
//! generated chain names, secondary-structure assignment, and crystallographic assembly
//! expansion. [`process`] chains them in the order a freshly parsed structure needs.
//! All stages share one error type.

mod bonds;
mod chain_names;
mod config;
mod error;
mod helixorient;
mod process;
mod secondary;
pub mod symmetry;

pub use bonds::{
    Connection, add_explicit_bonds, assign_residue_type_bonds, calculate_bonds,
    calculate_bonds_between, calculate_bonds_within,
};

pub use chain_names::{calculate_chain_names, chain_name};

pub use config::{
    BondConfig, ProcessConfig, SecondaryStructureConfig, SecondaryStructureMode, SymmetryConfig,
};

pub use helixorient::{HelixPosition, helix_position};

pub use secondary::{
    apply_secondary_structure, assign_secondary_structure, calculate_secondary_structure,
    helix_code,
};

pub use symmetry::{build_unitcell_assembly, get_symmetry_operators, supported_space_groups};

pub use process::{process, process_with_connections};

pub use error::Error;
