//! The post-build pipeline that turns a freshly built structure into a fully derived one.

use crate::model::structure::Structure;
use crate::ops::{
    bonds::{self, Connection},
    chain_names::calculate_chain_names,
    config::ProcessConfig,
    error::Error,
    secondary::apply_secondary_structure,
    symmetry::build_unitcell_assembly,
};

/// Runs every derived-computation stage on the output of
/// [`StructureBuilder::finish`](crate::model::builder::StructureBuilder::finish).
///
/// See [`process_with_connections`] for the stage order.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for an invalid `config`, and propagates stage errors.
pub fn process(structure: Structure, config: &ProcessConfig) -> Result<Structure, Error> {
    process_with_connections(structure, config, &[])
}

/// Runs the pipeline, applying explicit connection records before geometric bonding.
///
/// The stages are, in order:
///
/// 1. bounding box, center, and spatial hash;
/// 2. explicit bonds from `connections`;
/// 3. generated chain names, when enabled and the input has none;
/// 4. within-residue and between-residue bonds, then the bond hash;
/// 5. residue-type bond caching, when enabled;
/// 6. secondary structure per `config.secondary_structure`;
/// 7. the `AU` assembly, plus `UNITCELL` and `SUPERCELL` when the structure has a unit
///    cell and unit-cell assemblies are enabled.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for an invalid `config`, and propagates stage errors.
pub fn process_with_connections(
    mut structure: Structure,
    config: &ProcessConfig,
    connections: &[Connection],
) -> Result<Structure, Error> {
    config.validate()?;

    structure.finalize_atoms();

    if !connections.is_empty() {
        bonds::add_explicit_bonds(&mut structure, connections);
    }

    if config.auto_chain_names {
        calculate_chain_names(&mut structure, config.bonds.use_existing_bonds);
    }

    bonds::calculate_bonds(&mut structure, &config.bonds)?;
    structure.finalize_bonds();

    if config.bonds.assign_residue_type_bonds {
        bonds::assign_residue_type_bonds(&mut structure)?;
    }

    apply_secondary_structure(&mut structure, &config.secondary_structure);

    structure.add_asymmetric_unit();
    if config.symmetry.build_unitcell {
        build_unitcell_assembly(&mut structure)?;
    }

    log::info!(
        "processed '{}': {} atoms, {} residues, {} chains, {} models, {} bonds, {} assemblies",
        structure.id,
        structure.atom_count(),
        structure.residue_count(),
        structure.chain_count(),
        structure.model_count(),
        structure.bond_count(),
        structure.biomol_dict.len()
    );

    Ok(structure)
}
