//! Covalent bond inference and the pseudo-bond sets derived alongside it.
//!
//! Bonding runs in passes over a finalized [`Structure`]:
//!
//! * **within-residue**: every residue type gets template bonds computed once from its
//!   first instance, which are then stamped onto every residue of that type. Bonds
//!   already present in the store win over template orders.
//! * **between-residue**: backbone-end to backbone-start links of consecutive polymer
//!   residues (including the last-to-first link of cyclic chains), with trace-to-trace
//!   pseudo-bonds recorded in `backbone_bond_store`.
//! * **ligand**: atoms of residues without a backbone are linked to nearby atoms of
//!   other residues through the spatial hash. Metals are never auto-bonded.
//!
//! Explicit connectivity from the input file goes in first via [`add_explicit_bonds`],
//! so its orders take precedence over inferred ones.

use crate::db;
use crate::model::{
    bond::covalently_connected,
    kdtree::KdTree,
    residue_type::ResidueBonds,
    structure::Structure,
    types::BackboneType,
};
use crate::ops::config::BondConfig;
use crate::ops::error::Error;
use crate::utils::bitarray::BitArray;
use crate::utils::parallel::*;
use std::collections::{HashMap, HashSet};

/// Neighbor search radius for all-atom residues in the k-d tree path, in Å.
const KDTREE_RADIUS: f64 = 2.3;
/// Neighbor search radius for coarse-grained residues in the k-d tree path, in Å.
const KDTREE_RADIUS_CG: f64 = 1.2;
/// Highest order a repeated explicit partner can raise a bond to.
const MAX_EXPLICIT_ORDER: u8 = 3;
/// Order stored for backbone and rung pseudo-bonds.
const PSEUDO_BOND_ORDER: u8 = 0;

/// One connection record: an atom serial and the serials it is bonded to.
///
/// A partner listed more than once raises the bond order by one per repeat, the way
/// PDB `CONECT` records encode double and triple bonds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub serial: i32,
    pub partners: Vec<i32>,
}

impl Connection {
    pub fn new(serial: i32, partners: impl Into<Vec<i32>>) -> Self {
        Self {
            serial,
            partners: partners.into(),
        }
    }
}

/// Runs the within-residue and between-residue passes.
///
/// # Errors
///
/// Returns [`Error::NotFinalized`] when ligand bonding is enabled and the spatial hash
/// has not been built by [`Structure::finalize_atoms`].
pub fn calculate_bonds(structure: &mut Structure, config: &BondConfig) -> Result<(), Error> {
    calculate_bonds_within(structure, config);
    calculate_bonds_between(structure, config)
}

/// Adds template bonds inside every residue and the nucleotide rung pseudo-bonds.
///
/// Residues with more than `config.max_residue_atoms` atoms are skipped with a warning.
/// With `config.pseudo_bonds_only`, only the rung pseudo-bonds are added.
pub fn calculate_bonds_within(structure: &mut Structure, config: &BondConfig) {
    let before = structure.bond_store.count();

    if !config.pseudo_bonds_only {
        compute_missing_templates(structure, config);
        apply_templates(structure, config);
    }

    structure.rung_atom_set = BitArray::new(structure.atom_count(), false);
    if config.calculate_rung_bonds {
        add_rung_bonds(structure, config);
    }

    log::debug!(
        "within-residue bonding added {} bonds and {} rung pseudo-bonds",
        structure.bond_store.count() - before,
        structure.rung_bond_store.count()
    );
}

/// Adds backbone links between consecutive residues, then ligand bonds.
///
/// # Errors
///
/// Returns [`Error::NotFinalized`] when ligand bonding is enabled and the spatial hash
/// is missing.
pub fn calculate_bonds_between(
    structure: &mut Structure,
    config: &BondConfig,
) -> Result<(), Error> {
    let before = structure.bond_store.count();

    if structure.backbone_bond_store.count() == 0 {
        structure
            .backbone_bond_store
            .resize(structure.residue_count());
    }
    structure.backbone_atom_set = BitArray::new(structure.atom_count(), false);

    let links = backbone_links(structure, config.use_existing_bonds);
    for link in &links {
        if !config.pseudo_bonds_only {
            structure.bond_store.add_bond(link.end, link.start, 1);
        }
        if let Some((trace1, trace2)) = link.traces {
            structure
                .backbone_bond_store
                .add_bond(trace1, trace2, PSEUDO_BOND_ORDER);
            structure.backbone_atom_set.set(trace1);
            structure.backbone_atom_set.set(trace2);
        }
    }
    log::debug!(
        "between-residue bonding found {} backbone links",
        links.len()
    );

    if !config.pseudo_bonds_only && config.calculate_ligand_bonds {
        add_ligand_bonds(structure, config)?;
    }

    log::debug!(
        "between-residue bonding added {} bonds",
        structure.bond_store.count() - before
    );
    Ok(())
}

/// Adds bonds from explicit connection records, resolving serials within each model.
///
/// Every record is applied to every model that contains both serials, so connectivity
/// written once for a multi-model file reaches all models. Serials that resolve in no
/// model are reported with one warning and skipped. Pairs already in the store keep
/// their existing order.
pub fn add_explicit_bonds(structure: &mut Structure, connections: &[Connection]) {
    if connections.is_empty() {
        return;
    }

    let before = structure.bond_store.count();
    let mut unresolved: Vec<i32> = Vec::new();

    for model_index in 0..structure.model_count() {
        let serials: HashMap<i32, usize> = structure
            .model_atom_range(model_index)
            .map(|atom| (structure.atom_store.serial[atom], atom))
            .collect();

        for connection in connections {
            let Some(&from) = serials.get(&connection.serial) else {
                unresolved.push(connection.serial);
                continue;
            };

            let mut rows: HashMap<usize, usize> = HashMap::new();
            for partner in &connection.partners {
                let Some(&to) = serials.get(partner) else {
                    unresolved.push(*partner);
                    continue;
                };
                match rows.get(&to) {
                    Some(&row) => {
                        let order = structure.bond_store.bond_order[row];
                        structure
                            .bond_store
                            .set_order(row, (order + 1).min(MAX_EXPLICIT_ORDER));
                    }
                    None => {
                        if let Some(row) = structure.bond_store.add_bond(from, to, 1) {
                            rows.insert(to, row);
                        }
                    }
                }
            }
        }
    }

    if !unresolved.is_empty() {
        let mut distinct: Vec<i32> = unresolved
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        distinct.sort_unstable();
        let unresolved_in_every_model: Vec<i32> = distinct
            .into_iter()
            .filter(|serial| {
                !structure
                    .atom_store
                    .serial
                    .iter()
                    .take(structure.atom_count())
                    .any(|s| s == serial)
            })
            .collect();
        if !unresolved_in_every_model.is_empty() {
            log::warn!(
                "{} connection serials do not match any atom and were skipped: {:?}",
                unresolved_in_every_model.len(),
                unresolved_in_every_model
            );
        }
    }

    log::debug!(
        "explicit connectivity added {} bonds",
        structure.bond_store.count() - before
    );
}

/// Caches intra-residue bonds on residue types that have none, from their first instance.
///
/// Bonds touching atoms outside the residue are ignored. After this, identical
/// residues share one template bond list.
///
/// # Errors
///
/// Returns [`Error::NotFinalized`] when the bond hash has not been built by
/// [`Structure::finalize_bonds`].
pub fn assign_residue_type_bonds(structure: &mut Structure) -> Result<(), Error> {
    let Some(hash) = structure.bond_hash.as_ref() else {
        return Err(Error::not_finalized(
            "assigning residue type bonds",
            "bond hash",
        ));
    };

    let mut assigned: Vec<(u32, ResidueBonds)> = Vec::new();
    let mut seen: HashSet<u32> = HashSet::new();

    for residue_index in 0..structure.residue_count() {
        let type_id = structure.residue_store.residue_type_id[residue_index];
        if structure.residue_map.get(type_id).has_bonds() || !seen.insert(type_id) {
            continue;
        }

        let range = structure.residue_atom_range(residue_index);
        let offset = range.start;
        let mut bonds = ResidueBonds::new();
        let mut pairs: HashSet<(usize, usize)> = HashSet::new();

        for atom in range.clone() {
            for &row in hash.bonds_of(atom) {
                let row = row as usize;
                let a1 = structure.bond_store.atom_index1[row] as usize;
                let a2 = structure.bond_store.atom_index2[row] as usize;
                if !range.contains(&a1) || !range.contains(&a2) {
                    continue;
                }
                if pairs.insert((a1, a2)) {
                    bonds.push(
                        (a1 - offset) as u32,
                        (a2 - offset) as u32,
                        structure.bond_store.bond_order[row],
                    );
                }
            }
        }
        assigned.push((type_id, bonds));
    }

    log::debug!("assigned template bonds to {} residue types", assigned.len());
    for (type_id, bonds) in assigned {
        structure.residue_map.get_mut(type_id).set_bonds(bonds);
    }
    Ok(())
}

/// Computes template bonds for residue types lacking them, one first instance per type.
fn compute_missing_templates(structure: &mut Structure, config: &BondConfig) {
    let mut seen: HashSet<u32> = HashSet::new();
    let mut first_instances: Vec<(u32, usize)> = Vec::new();
    for residue_index in 0..structure.residue_count() {
        let type_id = structure.residue_store.residue_type_id[residue_index];
        let atom_count = structure.residue_store.atom_count[residue_index] as usize;
        if atom_count > config.max_residue_atoms {
            continue;
        }
        if !structure.residue_map.get(type_id).has_bonds() && seen.insert(type_id) {
            first_instances.push((type_id, residue_index));
        }
    }

    let shared: &Structure = structure;
    let templates: Vec<(u32, ResidueBonds)> = first_instances
        .par_iter()
        .map(|&(type_id, residue_index)| {
            (type_id, residue_template(shared, residue_index, config))
        })
        .collect();

    for (type_id, bonds) in templates {
        structure.residue_map.get_mut(type_id).set_bonds(bonds);
    }
}

/// Bonds between atoms of one residue that pass the covalent distance test.
fn residue_template(structure: &Structure, residue_index: usize, config: &BondConfig) -> ResidueBonds {
    let residue_type = structure.residue_type(residue_index);
    let range = structure.residue_atom_range(residue_index);
    let offset = range.start;
    let cg = residue_type.is_cg();
    let atoms = &structure.atom_store;
    let atom_map = &structure.atom_map;

    let order_of = |i: usize, j: usize| {
        db::bond_order_from_table(
            &residue_type.res_name,
            &atom_map.get(atoms.atom_type_id[i]).name,
            &atom_map.get(atoms.atom_type_id[j]).name,
        )
    };

    let mut bonds = ResidueBonds::new();
    if range.len() > config.kdtree_threshold {
        let tree = KdTree::from_atoms(atoms, range.clone());
        let radius = if cg { KDTREE_RADIUS_CG } else { KDTREE_RADIUS };
        for i in range.start..range.end.saturating_sub(1) {
            let covalent = atom_map.get(atoms.atom_type_id[i]).covalent as f64;
            let max_dist = covalent + radius + 0.3;
            let candidates =
                tree.nearest(&atoms.position(i), usize::MAX, (max_dist * max_dist) as f32);
            for (j, _) in candidates {
                if i < j && covalently_connected(atoms, atom_map, i, j, cg) {
                    bonds.push((i - offset) as u32, (j - offset) as u32, order_of(i, j));
                }
            }
        }
    } else {
        for i in range.clone() {
            for j in i + 1..range.end {
                if covalently_connected(atoms, atom_map, i, j, cg) {
                    bonds.push((i - offset) as u32, (j - offset) as u32, order_of(i, j));
                }
            }
        }
    }
    bonds
}

/// Stamps each residue type's template onto its residues.
///
/// A template bond already present in the store keeps the stored order, and that order
/// is written back into the template for the residues that follow.
fn apply_templates(structure: &mut Structure, config: &BondConfig) {
    for residue_index in 0..structure.residue_count() {
        let offset = structure.residue_store.atom_offset[residue_index] as usize;
        let atom_count = structure.residue_store.atom_count[residue_index] as usize;
        let type_id = structure.residue_store.residue_type_id[residue_index];

        if atom_count > config.max_residue_atoms {
            let residue = structure.residue(residue_index);
            log::warn!(
                "skipping auto-bonding of residue {}{} in chain '{}': {} atoms exceed the limit of {}",
                residue.res_name(),
                residue.resno(),
                residue.chain_name(),
                atom_count,
                config.max_residue_atoms
            );
            continue;
        }

        let Some(template) = structure.residue_map.get_mut(type_id).bonds_mut() else {
            continue;
        };
        for i in 0..template.len() {
            let a1 = offset + template.atom_indices1[i] as usize;
            let a2 = offset + template.atom_indices2[i] as usize;
            match structure.bond_store.find(a1, a2) {
                Some(row) => template.bond_orders[i] = structure.bond_store.bond_order[row],
                None => {
                    structure.bond_store.add_bond(a1, a2, template.bond_orders[i]);
                }
            }
        }
    }
}

fn add_rung_bonds(structure: &mut Structure, config: &BondConfig) {
    for residue_index in 0..structure.residue_count() {
        let atom_count = structure.residue_store.atom_count[residue_index] as usize;
        if !config.pseudo_bonds_only && atom_count > config.max_residue_atoms {
            continue;
        }
        let residue_type = structure.residue_type(residue_index);
        let (Some(trace), Some(rung_end)) =
            (residue_type.trace_atom_index, residue_type.rung_end_atom_index)
        else {
            continue;
        };
        let offset = structure.residue_store.atom_offset[residue_index] as usize;
        let (a1, a2) = (offset + trace as usize, offset + rung_end as usize);
        structure
            .rung_bond_store
            .add_bond(a1, a2, PSEUDO_BOND_ORDER);
        structure.rung_atom_set.set(a1);
        structure.rung_atom_set.set(a2);
    }
}

/// A covalent link between two consecutive polymer residues.
struct BackboneLink {
    end: usize,
    start: usize,
    traces: Option<(usize, usize)>,
}

/// Consecutive residue pairs of one model, plus the last-to-first pair of each chain,
/// whose backbone end and start atoms are bonded.
fn backbone_links(structure: &Structure, use_existing_bonds: bool) -> Vec<BackboneLink> {
    let mut pairs: Vec<(usize, usize)> = (1..structure.residue_count())
        .filter(|&i| structure.residue(i - 1).model_index() == structure.residue(i).model_index())
        .map(|i| (i - 1, i))
        .collect();
    pairs.extend(
        structure
            .chains()
            .filter(|chain| chain.residue_count() > 1)
            .map(|chain| {
                let range = chain.residue_range();
                (range.end - 1, range.start)
            }),
    );

    pairs
        .into_iter()
        .filter_map(|(i1, i2)| {
            let (r1, r2) = (structure.residue(i1), structure.residue(i2));
            let backbone = r1.backbone_type();
            if backbone == BackboneType::Unknown || backbone != r2.backbone_type() {
                return None;
            }
            let end = r1.backbone_end_atom()?;
            let start = r2.backbone_start_atom()?;
            let linked = (use_existing_bonds && end.has_bond_to(start.index()))
                || end.connected_to(&start);
            linked.then(|| BackboneLink {
                end: end.index(),
                start: start.index(),
                traces: r1
                    .trace_atom()
                    .zip(r2.trace_atom())
                    .map(|(t1, t2)| (t1.index(), t2.index())),
            })
        })
        .collect()
}

fn add_ligand_bonds(structure: &mut Structure, config: &BondConfig) -> Result<(), Error> {
    let Some(hash) = structure.atom_hash.as_ref() else {
        return Err(Error::not_finalized("ligand bonding", "spatial hash"));
    };

    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for residue in structure.residues() {
        if residue.backbone_type() != BackboneType::Unknown || residue.is_water() {
            continue;
        }
        for atom in residue.atoms() {
            if atom.is_metal() {
                continue;
            }
            let model_index = atom.model_index();
            hash.each_within(&atom.position(), config.ligand_radius, |other, _| {
                let partner = structure.atom(other);
                if partner.residue_index() != atom.residue_index()
                    && partner.model_index() == model_index
                    && !partner.is_metal()
                {
                    candidates.push((atom.index(), other));
                }
            });
        }
    }

    for (a1, a2) in candidates {
        structure.bond_store.add_bond_if_connected(
            &structure.atom_store,
            &structure.atom_map,
            a1,
            a2,
            1,
        );
    }
    Ok(())
}
