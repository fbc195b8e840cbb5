//! Interning table for residue compositions.

use super::atom_map::AtomMap;
use super::residue_type::{ResidueBonds, ResidueType};
use smol_str::SmolStr;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResidueKey {
    res_name: SmolStr,
    atom_type_ids: Vec<u32>,
    hetero: bool,
    chem_comp_type: Option<SmolStr>,
    bonds: Option<ResidueBonds>,
}

/// Append-only map from residue composition to a dense `u32` id.
///
/// Residues with the same name, ordered atom types, hetero flag, component type, and
/// supplied bond list share one [`ResidueType`], so classification and template bonds
/// are computed once per composition.
#[derive(Debug, Clone, Default)]
pub struct ResidueMap {
    types: Vec<ResidueType>,
    lookup: HashMap<ResidueKey, u32>,
}

impl ResidueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for a residue composition, creating its [`ResidueType`] on first use.
    ///
    /// # Arguments
    ///
    /// * `atom_map` - Map resolving `atom_type_ids` to names.
    /// * `res_name` - Residue name as written in the source.
    /// * `atom_type_ids` - Atom types of the residue in atom order.
    /// * `hetero` - Whether the residue came from a hetero record.
    /// * `chem_comp_type` - Chemical component type, when the format carries one.
    /// * `bonds` - Template bonds supplied by the source; `None` to infer them later.
    pub fn add(
        &mut self,
        atom_map: &AtomMap,
        res_name: &str,
        atom_type_ids: &[u32],
        hetero: bool,
        chem_comp_type: Option<&str>,
        bonds: Option<ResidueBonds>,
    ) -> u32 {
        let key = ResidueKey {
            res_name: SmolStr::new(res_name),
            atom_type_ids: atom_type_ids.to_vec(),
            hetero,
            chem_comp_type: chem_comp_type.map(SmolStr::new),
            bonds,
        };
        if let Some(&id) = self.lookup.get(&key) {
            return id;
        }

        let id = self.types.len() as u32;
        self.types.push(ResidueType::new(
            atom_map,
            res_name,
            key.atom_type_ids.clone(),
            hetero,
            chem_comp_type,
            key.bonds.clone(),
        ));
        self.lookup.insert(key, id);
        id
    }

    pub fn get(&self, id: u32) -> &ResidueType {
        &self.types[id as usize]
    }

    pub fn get_mut(&mut self, id: u32) -> &mut ResidueType {
        &mut self.types[id as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &ResidueType)> {
        self.types.iter().enumerate().map(|(i, t)| (i as u32, t))
    }
}
