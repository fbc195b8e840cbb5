//! Generated chain names for inputs that carry none.

use crate::model::{
    proxy::ResidueProxy,
    store::ChainStore,
    structure::Structure,
    types::BackboneType,
};

/// Names longer than this trigger a one-time warning.
const LONG_NAME: usize = 4;

/// The `index`-th generated chain name: `A`..`Z`, then `AA`, `AB`, ... `ZZ`, `AAA`.
pub fn chain_name(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Hands out chain names in order, restarting at `A` for every model.
///
/// The first name longer than [`LONG_NAME`] logs a warning; later ones are only counted.
struct ChainNamer {
    model_index: usize,
    name_index: usize,
    long_names: usize,
    warnings: usize,
}

impl ChainNamer {
    fn new() -> Self {
        Self {
            model_index: usize::MAX,
            name_index: 0,
            long_names: 0,
            warnings: 0,
        }
    }

    fn next(&mut self, model_index: usize) -> String {
        if model_index != self.model_index {
            self.model_index = model_index;
            self.name_index = 0;
        }

        let name = chain_name(self.name_index);
        self.name_index += 1;
        if name.len() > LONG_NAME {
            if self.warnings == 0 {
                log::warn!(
                    "more than {} chains in model {}, generated names exceed {} characters",
                    self.name_index - 1,
                    model_index,
                    LONG_NAME
                );
                self.warnings += 1;
            }
            self.long_names += 1;
        }
        name
    }
}

/// Splits chains at backbone breaks and names them, for structures without chain names.
///
/// A new chain starts at every model boundary, at every change of molecule type, and
/// between two polymer residues of the same backbone type that are not linked. Linkage is
/// a distance test on the backbone end and start atoms, or an existing bond between them
/// when `use_existing_bonds` is set. Names restart at `A` in every model.
///
/// Returns `false` and leaves the structure unchanged when any chain already has a name.
pub fn calculate_chain_names(structure: &mut Structure, use_existing_bonds: bool) -> bool {
    if structure.chains().any(|chain| !chain.chain_name().is_empty()) {
        return false;
    }
    let residue_count = structure.residue_count();
    if residue_count == 0 {
        return false;
    }

    let starts: Vec<usize> = (0..residue_count)
        .filter(|&i| {
            i == 0
                || starts_new_chain(
                    &structure.residue(i - 1),
                    &structure.residue(i),
                    use_existing_bonds,
                )
        })
        .collect();

    let mut chains = ChainStore::with_capacity(starts.len());
    let mut residue_chain = vec![0u32; residue_count];
    let mut namer = ChainNamer::new();

    for (k, &start) in starts.iter().enumerate() {
        let end = starts.get(k + 1).copied().unwrap_or(residue_count);
        let first = structure.residue(start);
        let model_index = first.model_index();
        let name = namer.next(model_index);

        let ci = chains.push_row();
        chains.chain_name[ci] = name.as_str().into();
        chains.chain_id[ci] = name.as_str().into();
        chains.model_index[ci] = model_index as u32;
        chains.residue_offset[ci] = start as u32;
        chains.residue_count[ci] = (end - start) as u32;
        chains.entity_index[ci] = first.chain().entity_index() as u32;
        residue_chain[start..end].fill(ci as u32);
    }

    log::debug!(
        "named {} chains (previously {}), {} with long names",
        chains.count(),
        structure.chain_count(),
        namer.long_names
    );

    let models = &mut structure.model_store;
    for mi in 0..models.count() {
        models.chain_offset[mi] = 0;
        models.chain_count[mi] = 0;
    }
    for ci in 0..chains.count() {
        let mi = chains.model_index[ci] as usize;
        if models.chain_count[mi] == 0 {
            models.chain_offset[mi] = ci as u32;
        }
        models.chain_count[mi] += 1;
    }

    let residues = &mut structure.residue_store;
    residues.chain_index[..residue_count].copy_from_slice(&residue_chain);
    structure.chain_store = chains;
    true
}

fn starts_new_chain(prev: &ResidueProxy, next: &ResidueProxy, use_existing_bonds: bool) -> bool {
    if prev.model_index() != next.model_index() || prev.molecule_type() != next.molecule_type()
    {
        return true;
    }
    let backbone = next.backbone_type();
    if backbone == BackboneType::Unknown || backbone != prev.backbone_type() {
        return false;
    }
    if use_existing_bonds {
        match (prev.backbone_end_atom(), next.backbone_start_atom()) {
            (Some(end), Some(start)) => !end.has_bond_to(start.index()),
            _ => true,
        }
    } else {
        !prev.connected_to(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        builder::{AtomRecord, ResidueSite, StructureBuilder},
        fixtures::{self, HELIX_PHI_PSI},
        types::{Element, Point},
    };
    use nalgebra::Vector3;

    fn unnamed(segments: &[(usize, usize, f64)]) -> StructureBuilder {
        let (phi, psi) = HELIX_PHI_PSI;
        let mut builder = StructureBuilder::new();
        let mut resno = 1;
        for &(model, count, shift) in segments {
            for atoms in fixtures::backbone(count, phi, psi) {
                let site = ResidueSite::new("", "GLY", resno).model(model);
                for (position, (name, element)) in atoms.iter().zip([
                    ("N", Element::N),
                    ("CA", Element::C),
                    ("C", Element::C),
                    ("O", Element::O),
                ]) {
                    let position = position + Vector3::new(shift, 0.0, 0.0);
                    builder.push(&AtomRecord::new(site, name, element, position));
                }
                resno += 1;
            }
        }
        builder
    }

    fn names(structure: &Structure) -> Vec<&str> {
        structure.chains().map(|c| c.chain_name()).collect()
    }

    #[test]
    fn chain_name_is_bijective_base_26() {
        assert_eq!(chain_name(0), "A");
        assert_eq!(chain_name(25), "Z");
        assert_eq!(chain_name(26), "AA");
        assert_eq!(chain_name(27), "AB");
        assert_eq!(chain_name(701), "ZZ");
        assert_eq!(chain_name(702), "AAA");
    }

    #[test]
    fn chain_name_reaches_five_letters_after_four_letter_range() {
        let four_letter_end = 26 + 26 * 26 + 26 * 26 * 26 + 26 * 26 * 26 * 26;
        assert_eq!(chain_name(four_letter_end - 1), "ZZZZ");
        assert_eq!(chain_name(four_letter_end), "AAAAA");
    }

    #[test]
    fn chain_namer_warns_once_past_four_letters() {
        let four_letter_end = 26 + 26 * 26 + 26 * 26 * 26 + 26 * 26 * 26 * 26;
        let mut namer = ChainNamer {
            name_index: four_letter_end - 1,
            model_index: 0,
            ..ChainNamer::new()
        };

        assert_eq!(namer.next(0), "ZZZZ");
        assert_eq!(namer.warnings, 0);
        assert_eq!(namer.next(0), "AAAAA");
        assert_eq!(namer.next(0), "AAAAB");
        assert_eq!(namer.long_names, 2);
        assert_eq!(namer.warnings, 1);

        namer.name_index = four_letter_end;
        namer.model_index = 1;
        assert_eq!(namer.next(1), "AAAAA");
        assert_eq!(namer.long_names, 3);
        assert_eq!(namer.warnings, 1);
    }

    #[test]
    fn chain_namer_restarts_names_per_model() {
        let mut namer = ChainNamer::new();
        assert_eq!(namer.next(0), "A");
        assert_eq!(namer.next(0), "B");
        assert_eq!(namer.next(1), "A");
        assert_eq!(namer.long_names, 0);
        assert_eq!(namer.warnings, 0);
    }

    #[test]
    fn calculate_chain_names_splits_at_backbone_break() {
        let mut structure = fixtures::finish(unnamed(&[(0, 3, 0.0), (0, 4, 25.0)]));
        assert_eq!(structure.chain_count(), 1);

        assert!(calculate_chain_names(&mut structure, false));

        assert_eq!(names(&structure), ["A", "B"]);
        assert_eq!(structure.chain(0).residue_range(), 0..3);
        assert_eq!(structure.chain(1).residue_range(), 3..7);
        assert_eq!(structure.chain(1).chain_id(), "B");
        assert_eq!(structure.residue(5).chain_name(), "B");
        assert_eq!(structure.model(0).chain_count(), 2);
    }

    #[test]
    fn calculate_chain_names_splits_on_molecule_type_change() {
        let mut builder = unnamed(&[(0, 3, 0.0)]);
        let water = ResidueSite::new("", "HOH", 100).hetero(true);
        builder.push(&AtomRecord::new(
            water,
            "O",
            Element::O,
            Point::new(20.0, 20.0, 20.0),
        ));
        let mut structure = fixtures::finish(builder);

        calculate_chain_names(&mut structure, false);

        assert_eq!(names(&structure), ["A", "B"]);
        assert_eq!(structure.residue(3).chain_name(), "B");
    }

    #[test]
    fn calculate_chain_names_restarts_per_model() {
        let mut structure = fixtures::finish(unnamed(&[(0, 3, 0.0), (1, 3, 0.0)]));

        calculate_chain_names(&mut structure, false);

        assert_eq!(names(&structure), ["A", "A"]);
        assert_eq!(structure.model(0).chain_offset(), 0);
        assert_eq!(structure.model(1).chain_offset(), 1);
        assert_eq!(structure.model(1).chain_count(), 1);
        assert_eq!(structure.chain(1).model_index(), 1);
    }

    #[test]
    fn calculate_chain_names_with_existing_bonds_requires_bonds() {
        let mut structure = fixtures::finish(unnamed(&[(0, 3, 0.0)]));

        calculate_chain_names(&mut structure, true);

        assert_eq!(names(&structure), ["A", "B", "C"]);
    }

    #[test]
    fn calculate_chain_names_keeps_existing_names() {
        let mut structure = fixtures::peptide_with_break(3, 3);

        assert!(!calculate_chain_names(&mut structure, false));

        assert_eq!(names(&structure), ["A"]);
    }
}
