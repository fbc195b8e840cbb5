//! Streaming construction of a [`Structure`] from per-atom records.
//!
//! Parsers report atoms one at a time in file order. The builder detects model, chain,
//! and residue boundaries from the reported keys and appends rows to the stores. A
//! residue's type can only be interned once all of its atoms are known, so typing lags
//! one residue behind: it happens when the next residue opens, or in [`finish`].
//!
//! [`finish`]: StructureBuilder::finish

use super::atom_map::AtomMap;
use super::store::AtomStore;
use super::structure::Structure;
use super::types::{Element, Point};
use crate::db;
use smol_str::SmolStr;

/// Model, chain, and residue keys reported alongside each atom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueSite<'a> {
    pub model_index: usize,
    pub chain_name: &'a str,
    pub chain_id: &'a str,
    pub res_name: &'a str,
    pub resno: i32,
    pub hetero: bool,
    /// Secondary-structure code stored when this atom opens a residue.
    pub sstruc: Option<char>,
    pub inscode: Option<char>,
    /// Chemical component type, for formats that carry one.
    pub chem_comp_type: Option<&'a str>,
}

impl<'a> ResidueSite<'a> {
    /// A polymer residue in model 0 whose chain name doubles as its id.
    pub fn new(chain_name: &'a str, res_name: &'a str, resno: i32) -> Self {
        Self {
            model_index: 0,
            chain_name,
            chain_id: chain_name,
            res_name,
            resno,
            hetero: false,
            sstruc: None,
            inscode: None,
            chem_comp_type: None,
        }
    }

    pub fn model(mut self, model_index: usize) -> Self {
        self.model_index = model_index;
        self
    }

    pub fn chain_id(mut self, chain_id: &'a str) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn hetero(mut self, hetero: bool) -> Self {
        self.hetero = hetero;
        self
    }

    pub fn sstruc(mut self, sstruc: char) -> Self {
        self.sstruc = Some(sstruc);
        self
    }

    pub fn inscode(mut self, inscode: char) -> Self {
        self.inscode = Some(inscode);
        self
    }

    pub fn chem_comp_type(mut self, chem_comp_type: &'a str) -> Self {
        self.chem_comp_type = Some(chem_comp_type);
        self
    }
}

/// A complete atom record: residue keys plus per-atom attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomRecord<'a> {
    pub site: ResidueSite<'a>,
    pub atom_name: &'a str,
    pub element: Element,
    pub position: Point,
    pub serial: i32,
    pub bfactor: f32,
    pub occupancy: f32,
    pub altloc: Option<char>,
}

impl<'a> AtomRecord<'a> {
    pub fn new(site: ResidueSite<'a>, atom_name: &'a str, element: Element, position: Point) -> Self {
        Self {
            site,
            atom_name,
            element,
            position,
            serial: 0,
            bfactor: 0.0,
            occupancy: 1.0,
            altloc: None,
        }
    }
}

/// Attributes of the open residue needed to intern its type when it closes.
#[derive(Debug, Clone)]
struct OpenResidue {
    model_index: usize,
    chain_id: SmolStr,
    res_name: SmolStr,
    resno: i32,
    inscode: u8,
    hetero: bool,
    chem_comp_type: Option<SmolStr>,
}

#[derive(Debug, Default)]
pub struct StructureBuilder {
    structure: Structure,
    open: Option<OpenResidue>,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocates `atom_count` atom rows.
    pub fn with_capacity(atom_count: usize) -> Self {
        let mut builder = Self::new();
        builder.structure.atom_store.resize(atom_count);
        builder
    }

    pub fn atom_store_mut(&mut self) -> &mut AtomStore {
        &mut self.structure.atom_store
    }

    pub fn atom_map_mut(&mut self) -> &mut AtomMap {
        &mut self.structure.atom_map
    }

    pub fn atom_count(&self) -> usize {
        self.structure.atom_count()
    }

    /// Opens any model, chain, or residue boundary implied by `site` and appends an
    /// empty atom row, returning its index.
    ///
    /// The caller writes the row's coordinates and atom type through
    /// [`atom_store_mut`](Self::atom_store_mut) before the residue closes.
    pub fn add_atom(&mut self, site: &ResidueSite) -> usize {
        let inscode = site.inscode.map_or(0, |c| c as u8);
        let (new_model, new_chain, new_residue) = match &self.open {
            None => (true, true, true),
            Some(open) if open.model_index != site.model_index => (true, true, true),
            Some(open) if open.chain_id != site.chain_id => (false, true, true),
            Some(open) => {
                let water = db::is_water(&open.res_name) && db::is_water(site.res_name);
                let renamed = open.res_name != site.res_name && !water;
                let boundary = open.resno != site.resno || open.inscode != inscode || renamed;
                (false, false, boundary)
            }
        };

        if new_residue {
            self.close_residue();
        }

        let s = &mut self.structure;
        if new_model {
            let mi = s.model_store.push_row();
            s.model_store.chain_offset[mi] = s.chain_store.count() as u32;
            s.model_store.chain_count[mi] = 0;
        }
        let mi = s.model_store.count() - 1;

        if new_chain {
            let ci = s.chain_store.push_row();
            s.chain_store.chain_name[ci] = SmolStr::new(site.chain_name);
            s.chain_store.chain_id[ci] = SmolStr::new(site.chain_id);
            s.chain_store.model_index[ci] = mi as u32;
            s.chain_store.residue_offset[ci] = s.residue_store.count() as u32;
            s.chain_store.residue_count[ci] = 0;
            s.model_store.chain_count[mi] += 1;
        }
        let ci = s.chain_store.count() - 1;

        if new_residue {
            let ri = s.residue_store.push_row();
            s.residue_store.chain_index[ri] = ci as u32;
            s.residue_store.resno[ri] = site.resno;
            s.residue_store.inscode[ri] = inscode;
            s.residue_store.sstruc[ri] = site.sstruc.map_or(0, |c| c as u8);
            s.residue_store.atom_offset[ri] = s.atom_store.count() as u32;
            s.residue_store.atom_count[ri] = 0;
            s.chain_store.residue_count[ci] += 1;

            self.open = Some(OpenResidue {
                model_index: site.model_index,
                chain_id: SmolStr::new(site.chain_id),
                res_name: SmolStr::new(site.res_name),
                resno: site.resno,
                inscode,
                hetero: site.hetero,
                chem_comp_type: site.chem_comp_type.map(SmolStr::new),
            });
        }

        let s = &mut self.structure;
        let ri = s.residue_store.count() - 1;
        let ai = s.atom_store.push_row();
        s.atom_store.residue_index[ai] = ri as u32;
        s.residue_store.atom_count[ri] += 1;
        ai
    }

    /// Adds an atom and writes all of its attributes in one call.
    pub fn push(&mut self, record: &AtomRecord) -> usize {
        let ai = self.add_atom(&record.site);
        let type_id = self.structure.atom_map.add(record.atom_name, record.element);
        let atoms = &mut self.structure.atom_store;
        atoms.atom_type_id[ai] = type_id;
        atoms.set_position(ai, &record.position);
        atoms.serial[ai] = record.serial;
        atoms.bfactor[ai] = record.bfactor;
        atoms.occupancy[ai] = record.occupancy;
        atoms.altloc[ai] = record.altloc.map_or(0, |c| c as u8);
        ai
    }

    /// Types the last open residue and returns the built structure.
    pub fn finish(mut self) -> Structure {
        self.close_residue();
        log::debug!(
            "built {} models, {} chains, {} residues, {} atoms ({} residue types)",
            self.structure.model_count(),
            self.structure.chain_count(),
            self.structure.residue_count(),
            self.structure.atom_count(),
            self.structure.residue_map.len()
        );
        self.structure
    }

    /// Interns the type of the open residue. The keys stay in place for comparison.
    fn close_residue(&mut self) {
        let Some(open) = &self.open else {
            return;
        };
        let s = &mut self.structure;
        let ri = s.residue_store.count() - 1;
        let offset = s.residue_store.atom_offset[ri] as usize;
        let count = s.residue_store.atom_count[ri] as usize;
        let atom_type_ids = &s.atom_store.atom_type_id[offset..offset + count];
        s.residue_store.residue_type_id[ri] = s.residue_map.add(
            &s.atom_map,
            &open.res_name,
            atom_type_ids,
            open.hetero,
            open.chem_comp_type.as_deref(),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::MoleculeType;

    fn record<'a>(site: ResidueSite<'a>, name: &'a str, element: Element, x: f64) -> AtomRecord<'a> {
        AtomRecord::new(site, name, element, Point::new(x, 0.0, 0.0))
    }

    fn push_gly(builder: &mut StructureBuilder, site: ResidueSite) {
        for (i, (name, element)) in [("N", Element::N), ("CA", Element::C), ("C", Element::C), ("O", Element::O)]
            .into_iter()
            .enumerate()
        {
            builder.push(&record(site, name, element, i as f64));
        }
    }

    #[test]
    fn residue_boundaries_follow_resno_name_and_inscode() {
        let mut builder = StructureBuilder::new();
        push_gly(&mut builder, ResidueSite::new("A", "GLY", 1));
        push_gly(&mut builder, ResidueSite::new("A", "GLY", 2));
        push_gly(&mut builder, ResidueSite::new("A", "GLY", 2).inscode('A'));
        push_gly(&mut builder, ResidueSite::new("A", "ALA", 2).inscode('A'));
        let structure = builder.finish();

        assert_eq!(structure.model_count(), 1);
        assert_eq!(structure.chain_count(), 1);
        assert_eq!(structure.residue_count(), 4);
        assert_eq!(structure.atom_count(), 16);
        assert_eq!(structure.residue_store.inscode_char(2), Some('A'));
        assert_eq!(structure.residue_type(3).res_name, "ALA");
    }

    #[test]
    fn new_model_cascades_to_chain_and_residue() {
        let mut builder = StructureBuilder::new();
        push_gly(&mut builder, ResidueSite::new("A", "GLY", 1));
        push_gly(&mut builder, ResidueSite::new("A", "GLY", 1).model(1));
        let structure = builder.finish();

        assert_eq!(structure.model_count(), 2);
        assert_eq!(structure.chain_count(), 2);
        assert_eq!(structure.residue_count(), 2);
        assert_eq!(structure.model_store.chain_offset[1], 1);
        assert_eq!(structure.chain_store.model_index[1], 1);
        assert_eq!(structure.chain_store.residue_offset[1], 1);
    }

    #[test]
    fn chain_id_change_opens_new_chain_even_with_same_name() {
        let mut builder = StructureBuilder::new();
        push_gly(&mut builder, ResidueSite::new("A", "GLY", 1));
        push_gly(&mut builder, ResidueSite::new("A", "GLY", 1).chain_id("C"));
        let structure = builder.finish();
        assert_eq!(structure.chain_count(), 2);
        assert_eq!(structure.chain_store.chain_name[1], "A");
        assert_eq!(structure.chain_store.chain_id[1], "C");
    }

    #[test]
    fn water_name_variants_do_not_split_a_residue() {
        let mut builder = StructureBuilder::new();
        let site = ResidueSite::new("W", "HOH", 101).hetero(true);
        builder.push(&record(site, "O", Element::O, 0.0));
        builder.push(&record(ResidueSite { res_name: "WAT", ..site }, "H1", Element::H, 1.0));
        builder.push(&record(ResidueSite { resno: 102, ..site }, "O", Element::O, 5.0));
        let structure = builder.finish();
        assert_eq!(structure.residue_count(), 2);
        assert_eq!(structure.residue_store.atom_count[0], 2);
        assert_eq!(structure.residue_type(0).molecule_type, MoleculeType::Water);
    }

    #[test]
    fn residue_typing_lags_until_next_residue_or_finish() {
        let mut builder = StructureBuilder::new();
        push_gly(&mut builder, ResidueSite::new("A", "GLY", 1));
        assert!(builder.structure.residue_map.is_empty());

        builder.push(&record(ResidueSite::new("A", "ALA", 2), "N", Element::N, 9.0));
        assert_eq!(builder.structure.residue_map.len(), 1);

        let structure = builder.finish();
        assert_eq!(structure.residue_map.len(), 2);
        assert_eq!(structure.residue_type(1).atom_count(), 1);
    }

    #[test]
    fn identical_residues_share_a_type() {
        let mut builder = StructureBuilder::new();
        for resno in 1..=3 {
            push_gly(&mut builder, ResidueSite::new("A", "GLY", resno));
        }
        let structure = builder.finish();
        assert_eq!(structure.residue_map.len(), 1);
        assert!(structure.residue_type(0).is_protein());
    }

    #[test]
    fn add_atom_leaves_attribute_writes_to_caller() {
        let mut builder = StructureBuilder::with_capacity(2);
        let ai = builder.add_atom(&ResidueSite::new("A", "ZN", 1).hetero(true).sstruc('c'));
        let zn = builder.atom_map_mut().add("ZN", Element::Zn);
        builder.atom_store_mut().atom_type_id[ai] = zn;
        builder.atom_store_mut().set_position(ai, &Point::new(1.0, 2.0, 3.0));
        let structure = builder.finish();

        assert_eq!(structure.atom_store.capacity(), 2);
        assert_eq!(structure.atom_store.position(0), Point::new(1.0, 2.0, 3.0));
        assert_eq!(structure.residue_store.sstruc[0], b'c');
        assert!(structure.residue_type(0).is_ion());
    }

    #[test]
    fn growth_past_initial_capacity_keeps_every_row() {
        let mut builder = StructureBuilder::with_capacity(4);
        for resno in 0..300 {
            push_gly(&mut builder, ResidueSite::new("A", "GLY", resno));
        }
        let structure = builder.finish();
        assert_eq!(structure.atom_count(), 1200);
        assert_eq!(structure.residue_count(), 300);
        for ri in 0..300 {
            assert_eq!(structure.residue_store.resno[ri], ri as i32);
            assert_eq!(structure.residue_store.atom_offset[ri], 4 * ri as u32);
        }
    }
}
