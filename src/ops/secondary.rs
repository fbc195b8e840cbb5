//! Per-residue secondary structure, from annotation records or from trace geometry.
//!
//! The geometric path for all-atom proteins follows Zhang and Skolnick (TM-align, NAR
//! 2005): a residue is helical or extended when the trace distances to the next two,
//! three and four residues around it match reference values. Coarse-grained polymers
//! use helix-axis geometry instead, see [`helix_position`].

use crate::model::{
    polymer::Polymer,
    structure::{ResidueRef, SecondaryAnnotations, Structure},
    types::{Point, SecondaryStructure},
};
use crate::ops::config::{SecondaryStructureConfig, SecondaryStructureMode};
use crate::ops::helixorient::helix_position;
use crate::utils::parallel::*;
use std::collections::HashMap;

const HELIX_DISTANCES: [f64; 3] = [5.45, 5.18, 6.37];
const HELIX_DELTA: f64 = 2.1;
const SHEET_DISTANCES: [f64; 3] = [6.1, 10.4, 13.0];
const SHEET_DELTA: f64 = 1.42;

/// Largest bend between local helix axes still counted as helical, in degrees.
const CG_MAX_BENDING: f64 = 20.0;
/// Open interval of helix-center spacing accepted as helical, in Å.
const CG_CENTER_DISTANCE: (f64, f64) = (1.0, 2.0);

/// Polymers shorter than this are left untouched by the geometric path.
const MIN_POLYMER_RESIDUES: usize = 4;

/// Maps a PDB `HELIX` class number to a secondary-structure code.
///
/// Class 3 is a pi helix and class 5 a 3-10 helix; every other class, including the
/// right-handed alpha class 1, maps to an alpha helix.
pub fn helix_code(helix_class: u8) -> SecondaryStructure {
    match helix_class {
        3 => SecondaryStructure::PiHelix,
        5 => SecondaryStructure::Helix310,
        _ => SecondaryStructure::AlphaHelix,
    }
}

/// Assigns secondary structure the way `config.mode` asks for.
///
/// In [`SecondaryStructureMode::Auto`], the structure's annotation records are used
/// when there are any. Otherwise geometry is used, unless residues already carry codes
/// from the input.
pub fn apply_secondary_structure(structure: &mut Structure, config: &SecondaryStructureConfig) {
    let annotations = std::mem::take(&mut structure.secondary_annotations);
    match config.mode {
        SecondaryStructureMode::Off => {}
        SecondaryStructureMode::Annotation => {
            assign_secondary_structure(structure, &annotations)
        }
        SecondaryStructureMode::Geometry => calculate_secondary_structure(structure),
        SecondaryStructureMode::Auto => {
            if !annotations.is_empty() {
                assign_secondary_structure(structure, &annotations);
            } else if !has_assigned_residues(structure) {
                calculate_secondary_structure(structure);
            } else {
                log::debug!("keeping secondary structure codes from the input");
            }
        }
    }
    structure.secondary_annotations = annotations;
}

fn has_assigned_residues(structure: &Structure) -> bool {
    structure.residue_store.sstruc[..structure.residue_count()]
        .iter()
        .any(|&code| SecondaryStructure::from_code(code) != SecondaryStructure::Unassigned)
}

/// A residue range from an annotation record and the code it assigns.
struct Span<'r> {
    start: &'r ResidueRef,
    end: &'r ResidueRef,
    code: u8,
}

/// Writes helix and strand codes from annotation records.
///
/// Records naming a chain that does not exist are dropped with a warning. Helices are
/// applied in chain order, then by start residue number; strands in chain order. In
/// every model, each record's run starts at the residue matching its start and ends at
/// the residue matching its end, so residues need not be ordered by number.
pub fn assign_secondary_structure(structure: &mut Structure, annotations: &SecondaryAnnotations) {
    let mut chain_order: HashMap<&str, usize> = HashMap::new();
    for (i, name) in structure.chain_store.chain_name[..structure.chain_count()]
        .iter()
        .enumerate()
    {
        chain_order.entry(name.as_str()).or_insert(i);
    }

    let mut helices: Vec<(usize, Span)> = annotations
        .helices
        .iter()
        .filter_map(|h| {
            let order = chain_order.get(h.start.chain_name.as_str())?;
            Some((
                *order,
                Span {
                    start: &h.start,
                    end: &h.end,
                    code: helix_code(h.helix_class).code(),
                },
            ))
        })
        .collect();
    let mut sheets: Vec<(usize, Span)> = annotations
        .sheets
        .iter()
        .filter_map(|s| {
            let order = chain_order.get(s.start.chain_name.as_str())?;
            Some((
                *order,
                Span {
                    start: &s.start,
                    end: &s.end,
                    code: SecondaryStructure::Strand.code(),
                },
            ))
        })
        .collect();

    let dropped = annotations.helices.len() - helices.len() + annotations.sheets.len()
        - sheets.len();
    if dropped > 0 {
        log::warn!(
            "dropped {} secondary structure annotations referencing chains not in the structure",
            dropped
        );
    }

    helices.sort_by_key(|(order, span)| (*order, span.start.resno));
    sheets.sort_by_key(|(order, _)| *order);

    let helices: Vec<Span> = helices.into_iter().map(|(_, span)| span).collect();
    let sheets: Vec<Span> = sheets.into_iter().map(|(_, span)| span).collect();

    for spans in [&helices, &sheets] {
        for model_index in 0..structure.model_count() {
            apply_spans(structure, model_index, spans);
        }
    }

    log::debug!(
        "assigned {} helix and {} strand annotations",
        helices.len(),
        sheets.len()
    );
}

/// Walks the chains of one model, consuming sorted spans in order.
fn apply_spans(structure: &mut Structure, model_index: usize, spans: &[Span]) {
    if spans.is_empty() {
        return;
    }
    let chains = structure.model_chain_range(model_index);
    let residues = &mut structure.residue_store;
    let mut current = 0;
    let mut in_run = false;

    for chain_index in chains {
        let chain_name = structure.chain_store.chain_name[chain_index].as_str();
        if spans[current].start.chain_name != chain_name {
            continue;
        }
        let offset = structure.chain_store.residue_offset[chain_index] as usize;
        let end = offset + structure.chain_store.residue_count[chain_index] as usize;

        let mut j = offset;
        while j < end {
            let span = &spans[current];
            let (resno, inscode) = (residues.resno[j], residues.inscode[j]);
            if span.start.matches(resno, inscode) {
                in_run = true;
            }
            if in_run {
                residues.sstruc[j] = span.code;
                if span.end.matches(resno, inscode) {
                    in_run = false;
                    current += 1;
                    if current == spans.len() {
                        return;
                    }
                    if spans[current].start.chain_name != chain_name {
                        break;
                    }
                    j = offset;
                    continue;
                }
            }
            j += 1;
        }
    }
}

/// Assigns secondary structure from geometry to every polymer with at least four
/// residues.
///
/// All-atom protein polymers are classified residue by residue as helix, strand, or
/// coil. Coarse-grained polymers only gain helix codes. Runs of a single residue are
/// then demoted to coil.
pub fn calculate_secondary_structure(structure: &mut Structure) {
    let assignments: Vec<(usize, Vec<u8>)> = {
        let polymers: Vec<Polymer> = structure.polymers();
        polymers
            .par_iter()
            .filter_map(|polymer| {
                if polymer.residue_count() < MIN_POLYMER_RESIDUES {
                    return None;
                }
                let mut codes = if polymer.is_cg() {
                    cg_polymer_codes(polymer)?
                } else if polymer.is_protein() {
                    protein_polymer_codes(polymer)?
                } else {
                    return None;
                };
                demote_lone_residues(&mut codes);
                Some((polymer.residue_start(), codes))
            })
            .collect()
    };

    log::debug!(
        "calculated secondary structure for {} polymers",
        assignments.len()
    );
    for (start, codes) in assignments {
        structure.residue_store.sstruc[start..start + codes.len()].copy_from_slice(&codes);
    }
}

fn trace_positions(polymer: &Polymer) -> Option<Vec<Point>> {
    polymer
        .residues()
        .map(|residue| residue.trace_atom().map(|atom| atom.position()))
        .collect()
}

fn protein_polymer_codes(polymer: &Polymer) -> Option<Vec<u8>> {
    let trace = trace_positions(polymer)?;
    let codes = (0..trace.len())
        .map(|i| {
            if matches_reference(&trace, i, &HELIX_DISTANCES, HELIX_DELTA) {
                SecondaryStructure::AlphaHelix.code()
            } else if matches_reference(&trace, i, &SHEET_DISTANCES, SHEET_DELTA) {
                SecondaryStructure::Strand.code()
            } else {
                SecondaryStructure::Coil.code()
            }
        })
        .collect();
    Some(codes)
}

/// Whether every trace distance `(j, j + k)` for `j` in `i - 2..=i` and `k` in `2..5`
/// is within `delta` of `reference[k - 2]`. Pairs past the polymer end are skipped.
fn matches_reference(trace: &[Point], i: usize, reference: &[f64; 3], delta: f64) -> bool {
    (i.saturating_sub(2)..=i).all(|j| {
        (2..5).filter(|k| j + k < trace.len()).all(|k| {
            let d = nalgebra::distance(&trace[j], &trace[j + k]);
            (d - reference[k - 2]).abs() <= delta
        })
    })
}

/// Existing codes with helix codes added where consecutive helix centers are evenly
/// spaced and the axis barely bends.
fn cg_polymer_codes(polymer: &Polymer) -> Option<Vec<u8>> {
    let position = helix_position(polymer)?;
    let mut codes: Vec<u8> = polymer.residues().map(|r| r.sstruc().code()).collect();
    let helix = SecondaryStructure::AlphaHelix.code();
    for i in 0..codes.len().saturating_sub(1) {
        let d = nalgebra::distance(&position.center[i], &position.center[i + 1]);
        let (min, max) = CG_CENTER_DISTANCE;
        if d > min && d < max && position.bending[i] < CG_MAX_BENDING {
            codes[i] = helix;
            codes[i + 1] = helix;
        }
    }
    Some(codes)
}

/// Sets every run of exactly one residue to coil.
fn demote_lone_residues(codes: &mut [u8]) {
    let coil = SecondaryStructure::Coil.code();
    let mut run_start = 0;
    for i in 1..=codes.len() {
        if i == codes.len() || codes[i] != codes[run_start] {
            if i - run_start == 1 {
                codes[run_start] = coil;
            }
            run_start = i;
        }
    }
}
