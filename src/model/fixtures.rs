//! Synthetic structures shared by unit tests.
//!
//! Peptide backbones are grown residue by residue from ideal bond lengths, bond angles,
//! and backbone torsions, so secondary-structure and bonding tests see realistic
//! geometry without reading files.

use super::builder::{AtomRecord, ResidueSite, StructureBuilder};
use super::structure::Structure;
use super::types::{Element, Point};
use nalgebra::Vector3;

pub const HELIX_PHI_PSI: (f64, f64) = (-57.0, -47.0);
pub const STRAND_PHI_PSI: (f64, f64) = (-120.0, 130.0);

const N_CA: f64 = 1.458;
const CA_C: f64 = 1.525;
const C_N: f64 = 1.329;
const C_O: f64 = 1.231;
const N_CA_C: f64 = 111.2;
const CA_C_N: f64 = 116.2;
const C_N_CA: f64 = 121.7;
const CA_C_O: f64 = 120.5;

/// Places atom `d` given three preceding atoms, the `c-d` bond length, the `b-c-d` angle,
/// and the `a-b-c-d` torsion (degrees).
fn place(a: &Point, b: &Point, c: &Point, bond: f64, angle: f64, torsion: f64) -> Point {
    let (angle, torsion) = (angle.to_radians(), torsion.to_radians());
    let bc = (c - b).normalize();
    let n = (b - a).cross(&bc).normalize();
    let m = n.cross(&bc);
    let local = Vector3::new(
        -bond * angle.cos(),
        bond * angle.sin() * torsion.cos(),
        bond * angle.sin() * torsion.sin(),
    );
    c + bc * local.x + m * local.y + n * local.z
}

/// `[N, CA, C, O]` positions of `count` residues with uniform backbone torsions.
pub fn backbone(count: usize, phi: f64, psi: f64) -> Vec<[Point; 4]> {
    let mut n = Point::origin();
    let mut ca = Point::new(N_CA, 0.0, 0.0);
    let mut c = ca
        + Vector3::new(-N_CA_C.to_radians().cos(), N_CA_C.to_radians().sin(), 0.0) * CA_C;

    let mut residues = Vec::with_capacity(count);
    for i in 0..count {
        if i > 0 {
            let next_n = place(&n, &ca, &c, C_N, CA_C_N, psi);
            let next_ca = place(&ca, &c, &next_n, N_CA, C_N_CA, 180.0);
            let next_c = place(&c, &next_n, &next_ca, CA_C, N_CA_C, phi);
            (n, ca, c) = (next_n, next_ca, next_c);
        }
        let o = place(&n, &ca, &c, C_O, CA_C_O, psi + 180.0);
        residues.push([n, ca, c, o]);
    }
    residues
}

/// Appends glycine residues at the given backbone positions, shifted by `offset`.
pub fn push_backbone(
    builder: &mut StructureBuilder,
    chain: &str,
    first_resno: i32,
    residues: &[[Point; 4]],
    offset: Vector3<f64>,
) {
    const NAMES: [(&str, Element); 4] = [
        ("N", Element::N),
        ("CA", Element::C),
        ("C", Element::C),
        ("O", Element::O),
    ];
    for (i, atoms) in residues.iter().enumerate() {
        let site = ResidueSite::new(chain, "GLY", first_resno + i as i32);
        for (position, (name, element)) in atoms.iter().zip(NAMES) {
            let serial = builder.atom_count() as i32 + 1;
            let mut record = AtomRecord::new(site, name, element, position + offset);
            record.serial = serial;
            builder.push(&record);
        }
    }
}

/// Builds and finalizes atoms, leaving bonding to the caller.
pub fn finish(builder: StructureBuilder) -> Structure {
    let mut structure = builder.finish();
    structure.finalize_atoms();
    structure
}

pub fn peptide(count: usize, (phi, psi): (f64, f64)) -> Structure {
    let mut builder = StructureBuilder::new();
    push_backbone(&mut builder, "A", 1, &backbone(count, phi, psi), Vector3::zeros());
    finish(builder)
}

pub fn helix_peptide(count: usize) -> Structure {
    peptide(count, HELIX_PHI_PSI)
}

pub fn strand_peptide(count: usize) -> Structure {
    peptide(count, STRAND_PHI_PSI)
}

/// One chain `A` whose backbone is broken after `first` residues.
pub fn peptide_with_break(first: usize, second: usize) -> Structure {
    let (phi, psi) = HELIX_PHI_PSI;
    let mut builder = StructureBuilder::new();
    push_backbone(&mut builder, "A", 1, &backbone(first, phi, psi), Vector3::zeros());
    push_backbone(
        &mut builder,
        "A",
        first as i32 + 1,
        &backbone(second, phi, psi),
        Vector3::new(25.0, 0.0, 0.0),
    );
    finish(builder)
}

/// Chain `A`: an 8-residue helix. Chain `B`: a 6-residue strand 30 Å away.
pub fn two_chain_peptide() -> Structure {
    let mut builder = StructureBuilder::new();
    let (phi, psi) = HELIX_PHI_PSI;
    push_backbone(&mut builder, "A", 1, &backbone(8, phi, psi), Vector3::zeros());
    let (phi, psi) = STRAND_PHI_PSI;
    push_backbone(
        &mut builder,
        "B",
        1,
        &backbone(6, phi, psi),
        Vector3::new(0.0, 30.0, 0.0),
    );
    finish(builder)
}

/// A coarse-grained chain with only alpha carbons on an ideal helix.
pub fn cg_helix(count: usize) -> Structure {
    let (phi, psi) = HELIX_PHI_PSI;
    let mut builder = StructureBuilder::new();
    for (i, atoms) in backbone(count, phi, psi).iter().enumerate() {
        let site = ResidueSite::new("A", "ALA", i as i32 + 1);
        builder.push(&AtomRecord::new(site, "CA", Element::C, atoms[1]));
    }
    finish(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn backbone_keeps_ideal_bond_lengths() {
        let residues = backbone(5, -57.0, -47.0);
        for (i, [n, ca, c, o]) in residues.iter().enumerate() {
            assert_relative_eq!((ca - n).norm(), N_CA, epsilon = 1e-9);
            assert_relative_eq!((c - ca).norm(), CA_C, epsilon = 1e-9);
            assert_relative_eq!((o - c).norm(), C_O, epsilon = 1e-9);
            if let Some([next_n, ..]) = residues.get(i + 1) {
                assert_relative_eq!((next_n - c).norm(), C_N, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn helix_alpha_carbons_follow_helical_spacing() {
        let residues = backbone(6, HELIX_PHI_PSI.0, HELIX_PHI_PSI.1);
        let d = |k: usize| (residues[k][1] - residues[0][1]).norm();
        assert!((d(2) - 5.45).abs() < 0.5);
        assert!((d(3) - 5.18).abs() < 0.5);
        assert!((d(4) - 6.37).abs() < 0.5);
    }
}
