//! Scalar vocabularies shared by the stores: chemical elements, bond orders, molecule and
//! backbone classifications, and secondary-structure codes.

use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

pub type Point = Point3<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He = 2,
    Li = 3,
    Be = 4,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Ne = 10,
    Na = 11,
    Mg = 12,
    Al = 13,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ar = 18,
    K = 19,
    Ca = 20,
    Sc = 21,
    Ti = 22,
    V = 23,
    Cr = 24,
    Mn = 25,
    Fe = 26,
    Co = 27,
    Ni = 28,
    Cu = 29,
    Zn = 30,
    Ga = 31,
    Ge = 32,
    As = 33,
    Se = 34,
    Br = 35,
    Kr = 36,
    Rb = 37,
    Sr = 38,
    Y = 39,
    Zr = 40,
    Nb = 41,
    Mo = 42,
    Tc = 43,
    Ru = 44,
    Rh = 45,
    Pd = 46,
    Ag = 47,
    Cd = 48,
    In = 49,
    Sn = 50,
    Sb = 51,
    Te = 52,
    I = 53,
    Xe = 54,
    Cs = 55,
    Ba = 56,
    La = 57,
    Ce = 58,
    Pr = 59,
    Nd = 60,
    Pm = 61,
    Sm = 62,
    Eu = 63,
    Gd = 64,
    Tb = 65,
    Dy = 66,
    Ho = 67,
    Er = 68,
    Tm = 69,
    Yb = 70,
    Lu = 71,
    Hf = 72,
    Ta = 73,
    W = 74,
    Re = 75,
    Os = 76,
    Ir = 77,
    Pt = 78,
    Au = 79,
    Hg = 80,
    Tl = 81,
    Pb = 82,
    Bi = 83,
    Po = 84,
    At = 85,
    Rn = 86,
    Fr = 87,
    Ra = 88,
    Ac = 89,
    Th = 90,
    Pa = 91,
    U = 92,
    Np = 93,
    Pu = 94,
    Am = 95,
    Cm = 96,
    Bk = 97,
    Cf = 98,
    Es = 99,
    Fm = 100,
    Md = 101,
    No = 102,
    Lr = 103,
    Rf = 104,
    Db = 105,
    Sg = 106,
    Bh = 107,
    Hs = 108,
    Mt = 109,
    Ds = 110,
    Rg = 111,
    Cn = 112,
    Nh = 113,
    Fl = 114,
    Mc = 115,
    Lv = 116,
    Ts = 117,
    Og = 118,
    Unknown = 0,
}

const ELEMENTS: [Element; 119] = {
    use Element::*;
    [
        Unknown, H, He, Li, Be, B, C, N, O, F,
        Ne, Na, Mg, Al, Si, P, S, Cl, Ar, K,
        Ca, Sc, Ti, V, Cr, Mn, Fe, Co, Ni, Cu,
        Zn, Ga, Ge, As, Se, Br, Kr, Rb, Sr, Y,
        Zr, Nb, Mo, Tc, Ru, Rh, Pd, Ag, Cd, In,
        Sn, Sb, Te, I, Xe, Cs, Ba, La, Ce, Pr,
        Nd, Pm, Sm, Eu, Gd, Tb, Dy, Ho, Er, Tm,
        Yb, Lu, Hf, Ta, W, Re, Os, Ir, Pt, Au,
        Hg, Tl, Pb, Bi, Po, At, Rn, Fr, Ra, Ac,
        Th, Pa, U, Np, Pu, Am, Cm, Bk, Cf, Es,
        Fm, Md, No, Lr, Rf, Db, Sg, Bh, Hs, Mt,
        Ds, Rg, Cn, Nh, Fl, Mc, Lv, Ts, Og,
    ]
};

const SYMBOLS: [&str; 119] = [
    "", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na",
    "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V",
    "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se", "Br",
    "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag",
    "Cd", "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr",
    "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu",
    "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi",
    "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am",
    "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh",
    "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Covalent radii in Ångström indexed by atomic number; slot 0 holds the fallback radius.
const COVALENT_RADII: [f32; 119] = [
    1.6, 0.31, 0.28, 1.28, 0.96, 0.84, 0.76, 0.71, 0.66, 0.57,
    0.58, 1.66, 1.41, 1.21, 1.11, 1.07, 1.05, 1.02, 1.06, 2.03,
    1.76, 1.7, 1.6, 1.53, 1.39, 1.39, 1.32, 1.26, 1.24, 1.32,
    1.22, 1.22, 1.2, 1.19, 1.2, 1.2, 1.16, 2.2, 1.95, 1.9,
    1.75, 1.64, 1.54, 1.47, 1.46, 1.42, 1.39, 1.45, 1.44, 1.42,
    1.39, 1.39, 1.38, 1.39, 1.4, 2.44, 2.15, 2.07, 2.04, 2.03,
    2.01, 1.99, 1.98, 1.98, 1.96, 1.94, 1.92, 1.92, 1.89, 1.9,
    1.87, 1.87, 1.75, 1.7, 1.62, 1.51, 1.44, 1.41, 1.36, 1.36,
    1.32, 1.45, 1.46, 1.48, 1.4, 1.5, 1.5, 2.6, 2.21, 2.15,
    2.06, 2.0, 1.96, 1.9, 1.87, 1.8, 1.69, 1.6, 1.6, 1.6,
    1.6, 1.6, 1.6, 1.6, 1.6, 1.6, 1.6, 1.6, 1.6, 1.6,
    1.6, 1.6, 1.6, 1.6, 1.6, 1.6, 1.6, 1.6, 1.6,
];

/// Fallback covalent radius for elements without a tabulated value.
pub const DEFAULT_COVALENT_RADIUS: f32 = 1.6;

impl Element {
    /// Returns the element with the given atomic number, or `Unknown` when out of range.
    pub fn from_atomic_number(number: u8) -> Self {
        ELEMENTS
            .get(number as usize)
            .copied()
            .unwrap_or(Element::Unknown)
    }

    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::Unknown => "X",
            other => SYMBOLS[other.atomic_number() as usize],
        }
    }

    /// Covalent radius in Ångström used by the distance-based bonding test.
    pub fn covalent_radius(&self) -> f32 {
        match self {
            Element::Unknown => DEFAULT_COVALENT_RADIUS,
            other => COVALENT_RADII[other.atomic_number() as usize],
        }
    }

    pub fn is_heavy_atom(&self) -> bool {
        !matches!(self, Element::H)
    }

    /// Metals are alkali, alkaline earth, transition, post-transition, lanthanide, and
    /// actinide elements.
    pub fn is_metal(&self) -> bool {
        use Element::*;
        matches!(
            self,
            Li | Na | K | Rb | Cs | Fr
                | Be | Mg | Ca | Sr | Ba | Ra
                | Al | Ga | In | Sn | Tl | Pb | Bi
        ) || matches!(self.atomic_number(), 21..=30 | 39..=48 | 57..=80 | 89..=112)
    }

    /// Guesses the element from a PDB-style atom name when no element column is given.
    ///
    /// Up to two leading digits are dropped (`1HB2`). One-letter names are taken as the
    /// symbol; `NA`, `CL`, and `FE` are read as two-letter symbols; anything else falls back
    /// to a leading `H`, `C`, `N`, `O`, `S`, or `P`.
    pub fn guess_from_atom_name(atom_name: &str) -> Self {
        const TWO_LETTER: [&str; 3] = ["NA", "CL", "FE"];
        const ONE_LETTER: [char; 6] = ['H', 'C', 'O', 'N', 'S', 'P'];

        let mut name = atom_name.trim().to_ascii_uppercase();
        for _ in 0..2 {
            if name.starts_with(|c: char| c.is_ascii_digit()) {
                name.remove(0);
            }
        }

        let first = name.chars().next();
        let symbol = match name.len() {
            0 => return Element::Unknown,
            1 => name.as_str(),
            2 if TWO_LETTER.contains(&name.as_str()) => name.as_str(),
            _ => match first {
                Some(c) if ONE_LETTER.contains(&c) => &name[..1],
                _ => return Element::Unknown,
            },
        };
        symbol.parse().unwrap_or(Element::Unknown)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Element {
    type Err = String;

    /// Parses a symbol in any letter case (`"FE"`, `"fe"`, `"Fe"`) or an atomic number.
    /// Unrecognized input maps to `Element::Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(num) = s.parse::<u8>() {
            return Ok(Element::from_atomic_number(num));
        }

        let mut chars = s.chars();
        let normalized: String = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => return Ok(Element::Unknown),
        };

        Ok(SYMBOLS
            .iter()
            .position(|sym| *sym == normalized)
            .filter(|&z| z > 0)
            .map(|z| ELEMENTS[z])
            .unwrap_or(Element::Unknown))
    }
}

/// Covalent bond multiplicity as stored in the bond tables (`0` = unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Unknown = 0,
    Single = 1,
    Double = 2,
    Triple = 3,
    Quadruple = 4,
}

impl BondOrder {
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Converts a stored order; values above four saturate to `Quadruple`.
    pub fn from_value(value: u8) -> Self {
        match value {
            0 => BondOrder::Unknown,
            1 => BondOrder::Single,
            2 => BondOrder::Double,
            3 => BondOrder::Triple,
            _ => BondOrder::Quadruple,
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for BondOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" | "Unknown" => Ok(BondOrder::Unknown),
            "1" | "Single" | "sing" => Ok(BondOrder::Single),
            "2" | "Double" | "doub" => Ok(BondOrder::Double),
            "3" | "Triple" | "trip" => Ok(BondOrder::Triple),
            "4" | "Quadruple" | "quad" => Ok(BondOrder::Quadruple),
            _ => Err(format!("Invalid bond order: {}", s)),
        }
    }
}

/// Chemical class of a residue, derived from its name, atoms, and component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoleculeType {
    #[default]
    Unknown,
    Water,
    Ion,
    Protein,
    Rna,
    Dna,
    Saccharide,
}

impl MoleculeType {
    pub fn name(&self) -> &'static str {
        match self {
            MoleculeType::Unknown => "Unknown",
            MoleculeType::Water => "Water",
            MoleculeType::Ion => "Ion",
            MoleculeType::Protein => "Protein",
            MoleculeType::Rna => "RNA",
            MoleculeType::Dna => "DNA",
            MoleculeType::Saccharide => "Saccharide",
        }
    }
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Recognized polymer backbone, which decides inter-residue bonding eligibility.
///
/// The `Cg*` variants describe coarse-grained models where a residue is reduced to a
/// handful of beads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackboneType {
    #[default]
    Unknown,
    Protein,
    Rna,
    Dna,
    CgProtein,
    CgRna,
    CgDna,
}

impl BackboneType {
    pub fn name(&self) -> &'static str {
        match self {
            BackboneType::Unknown => "Unknown",
            BackboneType::Protein => "Protein",
            BackboneType::Rna => "RNA",
            BackboneType::Dna => "DNA",
            BackboneType::CgProtein => "CG Protein",
            BackboneType::CgRna => "CG RNA",
            BackboneType::CgDna => "CG DNA",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, BackboneType::Unknown)
    }

    pub fn is_cg(&self) -> bool {
        matches!(
            self,
            BackboneType::CgProtein | BackboneType::CgRna | BackboneType::CgDna
        )
    }
}

impl fmt::Display for BackboneType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-residue secondary structure state, stored as a one-byte code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecondaryStructure {
    #[default]
    Unassigned,
    AlphaHelix,
    Helix310,
    PiHelix,
    Strand,
    Bridge,
    Turn,
    Bend,
    Coil,
}

impl SecondaryStructure {
    /// The single-character code written to the residue store.
    pub fn code(&self) -> u8 {
        match self {
            SecondaryStructure::Unassigned => 0,
            SecondaryStructure::AlphaHelix => b'h',
            SecondaryStructure::Helix310 => b'g',
            SecondaryStructure::PiHelix => b'i',
            SecondaryStructure::Strand => b'e',
            SecondaryStructure::Bridge => b'b',
            SecondaryStructure::Turn => b't',
            SecondaryStructure::Bend => b's',
            SecondaryStructure::Coil => b'c',
        }
    }

    /// Decodes a stored code. Upper-case DSSP letters are accepted as well.
    pub fn from_code(code: u8) -> Self {
        match code.to_ascii_lowercase() {
            b'h' => SecondaryStructure::AlphaHelix,
            b'g' => SecondaryStructure::Helix310,
            b'i' => SecondaryStructure::PiHelix,
            b'e' => SecondaryStructure::Strand,
            b'b' => SecondaryStructure::Bridge,
            b't' => SecondaryStructure::Turn,
            b's' => SecondaryStructure::Bend,
            b'c' | b'l' | b'-' => SecondaryStructure::Coil,
            _ => SecondaryStructure::Unassigned,
        }
    }

    pub fn is_helix(&self) -> bool {
        matches!(
            self,
            SecondaryStructure::AlphaHelix
                | SecondaryStructure::Helix310
                | SecondaryStructure::PiHelix
        )
    }

    pub fn is_sheet(&self) -> bool {
        matches!(self, SecondaryStructure::Strand | SecondaryStructure::Bridge)
    }
}
