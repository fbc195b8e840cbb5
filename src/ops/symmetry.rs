//! Space-group operators and the crystallographic assemblies built from them.

use crate::db;
use crate::model::{assembly::Assembly, structure::Structure, types::Point};
use crate::ops::error::Error;
use nalgebra::{Matrix4, Vector3, Vector4};

/// Lattice shifts of the 3x3x3 supercell, in the order the `SUPERCELL` assembly lists
/// them. The unshifted cell comes 25th.
#[rustfmt::skip]
const SUPERCELL_SHIFTS: [[f64; 3]; 27] = [
    [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0],
    [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0],
    [1.0, 1.0, 0.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0],
    [-1.0, -1.0, 0.0], [-1.0, 0.0, -1.0], [0.0, -1.0, -1.0],
    [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0],
    [0.0, 1.0, -1.0], [0.0, -1.0, 1.0], [1.0, 0.0, -1.0],
    [-1.0, 0.0, 1.0], [1.0, -1.0, 0.0], [-1.0, 1.0, 0.0],
    [0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0],
];

/// Parses one operator such as `-x,y+1/2,-z` into a fractional-space affine matrix.
///
/// Each of the three comma-separated components is a signed sum of `x`, `y`, `z` terms
/// (optionally with a numeric coefficient) and constants written as integers,
/// decimals, or fractions. Letters are case-insensitive and whitespace is ignored.
///
/// # Errors
///
/// Returns [`Error::MalformedOperator`] when the string does not have exactly three
/// components or a component contains anything else.
pub fn parse_operator(operator: &str) -> Result<Matrix4<f64>, Error> {
    let components: Vec<&str> = operator.split(',').collect();
    if components.len() != 3 {
        return Err(Error::malformed_operator(
            operator,
            format!("expected 3 components, found {}", components.len()),
        ));
    }

    let mut matrix = Matrix4::zeros();
    matrix[(3, 3)] = 1.0;
    for (row, component) in components.iter().enumerate() {
        parse_component(operator, component, row, &mut matrix)?;
    }
    Ok(matrix)
}

fn parse_component(
    operator: &str,
    component: &str,
    row: usize,
    matrix: &mut Matrix4<f64>,
) -> Result<(), Error> {
    let chars: Vec<char> = component.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.is_empty() {
        return Err(Error::malformed_operator(operator, "empty component"));
    }

    let mut i = 0;
    while i < chars.len() {
        let mut sign = 1.0;
        while i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
            if chars[i] == '-' {
                sign = -sign;
            }
            i += 1;
        }

        let start = i;
        while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '/')
        {
            i += 1;
        }
        let number = if i > start {
            let text: String = chars[start..i].iter().collect();
            Some(parse_number(operator, &text)?)
        } else {
            None
        };
        if i < chars.len() && chars[i] == '*' && number.is_some() {
            i += 1;
        }

        let axis = chars.get(i).and_then(|c| match c.to_ascii_lowercase() {
            'x' => Some(0),
            'y' => Some(1),
            'z' => Some(2),
            _ => None,
        });
        match (axis, number) {
            (Some(col), coefficient) => {
                matrix[(row, col)] += sign * coefficient.unwrap_or(1.0);
                i += 1;
            }
            (None, Some(value)) => matrix[(row, 3)] += sign * value,
            (None, None) => {
                let found = chars.get(i).map_or("end of component".to_string(), |c| {
                    format!("unexpected character '{}'", c)
                });
                return Err(Error::malformed_operator(operator, found));
            }
        }
    }
    Ok(())
}

fn parse_number(operator: &str, text: &str) -> Result<f64, Error> {
    let invalid = || Error::malformed_operator(operator, format!("invalid number '{}'", text));
    match text.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.parse().map_err(|_| invalid())?;
            let denominator: f64 = denominator.parse().map_err(|_| invalid())?;
            if denominator == 0.0 {
                return Err(invalid());
            }
            Ok(numerator / denominator)
        }
        None => text.parse().map_err(|_| invalid()),
    }
}

/// Fractional-space operator matrices of a space group, in table order.
///
/// The symbol may be the full Hermann-Mauguin symbol or a common short form.
///
/// # Errors
///
/// Returns [`Error::UnknownSpaceGroup`] for symbols missing from the embedded table and
/// [`Error::MalformedOperator`] if a table entry fails to parse.
pub fn get_symmetry_operators(space_group: &str) -> Result<Vec<Matrix4<f64>>, Error> {
    let operators = db::space_group_operators(space_group)
        .ok_or_else(|| Error::unknown_space_group(space_group))?;
    operators.iter().map(|op| parse_operator(op)).collect()
}

/// Canonical symbols of every space group with known operators, sorted.
pub fn supported_space_groups() -> Vec<&'static str> {
    db::space_group_symbols()
}

/// Adds the `UNITCELL` and `SUPERCELL` assemblies for a structure with a unit cell.
///
/// Every operator image is shifted by whole lattice vectors so that the image of the
/// structure center lands in the same cell as the center itself. `SUPERCELL` repeats
/// that for the 26 neighboring cells. When an `NCS` assembly exists, every matrix is
/// combined with the identity and each NCS operator of its first part.
///
/// Structures without a unit cell are left unchanged, and an unknown space group is
/// reported with a warning and skipped.
///
/// # Errors
///
/// Returns [`Error::MalformedOperator`] if a table entry fails to parse.
pub fn build_unitcell_assembly(structure: &mut Structure) -> Result<(), Error> {
    let Some(unitcell) = structure.unitcell.as_ref() else {
        return Ok(());
    };

    let operators = match get_symmetry_operators(&unitcell.space_group) {
        Ok(operators) => operators,
        Err(Error::UnknownSpaceGroup { symbol }) => {
            log::warn!(
                "unknown space group '{}', skipping unit cell assemblies",
                symbol
            );
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let center_frac = transform_point(&unitcell.cart_to_frac, &structure.center);
    let center_cell = center_frac.coords.map(f64::floor);

    let matrix_list = |shift: Vector3<f64>| -> Vec<Matrix4<f64>> {
        operators
            .iter()
            .map(|op| {
                let image_cell = transform_point(op, &center_frac).coords.map(f64::floor);
                let translation =
                    op.fixed_view::<3, 1>(0, 3).into_owned() - image_cell + center_cell + shift;
                let mut m = *op;
                m.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
                unitcell.frac_to_cart * m * unitcell.cart_to_frac
            })
            .collect()
    };

    let ncs: Option<Vec<Matrix4<f64>>> = structure
        .biomol_dict
        .get("NCS")
        .and_then(|assembly| assembly.parts().first())
        .map(|part| {
            std::iter::once(Matrix4::identity())
                .chain(part.matrices.iter().copied())
                .collect()
        });
    let with_ncs = |matrices: Vec<Matrix4<f64>>| -> Vec<Matrix4<f64>> {
        match &ncs {
            Some(ncs) => matrices
                .iter()
                .flat_map(|m| ncs.iter().map(move |n| m * n))
                .collect(),
            None => matrices,
        }
    };

    let unitcell_matrices = with_ncs(matrix_list(Vector3::zeros()));
    let supercell_matrices = with_ncs(
        SUPERCELL_SHIFTS
            .iter()
            .flat_map(|shift| matrix_list(Vector3::from(*shift)))
            .collect(),
    );

    log::debug!(
        "unit cell assemblies: {} and {} instances",
        unitcell_matrices.len(),
        supercell_matrices.len()
    );

    let mut unitcell_assembly = Assembly::new("UNITCELL");
    unitcell_assembly.add_part(unitcell_matrices, Vec::new());
    let mut supercell_assembly = Assembly::new("SUPERCELL");
    supercell_assembly.add_part(supercell_matrices, Vec::new());

    structure.biomol_dict.insert(unitcell_assembly);
    structure.biomol_dict.insert(supercell_assembly);
    Ok(())
}

fn transform_point(matrix: &Matrix4<f64>, point: &Point) -> Point {
    let v = matrix * Vector4::new(point.x, point.y, point.z, 1.0);
    Point::new(v.x, v.y, v.z)
}
