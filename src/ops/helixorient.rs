//! Local helix geometry from four consecutive trace atoms.
//!
//! For every window of four trace positions the local helix axis is the normalized
//! cross product of the two second differences, and the helix center of the inner two
//! residues lies one radius along those differences. The two end centers are projected
//! onto the axis through their neighbors. Per-window values are then averaged onto
//! residues. This is the approach of the GROMACS `helixorient` tool.

use crate::model::polymer::{Landmark, Polymer};
use crate::model::types::Point;
use nalgebra::Vector3;

/// Helix parameters per residue of a polymer.
#[derive(Debug, Clone, PartialEq)]
pub struct HelixPosition {
    /// Point on the local helix axis closest to each residue's trace atom.
    pub center: Vec<Point>,
    /// Unit direction of the local helix axis.
    pub axis: Vec<Vector3<f64>>,
    /// Angle between successive local axes, in degrees; `0` on the two residues at
    /// each end.
    pub bending: Vec<f64>,
    pub radius: Vec<f64>,
    pub rise: Vec<f64>,
    /// Rotation per residue around the axis, in degrees.
    pub twist: Vec<f64>,
}

impl HelixPosition {
    pub fn len(&self) -> usize {
        self.center.len()
    }

    pub fn is_empty(&self) -> bool {
        self.center.is_empty()
    }
}

/// Computes helix parameters along a polymer's trace.
///
/// Returns `None` for polymers shorter than four residues or with a residue lacking a
/// trace atom.
pub fn helix_position(polymer: &Polymer) -> Option<HelixPosition> {
    let n = polymer.residue_count();
    if n < 4 {
        return None;
    }

    let atoms = &polymer.structure().atom_store;
    let trace: Vec<Point> = (0..n)
        .map(|i| {
            polymer
                .atom_index_by_landmark(i as isize, Landmark::Trace)
                .map(|atom| atoms.position(atom))
        })
        .collect::<Option<_>>()?;

    let windows = n - 3;
    let mut center = vec![Point::origin(); n];
    let mut axis = vec![Vector3::zeros(); windows];
    let mut radius = vec![0.0; windows];
    let mut rise = vec![0.0; windows];
    let mut twist = vec![0.0; windows];

    for i in 0..windows {
        let (a1, a2, a3, a4) = (trace[i], trace[i + 1], trace[i + 2], trace[i + 3]);
        let r12 = a2 - a1;
        let r23 = a3 - a2;
        let r34 = a4 - a3;
        let diff13 = r12 - r23;
        let diff24 = r23 - r34;

        axis[i] = unit(&diff13.cross(&diff24));

        let cos = diff13.angle(&diff24).cos();
        twist[i] = cos.clamp(-1.0, 1.0).acos().to_degrees();

        let (len13, len24) = (diff13.norm(), diff24.norm());
        radius[i] = (len24 * len13).sqrt() / f64::max(2.0, 2.0 * (1.0 - cos));
        rise[i] = r23.dot(&axis[i]).abs();

        center[i + 1] = a2 - scaled_to(&diff13, radius[i]);
        center[i + 2] = a3 - scaled_to(&diff24, radius[i]);
    }

    let first_axis = unit(&(center[1] - center[2]));
    center[0] = project_on_axis(&trace[0], &first_axis, &center[1]);
    let last_axis = unit(&(center[n - 2] - center[n - 3]));
    center[n - 1] = project_on_axis(&trace[n - 1], &last_axis, &center[n - 2]);

    let mut res_radius = vec![0.0; n];
    let mut res_rise = vec![0.0; n];
    let mut res_twist = vec![0.0; n];
    let mut res_bending = vec![0.0; n];
    let mut res_axis = vec![Vector3::zeros(); n];

    res_radius[1] = radius[0];
    res_rise[1] = rise[0];
    res_twist[1] = twist[0];
    res_axis[0] = axis[0];
    res_axis[1] = axis[0];

    for i in 2..n - 2 {
        res_radius[i] = 0.5 * (radius[i - 2] + radius[i - 1]);
        res_rise[i] = 0.5 * (rise[i - 2] + rise[i - 1]);
        res_twist[i] = 0.5 * (twist[i - 2] + twist[i - 1]);
        res_bending[i] = axis[i - 2].angle(&axis[i - 1]).to_degrees();
        res_axis[i] = unit(&(axis[i - 2] + axis[i - 1]));
    }

    res_radius[n - 2] = radius[n - 4];
    res_rise[n - 2] = rise[n - 4];
    res_twist[n - 2] = twist[n - 4];
    res_axis[n - 2] = axis[n - 4];
    res_axis[n - 1] = axis[n - 4];

    Some(HelixPosition {
        center,
        axis: res_axis,
        bending: res_bending,
        radius: res_radius,
        rise: res_rise,
        twist: res_twist,
    })
}

/// Unit vector along `v`; zero for a zero vector.
fn unit(v: &Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
}

/// `v` rescaled to `length`; zero for a zero vector.
fn scaled_to(v: &Vector3<f64>, length: f64) -> Vector3<f64> {
    unit(v) * length
}

/// Orthogonal projection of `point` onto the line through `origin` along unit `axis`.
fn project_on_axis(point: &Point, axis: &Vector3<f64>, origin: &Point) -> Point {
    origin + axis * (point - origin).dot(axis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use approx::assert_relative_eq;

    #[test]
    fn helix_position_on_short_polymer_is_none() {
        let structure = fixtures::cg_helix(3);
        let polymer = Polymer::new(&structure, 0, 2);
        assert!(helix_position(&polymer).is_none());
    }

    #[test]
    fn helix_position_of_alpha_helix_has_ideal_parameters() {
        let structure = fixtures::cg_helix(12);
        let polymer = Polymer::new(&structure, 0, 11);
        let position = helix_position(&polymer).unwrap();

        assert_eq!(position.len(), 12);
        for i in 2..10 {
            assert!((2.0..2.6).contains(&position.radius[i]), "radius {}", position.radius[i]);
            assert!((1.3..1.8).contains(&position.rise[i]), "rise {}", position.rise[i]);
            assert!((90.0..110.0).contains(&position.twist[i]), "twist {}", position.twist[i]);
            assert!(position.bending[i] < 5.0);
            assert_relative_eq!(position.axis[i].norm(), 1.0, epsilon = 1e-9);
        }
        assert_eq!(position.bending[0], 0.0);
        assert_eq!(position.bending[11], 0.0);
    }

    #[test]
    fn helix_position_centers_step_by_the_rise() {
        let structure = fixtures::cg_helix(10);
        let polymer = Polymer::new(&structure, 0, 9);
        let position = helix_position(&polymer).unwrap();

        for i in 0..9 {
            let step = (position.center[i + 1] - position.center[i]).norm();
            assert!(step > 1.0 && step < 2.0, "center step {} at {}", step, i);
        }
    }

    #[test]
    fn project_on_axis_drops_perpendicular_component() {
        let projected = project_on_axis(
            &Point::new(3.0, 4.0, 5.0),
            &Vector3::new(0.0, 0.0, 1.0),
            &Point::new(1.0, 1.0, 0.0),
        );
        assert_relative_eq!(projected, Point::new(1.0, 1.0, 5.0), epsilon = 1e-12);
    }
}
