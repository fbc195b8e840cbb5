//! Crystallographic unit cell and its fractional/Cartesian transforms.

use super::error::Error;
use nalgebra::Matrix4;

/// Lattice parameters as read from a crystal record. Angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitcellParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub space_group: String,
}

impl Default for UnitcellParams {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 1.0,
            c: 1.0,
            alpha: 90.0,
            beta: 90.0,
            gamma: 90.0,
            space_group: "P 1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unitcell {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub space_group: String,
    pub volume: f64,
    /// Maps fractional coordinates to Cartesian Ångström.
    pub frac_to_cart: Matrix4<f64>,
    /// Inverse of `frac_to_cart`.
    pub cart_to_frac: Matrix4<f64>,
}

impl Unitcell {
    /// Derives both transforms from the lattice parameters.
    ///
    /// Uses the standard convention with `a` along x and `b` in the xy plane.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateCell`] when an edge is non-positive or the angles do
    /// not span a volume, and [`Error::SingularMatrix`] if the resulting transform cannot
    /// be inverted.
    pub fn new(params: UnitcellParams) -> Result<Self, Error> {
        let volume = cell_volume(&params)?;

        let (alpha, beta, gamma) = (
            params.alpha.to_radians(),
            params.beta.to_radians(),
            params.gamma.to_radians(),
        );
        let (cos_alpha, cos_beta, cos_gamma) = (alpha.cos(), beta.cos(), gamma.cos());
        let (sin_beta, sin_gamma) = (beta.sin(), gamma.sin());

        let c_star = params.a * params.b * sin_gamma / volume;
        let cos_alpha_star = (cos_beta * cos_gamma - cos_alpha) / (sin_beta * sin_gamma);

        #[rustfmt::skip]
        let frac_to_cart = Matrix4::new(
            params.a, params.b * cos_gamma, params.c * cos_beta,                    0.0,
            0.0,      params.b * sin_gamma, -params.c * sin_beta * cos_alpha_star, 0.0,
            0.0,      0.0,                  1.0 / c_star,                           0.0,
            0.0,      0.0,                  0.0,                                    1.0,
        );
        let cart_to_frac = frac_to_cart
            .try_inverse()
            .ok_or_else(|| Error::singular_matrix("fractional-to-Cartesian"))?;

        Ok(Self::assemble(params, volume, frac_to_cart, cart_to_frac))
    }

    /// Uses a supplied Cartesian-to-fractional (SCALE) matrix instead of deriving it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SingularMatrix`] when `scale` is not invertible, or
    /// [`Error::DegenerateCell`] for invalid lattice parameters.
    pub fn with_scale(params: UnitcellParams, scale: Matrix4<f64>) -> Result<Self, Error> {
        let volume = cell_volume(&params)?;
        let frac_to_cart = scale
            .try_inverse()
            .ok_or_else(|| Error::singular_matrix("SCALE"))?;
        Ok(Self::assemble(params, volume, frac_to_cart, scale))
    }

    fn assemble(
        params: UnitcellParams,
        volume: f64,
        frac_to_cart: Matrix4<f64>,
        cart_to_frac: Matrix4<f64>,
    ) -> Self {
        Self {
            a: params.a,
            b: params.b,
            c: params.c,
            alpha: params.alpha,
            beta: params.beta,
            gamma: params.gamma,
            space_group: params.space_group,
            volume,
            frac_to_cart,
            cart_to_frac,
        }
    }
}

fn cell_volume(p: &UnitcellParams) -> Result<f64, Error> {
    if !(p.a > 0.0 && p.b > 0.0 && p.c > 0.0) {
        return Err(Error::degenerate_cell(format!(
            "edge lengths must be positive (a={}, b={}, c={})",
            p.a, p.b, p.c
        )));
    }
    let (ca, cb, cg) = (
        p.alpha.to_radians().cos(),
        p.beta.to_radians().cos(),
        p.gamma.to_radians().cos(),
    );
    let radicand = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
    if !(radicand > 0.0) {
        return Err(Error::degenerate_cell(format!(
            "angles alpha={}, beta={}, gamma={} do not span a volume",
            p.alpha, p.beta, p.gamma
        )));
    }
    Ok(p.a * p.b * p.c * radicand.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Point;
    use approx::assert_relative_eq;

    fn params(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> UnitcellParams {
        UnitcellParams {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
            space_group: "P 1".to_string(),
        }
    }

    #[test]
    fn unit_cube_transforms_are_identity() {
        let cell = Unitcell::new(UnitcellParams::default()).unwrap();
        assert_relative_eq!(cell.frac_to_cart, Matrix4::identity(), epsilon = 1e-12);
        assert_relative_eq!(cell.cart_to_frac, Matrix4::identity(), epsilon = 1e-12);
        assert_relative_eq!(cell.volume, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn orthorhombic_cell_scales_axes() {
        let cell = Unitcell::new(params(10.0, 20.0, 30.0, 90.0, 90.0, 90.0)).unwrap();
        let p = cell.frac_to_cart.transform_point(&Point::new(0.5, 0.5, 0.5));
        assert_relative_eq!(p, Point::new(5.0, 10.0, 15.0), epsilon = 1e-9);
        assert_relative_eq!(cell.volume, 6000.0, epsilon = 1e-9);
    }

    #[test]
    fn monoclinic_cell_transforms_are_inverse() {
        // 1CRN cell.
        let cell = Unitcell::new(params(40.96, 18.65, 22.52, 90.0, 90.77, 90.0)).unwrap();
        let product = cell.frac_to_cart * cell.cart_to_frac;
        assert_relative_eq!(product, Matrix4::identity(), epsilon = 1e-9);

        let frac = Point::new(0.25, 0.5, 0.75);
        let back = cell
            .cart_to_frac
            .transform_point(&cell.frac_to_cart.transform_point(&frac));
        assert_relative_eq!(back, frac, epsilon = 1e-9);
    }

    #[test]
    fn hexagonal_cell_places_b_at_120_degrees() {
        let cell = Unitcell::new(params(10.0, 10.0, 15.0, 90.0, 90.0, 120.0)).unwrap();
        let b = cell.frac_to_cart.transform_point(&Point::new(0.0, 1.0, 0.0));
        assert_relative_eq!(b.x, -5.0, epsilon = 1e-9);
        assert_relative_eq!(b.y, 10.0 * 120f64.to_radians().sin(), epsilon = 1e-9);
    }

    #[test]
    fn new_rejects_degenerate_parameters() {
        assert!(matches!(
            Unitcell::new(params(0.0, 1.0, 1.0, 90.0, 90.0, 90.0)),
            Err(Error::DegenerateCell { .. })
        ));
        assert!(matches!(
            Unitcell::new(params(1.0, 1.0, 1.0, 0.0, 0.0, 0.0)),
            Err(Error::DegenerateCell { .. })
        ));
    }

    #[test]
    fn with_scale_inverts_supplied_matrix() {
        let scale = Matrix4::new_nonuniform_scaling(&nalgebra::Vector3::new(0.1, 0.05, 0.02));
        let cell = Unitcell::with_scale(params(10.0, 20.0, 50.0, 90.0, 90.0, 90.0), scale).unwrap();
        assert_relative_eq!(cell.cart_to_frac, scale);
        let p = cell.frac_to_cart.transform_point(&Point::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point::new(10.0, 20.0, 50.0), epsilon = 1e-9);
    }

    #[test]
    fn with_scale_rejects_singular_matrix() {
        assert!(matches!(
            Unitcell::with_scale(UnitcellParams::default(), Matrix4::zeros()),
            Err(Error::SingularMatrix { .. })
        ));
    }
}
