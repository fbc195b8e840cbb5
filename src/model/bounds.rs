//! Axis-aligned bounding boxes.

use super::types::Point;
use nalgebra::{Matrix4, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// A box containing nothing; expanding it by a point yields that point.
    pub fn empty() -> Self {
        Self {
            min: Point::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_by_point(&p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn expand_by_point(&mut self, p: &Point) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        BoundingBox {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Midpoint of the box, or the origin for an empty box.
    pub fn center(&self) -> Point {
        if self.is_empty() {
            return Point::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    pub fn corners(&self) -> [Point; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point::new(lo.x, lo.y, lo.z),
            Point::new(hi.x, lo.y, lo.z),
            Point::new(lo.x, hi.y, lo.z),
            Point::new(lo.x, lo.y, hi.z),
            Point::new(hi.x, hi.y, lo.z),
            Point::new(hi.x, lo.y, hi.z),
            Point::new(lo.x, hi.y, hi.z),
            Point::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Box enclosing the eight corners after applying an affine transform.
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        BoundingBox::from_points(
            self.corners()
                .iter()
                .map(|corner| matrix.transform_point(corner)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_box_reports_empty_and_origin_center() {
        let bbox = BoundingBox::empty();
        assert!(bbox.is_empty());
        assert_eq!(bbox.center(), Point::origin());
        assert_eq!(bbox.size(), Vector3::zeros());
    }

    #[test]
    fn from_points_encloses_all_points() {
        let bbox = BoundingBox::from_points([
            Point::new(1.0, -2.0, 3.0),
            Point::new(-1.0, 4.0, 0.0),
        ]);
        assert_eq!(bbox.min, Point::new(-1.0, -2.0, 0.0));
        assert_eq!(bbox.max, Point::new(1.0, 4.0, 3.0));
        assert_eq!(bbox.center(), Point::new(0.0, 1.0, 1.5));
    }

    #[test]
    fn union_ignores_empty_operand() {
        let a = BoundingBox::from_points([Point::new(0.0, 0.0, 0.0)]);
        assert_eq!(a.union(&BoundingBox::empty()), a);
        assert_eq!(BoundingBox::empty().union(&a), a);
    }

    #[test]
    fn transformed_translates_box() {
        let bbox = BoundingBox::from_points([
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 1.0),
        ]);
        let shifted = bbox.transformed(&Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0)));
        assert_relative_eq!(shifted.min.x, 10.0);
        assert_relative_eq!(shifted.max.x, 11.0);
        assert_relative_eq!(shifted.max.y, 1.0);
    }
}
