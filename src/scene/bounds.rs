//! Axis-aligned bounding boxes

use nalgebra::{Matrix4, Point3, Vector3};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Point3<f64>,
    /// Maximum corner
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Create a box from its corners
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all points, or `None` for no points
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, p| {
            Self::new(bounds.min.inf(&p), bounds.max.sup(&p))
        }))
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Bounds of this box after an affine transform
    ///
    /// The result encloses all eight transformed corners.
    pub fn transformed(&self, transform: &Matrix4<f64>) -> Self {
        let corners = (0..8).map(|i| {
            let corner = Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            transform.transform_point(&corner)
        });
        // Eight corners are always present
        Self::from_points(corners).unwrap_or(*self)
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Center point
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        assert!(BoundingBox::from_points(Vec::new()).is_none());

        let bounds = BoundingBox::from_points([
            Point3::new(1.0, -2.0, 3.0),
            Point3::new(-1.0, 4.0, 0.0),
        ])
        .unwrap();
        assert_eq!(bounds.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 4.0, 3.0));
        assert_eq!(bounds.size(), Vector3::new(2.0, 6.0, 3.0));
        assert_eq!(bounds.center(), Point3::new(0.0, 1.0, 1.5));
    }

    #[test]
    fn test_union() {
        let a = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = BoundingBox::new(Point3::new(2.0, -1.0, 0.5), Point3::new(3.0, 0.5, 0.7));
        let u = a.union(&b);
        assert_eq!(u.min, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Point3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn test_transformed_translation_and_scale() {
        let unit = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let transform = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0))
            * Matrix4::new_scaling(2.0);
        let moved = unit.transformed(&transform);
        assert_eq!(moved.min, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(moved.max, Point3::new(12.0, 2.0, 2.0));
    }

    #[test]
    fn test_transformed_rotation() {
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let rotation = Matrix4::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let rotated = bounds.transformed(&rotation);
        assert!((rotated.min.x - -1.0).abs() < 1e-12);
        assert!((rotated.max.y - 2.0).abs() < 1e-12);
    }
}
