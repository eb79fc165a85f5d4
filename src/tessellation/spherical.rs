//! Subdivision that bends flat geometry onto the globe

use super::subdivision::SubdivisionModifier;
use crate::geo::{Projection, Vector3};

/// Splits edges spanning more than `max_angle` radians of arc.
///
/// Positions are expressed in `projection` world space; angles and
/// midpoints are computed on the sphere so new vertices land on the great
/// circle between their endpoints.
#[derive(Debug, Clone, Copy)]
pub struct SphericalGeometrySubdivisionModifier {
    pub max_angle: f64,
    pub projection: Projection,
}

impl SphericalGeometrySubdivisionModifier {
    pub fn new(max_angle_deg: f64, projection: Projection) -> Self {
        Self { max_angle: max_angle_deg.to_radians(), projection }
    }

    fn to_sphere(&self, p: Vector3) -> Vector3 {
        Projection::Sphere.reproject_point(&self.projection, p)
    }
}

impl SubdivisionModifier for SphericalGeometrySubdivisionModifier {
    fn should_split_triangle(&self, a: Vector3, b: Vector3, c: Vector3) -> Option<usize> {
        let (a, b, c) = (self.to_sphere(a), self.to_sphere(b), self.to_sphere(c));
        let angles = [a.angle_to(b), b.angle_to(c), c.angle_to(a)];

        let mut edge = None;
        let mut widest = self.max_angle;
        for (i, angle) in angles.into_iter().enumerate() {
            if angle > widest {
                widest = angle;
                edge = Some(i);
            }
        }
        edge
    }

    fn midpoint(&self, a: Vector3, b: Vector3) -> Vector3 {
        let (sa, sb) = (self.to_sphere(a), self.to_sphere(b));
        let radius = (sa.length() + sb.length()) * 0.5;
        let mid = sa.lerp(sb, 0.5).normalize() * radius;
        self.projection.reproject_point(&Projection::Sphere, mid)
    }
}
