//! Subdivision to a maximum edge length derived from a geo box

use super::subdivision::SubdivisionModifier;
use crate::geo::{GeoBox, Projection, Vector3};

/// Tolerance for float noise when comparing against the length limits
const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubdivisionMode {
    /// Split any edge that is too long
    All,
    /// Split axis-aligned edges only
    NoDiagonals,
}

/// Splits edges until every edge spans at most `1 / subdivision` of the geo
/// box extent along x and y of the projected box.
#[derive(Debug, Clone, Copy)]
pub struct EdgeLengthGeometrySubdivisionModifier {
    max_length_x: f64,
    max_length_y: f64,
    mode: SubdivisionMode,
}

impl EdgeLengthGeometrySubdivisionModifier {
    pub fn new(
        subdivision: u32,
        geo_box: &GeoBox,
        mode: SubdivisionMode,
        projection: Projection,
    ) -> Self {
        let sw = projection.project_point(geo_box.south_west());
        let ne = projection.project_point(geo_box.north_east());
        let subdivision = subdivision.max(1) as f64;
        Self {
            max_length_x: (ne.x - sw.x).abs() / subdivision,
            max_length_y: (ne.y - sw.y).abs() / subdivision,
            mode,
        }
    }

    /// How far an edge exceeds the limits, `None` when it may not be split
    fn excess(&self, from: Vector3, to: Vector3) -> Option<f64> {
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        if self.mode == SubdivisionMode::NoDiagonals && dx > EPSILON && dy > EPSILON {
            return None;
        }
        let ratio_x = if self.max_length_x > 0.0 { dx / self.max_length_x } else { 0.0 };
        let ratio_y = if self.max_length_y > 0.0 { dy / self.max_length_y } else { 0.0 };
        let ratio = ratio_x.max(ratio_y);
        (ratio > 1.0 + EPSILON).then_some(ratio)
    }
}

impl SubdivisionModifier for EdgeLengthGeometrySubdivisionModifier {
    fn should_split_triangle(&self, a: Vector3, b: Vector3, c: Vector3) -> Option<usize> {
        [self.excess(a, b), self.excess(b, c), self.excess(c, a)]
            .into_iter()
            .enumerate()
            .filter_map(|(i, excess)| excess.map(|e| (i, e)))
            .fold(None, |best: Option<(usize, f64)>, (i, e)| match best {
                Some((_, best_e)) if best_e >= e => best,
                _ => Some((i, e)),
            })
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tessellation::BufferGeometry;

    fn plane(geo_box: &GeoBox) -> BufferGeometry {
        let p = Projection::Mercator;
        BufferGeometry {
            positions: vec![
                p.project_point(geo_box.south_west()),
                p.project_point(geo_box.south_east()),
                p.project_point(geo_box.north_west()),
                p.project_point(geo_box.north_east()),
            ],
            uvs: None,
            indices: vec![0, 1, 2, 2, 1, 3],
        }
    }

    #[test]
    fn test_subdivision_of_one_keeps_quad() {
        let geo_box = GeoBox::new(0.0, 0.0, 10.0, 10.0);
        let mut geometry = plane(&geo_box);
        let mode = SubdivisionMode::All;
        EdgeLengthGeometrySubdivisionModifier::new(1, &geo_box, mode, Projection::Mercator)
            .modify(&mut geometry);
        assert_eq!(geometry.triangle_count(), 2);
    }

    #[test]
    fn test_edges_respect_limits() {
        let geo_box = GeoBox::new(0.0, 0.0, 10.0, 10.0);
        let modifier = EdgeLengthGeometrySubdivisionModifier::new(
            4,
            &geo_box,
            SubdivisionMode::All,
            Projection::Mercator,
        );
        let mut geometry = plane(&geo_box);
        modifier.modify(&mut geometry);

        assert!(geometry.triangle_count() >= 32);
        for tri in geometry.indices.chunks_exact(3) {
            let p: Vec<Vector3> = tri.iter().map(|&i| geometry.positions[i as usize]).collect();
            assert!(modifier.should_split_triangle(p[0], p[1], p[2]).is_none());
        }
    }

    #[test]
    fn test_no_diagonals_mode_skips_diagonal_edges() {
        let geo_box = GeoBox::new(0.0, 0.0, 10.0, 10.0);
        let modifier = EdgeLengthGeometrySubdivisionModifier::new(
            2,
            &geo_box,
            SubdivisionMode::NoDiagonals,
            Projection::Mercator,
        );
        let a = Vector3::new(0.0, 0.0, 0.0);
        let far = Vector3::new(1.0e7, 1.0e7, 0.0);
        assert!(modifier.excess(a, far).is_none());
        assert!(modifier.excess(a, Vector3::new(1.0e7, 0.0, 0.0)).is_some());
    }
}
