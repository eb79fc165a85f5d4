//! Adaptive triangle subdivision
//!
//! Triangles are split in two across one edge until the modifier accepts
//! them. Midpoints are cached per edge so neighbouring triangles share the
//! new vertex and the mesh stays watertight.

use super::mesh::BufferGeometry;
use crate::geo::Vector3;
use std::collections::HashMap;

/// Hard cap on produced vertices; malformed input must not loop forever
const MAX_VERTICES: usize = 1 << 20;

#[inline]
fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A rule deciding which triangle edges to split
pub trait SubdivisionModifier {
    /// Edge of triangle `(a, b, c)` to split: 0 is a-b, 1 is b-c, 2 is c-a
    fn should_split_triangle(&self, a: Vector3, b: Vector3, c: Vector3) -> Option<usize>;

    /// New vertex between `a` and `b`
    fn midpoint(&self, a: Vector3, b: Vector3) -> Vector3 {
        a.lerp(b, 0.5)
    }

    /// Subdivide `geometry` in place. Texture coordinates are interpolated
    /// linearly along split edges.
    fn modify(&self, geometry: &mut BufferGeometry) {
        let mut cache: HashMap<(u32, u32), u32> = HashMap::new();
        let mut pending: Vec<[u32; 3]> = geometry
            .indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();
        pending.reverse();
        let mut done: Vec<u32> = Vec::with_capacity(geometry.indices.len());

        while let Some(tri) = pending.pop() {
            let [a, b, c] = tri;
            let pa = geometry.positions[a as usize];
            let pb = geometry.positions[b as usize];
            let pc = geometry.positions[c as usize];

            let split = if geometry.positions.len() >= MAX_VERTICES {
                None
            } else {
                self.should_split_triangle(pa, pb, pc)
            };

            let Some(edge) = split else {
                done.extend_from_slice(&tri);
                continue;
            };

            // Rotate so the split edge is always (v0, v1)
            let [v0, v1, v2] = match edge {
                0 => [a, b, c],
                1 => [b, c, a],
                _ => [c, a, b],
            };

            let mid = *cache.entry(edge_key(v0, v1)).or_insert_with(|| {
                let p0 = geometry.positions[v0 as usize];
                let p1 = geometry.positions[v1 as usize];
                geometry.positions.push(self.midpoint(p0, p1));
                if let Some(uvs) = geometry.uvs.as_mut() {
                    let t0 = uvs[v0 as usize];
                    let t1 = uvs[v1 as usize];
                    uvs.push([(t0[0] + t1[0]) * 0.5, (t0[1] + t1[1]) * 0.5]);
                }
                (geometry.positions.len() - 1) as u32
            });

            pending.push([mid, v1, v2]);
            pending.push([v0, mid, v2]);
        }

        if geometry.positions.len() >= MAX_VERTICES {
            tracing::warn!(
                vertices = geometry.positions.len(),
                "subdivision stopped at vertex limit"
            );
        }
        geometry.indices = done;
    }
}
