//! Background plane covering a tile

use super::TileGeometryCreator;
use crate::decoded::GeometryKind;
use crate::geo::{ProjectionType, Vector3};
use crate::logging::profile_timing;
use crate::map::MapContext;
use crate::render::{Material, MaterialKind, ObjectGeometry, ObjectKind, RenderObject};
use crate::tessellation::{
    BufferGeometry,
    EdgeLengthGeometrySubdivisionModifier,
    LodMesh,
    MeshData,
    SphericalGeometrySubdivisionModifier,
    SubdivisionMode,
    SubdivisionModifier,
};
use crate::tile::Tile;
use rayon::prelude::*;

/// Triangles of the corner quad: south-west, south-east, north-west, north-east
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];
const QUAD_UVS: [[f64; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

impl TileGeometryCreator {
    /// Mesh covering the tile's geo box, relative to the tile center.
    ///
    /// On the globe the quad is bent onto the sphere. With mixed LOD enabled
    /// the result holds one mesh per level, level `n` pre-split into a
    /// `2^n` grid along each axis.
    pub fn create_ground_plane(
        &self,
        tile: &Tile,
        map: &MapContext,
        create_tex_coords: bool,
    ) -> ObjectGeometry {
        let source = tile.data_source.tiling_projection;
        let target = tile.projection;
        let center = tile.center;
        let geo_box = tile.geo_box;

        let corners = [
            geo_box.south_west(),
            geo_box.south_east(),
            geo_box.north_west(),
            geo_box.north_east(),
        ];
        let mut geometry = BufferGeometry {
            positions: corners.iter().map(|corner| source.project_point(*corner)).collect(),
            uvs: create_tex_coords.then(|| QUAD_UVS.to_vec()),
            indices: QUAD_INDICES.to_vec(),
        };

        // Large world coordinates lose precision as f32; store offsets from the center
        let move_tile_center = move |p: Vector3| target.reproject_point(&source, p) - center;

        if target.projection_type() != ProjectionType::Spherical {
            return ObjectGeometry::Owned(geometry.to_mesh_data(move_tile_center));
        }

        let spherical = SphericalGeometrySubdivisionModifier::new(
            self.config.spherical_subdivision_angle_deg,
            source,
        );

        if !map.mixed_lod_enabled() {
            spherical.modify(&mut geometry);
            return ObjectGeometry::Owned(geometry.to_mesh_data(move_tile_center));
        }

        let start = std::time::Instant::now();
        let levels: Vec<MeshData> = (0..self.config.mixed_lod_levels.max(1))
            .into_par_iter()
            .map(|level| {
                let mut level_geometry = geometry.clone();
                let subdivision = 1u32 << level.min(16);
                if subdivision > 1 {
                    EdgeLengthGeometrySubdivisionModifier::new(
                        subdivision,
                        &geo_box,
                        SubdivisionMode::All,
                        source,
                    )
                    .modify(&mut level_geometry);
                }
                spherical.modify(&mut level_geometry);
                level_geometry.to_mesh_data(move_tile_center)
            })
            .collect();

        if profile_timing() {
            tracing::info!(
                tile = ?tile.tile_key,
                levels = levels.len(),
                vertices = levels.last().map(MeshData::vertex_count).unwrap_or(0),
                elapsed = ?start.elapsed(),
                "ground plane LOD mesh"
            );
        }
        ObjectGeometry::Lod(LodMesh::new(levels))
    }

    /// Add the ground plane to the tile's objects, drawn in the map's clear color
    pub fn add_ground_plane(&self, tile: &mut Tile, map: &MapContext, render_order: f64) {
        let geometry = self.create_ground_plane(tile, map, false);

        let mut material = Material::new(MaterialKind::MeshBasic, map.clear_color);
        material.depth_write = tile.projection.projection_type() == ProjectionType::Spherical;

        let mut object =
            RenderObject::new(ObjectKind::Mesh, geometry, material).with_render_order(render_order);
        self.register_tile_object(tile, &mut object, &[GeometryKind::Background]);
        tile.objects.push(object);
    }
}
