use super::{shared_object, HandlerContext, MergedGroup, TechniqueHandler};
use crate::decoded::Geometry;
use crate::render::{Material, MaterialKind, ObjectKind, RenderObject};

pub struct TerrainTechniqueHandler {
    material: Material,
    render_order: f64,
}

impl TerrainTechniqueHandler {
    pub fn new(ctx: &HandlerContext<'_>) -> Self {
        let mut material = Material::from_technique(MaterialKind::Terrain, &ctx.technique, ctx.env);
        // Terrain is the ground; it never blends with what is below
        material.transparent = false;
        material.depth_write = true;
        Self { material, render_order: ctx.technique.render_order(ctx.env) }
    }
}

impl TechniqueHandler for TerrainTechniqueHandler {
    fn add_world_space_objects(
        &mut self,
        _ctx: &HandlerContext<'_>,
        _geometry: &Geometry,
        group: &MergedGroup,
    ) -> Vec<RenderObject> {
        vec![shared_object(ObjectKind::Mesh, group, self.material.clone(), self.render_order)]
    }
}
