use super::{shared_object, HandlerContext, MergedGroup, TechniqueHandler};
use crate::decoded::{Geometry, GeometryType, TechniqueName};
use crate::render::{Material, MaterialKind, ObjectKind, RenderObject};

/// Draws any technique as a single object whose primitive follows the
/// geometry type
pub struct GenericWorldSpaceTechniqueHandler {
    material: Material,
    render_order: f64,
}

impl GenericWorldSpaceTechniqueHandler {
    pub fn new(ctx: &HandlerContext<'_>) -> Self {
        let technique = &ctx.technique;
        let kind = match technique.name() {
            TechniqueName::Line
            | TechniqueName::Segments
            | TechniqueName::SolidLine
            | TechniqueName::DashedLine => MaterialKind::SolidLine,
            TechniqueName::Squares | TechniqueName::Circles => MaterialKind::Points,
            TechniqueName::Standard
            | TechniqueName::ExtrudedLine
            | TechniqueName::ExtrudedPolygon => MaterialKind::MeshStandard,
            TechniqueName::Terrain => MaterialKind::Terrain,
            _ => MaterialKind::MeshBasic,
        };
        let mut material = Material::from_technique(kind, technique, ctx.env);
        material.line_width = technique.number("lineWidth", ctx.env);
        material.size = technique.number("size", ctx.env);

        Self { material, render_order: technique.render_order(ctx.env) }
    }
}

impl TechniqueHandler for GenericWorldSpaceTechniqueHandler {
    fn add_world_space_objects(
        &mut self,
        _ctx: &HandlerContext<'_>,
        geometry: &Geometry,
        group: &MergedGroup,
    ) -> Vec<RenderObject> {
        let kind = match geometry.geometry_type {
            GeometryType::Point => ObjectKind::Points,
            GeometryType::Line | GeometryType::SolidLine => ObjectKind::Lines,
            _ => ObjectKind::Mesh,
        };
        vec![shared_object(kind, group, self.material.clone(), self.render_order)]
    }
}
