use super::{shared_object, HandlerContext, MergedGroup, TechniqueHandler};
use crate::decoded::Geometry;
use crate::render::{Material, MaterialKind, ObjectKind, RenderObject};

/// Filled polygons. When the technique sets `lineWidth` and `lineColor` the
/// polygon outline is drawn too, at the secondary render order.
pub struct FillTechniqueHandler {
    fill: Material,
    render_order: f64,
    outline: Option<(Material, f64)>,
}

impl FillTechniqueHandler {
    pub fn new(ctx: &HandlerContext<'_>) -> Self {
        let technique = &ctx.technique;
        let env = ctx.env;
        let fill = Material::from_technique(MaterialKind::MeshBasic, technique, env);

        let line_width = technique.number("lineWidth", env);
        let outline = match (line_width, technique.color("lineColor", env)) {
            (Some(width), Some(color)) if width > 0.0 => {
                let mut material = Material::new(MaterialKind::SolidLine, color);
                material.line_width = Some(width);
                material.opacity = fill.opacity * color[3];
                material.transparent = material.opacity < 1.0;
                material.fading = fill.fading;
                Some((material, technique.secondary_render_order(env)))
            }
            _ => None,
        };

        Self { fill, render_order: technique.render_order(env), outline }
    }
}

impl TechniqueHandler for FillTechniqueHandler {
    fn add_world_space_objects(
        &mut self,
        _ctx: &HandlerContext<'_>,
        _geometry: &Geometry,
        group: &MergedGroup,
    ) -> Vec<RenderObject> {
        let mut objects =
            vec![shared_object(ObjectKind::Mesh, group, self.fill.clone(), self.render_order)];
        if let Some((material, render_order)) = &self.outline {
            objects.push(shared_object(ObjectKind::Lines, group, material.clone(), *render_order));
        }
        objects
    }
}
