use super::{shared_object, HandlerContext, MergedGroup, TechniqueHandler};
use crate::decoded::{Geometry, TechniqueName};
use crate::render::{Material, MaterialKind, ObjectKind, RenderObject};

/// Solid and dashed lines. A `secondaryWidth` wider than the line adds an
/// outline drawn underneath in `secondaryColor`.
pub struct SolidLineTechniqueHandler {
    line: Material,
    render_order: f64,
    outline: Option<(Material, f64)>,
}

impl SolidLineTechniqueHandler {
    pub fn new(ctx: &HandlerContext<'_>) -> Self {
        let technique = &ctx.technique;
        let env = ctx.env;
        let kind = if technique.name() == TechniqueName::DashedLine {
            MaterialKind::DashedLine
        } else {
            MaterialKind::SolidLine
        };

        let mut line = Material::from_technique(kind, technique, env);
        let width = technique.number("lineWidth", env).unwrap_or(1.0);
        line.line_width = Some(width);

        let outline = technique
            .number("secondaryWidth", env)
            .filter(|secondary| *secondary > width)
            .map(|secondary| {
                let color = technique.color("secondaryColor", env).unwrap_or(line.color);
                let mut material = Material::new(MaterialKind::SolidLine, color);
                material.line_width = Some(secondary);
                material.opacity = line.opacity;
                material.transparent = line.transparent;
                material.fading = line.fading;
                (material, technique.secondary_render_order(env))
            });

        Self { line, render_order: technique.render_order(env), outline }
    }
}

impl TechniqueHandler for SolidLineTechniqueHandler {
    fn add_world_space_objects(
        &mut self,
        _ctx: &HandlerContext<'_>,
        _geometry: &Geometry,
        group: &MergedGroup,
    ) -> Vec<RenderObject> {
        let mut objects = Vec::with_capacity(2);
        if let Some((material, render_order)) = &self.outline {
            objects.push(shared_object(ObjectKind::Lines, group, material.clone(), *render_order));
        }
        objects.push(shared_object(ObjectKind::Lines, group, self.line.clone(), self.render_order));
        objects
    }
}
