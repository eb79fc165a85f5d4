use super::{shared_object, HandlerContext, MergedGroup, TechniqueHandler};
use crate::decoded::Geometry;
use crate::render::{Material, MaterialKind, ObjectKind, RenderObject};

/// Squares and circles, drawn as sized points
pub struct PointTechniqueHandler {
    material: Material,
    render_order: f64,
}

impl PointTechniqueHandler {
    pub fn new(ctx: &HandlerContext<'_>) -> Self {
        let mut material = Material::from_technique(MaterialKind::Points, &ctx.technique, ctx.env);
        material.size = Some(ctx.technique.number("size", ctx.env).unwrap_or(1.0));
        Self { material, render_order: ctx.technique.render_order(ctx.env) }
    }
}

impl TechniqueHandler for PointTechniqueHandler {
    fn add_world_space_objects(
        &mut self,
        _ctx: &HandlerContext<'_>,
        _geometry: &Geometry,
        group: &MergedGroup,
    ) -> Vec<RenderObject> {
        vec![shared_object(ObjectKind::Points, group, self.material.clone(), self.render_order)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{compiled, context};
    use crate::style::MapEnv;
    use serde_json::json;

    #[test]
    fn test_point_size_follows_zoom() {
        let (decoded, state) = compiled(json!([{
            "name": "circles",
            "color": "#0000ff",
            "size": ["interpolate", ["linear"], ["zoom"], 10, 2, 20, 12]
        }]));
        let env = MapEnv::with_zoom(15.0, None);
        let ctx = context(&decoded, &state, &env, 0);
        let group = MergedGroup { geometry_index: 0, start: 0, count: 10, technique: 0 };

        let mut handler = PointTechniqueHandler::new(&ctx);
        let objects = handler.add_world_space_objects(&ctx, &Geometry::default(), &group);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].kind, ObjectKind::Points);
        assert_eq!(objects[0].material.size, Some(7.0));
    }
}
