use super::{shared_object, HandlerContext, MergedGroup, TechniqueHandler};
use crate::decoded::Geometry;
use crate::render::{Material, MaterialKind, ObjectKind, PolygonFadingParameters, RenderObject};

/// Share of the edge color mixed into the volume color when not styled
const DEFAULT_LINE_COLOR_MIX: f64 = 0.6;

/// Extruded building volumes. `lineWidth > 0` adds outline edges that fade
/// with `lineFadeNear`/`lineFadeFar`, defaulting to the volume's fading.
pub struct ExtrudedPolygonTechniqueHandler {
    volume: Material,
    edges: Option<Material>,
    render_order: f64,
}

impl ExtrudedPolygonTechniqueHandler {
    pub fn new(ctx: &HandlerContext<'_>) -> Self {
        let technique = &ctx.technique;
        let env = ctx.env;
        let mut volume = Material::from_technique(MaterialKind::MeshStandard, technique, env);

        let line_width = technique.number("lineWidth", env).unwrap_or(0.0);
        let edges = (line_width > 0.0).then(|| {
            let color = technique.color("lineColor", env).unwrap_or(volume.color);
            let fading = PolygonFadingParameters {
                color,
                color_mix: technique
                    .number("lineColorMix", env)
                    .unwrap_or(DEFAULT_LINE_COLOR_MIX)
                    .clamp(0.0, 1.0),
                line_fade_near: technique
                    .number("lineFadeNear", env)
                    .or_else(|| technique.fade_near(env))
                    .unwrap_or(0.0),
                line_fade_far: technique
                    .number("lineFadeFar", env)
                    .or_else(|| technique.fade_far(env))
                    .unwrap_or(0.0),
            };
            volume.polygon_fading = Some(fading);

            let mut edges = Material::new(MaterialKind::Edges, color);
            edges.line_width = Some(line_width);
            edges.opacity = volume.opacity;
            edges.transparent = volume.transparent;
            edges.polygon_fading = Some(fading);
            edges
        });

        Self { volume, edges, render_order: technique.render_order(env) }
    }
}

impl TechniqueHandler for ExtrudedPolygonTechniqueHandler {
    fn add_world_space_objects(
        &mut self,
        _ctx: &HandlerContext<'_>,
        _geometry: &Geometry,
        group: &MergedGroup,
    ) -> Vec<RenderObject> {
        let mut objects =
            vec![shared_object(ObjectKind::Volume, group, self.volume.clone(), self.render_order)];
        if let Some(edges) = &self.edges {
            objects.push(shared_object(ObjectKind::Edges, group, edges.clone(), self.render_order));
        }
        objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{compiled, context};
    use crate::style::MapEnv;
    use serde_json::json;

    #[test]
    fn test_edges_carry_polygon_fading() {
        let (decoded, state) = compiled(json!([{
            "name": "extruded-polygon",
            "color": "#808080",
            "lineWidth": 1,
            "lineColor": "#ffffff",
            "fadeNear": 0.9,
            "fadeFar": 1.0,
            "lineFadeFar": 0.95
        }]));
        let env = MapEnv::with_zoom(16.0, None);
        let ctx = context(&decoded, &state, &env, 0);
        let group = MergedGroup { geometry_index: 0, start: 0, count: 36, technique: 0 };

        let objects = ExtrudedPolygonTechniqueHandler::new(&ctx).add_world_space_objects(
            &ctx,
            &Geometry::default(),
            &group,
        );
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].kind, ObjectKind::Volume);
        let fading = objects[1].material.polygon_fading.unwrap();
        assert_eq!(fading.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(fading.line_fade_near, 0.9);
        assert_eq!(fading.line_fade_far, 0.95);
        assert_eq!(fading.color_mix, DEFAULT_LINE_COLOR_MIX);
    }

    #[test]
    fn test_no_edges_without_line_width() {
        let (decoded, state) = compiled(json!([{ "name": "extruded-polygon" }]));
        let env = MapEnv::with_zoom(16.0, None);
        let ctx = context(&decoded, &state, &env, 0);
        let group = MergedGroup { geometry_index: 0, start: 0, count: 36, technique: 0 };

        let objects = ExtrudedPolygonTechniqueHandler::new(&ctx).add_world_space_objects(
            &ctx,
            &Geometry::default(),
            &group,
        );
        assert_eq!(objects.len(), 1);
        assert!(objects[0].material.polygon_fading.is_none());
    }
}
