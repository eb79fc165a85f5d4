//! Extraction of labels, POIs and label blockers from decoded tiles

use super::TileGeometryCreator;
use crate::decoded::{catalog_string, path_points, DecodedTile, PoiGeometry, TextPathGeometry};
use crate::map::MapContext;
use crate::style::MapEnv;
use crate::text::{arabic, FeatureId, PathBlockingElement, PoiInfo, TextAnchor, TextElement};
use crate::tile::{TechniqueFilter, TechniqueRef, Tile, TileBuildState};
use serde_json::Value;

/// Label settings shared by every element of one technique
struct LabelDefaults {
    priority: f64,
    fade_near: Option<f64>,
    fade_far: Option<f64>,
}

impl LabelDefaults {
    fn new(technique: &TechniqueRef<'_>, env: &MapEnv) -> Self {
        Self {
            priority: technique.priority(env).unwrap_or(0.0),
            fade_near: technique.fade_near(env),
            fade_far: technique.fade_far(env),
        }
    }
}

fn accepts(technique: &TechniqueRef<'_>, filter: Option<&TechniqueFilter<'_>>) -> bool {
    technique.is_enabled() && filter.map_or(true, |f| f(technique))
}

impl TileGeometryCreator {
    /// Text paths whose technique is a text technique accepted by `filter`,
    /// in reverse input order
    pub fn prepare_text_paths<'a>(
        &self,
        text_paths: &'a [TextPathGeometry],
        decoded: &DecodedTile,
        state: &TileBuildState,
        filter: Option<&TechniqueFilter<'_>>,
    ) -> Vec<&'a TextPathGeometry> {
        text_paths
            .iter()
            .rev()
            .filter(|path| {
                TechniqueRef::resolve(decoded, state, path.technique).is_some_and(|technique| {
                    technique.name().is_text_technique() && filter.map_or(true, |f| f(&technique))
                })
            })
            .collect()
    }

    /// Build text elements for path labels and point labels
    pub fn create_text_elements(
        &self,
        tile: &mut Tile,
        map: &MapContext,
        filter: Option<&TechniqueFilter<'_>>,
    ) {
        let Some(decoded) = tile.decoded_tile.clone() else {
            return;
        };
        let Some(state) = tile.build_state.take() else {
            tracing::warn!(
                tile = ?tile.tile_key,
                "create_text_elements called before the tile was initialized"
            );
            return;
        };

        let env = map.discrete_zoom_env();
        let world_offset_x = tile.compute_world_offset_x();

        if let Some(text_paths) = decoded.text_path_geometries.as_deref() {
            for text_path in self.prepare_text_paths(text_paths, &decoded, &state, filter) {
                let Some(technique) =
                    TechniqueRef::resolve(&decoded, &state, text_path.technique)
                else {
                    continue;
                };
                if !technique.name().is_text_technique() || !accepts(&technique, filter) {
                    continue;
                }

                let defaults = LabelDefaults::new(&technique, &env);
                let mut element = self.new_text_element(
                    tile,
                    map,
                    &technique,
                    &env,
                    &defaults,
                    &text_path.text,
                    TextAnchor::Path(path_points(&text_path.path, world_offset_x)),
                    text_path.obj_infos.clone(),
                );
                element.path_length_sqr = Some(text_path.path_length_sqr);
                tile.add_text_element(element);
            }
        }

        for text in decoded.text_geometries.iter().flatten() {
            let (Some(technique_index), Some(catalog)) =
                (text.technique, text.string_catalog.as_deref())
            else {
                continue;
            };
            let Some(technique) = TechniqueRef::resolve(&decoded, &state, technique_index) else {
                continue;
            };
            if !technique.name().is_text_technique() || !accepts(&technique, filter) {
                continue;
            }
            if text.positions.count() < 1 {
                continue;
            }

            let defaults = LabelDefaults::new(&technique, &env);
            for i in 0..text.positions.count() {
                let Some(label) =
                    text.texts.get(i).and_then(|&index| catalog_string(catalog, index))
                else {
                    continue;
                };
                let Some(mut position) = text.positions.get_xyz(i) else {
                    continue;
                };
                position.x += world_offset_x;
                let user_data = text.obj_infos.as_ref().and_then(|infos| infos.get(i).cloned());

                let element = self.new_text_element(
                    tile,
                    map,
                    &technique,
                    &env,
                    &defaults,
                    label,
                    TextAnchor::Point(position),
                    user_data,
                );
                tile.add_text_element(element);
            }
        }

        tile.build_state = Some(state);
    }

    /// Build POI and line-marker elements
    pub fn prepare_pois(&self, tile: &mut Tile, map: &MapContext) {
        let Some(decoded) = tile.decoded_tile.clone() else {
            return;
        };
        let Some(state) = tile.build_state.take() else {
            return;
        };

        let env = map.discrete_zoom_env();
        let world_offset_x = tile.compute_world_offset_x();

        for poi in decoded.poi_geometries.iter().flatten() {
            let Some(technique) =
                poi.technique.and_then(|i| TechniqueRef::resolve(&decoded, &state, i))
            else {
                continue;
            };
            if !technique.is_enabled()
                || technique.name().is_text_technique()
                || !technique.name().is_label()
            {
                continue;
            }

            let defaults = LabelDefaults::new(&technique, &env);
            if technique.name().is_line_marker_technique() {
                self.add_line_marker(tile, map, &technique, &env, &defaults, poi, world_offset_x);
            } else {
                self.add_pois(tile, map, &technique, &env, &defaults, poi, world_offset_x);
            }
        }

        tile.build_state = Some(state);
    }

    /// Turn the decoded path geometries into blocking elements
    pub fn create_label_rejection_elements(&self, tile: &mut Tile) {
        let Some(decoded) = tile.decoded_tile.clone() else {
            return;
        };
        for path in decoded.path_geometries.iter().flatten() {
            tile.add_blocking_element(PathBlockingElement::new(path_points(&path.path, 0.0)));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn add_line_marker(
        &self,
        tile: &mut Tile,
        map: &MapContext,
        technique: &TechniqueRef<'_>,
        env: &MapEnv,
        defaults: &LabelDefaults,
        poi: &PoiGeometry,
        world_offset_x: f64,
    ) {
        let path: Vec<_> = (0..poi.positions.count())
            .filter_map(|i| poi.positions.get_xyz(i))
            .map(|mut p| {
                p.x += world_offset_x;
                p
            })
            .collect();
        if path.is_empty() {
            return;
        }

        let text = poi_text(poi, 0).unwrap_or_default();
        let user_data = poi.obj_infos.as_ref().and_then(|infos| infos.first().cloned());
        let mut element = self.new_text_element(
            tile,
            map,
            technique,
            env,
            defaults,
            text,
            TextAnchor::Path(path),
            user_data,
        );
        element.poi_info = Some(PoiInfo {
            technique_index: technique.index,
            image_texture_name: poi_image(poi, 0).or_else(|| technique.string("imageTexture", env)),
            is_line_marker: true,
        });
        tile.add_text_element(element);
    }

    #[allow(clippy::too_many_arguments)]
    fn add_pois(
        &self,
        tile: &mut Tile,
        map: &MapContext,
        technique: &TechniqueRef<'_>,
        env: &MapEnv,
        defaults: &LabelDefaults,
        poi: &PoiGeometry,
        world_offset_x: f64,
    ) {
        for i in 0..poi.positions.count() {
            let Some(mut position) = poi.positions.get_xyz(i) else {
                continue;
            };
            position.x += world_offset_x;

            // Icon-only POIs have no text
            let text = poi_text(poi, i).unwrap_or_default();
            let user_data = poi.obj_infos.as_ref().and_then(|infos| infos.get(i).cloned());
            let mut element = self.new_text_element(
                tile,
                map,
                technique,
                env,
                defaults,
                text,
                TextAnchor::Point(position),
                user_data,
            );
            element.poi_info = Some(PoiInfo {
                technique_index: technique.index,
                image_texture_name: poi_image(poi, i)
                    .or_else(|| technique.string("imageTexture", env)),
                is_line_marker: false,
            });
            tile.add_text_element(element);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn new_text_element(
        &self,
        tile: &mut Tile,
        map: &MapContext,
        technique: &TechniqueRef<'_>,
        env: &MapEnv,
        defaults: &LabelDefaults,
        text: &str,
        anchor: TextAnchor,
        user_data: Option<Value>,
    ) -> TextElement {
        let source = technique.technique;
        let render_style = tile.text_style_cache.get_render_style(technique, env);
        let layout_style = tile.text_style_cache.get_layout_style(technique, env);

        let mut element = TextElement::new(
            arabic::convert(text),
            anchor,
            render_style,
            layout_style,
            defaults.priority,
            tile.offset,
        );
        element.x_offset = source.x_offset.unwrap_or(0.0);
        element.y_offset = source.y_offset.unwrap_or(0.0);
        element.feature_id = FeatureId::from_user_data(user_data.as_ref());
        element.style = source.style.clone();
        element.fade_near = defaults.fade_near;
        element.fade_far = defaults.fade_far;
        element.min_zoom_level = Some(source.min_zoom_level.unwrap_or(map.min_zoom_level));
        element.max_zoom_level = Some(source.max_zoom_level.unwrap_or(map.max_zoom_level));
        element.distance_scale =
            source.distance_scale.unwrap_or(self.config.default_text_distance_scale);
        element.may_overlap = source.may_overlap == Some(true);
        element.reserve_space = source.reserve_space != Some(false);
        element.kind = technique.kind().cloned();
        element.user_data = user_data;
        element
    }
}

fn poi_text(poi: &PoiGeometry, i: usize) -> Option<&str> {
    let catalog = poi.string_catalog.as_deref()?;
    catalog_string(catalog, *poi.texts.get(i)?)
}

fn poi_image(poi: &PoiGeometry, i: usize) -> Option<String> {
    let catalog = poi.string_catalog.as_deref()?;
    let index = *poi.image_textures.as_ref()?.get(i)?;
    catalog_string(catalog, index).map(str::to_string)
}
