// Label extraction: path labels, point labels, POIs, line markers, blockers
use approx::assert_relative_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tile_geometry::geo::EQUATORIAL_CIRCUMFERENCE;
use tile_geometry::style::ThemePriorities;
use tile_geometry::text::{FeatureId, TextAnchor};
use tile_geometry::{
    DataSourceInfo, DecodedTile, GeometryKindSet, MapContext, Projection, Tile, TileGeometryCreator,
    TileKey, Vector3,
};

fn build(decoded: Value, map: &MapContext, offset: i32) -> Tile {
    let decoded: DecodedTile =
        serde_json::from_value(decoded).expect("Invalid decoded tile fixture");
    let source = DataSourceInfo::new("osm");
    let mut tile = Tile::new(TileKey::new(3, 3, 3), source, Projection::Mercator, offset);
    tile.set_decoded_tile(Arc::new(decoded));
    TileGeometryCreator::default().build_tile(&mut tile, map, None, None);
    tile
}

fn point_labels(technique: Value, texts: Value, catalog: Value) -> Value {
    json!({
        "techniques": [technique],
        "textGeometries": [{
            "positions": { "buffer": [10, 20, 0, 30, 40, 0], "itemCount": 3 },
            "texts": texts,
            "technique": 0,
            "stringCatalog": catalog
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_labels_skip_missing_catalog_entries() {
        let map = MapContext::new(12.0);
        let fixture = point_labels(json!({ "name": "text" }), json!([0, 5]), json!(["A", "B"]));
        let tile = build(fixture, &map, 0);

        assert_eq!(tile.text_elements.len(), 1);
        let label = &tile.text_elements[0];
        assert_eq!(label.text, "A");
        assert_eq!(label.position(), Some(Vector3::new(10.0, 20.0, 0.0)));
    }

    #[test]
    fn test_label_defaults() {
        let map = MapContext::new(12.0);
        let fixture = point_labels(json!({ "name": "text" }), json!([0]), json!(["A"]));
        let tile = build(fixture, &map, 0);
        let label = &tile.text_elements[0];

        assert_eq!(label.priority, 0.0);
        assert_eq!(label.distance_scale, 0.5);
        assert!(!label.may_overlap);
        assert!(label.reserve_space);
        assert_eq!(label.min_zoom_level, Some(map.min_zoom_level));
        assert_eq!(label.max_zoom_level, Some(map.max_zoom_level));
        assert_eq!((label.x_offset, label.y_offset), (0.0, 0.0));
        assert!(label.fade_near.is_none());
        assert!(label.poi_info.is_none());
    }

    #[test]
    fn test_label_settings_from_technique() {
        let map = MapContext::new(12.0);
        let technique = json!({
            "name": "text",
            "mayOverlap": true,
            "reserveSpace": false,
            "distanceScale": 2.0,
            "minZoomLevel": 5,
            "xOffset": 4,
            "fadeNear": 0.8,
            "fadeFar": 0.9,
            "size": 20,
            "kind": "label"
        });
        let mut fixture = point_labels(technique, json!([0]), json!(["A"]));
        fixture["textGeometries"][0]["objInfos"] = json!([{ "$id": 42 }]);
        let tile = build(fixture, &map, 0);
        let label = &tile.text_elements[0];

        assert!(label.may_overlap);
        assert!(!label.reserve_space);
        assert_eq!(label.distance_scale, 2.0);
        assert_eq!(label.min_zoom_level, Some(5.0));
        assert_eq!(label.x_offset, 4.0);
        assert_eq!(label.fade_near, Some(0.8));
        assert_eq!(label.fade_far, Some(0.9));
        assert_eq!(label.render_style.font_size, 20.0);
        assert_eq!(label.feature_id, Some(FeatureId::Number(42)));
        assert!(label.kind.as_ref().is_some_and(|k| k.len() == 1));
    }

    #[test]
    fn test_priority_is_evaluated_at_integer_zoom() {
        let map = MapContext::new(14.9);
        let technique = json!({ "name": "text", "priority": ["step", ["zoom"], 1, 14, 5, 15, 9] });
        let tile = build(point_labels(technique, json!([0]), json!(["A"])), &map, 0);
        assert_eq!(tile.text_elements[0].priority, 5.0);
    }

    #[test]
    fn test_theme_label_priorities() {
        let theme: ThemePriorities = serde_json::from_value(json!({
            "labelPriorities": ["capital", "city", "village"]
        }))
        .unwrap();
        let map = MapContext { theme: Some(theme), ..MapContext::new(10.0) };

        let technique = json!({ "name": "text", "_category": "city", "priority": 100 });
        let tile = build(point_labels(technique, json!([0]), json!(["A"])), &map, 0);
        assert_eq!(tile.text_elements[0].priority, 2.0);
    }

    #[test]
    fn test_text_paths_reverse_order_and_world_offset() {
        let map = MapContext::new(12.0);
        let fixture = json!({
            "techniques": [{ "name": "text" }, { "name": "solid-line" }],
            "textPathGeometries": [
                {
                    "path": [0, 0, 0, 10, 0, 0],
                    "pathLengthSqr": 100,
                    "text": "First",
                    "technique": 0
                },
                {
                    "path": [0, 5, 0, 0, 15, 0],
                    "pathLengthSqr": 100,
                    "text": "Second",
                    "technique": 0
                },
                { "path": [0, 0, 0, 1, 1, 0], "text": "Ignored", "technique": 1 }
            ]
        });
        let tile = build(fixture, &map, 1);

        let texts: Vec<_> = tile.text_elements.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Second", "First"]);

        let path = tile.text_elements[1].path().expect("Path label must keep its path");
        assert_relative_eq!(path[1].x, 10.0 + EQUATORIAL_CIRCUMFERENCE);
        assert_eq!(tile.text_elements[1].path_length_sqr, Some(100.0));
        assert_eq!(tile.text_elements[1].tile_offset, 1);
    }

    #[test]
    fn test_disabled_label_kind_produces_no_text() {
        let map = MapContext::new(12.0);
        let decoded: DecodedTile = serde_json::from_value(point_labels(
            json!({ "name": "text", "kind": "label" }),
            json!([0]),
            json!(["A"]),
        ))
        .unwrap();
        let mut tile =
            Tile::new(TileKey::new(3, 3, 3), DataSourceInfo::new("osm"), Projection::Mercator, 0);
        tile.set_decoded_tile(Arc::new(decoded));

        let labels: GeometryKindSet = ["label"].into_iter().collect();
        TileGeometryCreator::default().build_tile(&mut tile, &map, None, Some(&labels));

        let state = tile.build_state.as_ref().unwrap();
        assert_eq!(state.technique(0).unwrap().enabled, Some(false));
        assert!(tile.text_elements.is_empty());
    }

    #[test]
    fn test_pois_with_icons() {
        let map = MapContext::new(12.0);
        let fixture = json!({
            "techniques": [{ "name": "labeled-icon", "imageTexture": "default-icon" }],
            "poiGeometries": [{
                "positions": { "buffer": [1, 2, 0, 3, 4, 0], "itemCount": 3 },
                "texts": [0, 9],
                "technique": 0,
                "stringCatalog": ["Cafe", "cafe-icon"],
                "imageTextures": [1, 7]
            }]
        });
        let tile = build(fixture, &map, 0);

        assert_eq!(tile.text_elements.len(), 2);
        let cafe = &tile.text_elements[0];
        assert_eq!(cafe.text, "Cafe");
        let info = cafe.poi_info.as_ref().expect("POI info");
        assert_eq!(info.image_texture_name.as_deref(), Some("cafe-icon"));
        assert!(!info.is_line_marker);

        // Missing text keeps the icon, missing image falls back to the technique
        let icon_only = &tile.text_elements[1];
        assert_eq!(icon_only.text, "");
        assert_eq!(
            icon_only.poi_info.as_ref().and_then(|i| i.image_texture_name.as_deref()),
            Some("default-icon")
        );
    }

    #[test]
    fn test_line_marker_is_one_path_element() {
        let map = MapContext::new(12.0);
        let fixture = json!({
            "techniques": [{ "name": "line-marker" }],
            "poiGeometries": [{
                "positions": { "buffer": [0, 0, 0, 5, 0, 0, 10, 0, 0], "itemCount": 3 },
                "texts": [0],
                "technique": 0,
                "stringCatalog": ["A1", "shield"],
                "imageTextures": [1]
            }]
        });
        let tile = build(fixture, &map, 0);

        assert_eq!(tile.text_elements.len(), 1);
        let marker = &tile.text_elements[0];
        assert!(matches!(&marker.anchor, TextAnchor::Path(points) if points.len() == 3));
        let info = marker.poi_info.as_ref().unwrap();
        assert!(info.is_line_marker);
        assert_eq!(info.image_texture_name.as_deref(), Some("shield"));
    }

    #[test]
    fn test_label_rejection_elements_ignore_world_offset() {
        let map = MapContext::new(12.0);
        let fixture = json!({
            "techniques": [],
            "pathGeometries": [
                { "path": [0, 0, 0, 10, 10, 0] },
                { "path": [1, 1, 0, 2, 2, 0, 3, 3, 0] }
            ]
        });
        let tile = build(fixture, &map, 2);

        assert_eq!(tile.blocking_elements.len(), 2);
        assert_eq!(tile.blocking_elements[0].points[1], Vector3::new(10.0, 10.0, 0.0));
        assert_eq!(tile.blocking_elements[1].points.len(), 3);
    }

    #[test]
    fn test_arabic_labels_are_shaped() {
        let map = MapContext::new(12.0);
        let label = json!(["\u{0628}\u{0628}\u{0628}"]);
        let tile = build(point_labels(json!({ "name": "text" }), json!([0]), label), &map, 0);
        println!("Shaped label: {:?}", tile.text_elements[0].text);
        assert_eq!(tile.text_elements[0].text, "\u{FE91}\u{FE92}\u{FE90}");
    }
}
