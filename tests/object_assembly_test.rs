// Object creation: kind filtering, group coalescing, per-offset bookkeeping
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tile_geometry::decoded::GeometryKind;
use tile_geometry::handlers::{HandlerContext, HandlerRegistry, MergedGroup, TechniqueHandler};
use tile_geometry::render::{ObjectKind, RenderObject};
use tile_geometry::{
    DataSourceInfo, DecodedTile, GeometryKindSet, MapContext, Projection, TechniqueName, Tile,
    TileGeometryCreator, TileKey,
};

fn decoded(value: Value) -> Arc<DecodedTile> {
    Arc::new(serde_json::from_value(value).expect("Invalid decoded tile fixture"))
}

fn tile_with(decoded: Arc<DecodedTile>, offset: i32) -> Tile {
    let source = DataSourceInfo::new("osm");
    let mut tile = Tile::new(TileKey::new(5, 8, 4), source, Projection::Mercator, offset);
    tile.set_decoded_tile(decoded);
    tile
}

fn fill_geometry(groups: Value) -> Value {
    json!({
        "type": "polygon",
        "vertexAttributes": [{
            "name": "position",
            "buffer": [0, 0, 0, 1, 0, 0, 0, 1, 0],
            "itemCount": 3
        }],
        "index": [0, 1, 2, 0, 1, 2, 0, 1, 2],
        "groups": groups
    })
}

/// Handler that records every range it is asked to build
struct Recording(Rc<RefCell<Vec<MergedGroup>>>);

impl TechniqueHandler for Recording {
    fn add_world_space_objects(
        &mut self,
        _ctx: &HandlerContext<'_>,
        _geometry: &tile_geometry::decoded::Geometry,
        group: &MergedGroup,
    ) -> Vec<RenderObject> {
        self.0.borrow_mut().push(*group);
        Vec::new()
    }
}

fn recording_creator(name: TechniqueName) -> (TileGeometryCreator, Rc<RefCell<Vec<MergedGroup>>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut handlers = HandlerRegistry::default();
    let shared = calls.clone();
    handlers.register(name, move |_| Box::new(Recording(shared.clone())));
    (TileGeometryCreator::with_handlers(Default::default(), handlers), calls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_groups_are_coalesced() {
        let (creator, calls) = recording_creator(TechniqueName::Fill);
        let map = MapContext::new(10.0);
        let mut tile = tile_with(
            decoded(json!({
                "techniques": [{ "name": "fill" }],
                "geometries": [fill_geometry(json!([
                    { "start": 0, "count": 3, "technique": 0 },
                    { "start": 3, "count": 2, "technique": 0 }
                ]))]
            })),
            0,
        );

        creator.process_techniques(&mut tile, &map, None, None);
        creator.create_objects(&mut tile, &map, None);

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1, "Expected a single handler call, got {:?}", calls);
        assert_eq!((calls[0].start, calls[0].count), (0, 5));
    }

    #[test]
    fn test_gaps_and_technique_changes_split_ranges() {
        let (creator, calls) = recording_creator(TechniqueName::Fill);
        let map = MapContext::new(10.0);
        let mut tile = tile_with(
            decoded(json!({
                "techniques": [{ "name": "fill" }, { "name": "fill" }],
                "geometries": [fill_geometry(json!([
                    { "start": 0, "count": 3, "technique": 0 },
                    { "start": 4, "count": 2, "technique": 0 },
                    { "start": 6, "count": 1, "technique": 1 },
                    { "start": 7, "count": 2, "technique": 1 }
                ]))]
            })),
            0,
        );

        creator.process_techniques(&mut tile, &map, None, None);
        creator.create_objects(&mut tile, &map, None);

        let ranges: Vec<_> =
            calls.borrow().iter().map(|g| (g.technique, g.start, g.count)).collect();
        assert_eq!(ranges, vec![(0, 0, 3), (0, 4, 2), (1, 6, 3)]);
    }

    #[test]
    fn test_objects_are_created_once_per_offset() {
        let creator = TileGeometryCreator::default();
        let map = MapContext::new(10.0);
        let mut tile = tile_with(
            decoded(json!({
                "techniques": [{ "name": "fill", "color": "#ff0000" }],
                "geometries": [fill_geometry(json!([{ "start": 0, "count": 3, "technique": 0 }]))]
            })),
            0,
        );

        creator.process_techniques(&mut tile, &map, None, None);
        creator.create_objects(&mut tile, &map, None);
        let first = tile.objects.len();
        assert_eq!(first, 1);

        creator.create_objects(&mut tile, &map, None);
        assert_eq!(tile.objects.len(), first, "Second pass must not duplicate objects");

        // A wrapped copy of the same tile is a different offset
        tile.offset = 1;
        creator.create_objects(&mut tile, &map, None);
        assert_eq!(tile.objects.len(), 2);
    }

    #[test]
    fn test_init_resets_created_offsets() {
        let creator = TileGeometryCreator::default();
        let map = MapContext::new(10.0);
        let mut tile = tile_with(
            decoded(json!({
                "techniques": [{ "name": "fill" }],
                "geometries": [fill_geometry(json!([{ "start": 0, "count": 3, "technique": 0 }]))]
            })),
            0,
        );

        creator.process_techniques(&mut tile, &map, None, None);
        creator.create_objects(&mut tile, &map, None);
        creator.init_decoded_tile(&mut tile, None, None);
        creator.create_objects(&mut tile, &map, None);
        assert_eq!(tile.objects.len(), 2);
    }

    #[test]
    fn test_objects_carry_tile_metadata() {
        let creator = TileGeometryCreator::default();
        let map = MapContext::new(10.0);
        let mut tile = tile_with(
            decoded(json!({
                "techniques": [{ "name": "fill", "kind": ["water", "area"], "renderOrder": 5 }],
                "geometries": [fill_geometry(json!([
                    { "start": 0, "count": 3, "technique": 0, "renderOrderOffset": 0.5 }
                ]))]
            })),
            0,
        );

        creator.process_techniques(&mut tile, &map, None, None);
        tile.mark_visibility_checked();
        creator.create_objects(&mut tile, &map, None);

        let object = &tile.objects[0];
        assert_eq!(object.kind, ObjectKind::Mesh);
        assert_eq!(object.render_order, 5.5);
        assert_eq!(object.user_data.tile_key, Some(TileKey::new(5, 8, 4)));
        assert_eq!(object.user_data.data_source.as_deref(), Some("osm"));
        assert_eq!(object.user_data.kind, vec![GeometryKind::Area, GeometryKind::Water]);
        assert_eq!(object.user_data.technique_index, Some(0));
        assert!(tile.needs_visibility_check(), "Registering objects must force a visibility check");
    }

    #[test]
    fn test_disabled_kinds_skip_objects() {
        let creator = TileGeometryCreator::default();
        let map = MapContext::new(10.0);
        let fixture = decoded(json!({
            "techniques": [
                { "name": "fill", "kind": "water" },
                { "name": "solid-line", "kind": "road" }
            ],
            "geometries": [fill_geometry(json!([
                { "start": 0, "count": 3, "technique": 0 },
                { "start": 3, "count": 3, "technique": 1 }
            ]))]
        }));
        let water: GeometryKindSet = ["water"].into_iter().collect();

        let mut tile = tile_with(fixture.clone(), 0);
        creator.build_tile(&mut tile, &map, None, Some(&water));
        assert_eq!(tile.objects.len(), 1);
        assert_eq!(tile.objects[0].kind, ObjectKind::Lines);

        // Enabling the same kind wins over disabling it
        let mut tile = tile_with(fixture, 0);
        creator.build_tile(&mut tile, &map, Some(&water), Some(&water));
        assert_eq!(tile.objects.len(), 2);
    }

    #[test]
    fn test_default_kinds_apply_to_filters() {
        let creator = TileGeometryCreator::default();
        let map = MapContext::new(10.0);
        let mut tile = tile_with(
            decoded(json!({
                "techniques": [{ "name": "fill" }, { "name": "extruded-polygon" }],
                "geometries": [fill_geometry(json!([
                    { "start": 0, "count": 3, "technique": 0 },
                    { "start": 3, "count": 3, "technique": 1 }
                ]))]
            })),
            0,
        );
        let buildings: GeometryKindSet = ["building"].into_iter().collect();

        creator.build_tile(&mut tile, &map, None, Some(&buildings));
        assert_eq!(tile.objects.len(), 1);
        assert_eq!(tile.objects[0].user_data.kind, vec![GeometryKind::Area]);
    }

    #[test]
    fn test_filter_excludes_techniques() {
        let (creator, calls) = recording_creator(TechniqueName::Fill);
        let map = MapContext::new(10.0);
        let mut tile = tile_with(
            decoded(json!({
                "techniques": [{ "name": "fill" }],
                "geometries": [fill_geometry(json!([{ "start": 0, "count": 3, "technique": 0 }]))]
            })),
            0,
        );
        creator.process_techniques(&mut tile, &map, None, None);

        let reject: &tile_geometry::tile::TechniqueFilter<'_> =
            &|_: &tile_geometry::tile::TechniqueRef<'_>| false;
        creator.create_objects(&mut tile, &map, Some(reject));
        assert!(calls.borrow().is_empty());

        // Filtered groups stay available for a later pass
        creator.create_objects(&mut tile, &map, None);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_malformed_color_does_not_abort_the_tile() {
        let creator = TileGeometryCreator::default();
        let map = MapContext::new(10.0);
        let mut tile = tile_with(
            decoded(json!({
                "techniques": [
                    { "name": "fill", "color": "#\u{e9}a" },
                    { "name": "fill", "color": "#ff0000" }
                ],
                "geometries": [fill_geometry(json!([
                    { "start": 0, "count": 3, "technique": 0 },
                    { "start": 3, "count": 3, "technique": 1 }
                ]))]
            })),
            0,
        );

        creator.build_tile(&mut tile, &map, None, None);
        assert_eq!(tile.objects.len(), 2);
        assert_eq!(tile.objects[0].material.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(tile.objects[1].material.color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_merged_count_stops_before_overflow() {
        let (creator, calls) = recording_creator(TechniqueName::Fill);
        let map = MapContext::new(10.0);
        let mut tile = tile_with(
            decoded(json!({
                "techniques": [{ "name": "fill" }],
                "geometries": [fill_geometry(json!([
                    { "start": 0, "count": u32::MAX, "technique": 0 },
                    { "start": u32::MAX, "count": 5, "technique": 0 }
                ]))]
            })),
            0,
        );

        creator.process_techniques(&mut tile, &map, None, None);
        creator.create_objects(&mut tile, &map, None);

        let ranges: Vec<_> = calls.borrow().iter().map(|g| (g.start, g.count)).collect();
        assert_eq!(ranges, vec![(0, u32::MAX), (u32::MAX, 5)]);
    }

    #[test]
    fn test_missing_technique_index_is_skipped() {
        let creator = TileGeometryCreator::default();
        let map = MapContext::new(10.0);
        let mut tile = tile_with(
            decoded(json!({
                "techniques": [{ "name": "fill" }],
                "geometries": [fill_geometry(json!([
                    { "start": 0, "count": 3, "technique": 7 },
                    { "start": 3, "count": 3, "technique": 0 }
                ]))]
            })),
            0,
        );
        creator.build_tile(&mut tile, &map, None, None);
        assert_eq!(tile.objects.len(), 1);
    }

    #[test]
    fn test_tile_without_decoded_data_is_noop() {
        let creator = TileGeometryCreator::default();
        let map = MapContext::new(10.0);
        let mut tile =
            Tile::new(TileKey::new(0, 0, 1), DataSourceInfo::new("osm"), Projection::Mercator, 0);
        creator.build_tile(&mut tile, &map, None, None);
        assert!(tile.objects.is_empty());
        assert!(tile.text_elements.is_empty());
    }
}
