//! Turning technique groups into render objects

use super::TileGeometryCreator;
use crate::decoded::GeometryKind;
use crate::handlers::{HandlerContext, MergedGroup};
use crate::map::MapContext;
use crate::render::RenderObject;
use crate::tile::{TechniqueFilter, TechniqueRef, Tile};

impl TileGeometryCreator {
    /// Create render objects for every group not yet built at the tile's
    /// offset. Adjacent groups of the same technique are passed to the
    /// handler as one range.
    pub fn create_objects(
        &self,
        tile: &mut Tile,
        map: &MapContext,
        filter: Option<&TechniqueFilter<'_>>,
    ) {
        let Some(decoded) = tile.decoded_tile.clone() else {
            return;
        };
        let Some(mut state) = tile.build_state.take() else {
            tracing::warn!(
                tile = ?tile.tile_key,
                "create_objects called before the tile was initialized"
            );
            return;
        };

        let env = map.discrete_zoom_env();
        let offset = tile.offset;
        let objects_before = tile.objects.len();

        for (geometry_index, geometry) in decoded.geometries.iter().enumerate() {
            let groups = &geometry.groups;
            let mut group_index = 0;

            while group_index < groups.len() {
                let first = group_index;
                let group = &groups[first];
                group_index += 1;

                let Some(technique) = TechniqueRef::resolve(&decoded, &state, group.technique)
                else {
                    tracing::warn!(
                        tile = ?tile.tile_key,
                        technique = group.technique,
                        "group references a missing technique"
                    );
                    continue;
                };
                let consumed = state
                    .group(geometry_index, first)
                    .map_or(true, |g| g.is_created_for(offset));
                if consumed || !technique.is_enabled() || filter.is_some_and(|f| !f(&technique)) {
                    continue;
                }

                let mut count = group.count;
                let mut consumed_groups = vec![first];
                while group_index < groups.len()
                    && groups[group_index].technique == group.technique
                {
                    let next = &groups[group_index];
                    if u64::from(group.start) + u64::from(count) != u64::from(next.start) {
                        break;
                    }
                    let Some(merged_count) = count.checked_add(next.count) else {
                        break;
                    };
                    count = merged_count;
                    consumed_groups.push(group_index);
                    group_index += 1;
                }

                for index in consumed_groups {
                    if let Some(group_state) = state.group_mut(geometry_index, index) {
                        group_state.mark_created(offset);
                    }
                }

                let merged = MergedGroup {
                    geometry_index,
                    start: group.start,
                    count,
                    technique: group.technique,
                };
                let Some(technique) = TechniqueRef::resolve(&decoded, &state, group.technique)
                else {
                    continue;
                };
                let ctx = HandlerContext {
                    tile_key: tile.tile_key,
                    technique,
                    env: &env,
                    projection: tile.projection,
                };
                let handler = tile.technique_handler_index.get_or_create(&self.handlers, &ctx);
                let new_objects = handler.add_world_space_objects(&ctx, geometry, &merged);

                let kind = technique.kind().map(|k| k.to_vec()).unwrap_or_default();
                for mut object in new_objects {
                    if let Some(render_order_offset) = group.render_order_offset {
                        object.render_order += render_order_offset;
                    }
                    self.register_tile_object(tile, &mut object, &kind);
                    tile.objects.push(object);
                }
            }
        }

        tile.build_state = Some(state);
        tracing::debug!(
            tile = ?tile.tile_key,
            offset,
            created = tile.objects.len() - objects_before,
            "created tile objects"
        );
    }

    /// Tag `object` with the tile it belongs to so it can be identified when
    /// picking, and force a visibility check of the tile's objects.
    pub fn register_tile_object(
        &self,
        tile: &mut Tile,
        object: &mut RenderObject,
        kind: &[GeometryKind],
    ) {
        object.user_data.tile_key = Some(tile.tile_key);
        object.user_data.data_source = Some(tile.data_source.name.clone());
        object.user_data.kind = kind.to_vec();
        tile.reset_visibility_counter();
    }
}
