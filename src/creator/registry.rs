//! Technique preparation: kind filtering, default kinds, compilation

use super::TileGeometryCreator;
use crate::decoded::{DecodedTile, GeometryKindSet};
use crate::map::MapContext;
use crate::style::{process_priorities, CompiledTechnique};
use crate::tile::{Tile, TileBuildState};

/// Whether a technique of `kind` is drawn. Inclusion in `enabled_kinds`
/// overrides exclusion by `disabled_kinds`.
pub fn is_kind_enabled(
    kind: Option<&GeometryKindSet>,
    enabled_kinds: Option<&GeometryKindSet>,
    disabled_kinds: Option<&GeometryKindSet>,
) -> bool {
    let Some(kind) = kind.filter(|kind| !kind.is_empty()) else {
        return true;
    };
    let disabled = disabled_kinds.is_some_and(|disabled| kind.intersects(disabled));
    let enabled = enabled_kinds.is_some_and(|enabled| kind.intersects(enabled));
    !disabled || enabled
}

/// Fill in `enabled`, reset created offsets and compile techniques not yet compiled
pub(crate) fn init_build_state(
    decoded: &DecodedTile,
    state: &mut TileBuildState,
    enabled_kinds: Option<&GeometryKindSet>,
    disabled_kinds: Option<&GeometryKindSet>,
) {
    for (index, technique) in decoded.techniques.iter().enumerate() {
        let Some(technique_state) = state.technique_mut(index) else {
            continue;
        };
        if technique_state.enabled.is_none() {
            technique_state.enabled = Some(is_kind_enabled(
                technique_state.kind.as_ref(),
                enabled_kinds,
                disabled_kinds,
            ));
        }
        if technique_state.compiled.is_none() {
            technique_state.compiled =
                Some(CompiledTechnique::compile(technique, technique_state.ordering()));
        }
    }
    state.reset_created_offsets();
}

/// Give every technique without a kind the default kind of its name
pub(crate) fn set_default_geometry_kinds(decoded: &DecodedTile, state: &mut TileBuildState) {
    for (index, technique) in decoded.techniques.iter().enumerate() {
        if let Some(technique_state) = state.technique_mut(index) {
            if technique_state.kind.is_none() {
                technique_state.kind =
                    Some(GeometryKindSet::single(technique.name.default_geometry_kind()));
            }
        }
    }
}

impl TileGeometryCreator {
    /// Prepare the tile's techniques for object creation: evaluate kind
    /// filters once, reset per-offset bookkeeping and compile expressions.
    pub fn init_decoded_tile(
        &self,
        tile: &mut Tile,
        enabled_kinds: Option<&GeometryKindSet>,
        disabled_kinds: Option<&GeometryKindSet>,
    ) {
        let Some(decoded) = tile.decoded_tile.clone() else {
            return;
        };
        let Some(state) = tile.build_state.as_mut() else {
            return;
        };
        init_build_state(&decoded, state, enabled_kinds, disabled_kinds);
    }

    /// Apply theme priorities and default kinds, then `init_decoded_tile`
    pub fn process_techniques(
        &self,
        tile: &mut Tile,
        map: &MapContext,
        enabled_kinds: Option<&GeometryKindSet>,
        disabled_kinds: Option<&GeometryKindSet>,
    ) {
        let Some(decoded) = tile.decoded_tile.clone() else {
            return;
        };
        let Some(state) = tile.build_state.as_mut() else {
            return;
        };
        let theme = map.theme.as_ref().or(self.config.theme.as_ref());
        process_priorities(&decoded, state, theme);
        set_default_geometry_kinds(&decoded, state);
        init_build_state(&decoded, state, enabled_kinds, disabled_kinds);
    }
}
