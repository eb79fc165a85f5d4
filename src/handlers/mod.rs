//! Technique handlers: turn geometry ranges into render objects
//!
//! Each technique of a tile gets one handler, created on first use from the
//! registry entry of its technique name and kept in the tile's
//! `TechniqueHandlerIndex`. Handlers resolve their materials when they are
//! created, so a handler sees the technique as it was at that zoom level.
//!
//! # Submodules
//! - `generic` - Fallback handler choosing the primitive from the geometry type
//! - `fill` - Filled polygons with optional outlines
//! - `line` - Solid and dashed lines with optional outlines
//! - `point` - Squares and circles
//! - `extruded` - Extruded polygons with fading edges
//! - `terrain` - Terrain meshes

mod extruded;
mod fill;
mod generic;
mod line;
mod point;
mod terrain;

use crate::decoded::{Geometry, TechniqueName};
use crate::geo::{Projection, TileKey};
use crate::render::{Material, ObjectGeometry, ObjectKind, RenderObject};
use crate::style::MapEnv;
use crate::tile::TechniqueRef;
use std::collections::HashMap;

pub use extruded::ExtrudedPolygonTechniqueHandler;
pub use fill::FillTechniqueHandler;
pub use generic::GenericWorldSpaceTechniqueHandler;
pub use line::SolidLineTechniqueHandler;
pub use point::PointTechniqueHandler;
pub use terrain::TerrainTechniqueHandler;

/// Contiguous same-technique range of one geometry, after coalescing groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedGroup {
    pub geometry_index: usize,
    pub start: u32,
    pub count: u32,
    pub technique: usize,
}

/// Everything a handler may look at besides the geometry itself
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub tile_key: TileKey,
    pub technique: TechniqueRef<'a>,
    /// Environment pinned to the tile's discrete zoom level
    pub env: &'a MapEnv,
    pub projection: Projection,
}

pub trait TechniqueHandler {
    /// Render objects for `group` of `geometry`, not yet registered on the tile
    fn add_world_space_objects(
        &mut self,
        ctx: &HandlerContext<'_>,
        geometry: &Geometry,
        group: &MergedGroup,
    ) -> Vec<RenderObject>;
}

pub type HandlerFactory = Box<dyn Fn(&HandlerContext<'_>) -> Box<dyn TechniqueHandler>>;

/// Handler constructors keyed by technique name
pub struct HandlerRegistry {
    factories: HashMap<TechniqueName, HandlerFactory>,
}

impl HandlerRegistry {
    /// Registry without any entries; every technique gets the generic handler
    pub fn empty() -> Self {
        Self { factories: HashMap::new() }
    }

    /// Replace the constructor used for `name`
    pub fn register<F>(&mut self, name: TechniqueName, factory: F)
    where
        F: Fn(&HandlerContext<'_>) -> Box<dyn TechniqueHandler> + 'static,
    {
        self.factories.insert(name, Box::new(factory));
    }

    pub fn contains(&self, name: TechniqueName) -> bool {
        self.factories.contains_key(&name)
    }

    pub fn create(&self, ctx: &HandlerContext<'_>) -> Box<dyn TechniqueHandler> {
        match self.factories.get(&ctx.technique.name()) {
            Some(factory) => factory(ctx),
            None => Box::new(GenericWorldSpaceTechniqueHandler::new(ctx)),
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(TechniqueName::Fill, |ctx| Box::new(FillTechniqueHandler::new(ctx)));
        registry.register(TechniqueName::SolidLine, |ctx| {
            Box::new(SolidLineTechniqueHandler::new(ctx))
        });
        registry.register(TechniqueName::DashedLine, |ctx| {
            Box::new(SolidLineTechniqueHandler::new(ctx))
        });
        registry.register(TechniqueName::Squares, |ctx| Box::new(PointTechniqueHandler::new(ctx)));
        registry.register(TechniqueName::Circles, |ctx| Box::new(PointTechniqueHandler::new(ctx)));
        registry.register(TechniqueName::ExtrudedPolygon, |ctx| {
            Box::new(ExtrudedPolygonTechniqueHandler::new(ctx))
        });
        registry.register(TechniqueName::Terrain, |ctx| {
            Box::new(TerrainTechniqueHandler::new(ctx))
        });
        registry
    }
}

/// Object drawing `group` straight from the decoded geometry buffers
pub(crate) fn shared_object(
    kind: ObjectKind,
    group: &MergedGroup,
    material: Material,
    render_order: f64,
) -> RenderObject {
    let geometry = ObjectGeometry::Shared {
        geometry_index: group.geometry_index,
        start: group.start,
        count: group.count,
    };
    RenderObject::new(kind, geometry, material)
        .with_render_order(render_order)
        .with_technique(group.technique)
}

/// Handlers of one tile, memoized per technique index
#[derive(Default)]
pub struct TechniqueHandlerIndex {
    handlers: HashMap<usize, Box<dyn TechniqueHandler>>,
}

impl TechniqueHandlerIndex {
    pub fn get_or_create(
        &mut self,
        registry: &HandlerRegistry,
        ctx: &HandlerContext<'_>,
    ) -> &mut dyn TechniqueHandler {
        self.handlers
            .entry(ctx.technique.index)
            .or_insert_with(|| registry.create(ctx))
            .as_mut()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::decoded::DecodedTile;
    use crate::style::CompiledTechnique;
    use crate::tile::TileBuildState;
    use serde_json::Value;

    /// Decoded tile plus a build state with every technique compiled
    pub fn compiled(techniques: Value) -> (DecodedTile, TileBuildState) {
        let decoded: DecodedTile =
            serde_json::from_value(serde_json::json!({ "techniques": techniques })).unwrap();
        let mut state = TileBuildState::new(&decoded);
        for (index, technique) in decoded.techniques.iter().enumerate() {
            let technique_state = state.technique_mut(index).unwrap();
            technique_state.compiled =
                Some(CompiledTechnique::compile(technique, technique_state.ordering()));
        }
        (decoded, state)
    }

    pub fn context<'a>(
        decoded: &'a DecodedTile,
        state: &'a TileBuildState,
        env: &'a MapEnv,
        index: usize,
    ) -> HandlerContext<'a> {
        HandlerContext {
            tile_key: TileKey::new(0, 0, 1),
            technique: TechniqueRef::resolve(decoded, state, index).unwrap(),
            env,
            projection: Projection::Mercator,
        }
    }
}
