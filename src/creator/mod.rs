//! Tile geometry creation
//!
//! `TileGeometryCreator` turns a tile's decoded payload into render objects,
//! text elements and label blockers. It owns the handler registry and the
//! creator configuration; all per-tile state lives on the `Tile`.
//!
//! # Submodules
//! - `registry` - Kind filtering, default kinds and technique compilation
//! - `assembler` - Group coalescing and render object creation
//! - `text_elements` - Path, point and POI labels, label blockers
//! - `ground_plane` - Background plane and its LOD meshes

mod assembler;
mod ground_plane;
mod registry;
mod text_elements;

use crate::config::GeometryCreatorConfig;
use crate::decoded::GeometryKindSet;
use crate::geo::ProjectionType;
use crate::handlers::HandlerRegistry;
use crate::logging::profile_timing;
use crate::map::MapContext;
use crate::render::GROUND_PLANE_RENDER_ORDER;
use crate::tile::{TechniqueFilter, TechniqueRef, Tile};

pub use registry::is_kind_enabled;

pub struct TileGeometryCreator {
    pub config: GeometryCreatorConfig,
    pub handlers: HandlerRegistry,
}

impl Default for TileGeometryCreator {
    fn default() -> Self {
        Self::new(GeometryCreatorConfig::default())
    }
}

impl TileGeometryCreator {
    pub fn new(config: GeometryCreatorConfig) -> Self {
        Self { config, handlers: HandlerRegistry::default() }
    }

    pub fn with_handlers(config: GeometryCreatorConfig, handlers: HandlerRegistry) -> Self {
        Self { config, handlers }
    }

    /// Create objects, POIs, labels, label blockers and the ground plane of
    /// a tile whose techniques were processed
    pub fn create_all_geometries(&self, tile: &mut Tile, map: &MapContext) {
        let Some(decoded) = tile.decoded_tile.clone() else {
            return;
        };
        let start = std::time::Instant::now();

        if let Some(height) = decoded.max_geometry_height {
            tile.max_geometry_height = height;
        }

        let filter: &TechniqueFilter<'_> = &|technique: &TechniqueRef<'_>| technique.is_enabled();
        self.create_objects(tile, map, Some(filter));

        self.prepare_pois(tile, map);

        // Text elements are placed by the label engine, not drawn as tile objects
        let text_filter: &TechniqueFilter<'_> =
            &|technique: &TechniqueRef<'_>| technique.name().is_label() && technique.is_enabled();
        self.create_text_elements(tile, map, Some(text_filter));

        self.create_label_rejection_elements(tile);

        // Sits between regular objects and fallback tiles, hiding parents
        // shown during zoom transitions
        if tile.data_source.add_ground_plane
            && tile.projection.projection_type() == ProjectionType::Spherical
        {
            self.add_ground_plane(tile, map, GROUND_PLANE_RENDER_ORDER);
        }

        tracing::debug!(
            tile = ?tile.tile_key,
            objects = tile.objects.len(),
            text_elements = tile.text_elements.len(),
            blocking_elements = tile.blocking_elements.len(),
            "tile geometry created"
        );
        if profile_timing() {
            tracing::info!(
                tile = ?tile.tile_key,
                elapsed = ?start.elapsed(),
                "create_all_geometries"
            );
        }
    }

    /// `process_techniques` followed by `create_all_geometries`
    pub fn build_tile(
        &self,
        tile: &mut Tile,
        map: &MapContext,
        enabled_kinds: Option<&GeometryKindSet>,
        disabled_kinds: Option<&GeometryKindSet>,
    ) {
        self.process_techniques(tile, map, enabled_kinds, disabled_kinds);
        self.create_all_geometries(tile, map);
    }
}
