//! Map tiles and their per-build state
//!
//! # Submodules
//! - `state` - Side-table of technique and group annotations
//! - `text_style` - Per-technique text style cache

mod state;
mod text_style;

use crate::decoded::DecodedTile;
use crate::geo::{GeoBox, Projection, TileKey, Vector3};
use crate::handlers::TechniqueHandlerIndex;
use crate::render::RenderObject;
use crate::text::{PathBlockingElement, TextElement};
use std::sync::Arc;

pub use state::{GroupState, TechniqueFilter, TechniqueRef, TechniqueState, TileBuildState};
pub use text_style::TextStyleCache;

/// The data source a tile belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceInfo {
    pub name: String,
    /// Projection of the tiling scheme, used by decoded coordinates
    pub tiling_projection: Projection,
    /// Whether tiles of this source get a background plane
    pub add_ground_plane: bool,
}

impl DataSourceInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tiling_projection: Projection::Mercator,
            add_ground_plane: false,
        }
    }

    pub fn with_ground_plane(mut self, add_ground_plane: bool) -> Self {
        self.add_ground_plane = add_ground_plane;
        self
    }
}

pub struct Tile {
    pub tile_key: TileKey,
    pub data_source: DataSourceInfo,
    /// Projection the tile is rendered with
    pub projection: Projection,
    pub geo_box: GeoBox,
    /// Projected geo box center; object positions are relative to it
    pub center: Vector3,
    /// World copy index, non-zero for wrapped copies of the same tile
    pub offset: i32,
    pub decoded_tile: Option<Arc<DecodedTile>>,
    pub build_state: Option<TileBuildState>,
    pub objects: Vec<RenderObject>,
    pub text_elements: Vec<TextElement>,
    pub blocking_elements: Vec<PathBlockingElement>,
    pub technique_handler_index: TechniqueHandlerIndex,
    pub text_style_cache: TextStyleCache,
    pub max_geometry_height: f64,
    visibility_counter: i32,
}

impl Tile {
    pub fn new(
        tile_key: TileKey,
        data_source: DataSourceInfo,
        projection: Projection,
        offset: i32,
    ) -> Self {
        let geo_box = tile_key.geo_box();
        Self {
            tile_key,
            data_source,
            projection,
            geo_box,
            center: projection.project_point(geo_box.center()),
            offset,
            decoded_tile: None,
            build_state: None,
            objects: Vec::new(),
            text_elements: Vec::new(),
            blocking_elements: Vec::new(),
            technique_handler_index: TechniqueHandlerIndex::default(),
            text_style_cache: TextStyleCache::default(),
            max_geometry_height: 0.0,
            visibility_counter: -1,
        }
    }

    /// Attach a decoded payload with a fresh build state
    pub fn set_decoded_tile(&mut self, decoded: Arc<DecodedTile>) {
        self.build_state = Some(TileBuildState::new(&decoded));
        self.decoded_tile = Some(decoded);
        self.technique_handler_index.clear();
        self.text_style_cache.clear();
    }

    /// Horizontal shift of this world copy
    pub fn compute_world_offset_x(&self) -> f64 {
        self.projection.world_extent_x() * self.offset as f64
    }

    pub fn add_text_element(&mut self, element: TextElement) {
        self.text_elements.push(element);
    }

    pub fn add_blocking_element(&mut self, element: PathBlockingElement) {
        self.blocking_elements.push(element);
    }

    /// Force a visibility check of all objects on the next frame
    pub fn reset_visibility_counter(&mut self) {
        self.visibility_counter = -1;
    }

    pub fn needs_visibility_check(&self) -> bool {
        self.visibility_counter < 0
    }

    /// Record that visibility was evaluated for the current objects
    pub fn mark_visibility_checked(&mut self) {
        self.visibility_counter = self.objects.len() as i32;
    }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("tile_key", &self.tile_key)
            .field("data_source", &self.data_source.name)
            .field("offset", &self.offset)
            .field("objects", &self.objects.len())
            .field("text_elements", &self.text_elements.len())
            .finish()
    }
}
