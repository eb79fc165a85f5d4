//! Tile geometry creation for large-scale 2D/3D maps
//!
//! Turns decoded, technique-indexed map tiles into render objects, text
//! elements and label blockers: techniques are filtered by kind and compiled
//! once, same-technique groups are coalesced and handed to technique
//! handlers, labels are extracted with their priorities, and tiles on the
//! globe get a subdivided, recentred ground plane.
//!
//! ```ignore
//! let creator = TileGeometryCreator::default();
//! let mut tile = Tile::new(key, DataSourceInfo::new("osm"), Projection::Mercator, 0);
//! tile.set_decoded_tile(Arc::new(DecodedTile::from_json_str(&json)?));
//! creator.build_tile(&mut tile, &MapContext::new(14.0), None, None);
//! ```

pub mod config;
pub mod creator;
pub mod decoded;
pub mod geo;
pub mod handlers;
pub mod logging;
pub mod map;
pub mod render;
pub mod style;
pub mod tessellation;
pub mod text;
pub mod tile;

pub use config::GeometryCreatorConfig;
pub use creator::TileGeometryCreator;
pub use decoded::{DecodedTile, GeometryKind, GeometryKindSet, Technique, TechniqueName};
pub use geo::{GeoBox, GeoCoordinates, Projection, TileKey, Vector3};
pub use map::MapContext;
pub use render::{RenderObject, FALLBACK_RENDER_ORDER_OFFSET};
pub use text::TextElement;
pub use tile::{DataSourceInfo, Tile};
