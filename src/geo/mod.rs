//! Geographic primitives and projections
//!
//! # Submodules
//! - `types` - Vectors, geo coordinates, geo boxes and tile keys
//! - `projection` - Planar mercator and sphere projections

mod projection;
mod types;

pub use types::{GeoBox, GeoCoordinates, TileKey, Vector3};

pub use projection::{
    Projection,
    ProjectionType,
    EQUATORIAL_CIRCUMFERENCE,
    EQUATORIAL_RADIUS,
    MAX_MERCATOR_LATITUDE,
};
