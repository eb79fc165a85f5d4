//! Render objects, materials and render order layout
//!
//! # Submodules
//! - `object` - Render objects and their user data
//! - `material` - Materials and fading parameters
//!
//! Render orders are laid out in three bands. Objects of regular tiles use
//! `[0, K)`, the ground plane sits at `-K` and objects of fallback tiles
//! (parents or children shown while a tile loads) are shifted below it by
//! `FALLBACK_RENDER_ORDER_OFFSET`, with `K = FALLBACK_RENDER_ORDER_OFFSET / 2`.

mod material;
mod object;

use std::ops::Range;

pub use material::{fading_of, FadingParameters, Material, MaterialKind, PolygonFadingParameters};
pub use object::{ObjectGeometry, ObjectKind, ObjectUserData, RenderObject};

/// Shift applied to the render order of fallback tile objects
pub const FALLBACK_RENDER_ORDER_OFFSET: f64 = 20_000.0;

/// Width of each render order band
pub const RENDER_ORDER_BAND: f64 = FALLBACK_RENDER_ORDER_OFFSET / 2.0;

/// Render order of the background plane, below every regular object
pub const GROUND_PLANE_RENDER_ORDER: f64 = -RENDER_ORDER_BAND;

/// Render orders available to regular tile objects
pub fn ordinary_render_orders() -> Range<f64> {
    0.0..RENDER_ORDER_BAND
}

/// Render orders of objects on fallback tiles
pub fn fallback_render_orders() -> Range<f64> {
    -FALLBACK_RENDER_ORDER_OFFSET..GROUND_PLANE_RENDER_ORDER
}

/// Render order used when an object is drawn as part of a fallback tile
pub fn fallback_render_order(render_order: f64) -> f64 {
    render_order - FALLBACK_RENDER_ORDER_OFFSET
}
