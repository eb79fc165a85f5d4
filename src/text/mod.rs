//! Labels extracted from decoded tiles
//!
//! # Submodules
//! - `element` - Text elements, their styles and blocking elements
//! - `arabic` - Contextual shaping of Arabic text

pub mod arabic;
mod element;

pub use element::{
    FeatureId,
    HorizontalAlignment,
    PathBlockingElement,
    PoiInfo,
    TextAnchor,
    TextElement,
    TextLayoutStyle,
    TextRenderStyle,
    VerticalAlignment,
    DEFAULT_TEXT_DISTANCE_SCALE,
};
