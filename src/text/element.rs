//! Text elements handed to the label placement engine

use crate::decoded::GeometryKindSet;
use crate::geo::Vector3;
use serde_json::Value;
use std::sync::Arc;

/// Distance scale used when a technique does not set one
pub const DEFAULT_TEXT_DISTANCE_SCALE: f64 = 0.5;

/// How text is drawn: size, colors and font
#[derive(Debug, Clone, PartialEq)]
pub struct TextRenderStyle {
    pub font_size: f64,
    pub color: [f32; 4],
    pub background_color: Option<[f32; 4]>,
    pub opacity: f64,
    pub font_name: Option<String>,
}

impl Default for TextRenderStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            color: [0.0, 0.0, 0.0, 1.0],
            background_color: None,
            opacity: 1.0,
            font_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlignment {
    Left,
    #[default]
    Center,
    Right,
}

impl HorizontalAlignment {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" | "centre" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlignment {
    Above,
    #[default]
    Center,
    Below,
}

impl VerticalAlignment {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "above" | "top" => Some(Self::Above),
            "center" | "centre" => Some(Self::Center),
            "below" | "bottom" => Some(Self::Below),
            _ => None,
        }
    }
}

/// How text is laid out around its anchor
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayoutStyle {
    pub horizontal_alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,
    pub tracking: f64,
    pub max_lines: Option<u32>,
}

impl Default for TextLayoutStyle {
    fn default() -> Self {
        Self {
            horizontal_alignment: HorizontalAlignment::Center,
            vertical_alignment: VerticalAlignment::Center,
            tracking: 0.0,
            max_lines: None,
        }
    }
}

/// Feature identifier read from the object info's `$id`
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureId {
    Number(i64),
    Text(String),
}

impl FeatureId {
    pub fn from_user_data(user_data: Option<&Value>) -> Option<Self> {
        match user_data?.get("$id")? {
            Value::Number(n) => n.as_i64().map(FeatureId::Number),
            Value::String(s) => Some(FeatureId::Text(s.clone())),
            _ => None,
        }
    }
}

/// Where a label is anchored
#[derive(Debug, Clone, PartialEq)]
pub enum TextAnchor {
    Point(Vector3),
    Path(Vec<Vector3>),
}

/// Icon data of POI and line-marker labels
#[derive(Debug, Clone, PartialEq)]
pub struct PoiInfo {
    pub technique_index: usize,
    pub image_texture_name: Option<String>,
    /// Repeated along `TextAnchor::Path` rather than placed once
    pub is_line_marker: bool,
}

#[derive(Debug, Clone)]
pub struct TextElement {
    pub text: String,
    pub anchor: TextAnchor,
    pub render_style: Arc<TextRenderStyle>,
    pub layout_style: Arc<TextLayoutStyle>,
    pub priority: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub feature_id: Option<FeatureId>,
    pub style: Option<String>,
    pub fade_near: Option<f64>,
    pub fade_far: Option<f64>,
    pub tile_offset: i32,
    pub path_length_sqr: Option<f64>,
    pub min_zoom_level: Option<f64>,
    pub max_zoom_level: Option<f64>,
    pub distance_scale: f64,
    pub may_overlap: bool,
    pub reserve_space: bool,
    pub kind: Option<GeometryKindSet>,
    pub user_data: Option<Value>,
    pub poi_info: Option<PoiInfo>,
}

impl TextElement {
    pub fn new(
        text: String,
        anchor: TextAnchor,
        render_style: Arc<TextRenderStyle>,
        layout_style: Arc<TextLayoutStyle>,
        priority: f64,
        tile_offset: i32,
    ) -> Self {
        Self {
            text,
            anchor,
            render_style,
            layout_style,
            priority,
            x_offset: 0.0,
            y_offset: 0.0,
            feature_id: None,
            style: None,
            fade_near: None,
            fade_far: None,
            tile_offset,
            path_length_sqr: None,
            min_zoom_level: None,
            max_zoom_level: None,
            distance_scale: DEFAULT_TEXT_DISTANCE_SCALE,
            may_overlap: false,
            reserve_space: true,
            kind: None,
            user_data: None,
            poi_info: None,
        }
    }

    pub fn position(&self) -> Option<Vector3> {
        match &self.anchor {
            TextAnchor::Point(p) => Some(*p),
            TextAnchor::Path(_) => None,
        }
    }

    pub fn path(&self) -> Option<&[Vector3]> {
        match &self.anchor {
            TextAnchor::Path(path) => Some(path),
            TextAnchor::Point(_) => None,
        }
    }
}

/// A polyline labels may not be placed over
#[derive(Debug, Clone, PartialEq)]
pub struct PathBlockingElement {
    pub points: Vec<Vector3>,
}

impl PathBlockingElement {
    pub fn new(points: Vec<Vector3>) -> Self {
        Self { points }
    }
}
