//! Techniques: the style rules geometry groups are rendered with

use super::kind::{deserialize_kind, GeometryKind, GeometryKindSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Technique discriminant, selects the handler that builds render objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TechniqueName {
    None,
    Fill,
    SolidLine,
    DashedLine,
    Line,
    Segments,
    ExtrudedLine,
    ExtrudedPolygon,
    Standard,
    Shader,
    Terrain,
    Squares,
    Circles,
    Text,
    Poi,
    LabeledIcon,
    LineMarker,
}

impl TechniqueName {
    pub fn is_text_technique(self) -> bool {
        self == TechniqueName::Text
    }

    pub fn is_poi_technique(self) -> bool {
        matches!(self, TechniqueName::Poi | TechniqueName::LabeledIcon)
    }

    pub fn is_line_marker_technique(self) -> bool {
        self == TechniqueName::LineMarker
    }

    /// Screen-space techniques placed by the label system rather than drawn as meshes
    pub fn is_label(self) -> bool {
        self.is_text_technique() || self.is_poi_technique() || self.is_line_marker_technique()
    }

    /// Kind assigned when the style does not declare one
    pub fn default_geometry_kind(self) -> GeometryKind {
        match self {
            TechniqueName::Fill => GeometryKind::Area,
            TechniqueName::Line
            | TechniqueName::SolidLine
            | TechniqueName::DashedLine
            | TechniqueName::Segments
            | TechniqueName::ExtrudedLine => GeometryKind::Line,
            TechniqueName::ExtrudedPolygon => GeometryKind::Building,
            TechniqueName::Terrain => GeometryKind::Terrain,
            TechniqueName::Text
            | TechniqueName::Poi
            | TechniqueName::LabeledIcon
            | TechniqueName::LineMarker => GeometryKind::Label,
            _ => GeometryKind::All,
        }
    }
}

/// A decoded style rule.
///
/// Properties that may be zoom or data dependent are kept as raw JSON and
/// compiled once per tile build. Everything the pipeline does not name
/// explicitly (colors, widths, sizes...) lands in `attributes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technique {
    pub name: TechniqueName,

    #[serde(
        default,
        deserialize_with = "deserialize_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<GeometryKindSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_order: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_render_order: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_near: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_far: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom_level: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom_level: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_scale: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_offset: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_offset: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub may_overlap: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve_space: Option<bool>,

    /// Named text style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Theme category used by the priority tables
    #[serde(rename = "_category", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,

    #[serde(rename = "_secondaryCategory", default, skip_serializing_if = "Option::is_none")]
    pub secondary_category: Option<Value>,

    #[serde(rename = "_styleSet", default, skip_serializing_if = "Option::is_none")]
    pub style_set: Option<String>,

    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
}

impl Technique {
    pub fn new(name: TechniqueName) -> Self {
        Self {
            name,
            kind: None,
            priority: None,
            render_order: None,
            secondary_render_order: None,
            fade_near: None,
            fade_far: None,
            min_zoom_level: None,
            max_zoom_level: None,
            distance_scale: None,
            x_offset: None,
            y_offset: None,
            may_overlap: None,
            reserve_space: None,
            style: None,
            category: None,
            secondary_category: None,
            style_set: None,
            attributes: IndexMap::new(),
        }
    }

    /// Category name, ignored unless it is a plain string
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().and_then(Value::as_str)
    }

    pub fn secondary_category_name(&self) -> Option<&str> {
        self.secondary_category.as_ref().and_then(Value::as_str)
    }
}
