//! Decoded tile payload
//!
//! The decoder hands the pipeline a `DecodedTile`: techniques, geometry
//! buffers grouped by technique, and the text, POI and path geometries used
//! for labels. The payload is shared behind an `Arc` and never mutated here.
//!
//! # Submodules
//! - `kind` - Geometry kinds and kind sets
//! - `technique` - Technique style rules

mod kind;
mod technique;

use crate::geo::Vector3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use kind::{deserialize_kind, normalize_kind, GeometryKind, GeometryKindSet};
pub use technique::{Technique, TechniqueName};

/// Shape of the primitives stored in a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeometryType {
    #[default]
    Unspecified,
    Point,
    Line,
    SolidLine,
    Text,
    TextPath,
    ExtrudedLine,
    Polygon,
    ExtrudedPolygon,
    Object3D,
    Other,
}

/// A flat typed buffer, `item_count` floats per element
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferAttribute {
    #[serde(default)]
    pub name: String,
    pub buffer: Vec<f32>,
    pub item_count: usize,
}

impl BufferAttribute {
    pub fn new(name: &str, buffer: Vec<f32>, item_count: usize) -> Self {
        Self { name: name.to_string(), buffer, item_count }
    }

    /// Number of elements in the buffer
    pub fn count(&self) -> usize {
        if self.item_count == 0 {
            0
        } else {
            self.buffer.len() / self.item_count
        }
    }

    /// Element `i` as a 3D point; missing components read as zero
    pub fn get_xyz(&self, i: usize) -> Option<Vector3> {
        if i >= self.count() {
            return None;
        }
        let base = i * self.item_count;
        let component = |c: usize| {
            if c < self.item_count {
                self.buffer[base + c] as f64
            } else {
                0.0
            }
        };
        Some(Vector3::new(component(0), component(1), component(2)))
    }
}

/// Contiguous index range of a geometry rendered with one technique
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub start: u32,
    pub count: u32,
    pub technique: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_order_offset: Option<f64>,
}

impl Group {
    pub fn new(start: u32, count: u32, technique: usize) -> Self {
        Self { start, count, technique, render_order_offset: None }
    }
}

/// Vertex buffers plus the technique groups that reference them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    #[serde(rename = "type", default)]
    pub geometry_type: GeometryType,
    #[serde(default)]
    pub vertex_attributes: Vec<BufferAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<u32>>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_infos: Option<Vec<Value>>,
}

impl Geometry {
    pub fn attribute(&self, name: &str) -> Option<&BufferAttribute> {
        self.vertex_attributes.iter().find(|attr| attr.name == name)
    }

    /// Number of drawable elements: indices when indexed, vertices otherwise
    pub fn element_count(&self) -> usize {
        match &self.index {
            Some(index) => index.len(),
            None => self.attribute("position").map(BufferAttribute::count).unwrap_or(0),
        }
    }
}

/// Label text that follows a path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPathGeometry {
    /// Flat xyz coordinates
    pub path: Vec<f64>,
    #[serde(default)]
    pub path_length_sqr: f64,
    pub text: String,
    pub technique: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj_infos: Option<Value>,
}

/// Point labels: one string catalog index per position
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGeometry {
    pub positions: BufferAttribute,
    pub texts: Vec<usize>,
    #[serde(default)]
    pub technique: Option<usize>,
    #[serde(default)]
    pub string_catalog: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj_infos: Option<Vec<Value>>,
}

/// Icons with optional text; `image_textures` index into the string catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiGeometry {
    pub positions: BufferAttribute,
    pub texts: Vec<usize>,
    #[serde(default)]
    pub technique: Option<usize>,
    #[serde(default)]
    pub string_catalog: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_textures: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj_infos: Option<Vec<Value>>,
}

/// Line geometry that labels must not overlap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathGeometry {
    pub path: Vec<f64>,
}

/// Catalog lookup that tolerates out-of-range indices and null entries
pub(crate) fn catalog_string(catalog: &[Option<String>], index: usize) -> Option<&str> {
    catalog.get(index).and_then(|entry| entry.as_deref())
}

/// Flat xyz buffer into points, shifted along x
pub(crate) fn path_points(flat: &[f64], offset_x: f64) -> Vec<Vector3> {
    flat.chunks_exact(3)
        .map(|c| Vector3::new(c[0] + offset_x, c[1], c[2]))
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTile {
    pub techniques: Vec<Technique>,
    #[serde(default)]
    pub geometries: Vec<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_path_geometries: Option<Vec<TextPathGeometry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_geometries: Option<Vec<TextGeometry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poi_geometries: Option<Vec<PoiGeometry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_geometries: Option<Vec<PathGeometry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_geometry_height: Option<f64>,
}

impl DecodedTile {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let tile = serde_json::from_str(json)?;
        Ok(tile)
    }
}
