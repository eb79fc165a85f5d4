//! Render objects produced for a tile

use super::material::Material;
use crate::decoded::GeometryKind;
use crate::geo::TileKey;
use crate::tessellation::{LodMesh, MeshData};
use serde::Serialize;

/// Primitive type the renderer draws an object with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Mesh,
    Lines,
    Points,
    /// Outline edges of extruded volumes
    Edges,
    /// Extruded building volume
    Volume,
}

/// Where an object's vertex data lives
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ObjectGeometry {
    /// A range of a decoded geometry's index or vertex buffer
    #[serde(rename_all = "camelCase")]
    Shared { geometry_index: usize, start: u32, count: u32 },
    Owned(MeshData),
    Lod(LodMesh),
}

/// Metadata attached when an object is registered on a tile
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectUserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_key: Option<TileKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    pub kind: Vec<GeometryKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderObject {
    pub kind: ObjectKind,
    pub geometry: ObjectGeometry,
    pub material: Material,
    pub render_order: f64,
    pub user_data: ObjectUserData,
}

impl RenderObject {
    pub fn new(kind: ObjectKind, geometry: ObjectGeometry, material: Material) -> Self {
        Self { kind, geometry, material, render_order: 0.0, user_data: ObjectUserData::default() }
    }

    pub fn with_render_order(mut self, render_order: f64) -> Self {
        self.render_order = render_order;
        self
    }

    pub fn with_technique(mut self, technique_index: usize) -> Self {
        self.user_data.technique_index = Some(technique_index);
        self
    }

    /// Shared range `(geometry_index, start, count)`, if the object references one
    pub fn shared_range(&self) -> Option<(usize, u32, u32)> {
        match self.geometry {
            ObjectGeometry::Shared { geometry_index, start, count } => {
                Some((geometry_index, start, count))
            }
            _ => None,
        }
    }
}
