//! Mesh buffers handed to the renderer
//!
//! `BufferGeometry` is the f64 working form used while tessellating;
//! `MeshData` is the final f32 form, recentred on the tile and serializable
//! with base64-encoded buffers for compact JSON transmission.

use crate::geo::Vector3;
use base64::{engine::general_purpose, Engine as _};
use serde::{Serialize, Serializer};

/// Serialize Vec<f32> as base64 of its little-endian bytes
pub fn serialize_f32_vec_base64<S>(data: &[f32], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
    serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
}

/// Serialize Option<Vec<f32>> as base64, `null` when absent
pub fn serialize_f32_vec_as_base64<S>(
    data: &Option<Vec<f32>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match data {
        Some(vec) => {
            let bytes: Vec<u8> = vec.iter().flat_map(|v| v.to_le_bytes()).collect();
            serializer.serialize_some(&general_purpose::STANDARD.encode(bytes))
        }
        None => serializer.serialize_none(),
    }
}

/// Serialize Vec<u32> as base64 of its little-endian bytes
pub fn serialize_u32_vec_base64<S>(data: &[u32], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
    serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
}

/// Indexed triangle mesh in double precision, used during tessellation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferGeometry {
    pub positions: Vec<Vector3>,
    pub uvs: Option<Vec<[f64; 2]>>,
    pub indices: Vec<u32>,
}

impl BufferGeometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Convert to render buffers, applying `transform` to every position
    pub fn to_mesh_data(&self, transform: impl Fn(Vector3) -> Vector3) -> MeshData {
        let positions = self
            .positions
            .iter()
            .flat_map(|p| transform(*p).to_f32_array())
            .collect();
        let uvs = self
            .uvs
            .as_ref()
            .map(|uvs| uvs.iter().flat_map(|uv| [uv[0] as f32, uv[1] as f32]).collect());
        MeshData { positions, uvs, indices: self.indices.clone() }
    }
}

/// Single precision mesh buffers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeshData {
    /// Base64-encoded Float32 positions (x, y, z, x, y, z, ...)
    #[serde(rename = "positionData", serialize_with = "serialize_f32_vec_base64")]
    pub positions: Vec<f32>,

    /// Base64-encoded Float32 texture coordinates (u, v, ...)
    #[serde(
        rename = "uvData",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_f32_vec_as_base64"
    )]
    pub uvs: Option<Vec<f32>>,

    /// Base64-encoded Uint32 indices
    #[serde(rename = "indexData", serialize_with = "serialize_u32_vec_base64")]
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn vertex(&self, i: usize) -> Option<[f32; 3]> {
        let base = i * 3;
        self.positions.get(base..base + 3).map(|v| [v[0], v[1], v[2]])
    }

    /// Largest absolute coordinate in the mesh
    pub fn max_abs_coordinate(&self) -> f32 {
        self.positions.iter().fold(0.0_f32, |acc, v| acc.max(v.abs()))
    }
}

/// Mesh with several levels of detail, one of them selected
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LodMesh {
    pub levels: Vec<MeshData>,
    pub current: usize,
}

impl LodMesh {
    pub fn new(levels: Vec<MeshData>) -> Self {
        Self { levels, current: 0 }
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Select a level, clamped to the available range
    pub fn set_level_of_detail(&mut self, level: usize) {
        self.current = level.min(self.levels.len().saturating_sub(1));
    }

    pub fn current_mesh(&self) -> Option<&MeshData> {
        self.levels.get(self.current)
    }
}
