//! Mesh buffers and subdivision
//!
//! # Submodules
//! - `mesh` - Working and render mesh buffers, LOD meshes, base64 export
//! - `subdivision` - Generic edge-splitting subdivision
//! - `spherical` - Great-circle subdivision for globe rendering
//! - `edge_length` - Subdivision to a maximum edge length

mod edge_length;
mod mesh;
mod spherical;
mod subdivision;

pub use edge_length::{EdgeLengthGeometrySubdivisionModifier, SubdivisionMode};
pub use mesh::{
    serialize_f32_vec_as_base64,
    serialize_f32_vec_base64,
    serialize_u32_vec_base64,
    BufferGeometry,
    LodMesh,
    MeshData,
};
pub use spherical::SphericalGeometrySubdivisionModifier;
pub use subdivision::SubdivisionModifier;
