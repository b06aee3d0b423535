//! In-memory mesh representation.
//!
//! These are plain storage types: a [`Mesh`] holds flat, indexed lists
//! of vertices, triangles and materials, plus two optional sections
//! (animation origin matrix and skin-weighted bones). Producing a
//! well-formed mesh from scene data is the job of the `o3d-export`
//! crate; this crate only stores and encodes it.

use serde::{Deserialize, Serialize};

/// A single mesh vertex: position, normal and one UV coordinate pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Position in left-handed Y-up space
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinate, top-left origin
    pub uv: [f32; 2],
}

/// A triangle face: three vertex indices and a material slot.
///
/// Winding order determines the face-front direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertex indices in winding order
    pub vertices: [u32; 3],
    /// Index into the mesh material list
    pub material: u16,
}

/// A resolved mesh material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Diffuse colour (RGBA)
    pub diffuse: [f32; 4],
    /// Specular colour (RGB)
    pub specular: [f32; 3],
    /// Emissive colour (RGB)
    pub emissive: [f32; 3],
    /// Specular power, `1000 - roughness * 1000`
    pub power: f32,
    /// Texture path relative to the consuming game's texture lookup root
    pub texture: String,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.5, 0.5, 0.5],
            emissive: [0.0, 0.0, 0.0],
            power: 1000.0,
            texture: String::new(),
        }
    }
}

/// One vertex influence of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinWeight {
    /// Index into the mesh vertex list
    pub vertex: u32,
    /// Influence weight
    pub weight: f32,
}

/// A named bone with its vertex influences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    /// Bone name
    pub name: String,
    /// Vertex influences
    pub weights: Vec<SkinWeight>,
}

/// Row-major 4x4 transform matrix.
pub type Matrix4 = [[f32; 4]; 4];

/// Storage for a whole mesh.
///
/// `matrix` and `bones` are optional sections; on the wire their absence
/// is signalled purely by the absence of their section marker. A bones
/// list that is present but empty is still written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex list; a vertex's index is its position in this list
    pub vertices: Vec<Vertex>,
    /// Material list, referenced by triangle material slots
    pub materials: Vec<Material>,
    /// Triangle list in render order
    pub triangles: Vec<Triangle>,
    /// Animation origin transform, if any
    pub matrix: Option<Matrix4>,
    /// Skin-weighted bones, if weight export produced any
    pub bones: Option<Vec<Bone>>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether writing this mesh needs 32-bit indexes.
    pub fn requires_long_indexes(&self) -> bool {
        self.vertices.len().max(self.triangles.len()) > 0xFFFF
    }

    /// Vertex count.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Triangle count.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Material count.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}
