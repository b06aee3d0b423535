//! Scene boundary types.
//!
//! The host 3D application hands the pipeline a snapshot of its scene
//! through these types: objects with decomposed local transforms,
//! already-triangulated geometry with per-loop normals and UVs, material
//! slots and vertex-group weights. The pipeline never reaches back into
//! the host; everything it needs is captured here.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::shader::NodeTree;

/// A source object supplied by the host scene.
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Object name, used for the caller-facing sort utility
    pub name: String,
    /// Local translation
    pub location: Vec3,
    /// Local rotation, XYZ Euler in radians
    pub rotation: Vec3,
    /// Local non-uniform scale
    pub scale: Vec3,
    /// Object payload; only mesh-bearing objects are consumed
    pub data: ObjectData,
    /// Material slots in slot order. A slot may be empty, and objects
    /// may carry fewer slots than their triangles reference.
    pub materials: Vec<Option<SourceMaterial>>,
    /// Vertex groups, consulted only when weight export is enabled
    pub vertex_groups: Vec<VertexGroup>,
}

/// Payload discriminator for scene objects.
#[derive(Debug, Clone)]
pub enum ObjectData {
    /// Triangulated mesh geometry
    Mesh(GeometrySnapshot),
    /// Anything else (lights, cameras, empties); skipped by the pipeline
    Other,
}

/// Triangulated geometry extracted from one object.
///
/// Loop indices address per-corner data (`loop_normals`, UV layer
/// `data`); vertex indices address `positions`. Triangles must only
/// reference indices that exist in those lists.
#[derive(Debug, Clone, Default)]
pub struct GeometrySnapshot {
    /// Per-vertex positions in object space
    pub positions: Vec<Vec3>,
    /// Per-loop normals in object space
    pub loop_normals: Vec<Vec3>,
    /// Triangles referencing vertices and loops
    pub triangles: Vec<LoopTriangle>,
    /// Named UV layers, zero or more
    pub uv_layers: Vec<UvLayer>,
}

/// One triangle of a geometry snapshot.
#[derive(Debug, Clone, Copy)]
pub struct LoopTriangle {
    /// Vertex indices in loop order
    pub vertices: [u32; 3],
    /// Loop indices, parallel to `vertices`
    pub loops: [u32; 3],
    /// Material slot this triangle uses
    pub material_index: usize,
}

/// A named UV layer with per-loop coordinates.
#[derive(Debug, Clone, Default)]
pub struct UvLayer {
    /// Layer name
    pub name: String,
    /// Selected in the host UI
    pub active: bool,
    /// Flagged as the layer used for rendering
    pub active_render: bool,
    /// Per-loop UV coordinates, bottom-left origin
    pub data: Vec<Vec2>,
}

/// A named vertex group with sparse per-vertex weights.
#[derive(Debug, Clone, Default)]
pub struct VertexGroup {
    /// Group (bone) name
    pub name: String,
    /// Weights by vertex index; absent vertices are not members
    pub weights: HashMap<u32, f32>,
}

impl VertexGroup {
    /// Weight of `vertex` in this group, 0.0 for non-members.
    pub fn weight(&self, vertex: u32) -> f32 {
        self.weights.get(&vertex).copied().unwrap_or(0.0)
    }
}

/// A source material reference, with the legacy surface properties and
/// an optional shader node graph.
#[derive(Debug, Clone)]
pub struct SourceMaterial {
    /// Material name; the host guarantees uniqueness, so the pipeline
    /// uses it as the material's identity
    pub name: String,
    /// Legacy viewport diffuse colour (RGBA)
    pub diffuse_color: [f32; 4],
    /// Legacy viewport specular colour (RGB)
    pub specular_color: [f32; 3],
    /// Legacy roughness scalar
    pub roughness: f32,
    /// Shader node graph, when the material uses nodes
    pub node_tree: Option<NodeTree>,
}

impl SourceMaterial {
    /// A material with host default surface properties and no nodes.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_color: [0.8, 0.8, 0.8, 1.0],
            specular_color: [1.0, 1.0, 1.0],
            roughness: 0.5,
            node_tree: None,
        }
    }
}

/// Return references to `objects` with non-mesh objects removed.
pub fn filter_objects(objects: &[SceneObject]) -> Vec<&SceneObject> {
    objects
        .iter()
        .filter(|o| matches!(o.data, ObjectData::Mesh(_)))
        .collect()
}

/// Sort `objects` by name, giving callers a predictable export order.
/// Object order determines render order, so this is a convenience, not
/// something the pipeline imposes.
pub fn sort_objects_by_name(objects: &mut [SceneObject]) {
    objects.sort_by(|a, b| a.name.cmp(&b.name));
}
