//! Deterministic scene-to-mesh assembly.
//!
//! The assembler walks mesh objects in caller order, applies each
//! object's combined transform, resolves materials through the shader
//! graph, deduplicates vertices and material slots with ordered
//! interners, and accumulates skin weights. The result is a flat
//! [`Mesh`] ready for encoding. Assembly is infallible: every resolver
//! condition has a fallback, so malformed shader graphs or missing UV
//! layers degrade to defaults instead of failing the export.

use std::collections::{BTreeMap, HashMap};

use glam::{Mat3, Mat4, Vec2};
use indexmap::IndexMap;
use tracing::debug;

use o3d_mesh::{Bone, Material, Mesh, SkinWeight, Triangle, Vertex};

use crate::exporter::{ExportOptions, UvLayerMode};
use crate::interner::Interner;
use crate::math::{euler_xyz, AXIS_SWAP};
use crate::scene::{GeometrySnapshot, LoopTriangle, ObjectData, SceneObject, UvLayer};
use crate::shader::{resolve_material, ResolvedMaterial};

/// Deduplication key for one emitted vertex.
///
/// Floats are keyed by bit pattern, so equality is bit-exact: -0.0 and
/// 0.0 are distinct, and no epsilon merging happens. Weights are part
/// of the key so two loops that coincide spatially but deform
/// differently stay separate vertices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VertexKey {
    position: [u32; 3],
    normal: [u32; 3],
    uv: [u32; 2],
    /// Nonzero group weights, sorted by group name
    weights: Vec<(String, u32)>,
}

impl VertexKey {
    fn to_vertex(&self) -> Vertex {
        Vertex {
            position: self.position.map(f32::from_bits),
            normal: self.normal.map(f32::from_bits),
            uv: self.uv.map(f32::from_bits),
        }
    }
}

/// Material slot identity: the source material name (`None` for an
/// empty or missing slot) plus a repeat counter driven by the merge
/// options.
type SlotKey = (Option<String>, u32);

/// Accumulates scene objects into a single mesh.
///
/// One assembler produces one mesh; the exporter creates a fresh
/// instance per call.
pub struct Assembler<'a> {
    options: &'a ExportOptions,
    vertices: Interner<VertexKey>,
    slots: Interner<SlotKey>,
    resolved: HashMap<Option<String>, ResolvedMaterial>,
    counters: HashMap<Option<String>, u32>,
    triangles: Vec<Triangle>,
    /// bone name -> vertex index -> weight, both in first-seen order
    bones: IndexMap<String, IndexMap<u32, f32>>,
    origin: Option<o3d_mesh::Matrix4>,
}

impl<'a> Assembler<'a> {
    /// Create an empty assembler for the given options.
    pub fn new(options: &'a ExportOptions) -> Self {
        Self {
            options,
            vertices: Interner::new(),
            slots: Interner::new(),
            resolved: HashMap::new(),
            counters: HashMap::new(),
            triangles: Vec::new(),
            bones: IndexMap::new(),
            origin: None,
        }
    }

    /// Consume `objects` in order and produce the assembled mesh.
    /// Non-mesh objects are skipped.
    pub fn assemble(mut self, objects: &[SceneObject]) -> Mesh {
        for object in objects {
            self.add_object(object);
        }
        self.finish()
    }

    /// The object's local transform composed with the axis swap, each
    /// component gated by the configured transform set.
    fn combined_transform(&self, object: &SceneObject) -> Mat4 {
        let set = &self.options.transforms;
        let mut combined = AXIS_SWAP;
        if set.location {
            combined *= Mat4::from_translation(object.location);
        }
        if set.rotation {
            combined *= euler_xyz(object.rotation);
        }
        if set.scale {
            combined *= Mat4::from_scale(object.scale);
        }
        combined
    }

    fn add_object(&mut self, object: &SceneObject) {
        let ObjectData::Mesh(geometry) = &object.data else {
            return;
        };
        let combined = self.combined_transform(object);

        // The animation origin is the first mesh object's transform,
        // captured once and never overwritten. Stored row-major, so the
        // column array of the column-major matrix is exactly the
        // transposed layout the format wants.
        if self.options.origin && self.origin.is_none() {
            self.origin = Some(combined.to_cols_array_2d());
        }

        // The axis swap flips handedness, so with a plain object
        // transform the determinant is negative and winding reverses;
        // a mirrored object flips it back.
        let reverse = combined.determinant() < 0.0;
        let normal_transform = Mat3::from_mat4(combined);

        let mut groups: BTreeMap<usize, Vec<&LoopTriangle>> = BTreeMap::new();
        for triangle in &geometry.triangles {
            groups.entry(triangle.material_index).or_default().push(triangle);
        }

        for (slot_index, triangles) in groups {
            let source = object.materials.get(slot_index).and_then(|m| m.as_ref());
            let identity = source.map(|m| m.name.clone());

            let material = self
                .resolved
                .entry(identity.clone())
                .or_insert_with(|| {
                    resolve_material(
                        source,
                        self.options.output_target,
                        &self.options.output_node,
                    )
                })
                .clone();

            let repeat = *self.counters.entry(identity.clone()).or_insert(0);
            let slot = self.slots.index_of((identity.clone(), repeat));
            if !self.options.merge_within {
                if let Some(count) = self.counters.get_mut(&identity) {
                    *count += 1;
                }
            }

            let uv_layer = select_uv_layer(geometry, &material, self.options.uv_layer);

            for triangle in triangles {
                let mut indices = [0u32; 3];
                for corner in 0..3 {
                    let vertex = triangle.vertices[corner];
                    let loop_index = triangle.loops[corner] as usize;

                    let position =
                        combined.transform_point3(geometry.positions[vertex as usize]);
                    let normal = (normal_transform * geometry.loop_normals[loop_index])
                        .normalize_or_zero();
                    let raw_uv = uv_layer
                        .map(|layer| layer.data[loop_index])
                        .unwrap_or(Vec2::ZERO);
                    let uv = material.deform_uv(raw_uv);

                    let mut weights: Vec<(String, f32)> = if self.options.weights {
                        object
                            .vertex_groups
                            .iter()
                            .filter_map(|group| {
                                let weight = group.weight(vertex);
                                (weight != 0.0).then(|| (group.name.clone(), weight))
                            })
                            .collect()
                    } else {
                        Vec::new()
                    };
                    weights.sort_by(|a, b| a.0.cmp(&b.0));

                    let index = self.vertices.index_of(VertexKey {
                        position: position.to_array().map(f32::to_bits),
                        normal: normal.to_array().map(f32::to_bits),
                        uv: uv.to_array().map(f32::to_bits),
                        weights: weights
                            .iter()
                            .map(|(name, weight)| (name.clone(), weight.to_bits()))
                            .collect(),
                    });

                    // First nonzero weight per (bone, vertex) wins;
                    // later coincident loops cannot change it.
                    for (name, weight) in weights {
                        self.bones
                            .entry(name)
                            .or_insert_with(IndexMap::new)
                            .entry(index)
                            .or_insert(weight);
                    }

                    indices[corner] = index;
                }
                if reverse {
                    indices.reverse();
                }
                self.triangles.push(Triangle {
                    vertices: indices,
                    material: slot as u16,
                });
            }
        }

        // Merge policy bookkeeping at object end: merging between
        // objects forgets all repeat counters; otherwise, if materials
        // merged within this object, every seen material moves to a
        // fresh slot for the next object.
        if self.options.merge_between {
            self.counters.clear();
        } else if self.options.merge_within {
            for count in self.counters.values_mut() {
                *count += 1;
            }
        }

        debug!(
            object = %object.name,
            triangles = geometry.triangles.len(),
            "assembled object"
        );
    }

    fn finish(self) -> Mesh {
        let vertices = self.vertices.iter().map(VertexKey::to_vertex).collect();
        let materials = self
            .slots
            .iter()
            .map(|(identity, _)| {
                self.resolved
                    .get(identity)
                    .map(ResolvedMaterial::to_material)
                    .unwrap_or_else(Material::default)
            })
            .collect();
        let bones = if self.options.weights && !self.bones.is_empty() {
            Some(
                self.bones
                    .into_iter()
                    .map(|(name, weights)| Bone {
                        name,
                        weights: weights
                            .into_iter()
                            .map(|(vertex, weight)| SkinWeight { vertex, weight })
                            .collect(),
                    })
                    .collect(),
            )
        } else {
            None
        };
        Mesh {
            vertices,
            materials,
            triangles: self.triangles,
            matrix: self.origin,
            bones,
        }
    }
}

/// Pick the UV layer a triangle group samples: the layer the shader
/// names, else the first layer carrying the configured mode flag, else
/// the first layer, else none (zero UVs).
fn select_uv_layer<'g>(
    geometry: &'g GeometrySnapshot,
    material: &ResolvedMaterial,
    mode: UvLayerMode,
) -> Option<&'g UvLayer> {
    let layers = &geometry.uv_layers;
    if !material.uv_map.is_empty() {
        if let Some(layer) = layers.iter().find(|l| l.name == material.uv_map) {
            return Some(layer);
        }
    }
    layers
        .iter()
        .find(|l| match mode {
            UvLayerMode::Active => l.active,
            UvLayerMode::ActiveForRender => l.active_render,
        })
        .or_else(|| layers.first())
}
