//! o3d-export
//!
//! Deterministic conversion from host scene snapshots to OMSI mesh
//! (`.o3d`) files.
//!
//! The pipeline consumes [`SceneObject`] values (decomposed transforms,
//! triangulated geometry, material slots with optional shader graphs,
//! vertex groups), resolves materials through the shader graph with
//! total fallback chains, deduplicates vertices and material slots in
//! first-seen order, and hands the assembled [`o3d_mesh::Mesh`] to the
//! codec. The same scene with the same options always produces the
//! same bytes.
//!
//! # Example
//!
//! ```
//! use o3d_export::{ExportOptions, Exporter};
//!
//! let exporter = Exporter::new(ExportOptions::default());
//! let mesh = exporter.assemble(&[]);
//! assert_eq!(mesh.vertex_count(), 0);
//! ```

pub mod assembler;
pub mod exporter;
pub mod interner;
pub mod logging;
pub mod math;
pub mod scene;
pub mod shader;

pub use assembler::Assembler;
pub use exporter::{ExportError, ExportOptions, Exporter, TransformSet, UvLayerMode};
pub use interner::Interner;
pub use scene::{
    filter_objects, sort_objects_by_name, GeometrySnapshot, LoopTriangle, ObjectData, SceneObject,
    SourceMaterial, UvLayer, VertexGroup,
};
pub use shader::{
    resolve_material, Link, MappingType, Node, NodeKind, NodeTree, RenderTarget, ResolvedMaterial,
};
