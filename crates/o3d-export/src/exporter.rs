//! Export configuration and the file-writing exporter.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use o3d_mesh::{FormatSpec, Mesh, MeshError};

use crate::assembler::Assembler;
use crate::scene::SceneObject;
use crate::shader::RenderTarget;

/// Which components of an object's local transform are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformSet {
    /// Apply translation
    pub location: bool,
    /// Apply rotation
    pub rotation: bool,
    /// Apply scale
    pub scale: bool,
}

impl Default for TransformSet {
    fn default() -> Self {
        Self {
            location: true,
            rotation: true,
            scale: true,
        }
    }
}

/// How the fallback UV layer is chosen when the shader graph does not
/// name one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UvLayerMode {
    /// The layer selected in the host UI
    Active,
    /// The layer flagged for rendering
    #[default]
    ActiveForRender,
}

/// Everything configurable about an export.
///
/// A fresh value per call; the exporter never mutates it.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Write format version 1 for legacy consumers instead of 7.
    /// Version 1 has no 32-bit index mode, so large meshes fail.
    pub compatibility: bool,
    /// Transform components to apply per object
    pub transforms: TransformSet,
    /// Store the first object's transform as the animation origin
    pub origin: bool,
    /// Export vertex-group weights as bones
    pub weights: bool,
    /// Reuse one material slot for repeated materials within an object
    pub merge_within: bool,
    /// Reuse material slots across objects
    pub merge_between: bool,
    /// Fallback UV layer selection mode
    pub uv_layer: UvLayerMode,
    /// Render engine filter for locating the material output node
    pub output_target: RenderTarget,
    /// Preferred material output node name
    pub output_node: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            compatibility: false,
            transforms: TransformSet::default(),
            origin: true,
            weights: false,
            merge_within: true,
            merge_between: true,
            uv_layer: UvLayerMode::default(),
            output_target: RenderTarget::All,
            output_node: "Export".into(),
        }
    }
}

/// Errors surfaced by [`Exporter::export`].
#[derive(Debug, Error)]
pub enum ExportError {
    /// The assembled mesh cannot be represented in the chosen format,
    /// e.g. more than 65535 vertices in compatibility mode
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// Filesystem failure while writing
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The final rename of the temporary output file failed
    #[error("failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Assembles scenes and writes `.o3d` files.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    /// Create an exporter with the given options.
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// The options this exporter was built with.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Assemble `objects` into a mesh without writing anything.
    pub fn assemble(&self, objects: &[SceneObject]) -> Mesh {
        Assembler::new(&self.options).assemble(objects)
    }

    /// Assemble `objects`, encode and write the result to `path`.
    ///
    /// Parent directories are created as needed. The file is written to
    /// a temporary sibling and renamed into place, so a failed export
    /// never leaves a partial file behind.
    pub fn export(&self, objects: &[SceneObject], path: &Path) -> Result<(), ExportError> {
        let mesh = self.assemble(objects);
        let version = if self.options.compatibility { 1 } else { 7 };
        let mut spec = FormatSpec::new(version)?;
        let bytes = o3d_mesh::encode(&mesh, &mut spec)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.persist(path)?;

        info!(
            path = %path.display(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            materials = mesh.material_count(),
            bytes = bytes.len(),
            format = %spec,
            "exported mesh"
        );
        Ok(())
    }
}
