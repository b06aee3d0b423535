//! o3d-mesh
//!
//! Data model and binary encoder for the OMSI mesh (`.o3d`) file format.
//!
//! The format is a little-endian, section-marked binary layout with six
//! known versions. Version capabilities (index width, equality bit,
//! encryption slot) are described by [`FormatSpec`]; the in-memory
//! representation is [`Mesh`]; [`encode`] turns a mesh into the exact
//! on-disk byte sequence.
//!
//! # Example
//!
//! ```
//! use o3d_mesh::{encode, FormatSpec, Mesh};
//!
//! let mesh = Mesh::new();
//! let mut spec = FormatSpec::new(7)?;
//! let bytes = encode(&mesh, &mut spec)?;
//! assert_eq!(&bytes[..2], &[0x84, 0x19]);
//! # Ok::<(), o3d_mesh::MeshError>(())
//! ```

pub mod encode;
pub mod error;
pub mod format;
pub mod model;

pub use encode::encode;
pub use error::{MeshError, Result};
pub use format::{FormatSpec, KNOWN_VERSIONS, NO_ENCRYPTION};
pub use model::{Bone, Material, Matrix4, Mesh, SkinWeight, Triangle, Vertex};
