//! Error types for mesh format configuration and encoding.

use thiserror::Error;

/// Errors raised by [`FormatSpec`](crate::FormatSpec) construction and
/// by [`encode`](crate::encode).
///
/// All variants except [`MeshError::LongIndexesUnsupported`] are
/// configuration errors that can only occur when building a format
/// descriptor. The long-index variant is also data-dependent: encoding
/// forces long indexes on when a mesh exceeds 65535 vertices or
/// triangles, which fails on versions without extended addressing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// The requested version is not one of the known format versions.
    #[error("mesh version {0} is unknown")]
    UnknownVersion(u8),

    /// Long (32-bit) indexes requested or required on a version that
    /// only supports short (16-bit) indexes.
    #[error("long indexes unsupported in version {0}")]
    LongIndexesUnsupported(u8),

    /// The equality bit was requested on a version without it.
    #[error("equality bit unsupported in version {0}")]
    EqualityBitUnsupported(u8),

    /// An encryption key was given for a version without a key slot.
    #[error("encryption unsupported in version {0}")]
    EncryptionUnsupported(u8),
}

/// Result type using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;
