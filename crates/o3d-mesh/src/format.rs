//! Mesh file format descriptor.
//!
//! A [`FormatSpec`] describes the target file format separately from the
//! mesh data: the version byte, index width, equality bit and encryption
//! key slot. Construction validates every option against the version's
//! capabilities, so an instance always describes a writable format.

use std::fmt;

use crate::error::{MeshError, Result};

/// Versions of the mesh format this crate can write.
pub const KNOWN_VERSIONS: [u8; 6] = [1, 3, 4, 5, 6, 7];

/// Sentinel key written to the encryption slot when the version has one
/// but no encryption is requested.
pub const NO_ENCRYPTION: u32 = 0xFFFF_FFFF;

/// Describes the format of a mesh file, separate from the mesh data.
///
/// Immutable after construction, with one exception: the encoder flips
/// [`long indexes`](FormatSpec::long_indexes) on when the mesh being
/// written needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    version: u8,
    long_indexes: bool,
    equality_bit: bool,
    encryption_key: Option<u32>,
}

impl FormatSpec {
    /// Create a descriptor for `version` with default options: short
    /// indexes, no equality bit, no encryption.
    ///
    /// Fails with [`MeshError::UnknownVersion`] for versions outside
    /// [`KNOWN_VERSIONS`].
    pub fn new(version: u8) -> Result<Self> {
        Self::with_options(version, false, false, None)
    }

    /// Create a descriptor with explicit options.
    ///
    /// Fails if `version` is unknown, if `long_indexes` or
    /// `equality_bit` is requested on version 1, or if a key is given
    /// for a version without an encryption slot (1 and 3).
    pub fn with_options(
        version: u8,
        long_indexes: bool,
        equality_bit: bool,
        encryption_key: Option<u32>,
    ) -> Result<Self> {
        if !KNOWN_VERSIONS.contains(&version) {
            return Err(MeshError::UnknownVersion(version));
        }
        let mut spec = Self {
            version,
            long_indexes: false,
            equality_bit: false,
            encryption_key: None,
        };
        spec.set_long_indexes(long_indexes)?;
        spec.set_equality_bit(equality_bit)?;
        spec.set_encryption_key(encryption_key)?;
        Ok(spec)
    }

    /// Mesh version number (1 for OMSI 1, 7 for OMSI 2).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Whether this version supports 32-bit vertex/triangle indexes.
    pub fn supports_long_indexes(&self) -> bool {
        self.version != 1
    }

    /// Whether this version supports the equality bit. Its consuming
    /// engine semantics are opaque; the bit is stored, never interpreted.
    pub fn supports_equality_bit(&self) -> bool {
        self.version != 1
    }

    /// Whether this version has an encryption key slot.
    pub fn supports_encryption(&self) -> bool {
        self.version >= 4
    }

    /// Whether the file will carry a real encryption key. The sentinel
    /// value counts as unencrypted.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.encryption_key, Some(key) if key != NO_ENCRYPTION)
    }

    /// Extended addressing state for this file.
    pub fn long_indexes(&self) -> bool {
        self.long_indexes
    }

    /// Enable or disable extended addressing.
    pub fn set_long_indexes(&mut self, value: bool) -> Result<()> {
        if value && !self.supports_long_indexes() {
            return Err(MeshError::LongIndexesUnsupported(self.version));
        }
        self.long_indexes = value;
        Ok(())
    }

    /// Equality bit state for this file.
    pub fn equality_bit(&self) -> bool {
        self.equality_bit
    }

    /// Enable or disable the equality bit.
    pub fn set_equality_bit(&mut self, value: bool) -> Result<()> {
        if value && !self.supports_equality_bit() {
            return Err(MeshError::EqualityBitUnsupported(self.version));
        }
        self.equality_bit = value;
        Ok(())
    }

    /// Encryption key for this file. `None` when the version has no key
    /// slot; the sentinel [`NO_ENCRYPTION`] when the slot is unused.
    pub fn encryption_key(&self) -> Option<u32> {
        self.encryption_key
    }

    /// Set or clear the encryption key.
    ///
    /// On versions with a key slot, `None` is normalized to the
    /// [`NO_ENCRYPTION`] sentinel. On versions without one, any explicit
    /// key is rejected.
    pub fn set_encryption_key(&mut self, key: Option<u32>) -> Result<()> {
        if self.supports_encryption() {
            self.encryption_key = Some(key.unwrap_or(NO_ENCRYPTION));
        } else {
            if key.is_some() {
                return Err(MeshError::EncryptionUnsupported(self.version));
            }
            self.encryption_key = None;
        }
        Ok(())
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version:   {}\n\
             indexes:   {}\n\
             equality:  {}\n\
             encrypted: {}",
            self.version,
            if self.long_indexes { "long" } else { "short" },
            self.equality_bit,
            if self.is_encrypted() { "yes" } else { "no" },
        )
    }
}
