//! Binary encoder for the mesh file format.
//!
//! Everything on the wire is little-endian. The file is a sequence of
//! sections, each introduced by a one-byte marker; optional sections
//! (matrix, bones) are simply absent when the mesh has no data for
//! them. Strings are length-prefixed Windows-1252.

use crate::error::{MeshError, Result};
use crate::format::{FormatSpec, NO_ENCRYPTION};
use crate::model::Mesh;

/// Every mesh file starts with these two bytes.
pub const MAGIC: [u8; 2] = [0x84, 0x19];

const SECTION_VERTICES: u8 = 0x17;
const SECTION_TRIANGLES: u8 = 0x49;
const SECTION_MATERIALS: u8 = 0x26;
const SECTION_MATRIX: u8 = 0x79;
const SECTION_BONES: u8 = 0x54;

/// Encode a [`Mesh`] into the binary layout described by `spec`.
///
/// If the mesh has more than 65535 vertices or triangles, long indexes
/// are forced on in `spec` before any byte is produced; this fails with
/// [`MeshError::LongIndexesUnsupported`] when the version cannot store
/// them. If the spec provides an encryption key it is written to the
/// file, but no encryption is ever performed on the content.
pub fn encode(mesh: &Mesh, spec: &mut FormatSpec) -> Result<Vec<u8>> {
    // Enforce extended addressing when the data needs it. Checked up
    // front so a failing encode produces no bytes at all.
    if mesh.requires_long_indexes() && !spec.long_indexes() {
        spec.set_long_indexes(true)?;
    }
    let long = spec.long_indexes();

    let mut buf = Vec::with_capacity(estimated_size(mesh));

    buf.extend_from_slice(&MAGIC);
    buf.push(spec.version());

    // Extended addressing and equality bit share one byte.
    if spec.supports_long_indexes() || spec.supports_equality_bit() {
        buf.push(u8::from(long) + u8::from(spec.equality_bit()) * 2);
    }

    if spec.supports_encryption() {
        let key = spec.encryption_key().unwrap_or(NO_ENCRYPTION);
        buf.extend_from_slice(&key.to_le_bytes());
    }

    buf.push(SECTION_VERTICES);
    put_count(&mut buf, long, mesh.vertices.len());
    for vertex in &mesh.vertices {
        for value in vertex
            .position
            .iter()
            .chain(&vertex.normal)
            .chain(&vertex.uv)
        {
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }

    buf.push(SECTION_TRIANGLES);
    put_count(&mut buf, long, mesh.triangles.len());
    for triangle in &mesh.triangles {
        for &index in &triangle.vertices {
            put_index(&mut buf, long, index);
        }
        buf.extend_from_slice(&triangle.material.to_le_bytes());
    }

    buf.push(SECTION_MATERIALS);
    buf.extend_from_slice(&(mesh.materials.len() as u16).to_le_bytes());
    for material in &mesh.materials {
        for value in material
            .diffuse
            .iter()
            .chain(&material.specular)
            .chain(&material.emissive)
            .chain(std::iter::once(&material.power))
        {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        put_string(&mut buf, &material.texture);
    }

    if let Some(matrix) = &mesh.matrix {
        buf.push(SECTION_MATRIX);
        for row in matrix {
            for value in row {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
    }

    // An explicitly requested but empty bones list is still written.
    if let Some(bones) = &mesh.bones {
        buf.push(SECTION_BONES);
        buf.extend_from_slice(&(bones.len() as u16).to_le_bytes());
        for bone in bones {
            put_string(&mut buf, &bone.name);
            buf.extend_from_slice(&(bone.weights.len() as u16).to_le_bytes());
            for weight in &bone.weights {
                put_index(&mut buf, long, weight.vertex);
                buf.extend_from_slice(&weight.weight.to_le_bytes());
            }
        }
    }

    Ok(buf)
}

fn estimated_size(mesh: &Mesh) -> usize {
    16 + mesh.vertices.len() * 32 + mesh.triangles.len() * 14 + mesh.materials.len() * 64
}

/// Vertex and triangle counts share the index width.
fn put_count(buf: &mut Vec<u8>, long: bool, count: usize) {
    put_index(buf, long, count as u32);
}

fn put_index(buf: &mut Vec<u8>, long: bool, index: u32) {
    if long {
        buf.extend_from_slice(&index.to_le_bytes());
    } else {
        buf.extend_from_slice(&(index as u16).to_le_bytes());
    }
}

/// Write a length-prefixed Windows-1252 string. Unmappable characters
/// become `?`; the content is capped at 255 bytes to fit the prefix.
fn put_string(buf: &mut Vec<u8>, text: &str) {
    let mut bytes: Vec<u8> = text.chars().map(cp1252_byte).collect();
    bytes.truncate(u8::MAX as usize);
    buf.push(bytes.len() as u8);
    buf.extend_from_slice(&bytes);
}

fn cp1252_byte(c: char) -> u8 {
    match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
        _ => b'?',
    }
}
