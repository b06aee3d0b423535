//! Shared matrix helpers for object and UV transforms.

use glam::{Mat4, Vec3};

/// Basis permutation converting right-handed Z-up coordinates to the
/// game's left-handed Y-up space by swapping the Y and Z axes. Its
/// determinant is -1, which the assembler tracks for winding purposes.
pub const AXIS_SWAP: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
]);

/// Rotation matrix for an XYZ Euler triple (radians): X applied first,
/// then Y, then Z.
pub fn euler_xyz(rotation: Vec3) -> Mat4 {
    Mat4::from_rotation_z(rotation.z)
        * Mat4::from_rotation_y(rotation.y)
        * Mat4::from_rotation_x(rotation.x)
}

/// Invert a matrix, falling back to identity when it is singular (a
/// mapping node with a zero scale component, for example).
pub fn invert_or_identity(matrix: Mat4) -> Mat4 {
    if matrix.determinant().abs() <= f32::EPSILON {
        Mat4::IDENTITY
    } else {
        matrix.inverse()
    }
}
