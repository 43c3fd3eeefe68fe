//! 3x4 render transforms handed to instanced drawing

use bytemuck::{Pod, Zeroable};
use glam::{Affine3A, Mat3, Quat, Vec3};

/// Column-major 3x4 affine transform (must match the instance buffer layout)
///
/// `c0..c2` are the world basis vectors scaled by the level scale, `c3` is the
/// world position. 48 bytes, no padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RenderMatrix {
    pub c0: [f32; 3],
    pub c1: [f32; 3],
    pub c2: [f32; 3],
    pub c3: [f32; 3],
}

impl RenderMatrix {
    pub const IDENTITY: Self = Self {
        c0: [1.0, 0.0, 0.0],
        c1: [0.0, 1.0, 0.0],
        c2: [0.0, 0.0, 1.0],
        c3: [0.0, 0.0, 0.0],
    };

    /// Build from a world rotation, uniform scale and world position
    #[inline]
    pub fn from_rotation_scale_translation(rotation: Quat, scale: f32, translation: Vec3) -> Self {
        let basis = Mat3::from_quat(rotation) * scale;
        Self {
            c0: basis.x_axis.to_array(),
            c1: basis.y_axis.to_array(),
            c2: basis.z_axis.to_array(),
            c3: translation.to_array(),
        }
    }

    /// Translation column
    pub fn translation(&self) -> Vec3 {
        Vec3::from_array(self.c3)
    }

    /// Scaled basis block
    pub fn basis(&self) -> Mat3 {
        Mat3::from_cols(
            Vec3::from_array(self.c0),
            Vec3::from_array(self.c1),
            Vec3::from_array(self.c2),
        )
    }

    /// Convert to a glam affine transform
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_mat3_translation(self.basis(), self.translation())
    }
}
