//! World placement of the object that owns the fractal

use glam::{Quat, Vec3};

use crate::core::{Error, Result};

/// Root world transform supplied by the owner each frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    position: Vec3,
    rotation: Quat,
    scale: f32,
}

impl Placement {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    /// Create a placement; `scale` must be positive and finite, `position`
    /// finite and `rotation` finite with non-zero length. `rotation` is normalized.
    pub fn new(position: Vec3, rotation: Quat, scale: f32) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::InvalidScale(scale));
        }
        if !position.is_finite() {
            return Err(Error::InvalidPlacement("position must be finite"));
        }
        let length = rotation.length();
        if !(rotation.is_finite() && length.is_finite() && length > 0.0) {
            return Err(Error::InvalidPlacement("rotation must be finite with non-zero length"));
        }
        Ok(Self {
            position,
            rotation: rotation.normalize(),
            scale,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Uniform world scale of the root
    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}
