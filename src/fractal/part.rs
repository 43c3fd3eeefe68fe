//! Per-node state of the fractal hierarchy

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Quat, Vec3};

/// Fixed fan-out from each part to its children
pub const BRANCHING_FACTOR: usize = 5;

/// Distance from a part to its parent, in units of the child level's scale
pub const PART_OFFSET: f32 = 1.5;

/// Canonical child directions, indexed by `i % BRANCHING_FACTOR`
pub const CHILD_DIRECTIONS: [Vec3; BRANCHING_FACTOR] = [
    Vec3::Y,
    Vec3::X,
    Vec3::NEG_X,
    Vec3::Z,
    Vec3::NEG_Z,
];

/// Local rotation that turns the reference up axis into `CHILD_DIRECTIONS[index]`
pub fn child_rotation(index: usize) -> Quat {
    match index % BRANCHING_FACTOR {
        0 => Quat::IDENTITY,
        1 => Quat::from_rotation_z(-FRAC_PI_2),
        2 => Quat::from_rotation_z(FRAC_PI_2),
        3 => Quat::from_rotation_x(FRAC_PI_2),
        _ => Quat::from_rotation_x(-FRAC_PI_2),
    }
}

/// State of one node in the hierarchy.
///
/// `local_rotation`, `spin_velocity` and `max_sag_angle` are drawn once at
/// build time. Only `spin_angle`, `world_position` and `world_rotation`
/// change per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartState {
    pub world_position: Vec3,
    pub local_rotation: Quat,
    pub world_rotation: Quat,
    /// Accumulated spin about the local up axis (radians, kept in [0, TAU))
    pub spin_angle: f32,
    /// Signed spin rate (radians/second)
    pub spin_velocity: f32,
    /// Upper bound on the gravity tilt (radians)
    pub max_sag_angle: f32,
}

impl PartState {
    /// Create a part for child slot `child_index` with its fixed random parameters
    pub fn new(child_index: usize, spin_velocity: f32, max_sag_angle: f32) -> Self {
        Self {
            world_position: Vec3::ZERO,
            local_rotation: child_rotation(child_index),
            world_rotation: Quat::IDENTITY,
            spin_angle: 0.0,
            spin_velocity,
            max_sag_angle,
        }
    }

    /// Advance the spin by `delta_time` seconds
    #[inline]
    pub fn advance_spin(&mut self, delta_time: f32) {
        let angle = (self.spin_angle + delta_time * self.spin_velocity).rem_euclid(TAU);
        // rem_euclid rounds tiny negative sums up to exactly TAU
        self.spin_angle = if angle >= TAU { 0.0 } else { angle };
    }

    /// Local offset followed by the accumulated spin about the local up axis
    #[inline]
    pub fn spun_local_rotation(&self) -> Quat {
        self.local_rotation * Quat::from_rotation_y(self.spin_angle)
    }

    /// World-space up axis of this part
    #[inline]
    pub fn world_up(&self) -> Vec3 {
        self.world_rotation * Vec3::Y
    }
}
