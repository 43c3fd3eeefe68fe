//! Per-level transform propagation.
//!
//! Every part is re-derived each frame from its already-updated parent:
//!
//! 1. advance the spin angle,
//! 2. find where the part's up axis would point under the parent frame,
//! 3. tilt the parent frame towards the ground by `max_sag_angle` scaled by
//!    `|up x axis|` (the sine of the deviation from vertical),
//! 4. compose local offset and spin under that tilted frame,
//! 5. place the part `PART_OFFSET * scale` along its own up axis.

use glam::{Quat, Vec3};
use rayon::prelude::*;

use super::level::LevelStore;
use super::matrix::RenderMatrix;
use super::part::{PartState, PART_OFFSET};

/// Parent frame tilted by gravity for a child with `local_rotation`.
///
/// Returns `parent_rotation` unchanged when the child's prospective up axis
/// is parallel to world up (the cross product has zero length).
#[inline]
pub fn sag_base_rotation(parent_rotation: Quat, local_rotation: Quat, max_sag_angle: f32) -> Quat {
    let up_axis = parent_rotation * local_rotation * Vec3::Y;
    let sag_axis = Vec3::Y.cross(up_axis);
    let sag_magnitude = sag_axis.length();
    if sag_magnitude > 0.0 {
        let sag_rotation = Quat::from_axis_angle(sag_axis / sag_magnitude, max_sag_angle * sag_magnitude);
        sag_rotation * parent_rotation
    } else {
        parent_rotation
    }
}

/// Update one child part from its parent. Returns the part's render matrix.
#[inline]
pub fn update_part(part: &mut PartState, parent: &PartState, delta_time: f32, scale: f32) -> RenderMatrix {
    part.advance_spin(delta_time);

    let base_rotation = sag_base_rotation(parent.world_rotation, part.local_rotation, part.max_sag_angle);
    part.world_rotation = base_rotation * part.spun_local_rotation();
    part.world_position = parent.world_position + part.world_rotation * Vec3::new(0.0, PART_OFFSET * scale, 0.0);

    RenderMatrix::from_rotation_scale_translation(part.world_rotation, scale, part.world_position)
}

/// Update the root from the owner's placement instead of a parent part
pub fn update_root(
    root: &mut PartState,
    delta_time: f32,
    world_position: Vec3,
    world_rotation: Quat,
    scale: f32,
) -> RenderMatrix {
    root.advance_spin(delta_time);
    root.world_rotation = world_rotation * root.spun_local_rotation();
    root.world_position = world_position;

    RenderMatrix::from_rotation_scale_translation(root.world_rotation, scale, root.world_position)
}

/// Propagates transforms from a finished parent level into a child level.
///
/// The parent is borrowed shared for the whole call, so it is frozen while
/// the child's parts are updated in parallel; the call returns only after
/// every part of the child level has been written.
pub struct LevelUpdater {
    /// Minimum parts per rayon work item
    min_batch: usize,
}

impl LevelUpdater {
    pub fn new(min_batch: usize) -> Self {
        Self { min_batch: min_batch.max(1) }
    }

    /// Update `child` in parallel. `on_part` runs before each part and is
    /// used to instrument the update.
    pub fn update_level<F>(
        &self,
        parent: &LevelStore,
        child: &mut LevelStore,
        delta_time: f32,
        scale: f32,
        on_part: F,
    ) where
        F: Fn(usize) + Sync,
    {
        debug_assert_eq!(child.depth(), parent.depth() + 1);
        let parents = parent.parts();
        let (parts, matrices) = child.split_mut();

        parts
            .par_iter_mut()
            .zip(matrices.par_iter_mut())
            .enumerate()
            .with_min_len(self.min_batch)
            .for_each(|(index, (part, matrix))| {
                on_part(index);
                let parent = &parents[LevelStore::parent_index(index)];
                *matrix = update_part(part, parent, delta_time, scale);
            });
    }

    /// Sequential reference path, identical results to `update_level`
    pub fn update_level_serial(&self, parent: &LevelStore, child: &mut LevelStore, delta_time: f32, scale: f32) {
        let parents = parent.parts();
        let (parts, matrices) = child.split_mut();
        for (index, (part, matrix)) in parts.iter_mut().zip(matrices.iter_mut()).enumerate() {
            let parent = &parents[LevelStore::parent_index(index)];
            *matrix = update_part(part, parent, delta_time, scale);
        }
    }
}

impl Default for LevelUpdater {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::part::child_rotation;
    use std::f32::consts::FRAC_PI_2;

    fn parent_at(position: Vec3, rotation: Quat) -> PartState {
        let mut parent = PartState::new(0, 0.0, 0.0);
        parent.world_position = position;
        parent.world_rotation = rotation;
        parent
    }

    #[test]
    fn test_degenerate_sag_returns_parent_exactly() {
        let parent_rotation = Quat::IDENTITY;
        let base = sag_base_rotation(parent_rotation, Quat::IDENTITY, 0.5);
        assert_eq!(base, parent_rotation);
    }

    #[test]
    fn test_degenerate_sag_with_yawed_parent() {
        // A pure yaw keeps the up axis exactly vertical
        let parent_rotation = Quat::from_rotation_y(0.7);
        let base = sag_base_rotation(parent_rotation, Quat::IDENTITY, 0.4);
        assert_eq!(base, parent_rotation);
        assert!(!base.is_nan());
    }

    #[test]
    fn test_sag_tilts_sideways_child_downwards() {
        // Child pointing along +X droops towards -Y
        let local = child_rotation(1);
        let base = sag_base_rotation(Quat::IDENTITY, local, 0.3);
        let up = base * local * Vec3::Y;
        assert!(up.y < 0.0);
        assert!((up.y - (-0.3f32).sin()).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sag_angle_scales_with_sine_of_deviation() {
        // Parent tilted 30 degrees: child up deviates by sin(30) = 0.5
        let parent_rotation = Quat::from_rotation_z(-std::f32::consts::FRAC_PI_6);
        let base = sag_base_rotation(parent_rotation, Quat::IDENTITY, 0.2);
        let applied = (base * parent_rotation.inverse()).to_axis_angle().1;
        assert!((applied - 0.1).abs() < 1e-5, "applied {applied}");
    }

    #[test]
    fn test_zero_max_sag_has_no_effect() {
        let parent_rotation = Quat::from_rotation_x(0.9) * Quat::from_rotation_y(0.3);
        let mut part = PartState::new(3, 1.5, 0.0);
        part.spin_angle = 0.4;
        let parent = parent_at(Vec3::new(1.0, 2.0, 3.0), parent_rotation);

        update_part(&mut part, &parent, 0.1, 0.5);

        let expected = parent_rotation * (part.local_rotation * Quat::from_rotation_y(part.spin_angle));
        assert!(part.world_rotation.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_child_offset_along_own_up() {
        let parent = parent_at(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_z(0.25));
        for slot in 0..5 {
            let mut part = PartState::new(slot, 0.8, 0.35);
            let matrix = update_part(&mut part, &parent, 0.016, 0.25);
            let offset = part.world_position - parent.world_position;
            assert!((offset.length() - PART_OFFSET * 0.25).abs() < 1e-5);
            assert!(offset.normalize().abs_diff_eq(part.world_up(), 1e-5));
            assert_eq!(matrix.translation(), part.world_position);
        }
    }

    #[test]
    fn test_render_matrix_basis_is_scaled_rotation() {
        let parent = parent_at(Vec3::ZERO, Quat::IDENTITY);
        let mut part = PartState::new(2, 1.0, 0.2);
        let matrix = update_part(&mut part, &parent, 0.5, 0.125);
        let basis = matrix.basis();
        assert!((basis.y_axis.length() - 0.125).abs() < 1e-6);
        assert!((basis.y_axis / 0.125).abs_diff_eq(part.world_up(), 1e-5));
    }

    #[test]
    fn test_root_follows_placement() {
        let mut root = PartState::new(0, FRAC_PI_2, 0.3);
        let rotation = Quat::from_rotation_x(0.5);
        let matrix = update_root(&mut root, 1.0, Vec3::new(4.0, 5.0, 6.0), rotation, 2.0);

        assert_eq!(root.world_position, Vec3::new(4.0, 5.0, 6.0));
        let expected = rotation * Quat::from_rotation_y(FRAC_PI_2);
        assert!(root.world_rotation.abs_diff_eq(expected, 1e-6));
        assert!((matrix.basis().x_axis.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_parallel_matches_serial() {
        use crate::fractal::{FractalConfig, HierarchyBuilder};

        let config = FractalConfig { depth: 3, ..FractalConfig::seeded(21) };
        let mut a = HierarchyBuilder::new(config).unwrap().build();
        let mut b = a.clone();
        let updater = LevelUpdater::new(2);

        for levels in [&mut a.levels, &mut b.levels] {
            let (parts, matrices) = levels[0].split_mut();
            matrices[0] = update_root(&mut parts[0], 0.1, Vec3::ZERO, Quat::IDENTITY, 1.0);
        }
        for d in 1..3 {
            let (head, tail) = a.levels.split_at_mut(d);
            updater.update_level(&head[d - 1], &mut tail[0], 0.1, 0.5f32.powi(d as i32), |_| {});
            let (head, tail) = b.levels.split_at_mut(d);
            updater.update_level_serial(&head[d - 1], &mut tail[0], 0.1, 0.5f32.powi(d as i32));
        }
        for (la, lb) in a.levels().iter().zip(b.levels()) {
            assert_eq!(la.parts(), lb.parts());
            assert_eq!(la.matrices(), lb.matrices());
        }
    }
}
