//! One simulation frame over the whole hierarchy.
//!
//! The root is updated directly from the owner's placement. Levels
//! `1..depth` then run strictly in order: level `d` borrows level `d - 1`
//! shared and itself exclusively (`split_at_mut`), and its parallel update
//! joins before the loop moves on, so a child level never observes a parent
//! level that is still being written.

use std::time::{Duration, Instant};

use crate::math::Aabb;

use super::hierarchy::Hierarchy;
use super::placement::Placement;
use super::updater::{update_root, LevelUpdater};

/// Edge length of the culling cube relative to the root scale
pub const BOUNDS_SCALE: f32 = 3.0;

/// Observes a frame while it runs. Both hooks are called from worker
/// threads, so implementations must be `Sync`.
pub trait UpdateObserver: Sync {
    /// Called before part `index` of `level` is updated (not called for the root)
    fn before_part(&self, _level: usize, _index: usize) {}

    /// Called once `level` has been fully written
    fn level_finished(&self, _level: usize, _elapsed: Duration) {}
}

/// Observer that does nothing
pub struct NoObserver;

impl UpdateObserver for NoObserver {}

/// Summary of one finished frame
#[derive(Clone, Debug, PartialEq)]
pub struct FrameStats {
    /// Frame index since the scheduler was created
    pub frame: u64,
    /// Wall time spent per level, root first
    pub level_times: Vec<Duration>,
    /// Parts updated this frame
    pub part_count: usize,
    /// Conservative world bounds of the whole fractal
    pub bounds: Aabb,
}

impl FrameStats {
    pub fn total_time(&self) -> Duration {
        self.level_times.iter().sum()
    }
}

/// Drives the root and the per-level updater for each frame
pub struct FrameScheduler {
    updater: LevelUpdater,
    frame: u64,
}

impl FrameScheduler {
    pub fn new(parallel_batch: usize) -> Self {
        Self {
            updater: LevelUpdater::new(parallel_batch),
            frame: 0,
        }
    }

    /// Number of frames run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Update every level for one frame
    pub fn run_frame(&mut self, hierarchy: &mut Hierarchy, delta_time: f32, placement: &Placement) -> FrameStats {
        self.run_frame_observed(hierarchy, delta_time, placement, &NoObserver)
    }

    /// Update every level for one frame, reporting progress to `observer`
    pub fn run_frame_observed<O: UpdateObserver>(
        &mut self,
        hierarchy: &mut Hierarchy,
        delta_time: f32,
        placement: &Placement,
        observer: &O,
    ) -> FrameStats {
        let delta_time = sanitize_delta(delta_time);
        let depth = hierarchy.depth();
        let mut level_times = Vec::with_capacity(depth);

        let start = Instant::now();
        {
            let (parts, matrices) = hierarchy.levels[0].split_mut();
            matrices[0] = update_root(
                &mut parts[0],
                delta_time,
                placement.position(),
                placement.rotation(),
                placement.scale(),
            );
        }
        let elapsed = start.elapsed();
        observer.level_finished(0, elapsed);
        level_times.push(elapsed);

        let mut scale = placement.scale();
        for level in 1..depth {
            scale *= 0.5;
            let start = Instant::now();

            let (finished, pending) = hierarchy.levels.split_at_mut(level);
            self.updater.update_level(
                &finished[level - 1],
                &mut pending[0],
                delta_time,
                scale,
                |index| observer.before_part(level, index),
            );

            let elapsed = start.elapsed();
            log::trace!(
                "Level {} ({} parts) updated in {:.3}ms",
                level,
                pending[0].len(),
                elapsed.as_secs_f64() * 1000.0
            );
            observer.level_finished(level, elapsed);
            level_times.push(elapsed);
        }

        let stats = FrameStats {
            frame: self.frame,
            level_times,
            part_count: hierarchy.part_count(),
            bounds: Aabb::cube(placement.position(), BOUNDS_SCALE * placement.scale()),
        };
        self.frame += 1;
        stats
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Negative or non-finite frame times become zero
fn sanitize_delta(delta_time: f32) -> f32 {
    if delta_time.is_finite() && delta_time >= 0.0 {
        delta_time
    } else {
        log::warn!("Ignoring invalid frame delta {delta_time}, using 0");
        0.0
    }
}
