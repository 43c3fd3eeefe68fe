//! Hand-off of finished per-level render matrices to an instanced renderer.
//!
//! The fractal core never talks to a GPU. After a frame it walks its levels
//! and calls a [`RenderHandoff`] once per level; [`InstanceBatcher`] is the
//! CPU-side implementation that packs everything into upload-ready buffers.

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::fractal::{Hierarchy, RenderMatrix};
use crate::math::Aabb;

use super::palette::{LevelStyle, MeshKind};

/// Everything needed to issue one instanced draw for a level
#[derive(Clone, Copy, Debug)]
pub struct LevelDraw<'a> {
    pub level: usize,
    pub instance_count: usize,
    pub matrices: &'a [RenderMatrix],
    pub style: LevelStyle,
    pub sequence_numbers: Vec4,
}

/// Consumer of finished frames
pub trait RenderHandoff {
    /// Called before the first level with the frame's culling bounds
    fn begin_frame(&mut self, _bounds: &Aabb) {}

    /// Called once per level, root first
    fn draw_level(&mut self, draw: &LevelDraw<'_>);

    /// Called after the last level
    fn end_frame(&mut self) {}
}

/// Hand every level of `hierarchy` to `handoff`
pub fn submit<H: RenderHandoff + ?Sized>(hierarchy: &Hierarchy, bounds: &Aabb, handoff: &mut H) {
    let depth = hierarchy.depth();
    let palette = &hierarchy.config().palette;

    handoff.begin_frame(bounds);
    for (level, store) in hierarchy.levels().iter().enumerate() {
        handoff.draw_level(&LevelDraw {
            level,
            instance_count: store.len(),
            matrices: store.matrices(),
            style: palette.level_style(level, depth),
            sequence_numbers: hierarchy.sequence_numbers(level),
        });
    }
    handoff.end_frame();
}

/// Per-level draw parameters for the GPU (must match shader struct exactly)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuLevelParams {
    /// First color (16 bytes, offset 0)
    pub color_a: [f32; 4],
    /// Second color (16 bytes, offset 16)
    pub color_b: [f32; 4],
    /// Per-level random numbers (16 bytes, offset 32)
    pub sequence_numbers: [f32; 4],
    /// First instance in the shared matrix buffer (offset 48)
    pub instance_offset: u32,
    /// Number of instances (offset 52)
    pub instance_count: u32,
    /// 0 = branch mesh, 1 = leaf mesh (offset 56)
    pub mesh: u32,
    /// Padding to 64 bytes
    pub _pad: u32,
}

/// One level's slice of the packed instance buffer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelBatch {
    pub level: usize,
    pub offset: usize,
    pub count: usize,
    pub style: LevelStyle,
    pub sequence_numbers: Vec4,
}

impl LevelBatch {
    pub fn gpu_params(&self) -> GpuLevelParams {
        GpuLevelParams {
            color_a: self.style.color_a,
            color_b: self.style.color_b,
            sequence_numbers: self.sequence_numbers.to_array(),
            instance_offset: self.offset as u32,
            instance_count: self.count as u32,
            mesh: match self.style.mesh {
                MeshKind::Branch => 0,
                MeshKind::Leaf => 1,
            },
            _pad: 0,
        }
    }
}

/// Packs every level's matrices into one contiguous buffer per frame.
///
/// Storage is reused between frames; the buffer only grows when the tree does.
#[derive(Default)]
pub struct InstanceBatcher {
    instances: Vec<RenderMatrix>,
    batches: Vec<LevelBatch>,
    bounds: Aabb,
    frames: u64,
}

impl InstanceBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All matrices of the last frame, root level first
    pub fn instances(&self) -> &[RenderMatrix] {
        &self.instances
    }

    /// Byte view of the instance buffer for upload
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn batches(&self) -> &[LevelBatch] {
        &self.batches
    }

    /// Matrices of one level
    pub fn level_instances(&self, level: usize) -> Option<&[RenderMatrix]> {
        let batch = self.batches.get(level)?;
        self.instances.get(batch.offset..batch.offset + batch.count)
    }

    /// GPU parameter block per level
    pub fn level_params(&self) -> Vec<GpuLevelParams> {
        self.batches.iter().map(LevelBatch::gpu_params).collect()
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Frames received so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderHandoff for InstanceBatcher {
    fn begin_frame(&mut self, bounds: &Aabb) {
        self.instances.clear();
        self.batches.clear();
        self.bounds = *bounds;
    }

    fn draw_level(&mut self, draw: &LevelDraw<'_>) {
        self.batches.push(LevelBatch {
            level: draw.level,
            offset: self.instances.len(),
            count: draw.instance_count,
            style: draw.style,
            sequence_numbers: draw.sequence_numbers,
        });
        self.instances.extend_from_slice(draw.matrices);
    }

    fn end_frame(&mut self) {
        self.frames += 1;
        log::trace!(
            "Batched {} instances in {} levels",
            self.instances.len(),
            self.batches.len()
        );
    }
}
