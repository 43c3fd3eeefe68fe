//! The complete leveled tree

use glam::Vec4;

use super::config::FractalConfig;
use super::level::LevelStore;
use super::part::PartState;

/// Render scale of `level` for a root drawn at `root_scale`
#[inline]
pub fn level_scale(root_scale: f32, level: usize) -> f32 {
    root_scale * 0.5f32.powi(level as i32)
}

/// Leveled fractal tree. Depth and per-part parameters are fixed for the
/// lifetime of a value; a parameter change produces a new `Hierarchy`.
#[derive(Clone, Debug)]
pub struct Hierarchy {
    pub(crate) levels: Vec<LevelStore>,
    pub(crate) sequence_numbers: Vec<Vec4>,
    config: FractalConfig,
    seed: u64,
}

impl Hierarchy {
    pub(crate) fn from_parts(
        levels: Vec<LevelStore>,
        sequence_numbers: Vec<Vec4>,
        config: FractalConfig,
        seed: u64,
    ) -> Self {
        debug_assert_eq!(levels.len(), config.depth);
        debug_assert_eq!(sequence_numbers.len(), config.depth);
        Self {
            levels,
            sequence_numbers,
            config,
            seed,
        }
    }

    /// Number of levels including the root
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[LevelStore] {
        &self.levels
    }

    pub fn level(&self, depth: usize) -> Option<&LevelStore> {
        self.levels.get(depth)
    }

    /// The single part at level 0
    pub fn root(&self) -> &PartState {
        &self.levels[0].parts()[0]
    }

    /// Per-level random vector for shader-side color variation
    pub fn sequence_numbers(&self, depth: usize) -> Vec4 {
        self.sequence_numbers.get(depth).copied().unwrap_or(Vec4::ZERO)
    }

    pub fn config(&self) -> &FractalConfig {
        &self.config
    }

    /// Seed the per-part parameters were drawn with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Total parts over all levels
    pub fn part_count(&self) -> usize {
        self.levels.iter().map(LevelStore::len).sum()
    }
}
