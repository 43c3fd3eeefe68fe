//! Builds a fresh hierarchy from parameters

use glam::Vec4;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::Result;

use super::config::FractalConfig;
use super::hierarchy::Hierarchy;
use super::level::LevelStore;
use super::part::{PartState, BRANCHING_FACTOR};

/// Draws every part's fixed random parameters and lays them out level by level.
pub struct HierarchyBuilder {
    config: FractalConfig,
}

impl HierarchyBuilder {
    /// Validate `config` and prepare a builder for it
    pub fn new(config: FractalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Build with the configured seed, or a fresh entropy seed if none is set
    pub fn build(&self) -> Hierarchy {
        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        self.build_seeded(seed)
    }

    /// Build with an explicit seed, ignoring the configured one
    pub fn build_seeded(&self, seed: u64) -> Hierarchy {
        let mut rng = StdRng::seed_from_u64(seed);
        let depth = self.config.depth;

        let mut levels = Vec::with_capacity(depth);
        let mut sequence_numbers = Vec::with_capacity(depth);
        for level in 0..depth {
            let len = LevelStore::expected_len(level);
            let parts: Vec<PartState> = (0..len)
                .map(|index| self.create_part(index % BRANCHING_FACTOR, &mut rng))
                .collect();
            levels.push(LevelStore::new(level, parts));
            sequence_numbers.push(Vec4::new(
                rng.random(),
                rng.random(),
                rng.random(),
                rng.random(),
            ));
        }

        log::debug!(
            "Built fractal hierarchy: depth {}, {} parts, seed {}",
            depth,
            levels.iter().map(LevelStore::len).sum::<usize>(),
            seed
        );
        Hierarchy::from_parts(levels, sequence_numbers, self.config.clone(), seed)
    }

    /// One part for child slot `child_index`. Draw order: sag, spin direction, spin speed.
    fn create_part<R: Rng>(&self, child_index: usize, rng: &mut R) -> PartState {
        let sag = self.config.max_sag_degrees;
        let spin = self.config.spin_speed_degrees;

        let max_sag_angle = rng.random_range(sag.min..=sag.max).to_radians();
        let direction = if rng.random_bool(self.config.reverse_spin_chance as f64) {
            -1.0
        } else {
            1.0
        };
        let spin_velocity = direction * rng.random_range(spin.min..=spin.max).to_radians();

        PartState::new(child_index, spin_velocity, max_sag_angle)
    }
}
