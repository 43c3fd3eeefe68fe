//! Fractal construction parameters

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::render::Palette;

/// Deepest tree accepted (5^7 = 78125 leaves)
pub const MAX_DEPTH: usize = 8;

/// Inclusive `min..=max` range a per-part value is drawn from
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn validate(&self, name: &'static str, lower: f32, upper: f32) -> Result<()> {
        let ok = self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && self.min >= lower
            && self.max <= upper;
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidRange { name, min: self.min, max: self.max })
        }
    }
}

/// Parameters the hierarchy is built from. Changing any of them requires a
/// full rebuild.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalConfig {
    /// Number of levels including the root
    pub depth: usize,
    /// Seed for per-part variation; `None` draws a fresh seed per build
    pub seed: Option<u64>,
    /// Spin speed magnitude in degrees per second
    pub spin_speed_degrees: ParamRange,
    /// Chance that a part spins the other way
    pub reverse_spin_chance: f32,
    /// Maximum gravity tilt in degrees
    pub max_sag_degrees: ParamRange,
    /// Minimum parts per parallel work item
    pub parallel_batch: usize,
    /// Level colors
    pub palette: Palette,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            seed: None,
            spin_speed_degrees: ParamRange::new(20.0, 25.0),
            reverse_spin_chance: 0.25,
            max_sag_degrees: ParamRange::new(15.0, 25.0),
            parallel_batch: 5,
            palette: Palette::default(),
        }
    }
}

impl FractalConfig {
    /// Default config with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Check every parameter, failing on the first invalid one
    pub fn validate(&self) -> Result<()> {
        if self.depth < 1 || self.depth > MAX_DEPTH {
            return Err(Error::InvalidDepth { depth: self.depth, max: MAX_DEPTH });
        }
        self.spin_speed_degrees.validate("spin_speed_degrees", 0.0, f32::MAX)?;
        self.max_sag_degrees.validate("max_sag_degrees", 0.0, 90.0)?;
        if !(0.0..=1.0).contains(&self.reverse_spin_chance) {
            return Err(Error::InvalidProbability {
                name: "reverse_spin_chance",
                value: self.reverse_spin_chance,
            });
        }
        if self.parallel_batch == 0 {
            return Err(Error::Config("parallel_batch must be at least 1".to_string()));
        }
        if self.palette.gradient_a.is_empty() || self.palette.gradient_b.is_empty() {
            return Err(Error::Config("palette gradients need at least one key".to_string()));
        }
        if !self.palette.gradient_a.is_finite() || !self.palette.gradient_b.is_finite() {
            return Err(Error::Config("palette gradient keys must be finite".to_string()));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded fractal config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Total part count over all levels
    pub fn part_count(&self) -> usize {
        (0..self.depth).map(super::LevelStore::expected_len).sum()
    }
}
