//! Error types for fractal construction and configuration

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid depth {depth}: must be between 1 and {max}")]
    InvalidDepth { depth: usize, max: usize },

    #[error("Invalid scale {0}: must be positive and finite")]
    InvalidScale(f32),

    #[error("Invalid placement: {0}")]
    InvalidPlacement(&'static str),

    #[error("Invalid range for {name}: {min}..{max}")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    #[error("Invalid probability for {name}: {value} (expected 0.0..=1.0)")]
    InvalidProbability { name: &'static str, value: f32 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
