//! Fractal Sag - procedurally animated fractal hierarchy with gravity sag

pub mod core;
pub mod math;
pub mod fractal;
pub mod render;

pub use fractal::{FractalConfig, FractalSystem, Placement};
