//! Render hand-off: level styling and instance packing

pub mod handoff;
pub mod palette;

pub use handoff::{submit, GpuLevelParams, InstanceBatcher, LevelBatch, LevelDraw, RenderHandoff};
pub use palette::{Gradient, LevelStyle, MeshKind, Palette, Rgba};
