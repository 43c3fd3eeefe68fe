//! Procedurally animated five-way fractal.
//!
//! The tree is stored as one flat [`LevelStore`] per depth. Each frame the
//! [`FrameScheduler`] updates the root from the owner's [`Placement`], then
//! runs the [`LevelUpdater`] over levels `1..depth` in order, each level in
//! parallel. [`FractalSystem`] ties building, updating and render hand-off
//! together.

pub mod builder;
pub mod config;
pub mod hierarchy;
pub mod level;
pub mod matrix;
pub mod part;
pub mod placement;
pub mod scheduler;
pub mod system;
pub mod updater;

pub use builder::HierarchyBuilder;
pub use config::{FractalConfig, ParamRange, MAX_DEPTH};
pub use hierarchy::{level_scale, Hierarchy};
pub use level::LevelStore;
pub use matrix::RenderMatrix;
pub use part::{PartState, BRANCHING_FACTOR};
pub use placement::Placement;
pub use scheduler::{FrameScheduler, FrameStats, NoObserver, UpdateObserver};
pub use system::FractalSystem;
pub use updater::LevelUpdater;
