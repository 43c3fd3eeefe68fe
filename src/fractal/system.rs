//! Owner of the fractal: activation, rebuild, per-frame update, teardown.

use crate::core::Result;
use crate::render::{submit, RenderHandoff};

use super::builder::HierarchyBuilder;
use super::config::FractalConfig;
use super::hierarchy::Hierarchy;
use super::placement::Placement;
use super::scheduler::{FrameScheduler, FrameStats};

/// Main fractal system. Call [`update`](Self::update) each frame.
///
/// A parameter change goes through [`rebuild`](Self::rebuild), which builds a
/// complete new hierarchy before replacing the old one, so a half-built tree
/// is never visible.
pub struct FractalSystem {
    config: FractalConfig,
    hierarchy: Option<Hierarchy>,
    scheduler: FrameScheduler,
}

impl FractalSystem {
    /// Validate `config` and build the hierarchy
    pub fn new(config: FractalConfig) -> Result<Self> {
        let hierarchy = HierarchyBuilder::new(config.clone())?.build();
        log::info!(
            "Fractal activated: depth {}, {} parts (seed {})",
            hierarchy.depth(),
            hierarchy.part_count(),
            hierarchy.seed()
        );
        Ok(Self {
            scheduler: FrameScheduler::new(config.parallel_batch),
            config,
            hierarchy: Some(hierarchy),
        })
    }

    pub fn config(&self) -> &FractalConfig {
        &self.config
    }

    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchy.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.hierarchy.is_some()
    }

    /// Replace the hierarchy with one built from `config`.
    ///
    /// On error the current hierarchy and config are left untouched.
    pub fn rebuild(&mut self, config: FractalConfig) -> Result<()> {
        let hierarchy = HierarchyBuilder::new(config.clone())?.build();
        log::info!(
            "Fractal rebuilt: depth {} -> {}, {} parts",
            self.config.depth,
            hierarchy.depth(),
            hierarchy.part_count()
        );
        self.scheduler = FrameScheduler::new(config.parallel_batch);
        self.hierarchy = Some(hierarchy);
        self.config = config;
        Ok(())
    }

    /// Rebuild from the current config (a new seed if none is configured)
    pub fn activate(&mut self) -> Result<()> {
        if self.is_active() {
            return Ok(());
        }
        self.rebuild(self.config.clone())
    }

    /// Release all level storage. `update` skips frames until reactivated.
    pub fn deactivate(&mut self) {
        if let Some(hierarchy) = self.hierarchy.take() {
            log::debug!("Fractal deactivated, released {} parts", hierarchy.part_count());
        }
    }

    /// Run one frame and hand the result to `handoff`.
    ///
    /// Returns `None` if the system is inactive.
    pub fn update<H: RenderHandoff + ?Sized>(
        &mut self,
        delta_time: f32,
        placement: &Placement,
        handoff: &mut H,
    ) -> Option<FrameStats> {
        let hierarchy = self.hierarchy.as_mut()?;
        let stats = self.scheduler.run_frame(hierarchy, delta_time, placement);
        submit(hierarchy, &stats.bounds, handoff);
        Some(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::render::InstanceBatcher;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = FractalConfig { depth: 0, ..Default::default() };
        assert!(matches!(FractalSystem::new(config), Err(Error::InvalidDepth { .. })));
    }

    #[test]
    fn test_update_feeds_handoff() {
        let mut system = FractalSystem::new(FractalConfig::seeded(1)).unwrap();
        let mut batcher = InstanceBatcher::new();
        let stats = system.update(0.016, &Placement::IDENTITY, &mut batcher).unwrap();

        assert_eq!(stats.frame, 0);
        assert_eq!(stats.part_count, 156);
        assert_eq!(batcher.instances().len(), 156);
        assert_eq!(batcher.bounds(), stats.bounds);
    }

    #[test]
    fn test_rebuild_swaps_depth() {
        let mut system = FractalSystem::new(FractalConfig::seeded(1)).unwrap();
        system.rebuild(FractalConfig { depth: 6, ..FractalConfig::seeded(2) }).unwrap();
        assert_eq!(system.hierarchy().unwrap().depth(), 6);
        assert_eq!(system.config().depth, 6);

        let mut batcher = InstanceBatcher::new();
        let stats = system.update(0.016, &Placement::IDENTITY, &mut batcher).unwrap();
        assert_eq!(stats.frame, 0);
        assert_eq!(batcher.batches().len(), 6);
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_tree() {
        let mut system = FractalSystem::new(FractalConfig::seeded(1)).unwrap();
        let before = system.hierarchy().unwrap().levels()[3].parts().to_vec();

        let bad = FractalConfig { reverse_spin_chance: 2.0, ..FractalConfig::seeded(1) };
        assert!(system.rebuild(bad).is_err());
        assert_eq!(system.config().reverse_spin_chance, 0.25);
        assert_eq!(system.hierarchy().unwrap().levels()[3].parts(), before.as_slice());
    }

    #[test]
    fn test_deactivate_skips_frames() {
        let mut system = FractalSystem::new(FractalConfig::seeded(1)).unwrap();
        system.deactivate();
        assert!(!system.is_active());
        assert!(system.hierarchy().is_none());

        let mut batcher = InstanceBatcher::new();
        assert!(system.update(0.016, &Placement::IDENTITY, &mut batcher).is_none());
        assert_eq!(batcher.frames(), 0);

        system.activate().unwrap();
        assert!(system.is_active());
        assert!(system.update(0.016, &Placement::IDENTITY, &mut batcher).is_some());
        assert_eq!(batcher.frames(), 1);
    }

    #[test]
    fn test_seeded_reactivation_is_identical() {
        let mut system = FractalSystem::new(FractalConfig::seeded(5)).unwrap();
        let first = system.hierarchy().unwrap().levels()[2].parts().to_vec();
        system.deactivate();
        system.activate().unwrap();
        assert_eq!(system.hierarchy().unwrap().levels()[2].parts(), first.as_slice());
    }
}
