//! Scene composition.
//!
//! A [`Scene`] owns every animated group plus the single [`ModeSwitch`] they
//! all read. The host drives it with one [`Scene::update`] per frame; the
//! renderer then reads the foliage uniform and drains the dirty instance
//! buffers.

use crate::config::{OrnamentConfig, SceneConfig};
use crate::error::ConfigError;
use crate::foliage::{Foliage, MorphUniform};
use crate::instance::InstanceBuffer;
use crate::mode::{Mode, ModeSwitch};
use crate::ornaments::OrnamentGroup;
use crate::spawn::{system_random, RandomSource};
use crate::star::{Star, StarParts};
use crate::time::FrameTime;
use crate::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// One CPU-morphed group and the instance buffer only it writes.
#[derive(Debug, Clone)]
pub struct OrnamentLayer {
    pub group: OrnamentGroup,
    pub instances: InstanceBuffer,
}

impl OrnamentLayer {
    fn new<R: RandomSource + ?Sized>(config: OrnamentConfig, rng: &mut R) -> Self {
        let group = OrnamentGroup::new(config, rng);
        let instances = InstanceBuffer::new(group.count());
        Self { group, instances }
    }
}

/// All animated groups of the tree.
pub struct Scene {
    config: SceneConfig,
    mode: ModeSwitch,
    foliage: Foliage,
    layers: Vec<OrnamentLayer>,
    star: Star,
    star_parts: StarParts,
    uniform: MorphUniform,
    /// Mode seen by the previous update, for logging transitions.
    observed: Option<Mode>,
}

impl Scene {
    /// Build a scene, seeding from `config.seed` or OS entropy.
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => system_random(),
        };
        Self::with_rng(config, &mut rng)
    }

    /// Build a scene drawing every position from `rng`.
    ///
    /// Groups draw in a fixed order (foliage, ornaments in config order) so
    /// a deterministic source gives a reproducible scene.
    pub fn with_rng<R: RandomSource + ?Sized>(
        config: SceneConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let foliage = Foliage::new(config.foliage.clone(), rng);
        let layers: Vec<OrnamentLayer> = config
            .ornaments
            .iter()
            .map(|o| OrnamentLayer::new(o.clone(), rng))
            .collect();
        let star = Star::new(config.star.clone());

        tracing::info!(
            foliage = foliage.count(),
            groups = layers.len(),
            ornaments = layers.iter().map(|l| l.group.count()).sum::<usize>(),
            mode = %config.initial_mode,
            "scene built"
        );

        Ok(Self {
            mode: ModeSwitch::with_mode(config.initial_mode),
            foliage,
            layers,
            star,
            star_parts: StarParts::new(),
            uniform: MorphUniform::default(),
            observed: None,
            config,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// World-space offset applied to every group when rendering.
    pub fn origin(&self) -> Vec3 {
        self.config.origin
    }

    /// Shareable handle to the mode, for input handlers on other threads.
    pub fn mode_switch(&self) -> ModeSwitch {
        self.mode.clone()
    }

    pub fn current_mode(&self) -> Mode {
        self.mode.current()
    }

    /// Flip the mode. Takes effect at the next update.
    pub fn toggle(&self) -> Mode {
        self.mode.toggle()
    }

    /// Advance every group by one frame.
    ///
    /// The mode is read once up front so all groups agree on it even if a
    /// toggle lands mid-update. Returns that mode.
    pub fn update(&mut self, frame: FrameTime) -> Mode {
        let mode = self.mode.current();
        if self.observed != Some(mode) {
            tracing::debug!(%mode, frame = frame.frame, "groups retargeting");
            self.observed = Some(mode);
        }

        self.uniform = self.foliage.update(mode, frame);

        for layer in &mut self.layers {
            layer.group.update(mode, frame, &mut layer.instances);
        }

        let root = self.star.update(mode, frame);
        self.star_parts.write(root);

        mode
    }

    /// Foliage uniforms from the last update.
    pub fn morph_uniform(&self) -> MorphUniform {
        self.uniform
    }

    pub fn foliage(&self) -> &Foliage {
        &self.foliage
    }

    pub fn layers(&self) -> &[OrnamentLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [OrnamentLayer] {
        &mut self.layers
    }

    pub fn star(&self) -> &Star {
        &self.star
    }

    pub fn star_parts(&self) -> &StarParts {
        &self.star_parts
    }

    pub fn star_parts_mut(&mut self) -> &mut StarParts {
        &mut self.star_parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FoliageConfig;
    use crate::instance::InstanceSink;
    use crate::time::fixed_frames;

    fn small_config() -> SceneConfig {
        let mut config = SceneConfig {
            seed: Some(42),
            foliage: FoliageConfig {
                count: 200,
                ..Default::default()
            },
            ..Default::default()
        };
        for o in &mut config.ornaments {
            o.count = 20;
        }
        config
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = Scene::new(small_config()).unwrap();
        let b = Scene::new(small_config()).unwrap();
        assert_eq!(a.foliage().positions(), b.foliage().positions());
        assert_eq!(
            a.layers()[3].group.positions(),
            b.layers()[3].group.positions()
        );
    }

    #[test]
    fn test_groups_do_not_share_positions() {
        let scene = Scene::new(small_config()).unwrap();
        let gold = scene.layers()[0].group.positions();
        let red = scene.layers()[1].group.positions();
        assert_ne!(gold.chaos, red.chaos);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = small_config();
        config.foliage.tree_height = 0.0;
        assert!(matches!(
            Scene::new(config),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_toggle_applies_on_next_update() {
        let mut scene = Scene::new(small_config()).unwrap();
        assert_eq!(scene.update(FrameTime::new(0.016, 0.016)), Mode::Chaos);
        assert_eq!(scene.morph_uniform().blend, 0.0);

        assert_eq!(scene.toggle(), Mode::Formed);
        assert_eq!(scene.update(FrameTime::new(0.032, 0.016)), Mode::Formed);
        assert!(scene.morph_uniform().blend > 0.0);
    }

    #[test]
    fn test_external_switch_drives_scene() {
        let mut scene = Scene::new(small_config()).unwrap();
        let switch = scene.mode_switch();
        std::thread::spawn(move || {
            switch.toggle();
        })
        .join()
        .unwrap();
        assert_eq!(scene.current_mode(), Mode::Formed);
    }

    #[test]
    fn test_every_buffer_marked_once_per_frame() {
        let mut scene = Scene::new(small_config()).unwrap();
        for frame in fixed_frames(0.016).take(4) {
            scene.update(frame);
        }
        for layer in scene.layers() {
            assert_eq!(layer.instances.dirty_marks(), 4);
            assert_eq!(layer.instances.len(), 20);
        }
        assert_eq!(scene.star_parts().rays.dirty_marks(), 4);
    }

    #[test]
    fn test_initial_mode_from_config() {
        let config = SceneConfig {
            initial_mode: Mode::Formed,
            ..small_config()
        };
        let mut scene = Scene::new(config).unwrap();
        for frame in fixed_frames(0.016).take(1000) {
            scene.update(frame);
        }
        assert!(1.0 - scene.morph_uniform().blend < 1e-4);
        let star = scene.star().position();
        assert!(star.distance(Vec3::new(0.0, 6.2, 0.0)) < 1e-3);
    }
}
