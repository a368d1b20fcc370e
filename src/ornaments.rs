//! CPU morph engine for instanced ornament groups.
//!
//! Unlike the foliage, each ornament keeps an explicit live position. Every
//! frame it is lerped towards its chaos or tree position (the destination
//! flips discretely with the mode; the lerp supplies the smoothing), spun,
//! scaled, and written into the group's instance buffer.

use crate::config::OrnamentConfig;
use crate::instance::InstanceSink;
use crate::mode::Mode;
use crate::morph::{idle_rotation, speed_band, step_factor};
use crate::spawn::{generate_positions_with, PositionSet, RandomSource};
use crate::time::FrameTime;
use crate::Vec3;
use glam::{EulerRot, Mat4, Quat};

/// Compose an instance transform from position, XYZ Euler rotation and uniform scale.
pub fn instance_transform(position: Vec3, rotation: Vec3, scale: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::splat(scale),
        Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z),
        position,
    )
}

/// One instanced group morphed on the CPU.
#[derive(Debug, Clone)]
pub struct OrnamentGroup {
    config: OrnamentConfig,
    positions: PositionSet,
    /// Live positions, starting at the chaos set.
    current: Vec<Vec3>,
}

impl OrnamentGroup {
    /// Generate positions for `config` and start every ornament at its chaos point.
    pub fn new<R: RandomSource + ?Sized>(config: OrnamentConfig, rng: &mut R) -> Self {
        let positions =
            generate_positions_with(rng, config.count, config.chaos_radius, &config.tree_shape());
        Self::from_positions(config, positions)
    }

    /// Build from pre-generated positions. The group count follows `positions`.
    pub fn from_positions(config: OrnamentConfig, positions: PositionSet) -> Self {
        debug_assert_eq!(positions.chaos.len(), positions.target.len());
        let current = positions.chaos.clone();
        Self {
            config,
            positions,
            current,
        }
    }

    pub fn config(&self) -> &OrnamentConfig {
        &self.config
    }

    pub fn count(&self) -> usize {
        self.current.len()
    }

    pub fn positions(&self) -> &PositionSet {
        &self.positions
    }

    /// Live positions as of the last update.
    pub fn current_positions(&self) -> &[Vec3] {
        &self.current
    }

    /// Advance one frame and write every instance into `sink`.
    ///
    /// The sink is marked dirty once, after all slots are written. An empty
    /// group writes nothing.
    pub fn update<S: InstanceSink + ?Sized>(&mut self, mode: Mode, frame: FrameTime, sink: &mut S) {
        if self.current.is_empty() {
            return;
        }

        let destinations = match mode {
            Mode::Formed => &self.positions.target,
            Mode::Chaos => &self.positions.chaos,
        };

        for (i, (current, &destination)) in self.current.iter_mut().zip(destinations).enumerate() {
            let step = step_factor(frame.delta, self.config.speed_multiplier * speed_band(i));
            *current = current.lerp(destination, step);

            sink.set_transform(
                i,
                instance_transform(*current, idle_rotation(i, frame.elapsed), self.config.scale),
            );
        }

        sink.mark_dirty();
    }
}
