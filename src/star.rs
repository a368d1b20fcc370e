//! The star topper.
//!
//! A single object using the same lerp-towards-mode-target pattern as the
//! ornaments, with an extra scale channel: it shrinks to a small resting
//! scale while scattered and grows to full size on top of the tree.

use crate::config::StarConfig;
use crate::instance::{InstanceBuffer, InstanceSink};
use crate::mode::Mode;
use crate::morph::{lerp, step_factor};
use crate::time::FrameTime;
use crate::Vec3;
use glam::{EulerRot, Mat4, Quat};
use std::f32::consts::{PI, TAU};

/// Radius of the emissive core octahedron.
pub const CORE_RADIUS: f32 = 0.5;
/// Radius of the translucent glow shell.
pub const GLOW_RADIUS: f32 = 0.8;
/// Size of each ray box.
pub const RAY_SIZE: Vec3 = Vec3::new(0.1, 2.5, 0.1);
/// Number of crossed rays.
pub const RAY_COUNT: usize = 3;

/// Live state of the star.
#[derive(Debug, Clone)]
pub struct Star {
    config: StarConfig,
    position: Vec3,
    scale: f32,
    spin: f32,
    sway: f32,
}

impl Star {
    /// Start scattered: chaos position, resting scale.
    pub fn new(config: StarConfig) -> Self {
        Self {
            position: config.chaos_position,
            scale: config.resting_scale,
            spin: 0.0,
            sway: 0.0,
            config,
        }
    }

    pub fn config(&self) -> &StarConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Advance one frame and return the new root transform.
    pub fn update(&mut self, mode: Mode, frame: FrameTime) -> Mat4 {
        let c = &self.config;
        let (target, target_scale) = match mode {
            Mode::Formed => (c.target_position, c.full_scale),
            Mode::Chaos => (c.chaos_position, c.resting_scale),
        };

        self.position = self.position.lerp(target, step_factor(frame.delta, c.position_rate));
        self.scale = lerp(self.scale, target_scale, step_factor(frame.delta, c.scale_rate));
        self.spin = (self.spin + frame.delta * c.spin_speed).rem_euclid(TAU);
        self.sway = (frame.elapsed * c.sway_frequency).sin() * c.sway_amplitude;

        self.transform()
    }

    /// Root transform: uniform scale, spin about Y, sway about Z.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(EulerRot::XYZ, 0.0, self.spin, self.sway),
            self.position,
        )
    }
}

/// Instance buffers for the star's pieces, one per mesh.
#[derive(Debug, Clone)]
pub struct StarParts {
    pub glow: InstanceBuffer,
    pub core: InstanceBuffer,
    pub rays: InstanceBuffer,
}

impl StarParts {
    pub fn new() -> Self {
        Self {
            glow: InstanceBuffer::new(1),
            core: InstanceBuffer::new(1),
            rays: InstanceBuffer::new(RAY_COUNT),
        }
    }

    /// Local transform of ray `k`, for a unit cube mesh.
    pub fn ray_local(k: usize) -> Mat4 {
        Mat4::from_rotation_z(PI / 3.0 * k as f32) * Mat4::from_scale(RAY_SIZE)
    }

    /// Write every piece relative to `root` and flag each buffer once.
    ///
    /// Meshes are authored at their final size (core radius
    /// [`CORE_RADIUS`], glow radius [`GLOW_RADIUS`]); rays use a unit cube.
    pub fn write(&mut self, root: Mat4) {
        self.glow.set_transform(0, root);
        self.glow.mark_dirty();

        self.core.set_transform(0, root);
        self.core.mark_dirty();

        for k in 0..RAY_COUNT {
            self.rays.set_transform(k, root * Self::ray_local(k));
        }
        self.rays.mark_dirty();
    }
}

impl Default for StarParts {
    fn default() -> Self {
        Self::new()
    }
}
