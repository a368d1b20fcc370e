//! GPU morph engine for the foliage point cloud.
//!
//! The foliage is too large to move on the CPU. Both position sets are
//! uploaded once as static vertex attributes; per frame the host only
//! smooths a single blend scalar and hands it to the shader together with
//! the elapsed time. Everything per-particle (position mix, bobbing, size
//! attenuation, soft-sphere shading) runs in [`foliage_wgsl`](crate::shaders::foliage_wgsl).
//!
//! The free functions at the bottom mirror the shader math on the CPU so it
//! can be unit tested and used for picking or debugging.

use crate::config::FoliageConfig;
use crate::mode::Mode;
use crate::morph::{lerp, step_factor};
use crate::spawn::{generate_positions_with, PositionSet, RandomSource};
use crate::time::FrameTime;
use crate::{Vec2, Vec3};
use bytemuck::{Pod, Zeroable};

/// Fixed light direction used by the point shading (not normalized).
pub const LIGHT_DIRECTION: Vec3 = Vec3::new(1.0, 1.0, 2.0);
/// Specular exponent of the glossy highlight.
pub const SHININESS: f32 = 32.0;
/// Highlight tint.
pub const SPECULAR_COLOR: Vec3 = Vec3::new(1.0, 0.9, 0.6);
/// Highlight strength.
pub const SPECULAR_STRENGTH: f32 = 0.8;
/// Maximum share of the secondary colour.
pub const TINT_VARIANCE: f32 = 0.2;
/// Ambient floor of the diffuse term.
pub const AMBIENT: f32 = 0.3;

/// Exponentially smoothed blend factor in `[0, 1]`.
///
/// Never reset: toggling the mode only changes which end it drifts towards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendState {
    value: f32,
    speed: f32,
}

impl BlendState {
    /// Start fully in chaos.
    pub fn new(speed: f32) -> Self {
        Self { value: 0.0, speed }
    }

    /// Start at a specific value, clamped to `[0, 1]`.
    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value.clamp(0.0, 1.0);
        self
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Move towards `mode`'s target and return the new value.
    pub fn update(&mut self, mode: Mode, delta: f32) -> f32 {
        self.value = lerp(self.value, mode.blend_target(), step_factor(delta, self.speed));
        self.value
    }
}

/// Scalar uniforms the shader needs each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MorphUniform {
    /// Blend factor between chaos (0) and tree (1).
    pub blend: f32,
    /// Elapsed seconds, drives the bobbing.
    pub time: f32,
}

/// Static per-particle vertex attributes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FoliageVertex {
    pub chaos: [f32; 3],
    pub size: f32,
    pub target: [f32; 3],
    pub _pad: f32,
}

/// The foliage group: static positions and sizes plus one blend state.
#[derive(Debug, Clone)]
pub struct Foliage {
    config: FoliageConfig,
    positions: PositionSet,
    sizes: Vec<f32>,
    blend: BlendState,
}

impl Foliage {
    /// Generate positions and sizes for `config`.
    pub fn new<R: RandomSource + ?Sized>(config: FoliageConfig, rng: &mut R) -> Self {
        let positions =
            generate_positions_with(rng, config.count, config.chaos_radius, &config.tree_shape());
        let span = config.max_size - config.min_size;
        let sizes = (0..config.count)
            .map(|_| config.min_size + rng.next_f32() * span)
            .collect();
        Self::from_parts(config, positions, sizes)
    }

    /// Build from pre-generated data.
    ///
    /// Particles are index-aligned across the chaos set, the target set and
    /// `sizes`. If their lengths differ, all three are truncated to the
    /// shortest so every particle has a full vertex.
    pub fn from_parts(
        config: FoliageConfig,
        mut positions: PositionSet,
        mut sizes: Vec<f32>,
    ) -> Self {
        let count = positions
            .chaos
            .len()
            .min(positions.target.len())
            .min(sizes.len());
        positions.chaos.truncate(count);
        positions.target.truncate(count);
        sizes.truncate(count);

        let blend = BlendState::new(config.morph_speed);
        Self {
            config,
            positions,
            sizes,
            blend,
        }
    }

    pub fn config(&self) -> &FoliageConfig {
        &self.config
    }

    pub fn count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &PositionSet {
        &self.positions
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Current blend factor.
    pub fn blend(&self) -> f32 {
        self.blend.value()
    }

    /// Vertex data for upload. Built once; never changes afterwards.
    pub fn vertices(&self) -> Vec<FoliageVertex> {
        self.positions
            .chaos
            .iter()
            .zip(&self.positions.target)
            .zip(&self.sizes)
            .map(|((chaos, target), &size)| FoliageVertex {
                chaos: chaos.to_array(),
                size,
                target: target.to_array(),
                _pad: 0.0,
            })
            .collect()
    }

    /// Advance one frame. Returns the uniforms to set for this frame.
    pub fn update(&mut self, mode: Mode, frame: FrameTime) -> MorphUniform {
        MorphUniform {
            blend: self.blend.update(mode, frame.delta),
            time: frame.elapsed,
        }
    }

    /// Where the shader places particle `index` for `uniform`, in group space.
    pub fn particle_position(&self, index: usize, uniform: MorphUniform) -> Option<Vec3> {
        let chaos = *self.positions.chaos.get(index)?;
        let target = *self.positions.target.get(index)?;
        Some(displaced_position(
            chaos,
            target,
            uniform,
            self.config.wobble_frequency,
            self.config.wobble_amplitude,
        ))
    }
}

// ========== Shader mirrors ==========

/// Mixed position plus vertical bobbing.
///
/// The bob is phase-shifted by the particle's x coordinate so neighbours
/// don't move in lockstep.
pub fn displaced_position(
    chaos: Vec3,
    target: Vec3,
    uniform: MorphUniform,
    frequency: f32,
    amplitude: f32,
) -> Vec3 {
    let mut pos = chaos.lerp(target, uniform.blend);
    pos.y += (uniform.time * frequency + pos.x).sin() * amplitude;
    pos
}

/// Screen-space point size with perspective attenuation.
///
/// `view_depth` is the view-space z, negative in front of the camera.
pub fn point_size(size: f32, view_depth: f32, attenuation: f32) -> f32 {
    size * (attenuation / (-view_depth).max(1e-3))
}

/// Cheap position hash in `[0, 1)` used to vary the tint.
pub fn tint_noise(pos: Vec3) -> f32 {
    let h = (pos.x * 12.9898 + pos.y * 78.233).sin() * 43758.5453;
    h - h.floor()
}

/// Shade one fragment of a point sprite.
///
/// `uv` spans `[-1, 1]` across the sprite. Returns `None` outside the
/// circular footprint, where the shader discards.
pub fn shade_fragment(uv: Vec2, pos: Vec3, primary: Vec3, secondary: Vec3) -> Option<Vec3> {
    let r = uv.dot(uv);
    if r > 1.0 {
        return None;
    }

    let normal = uv.extend((1.0 - r).sqrt()).normalize();
    let light_dir = LIGHT_DIRECTION.normalize();
    let diffuse = normal.dot(light_dir).max(0.0);

    let incident = -light_dir;
    let reflect_dir = incident - 2.0 * normal.dot(incident) * normal;
    let specular = Vec3::Z.dot(reflect_dir).max(0.0).powf(SHININESS);

    let base = primary.lerp(secondary, tint_noise(pos) * TINT_VARIANCE);
    Some(base * (AMBIENT + (1.0 - AMBIENT) * diffuse) + SPECULAR_COLOR * specular * SPECULAR_STRENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_frames;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn foliage(count: usize) -> Foliage {
        let config = FoliageConfig {
            count,
            ..Default::default()
        };
        Foliage::new(config, &mut SmallRng::seed_from_u64(3))
    }

    #[test]
    fn test_from_parts_truncates_to_shortest() {
        let positions = PositionSet {
            chaos: vec![Vec3::X; 5],
            target: vec![Vec3::Y; 4],
        };
        let f = Foliage::from_parts(FoliageConfig::default(), positions, vec![0.5; 3]);

        assert_eq!(f.count(), 3);
        assert_eq!(f.positions().target.len(), 3);
        assert_eq!(f.sizes().len(), 3);
        assert_eq!(f.vertices().len(), f.count());
    }

    #[test]
    fn test_blend_monotonic_and_bounded() {
        let mut blend = BlendState::new(2.0);
        let mut last = blend.value();
        for frame in fixed_frames(0.016).take(1000) {
            let v = blend.update(Mode::Formed, frame.delta);
            assert!(v >= last && v <= 1.0);
            last = v;
        }
        assert!(1.0 - last < 1e-4);

        for frame in fixed_frames(0.016).take(1000) {
            let v = blend.update(Mode::Chaos, frame.delta);
            assert!(v <= last && v >= 0.0);
            last = v;
        }
        assert!(last < 1e-4);
    }

    #[test]
    fn test_blend_large_delta_stays_in_range() {
        let mut blend = BlendState::new(2.0);
        assert_eq!(blend.update(Mode::Formed, 10.0), 1.0);
        assert_eq!(blend.update(Mode::Chaos, 10.0), 0.0);
    }

    #[test]
    fn test_blend_step_is_exponential() {
        let mut blend = BlendState::new(2.0).with_value(0.5);
        let v = blend.update(Mode::Formed, 0.1);
        assert!((v - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_generated_sizes_in_range() {
        let f = foliage(500);
        assert_eq!(f.sizes().len(), 500);
        assert!(f.sizes().iter().all(|&s| (0.3..0.8).contains(&s)));
    }

    #[test]
    fn test_vertices_carry_both_positions() {
        let f = foliage(10);
        let verts = f.vertices();
        assert_eq!(std::mem::size_of::<FoliageVertex>(), 32);
        assert_eq!(verts.len(), 10);
        assert_eq!(verts[7].chaos, f.positions().chaos[7].to_array());
        assert_eq!(verts[7].target, f.positions().target[7].to_array());
        assert_eq!(verts[7].size, f.sizes()[7]);
    }

    #[test]
    fn test_update_reports_time_and_blend() {
        let mut f = foliage(4);
        let u = f.update(Mode::Formed, FrameTime::new(3.0, 0.016));
        assert_eq!(u.time, 3.0);
        assert!((u.blend - 0.032).abs() < 1e-6);
        assert_eq!(f.blend(), u.blend);
    }

    #[test]
    fn test_particle_position_tracks_blend() {
        let f = foliage(3);
        let u = MorphUniform { blend: 1.0, time: 0.0 };
        let p = f.particle_position(1, u).unwrap();
        let target = f.positions().target[1];
        assert!((p.x - target.x).abs() < 1e-4);
        assert!((p.y - (target.y + target.x.sin() * 0.05)).abs() < 1e-4);
        assert!(f.particle_position(3, u).is_none());
    }

    #[test]
    fn test_point_size_attenuation() {
        assert!((point_size(0.5, -10.0, 300.0) - 15.0).abs() < 1e-4);
        assert!(point_size(0.5, -20.0, 300.0) < point_size(0.5, -10.0, 300.0));
    }

    #[test]
    fn test_fragment_discards_outside_circle() {
        let green = Vec3::new(0.0, 0.05, 0.02);
        let gold = Vec3::new(1.0, 0.68, 0.0);
        assert!(shade_fragment(Vec2::new(0.9, 0.9), Vec3::ZERO, green, gold).is_none());
        let c = shade_fragment(Vec2::ZERO, Vec3::ZERO, green, gold).unwrap();
        assert!(c.is_finite());
        // Centre of the sprite faces the viewer: diffuse = n.l with n = +Z.
        let diffuse = LIGHT_DIRECTION.normalize().z;
        let expected_min = green * (AMBIENT + (1.0 - AMBIENT) * diffuse);
        assert!(c.x >= expected_min.x - 1e-5);
    }

    #[test]
    fn test_tint_noise_range() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..500 {
            let p = crate::spawn::random_in_sphere(&mut rng, 15.0);
            let n = tint_noise(p);
            assert!((0.0..=1.0).contains(&n));
        }
    }
}
