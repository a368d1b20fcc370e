//! Orbit camera around the tree.

use crate::mode::Mode;
use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Vertical field of view in degrees.
pub const FOV_DEGREES: f32 = 50.0;
/// Near clip plane.
pub const NEAR: f32 = 0.1;
/// Far clip plane.
pub const FAR: f32 = 200.0;
/// Closest allowed orbit distance.
pub const MIN_DISTANCE: f32 = 10.0;
/// Furthest allowed orbit distance.
pub const MAX_DISTANCE: f32 = 30.0;
/// Smallest polar angle measured from +Y.
pub const MIN_POLAR: f32 = PI / 3.0;
/// Largest polar angle measured from +Y.
pub const MAX_POLAR: f32 = PI / 1.8;
/// Idle yaw speed while the tree is formed, in radians per second.
pub const AUTO_ROTATE_SPEED: f32 = TAU / 60.0 * 0.5;

const ORBIT_SENSITIVITY: f32 = 0.005;
const ZOOM_STEP: f32 = 1.0;

/// Orbit camera looking at a fixed target.
///
/// `pitch` is elevation above the horizontal plane, so the polar limits
/// become `FRAC_PI_2 - MAX_POLAR ..= FRAC_PI_2 - MIN_POLAR`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
}

impl OrbitCamera {
    /// Camera at `eye` looking at `target`, clamped into the orbit limits.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        let mut camera = Self {
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
            target,
        };
        camera.clamp();
        camera
    }

    /// Camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_DEGREES.to_radians(), aspect.max(f32::EPSILON), NEAR, FAR)
    }

    /// Drag by a pixel delta.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * ORBIT_SENSITIVITY;
        self.pitch += dy * ORBIT_SENSITIVITY;
        self.clamp();
    }

    /// Zoom by wheel lines; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        self.distance -= lines * ZOOM_STEP;
        self.clamp();
    }

    /// Auto-rotate while the tree is formed.
    pub fn update(&mut self, delta: f32, mode: Mode) {
        if mode.is_formed() {
            self.yaw = (self.yaw + AUTO_ROTATE_SPEED * delta).rem_euclid(TAU);
        }
    }

    fn clamp(&mut self) {
        self.pitch = self.pitch.clamp(FRAC_PI_2 - MAX_POLAR, FRAC_PI_2 - MIN_POLAR);
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 2.0, 18.0), Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_eye() {
        let camera = OrbitCamera::default();
        assert!(camera.position().distance(Vec3::new(0.0, 2.0, 18.0)) < 1e-4);
    }

    #[test]
    fn test_polar_and_distance_limits() {
        let mut camera = OrbitCamera::default();
        camera.orbit(0.0, 10_000.0);
        let polar = FRAC_PI_2 - camera.pitch;
        assert!((polar - MIN_POLAR).abs() < 1e-5);
        camera.orbit(0.0, -10_000.0);
        assert!((FRAC_PI_2 - camera.pitch - MAX_POLAR).abs() < 1e-5);

        camera.zoom(100.0);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(-100.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_auto_rotate_only_when_formed() {
        let mut camera = OrbitCamera::default();
        camera.update(1.0, Mode::Chaos);
        assert_eq!(camera.yaw, 0.0);
        camera.update(1.0, Mode::Formed);
        assert!((camera.yaw - AUTO_ROTATE_SPEED).abs() < 1e-6);
    }

    #[test]
    fn test_view_looks_at_target() {
        let camera = OrbitCamera::default();
        let target_in_view = camera.view_matrix().transform_point3(camera.target);
        assert!(target_in_view.x.abs() < 1e-4 && target_in_view.y.abs() < 1e-4);
        assert!(target_in_view.z < 0.0);
    }
}
