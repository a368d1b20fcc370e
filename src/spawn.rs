//! Spawn positions for the two particle configurations.
//!
//! Every group owns a pair of index-aligned position sets: a scattered
//! "chaos" cloud filling a solid sphere, and an assembled "tree" filling a
//! tapered cone around the vertical axis. Particle `i` of the chaos set and
//! particle `i` of the tree set are the same logical particle.
//!
//! ```ignore
//! let mut rng = SmallRng::seed_from_u64(7);
//! let set = generate_positions_with(&mut rng, 400, 15.0, &TreeShape::new(12.0, 5.0));
//! assert_eq!(set.chaos.len(), set.target.len());
//! ```

use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use std::f32::consts::TAU;

/// Source of uniform draws in `[0, 1)`.
///
/// Any `rand` generator works. Tests can plug in [`ConstantSource`] or
/// [`SequenceSource`] to pin the exact arithmetic.
pub trait RandomSource {
    /// Next uniform draw in `[0, 1)`.
    fn next_f32(&mut self) -> f32;
}

impl<R: RngCore> RandomSource for R {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.gen()
    }
}

/// Returns the same value for every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSource(pub f32);

impl RandomSource for ConstantSource {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.0
    }
}

/// Cycles through a fixed list of draws.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSource {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceSource {
    /// Create a source that repeats `values` in order.
    ///
    /// An empty list behaves like `ConstantSource(0.0)`.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for SequenceSource {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Generator seeded from OS entropy, used when no source is injected.
pub fn system_random() -> SmallRng {
    SmallRng::from_entropy()
}

/// Dimensions of the assembled tree volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeShape {
    /// Height of the cone along +Y.
    pub height: f32,
    /// Radius of the cone at its base.
    pub base_radius: f32,
    /// Vertical shift applied after sampling. Defaults to `-height / 2`.
    pub y_offset: f32,
}

impl TreeShape {
    /// Cone centred on the origin: base at `-height/2`, apex at `+height/2`.
    pub fn new(height: f32, base_radius: f32) -> Self {
        Self {
            height,
            base_radius,
            y_offset: -height / 2.0,
        }
    }

    /// Override the vertical shift.
    pub fn with_y_offset(mut self, y_offset: f32) -> Self {
        self.y_offset = y_offset;
        self
    }

    /// Radius the cone allows at `height_from_base` (linear taper).
    #[inline]
    pub fn radius_at(&self, height_from_base: f32) -> f32 {
        self.base_radius * (1.0 - height_from_base / self.height)
    }
}

/// Index-aligned chaos and tree positions for one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionSet {
    /// Scattered positions.
    pub chaos: Vec<Vec3>,
    /// Assembled positions.
    pub target: Vec<Vec3>,
}

impl PositionSet {
    /// Number of particles.
    pub fn len(&self) -> usize {
        self.chaos.len()
    }

    /// True if the set holds no particles.
    pub fn is_empty(&self) -> bool {
        self.chaos.is_empty()
    }

    /// Chaos positions as flat `x, y, z` triples.
    pub fn chaos_flat(&self) -> Vec<f32> {
        flatten(&self.chaos)
    }

    /// Tree positions as flat `x, y, z` triples.
    pub fn target_flat(&self) -> Vec<f32> {
        flatten(&self.target)
    }
}

fn flatten(points: &[Vec3]) -> Vec<f32> {
    points.iter().flat_map(|p| p.to_array()).collect()
}

// ========== Position helpers ==========

/// Random point inside a solid sphere of given radius, centred at origin.
///
/// Uniform by volume: the polar angle comes from `acos(2v - 1)` so points
/// don't bunch at the poles, and the radius from a cube root.
pub fn random_in_sphere<R: RandomSource + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let theta = TAU * rng.next_f32();
    let phi = (2.0 * rng.next_f32() - 1.0).acos();
    let r = rng.next_f32().cbrt() * radius;
    let sin_phi = phi.sin();

    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

/// Random point inside the tree cone.
///
/// Height is drawn uniformly along the axis, so the fill gets denser towards
/// the apex. Within each horizontal disc the radius uses a square root, which
/// keeps the disc itself uniformly filled.
pub fn random_in_tree<R: RandomSource + ?Sized>(rng: &mut R, shape: &TreeShape) -> Vec3 {
    debug_assert!(
        shape.height > 0.0,
        "tree height must be positive, got {}",
        shape.height
    );

    let y = rng.next_f32() * shape.height;
    let radius_at_y = shape.radius_at(y);
    let angle = rng.next_f32() * TAU;
    let r = rng.next_f32().sqrt() * radius_at_y;

    Vec3::new(r * angle.cos(), y + shape.y_offset, r * angle.sin())
}

/// Generate `count` chaos/tree pairs from an injected random source.
///
/// Each particle draws its chaos point and then its tree point, so the two
/// sets always come out together and index-aligned.
pub fn generate_positions_with<R: RandomSource + ?Sized>(
    rng: &mut R,
    count: usize,
    chaos_radius: f32,
    tree: &TreeShape,
) -> PositionSet {
    let mut chaos = Vec::with_capacity(count);
    let mut target = Vec::with_capacity(count);

    for _ in 0..count {
        chaos.push(random_in_sphere(rng, chaos_radius));
        target.push(random_in_tree(rng, tree));
    }

    PositionSet { chaos, target }
}

/// Generate `count` chaos/tree pairs using system randomness.
///
/// The tree is centred vertically (`y_offset = -tree_height / 2`).
pub fn generate_positions(
    count: usize,
    chaos_radius: f32,
    tree_height: f32,
    tree_base_radius: f32,
) -> PositionSet {
    generate_positions_with(
        &mut system_random(),
        count,
        chaos_radius,
        &TreeShape::new(tree_height, tree_base_radius),
    )
}
