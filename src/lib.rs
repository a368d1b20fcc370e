//! # treemorph - chaos-to-tree particle morphing
//!
//! Thousands of particles and instanced ornaments that drift between a
//! scattered sphere ("chaos") and an assembled cone ("tree") whenever the
//! mode is toggled.
//!
//! ## Quick Start
//!
//! ```ignore
//! use treemorph::prelude::*;
//!
//! fn main() -> Result<(), ViewerError> {
//!     Viewer::new(SceneConfig::default()).run()
//! }
//! ```
//!
//! Headless, driven by synthetic frames:
//!
//! ```ignore
//! let mut scene = Scene::new(SceneConfig { seed: Some(1), ..Default::default() })?;
//! scene.toggle();
//! for frame in fixed_frames(0.016).take(1000) {
//!     scene.update(frame);
//! }
//! assert!(scene.morph_uniform().blend > 0.99);
//! ```
//!
//! ## Core Concepts
//!
//! ### Position sets
//!
//! Every group draws two index-aligned position arrays once at startup:
//! a uniform solid sphere and a tapered cone. See [`generate_positions`].
//!
//! ### Two morph engines
//!
//! | Engine | Used by | State per frame |
//! |--------|---------|-----------------|
//! | GPU ([`Foliage`]) | the large point cloud | one smoothed blend scalar; the shader mixes positions |
//! | CPU ([`OrnamentGroup`]) | instanced ornaments | a live position per instance, lerped with five speed bands |
//!
//! The [`Star`] topper is the CPU pattern with a single instance and an
//! extra scale channel.
//!
//! ### Mode
//!
//! [`Mode`] is flipped only by [`Scene::toggle`] (or a [`ModeSwitch`]
//! handle). Engines never reset their state on a toggle; they just start
//! heading the other way.

pub mod config;
pub mod error;
pub mod foliage;
mod gpu;
pub mod instance;
pub mod mesh;
pub mod mode;
pub mod morph;
pub mod ornaments;
pub mod scene;
pub mod shaders;
pub mod spawn;
pub mod star;
pub mod time;
mod viewer;

pub use bytemuck;
pub use config::{FoliageConfig, OrnamentConfig, OrnamentShape, SceneConfig, StarConfig};
pub use error::{ConfigError, GpuError, ViewerError};
pub use foliage::{BlendState, Foliage, FoliageVertex, MorphUniform};
pub use glam::{Mat4, Vec2, Vec3, Vec4};
pub use gpu::OrbitCamera;
pub use instance::{InstanceBuffer, InstanceRaw, InstanceSink};
pub use mesh::{Mesh, MeshVertex};
pub use mode::{Mode, ModeSwitch};
pub use ornaments::OrnamentGroup;
pub use scene::{OrnamentLayer, Scene};
pub use spawn::{generate_positions, generate_positions_with, PositionSet, RandomSource, TreeShape};
pub use star::{Star, StarParts};
pub use time::{fixed_frames, FrameClock, FrameTime};
pub use viewer::Viewer;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use treemorph::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{FoliageConfig, OrnamentConfig, OrnamentShape, SceneConfig, StarConfig};
    pub use crate::error::{ConfigError, ViewerError};
    pub use crate::mode::{Mode, ModeSwitch};
    pub use crate::scene::Scene;
    pub use crate::spawn::{generate_positions, generate_positions_with, RandomSource};
    pub use crate::time::{fixed_frames, FrameClock, FrameTime};
    pub use crate::viewer::Viewer;
    pub use crate::{Mat4, Vec2, Vec3, Vec4};
}
