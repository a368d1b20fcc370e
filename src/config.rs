//! Scene configuration.
//!
//! Every value the engines need is fixed when the scene is built. Configs are
//! plain serde structs so a scene can be described in JSON; missing fields
//! fall back to the defaults, which reproduce the stock tree.
//!
//! ```ignore
//! let config = SceneConfig::from_json(r#"{ "seed": 7, "foliage": { "count": 1000 } }"#)?;
//! let scene = Scene::new(config)?;
//! ```

use crate::error::ConfigError;
use crate::mode::Mode;
use crate::spawn::TreeShape;
use crate::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Margin added to an ornament group's tree radius so ornaments sit just
/// outside the foliage.
pub const ORNAMENT_RADIUS_MARGIN: f32 = 0.5;

/// Convert an sRGB hex colour (`0xRRGGBB`) to linear RGB.
pub fn rgb(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xFF) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// The GPU-blended point cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoliageConfig {
    pub count: usize,
    pub chaos_radius: f32,
    pub tree_height: f32,
    pub tree_radius: f32,
    /// Rate of the blend factor's exponential smoothing.
    pub morph_speed: f32,
    /// Point sizes are drawn uniformly from `min_size..max_size`.
    pub min_size: f32,
    pub max_size: f32,
    /// Dominant colour.
    pub primary_color: Vec3,
    /// Sparse variance colour mixed in by a position hash.
    pub secondary_color: Vec3,
    /// Frequency of the vertical bobbing.
    pub wobble_frequency: f32,
    /// Height of the vertical bobbing.
    pub wobble_amplitude: f32,
    /// Perspective size attenuation constant.
    pub size_attenuation: f32,
}

impl Default for FoliageConfig {
    fn default() -> Self {
        Self {
            count: 3500,
            chaos_radius: 15.0,
            tree_height: 12.0,
            tree_radius: 5.0,
            morph_speed: 2.0,
            min_size: 0.3,
            max_size: 0.8,
            primary_color: rgb(0x004225),
            secondary_color: rgb(0xFFD700),
            wobble_frequency: 2.0,
            wobble_amplitude: 0.05,
            size_attenuation: 300.0,
        }
    }
}

impl FoliageConfig {
    /// Tree volume the foliage assembles into.
    pub fn tree_shape(&self) -> TreeShape {
        TreeShape::new(self.tree_height, self.tree_radius)
    }
}

/// Geometry of an ornament group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrnamentShape {
    #[default]
    Sphere,
    Box,
}

/// One CPU-morphed instanced group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrnamentConfig {
    /// Used in logs and error messages.
    pub name: String,
    pub count: usize,
    pub shape: OrnamentShape,
    pub color: Vec3,
    /// Uniform scale of every instance.
    pub scale: f32,
    pub chaos_radius: f32,
    pub tree_height: f32,
    pub tree_radius: f32,
    pub speed_multiplier: f32,
    /// Glow with the base colour.
    pub emissive: bool,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for OrnamentConfig {
    fn default() -> Self {
        Self {
            name: "ornaments".to_string(),
            count: 100,
            shape: OrnamentShape::Sphere,
            color: Vec3::ONE,
            scale: 0.25,
            chaos_radius: 15.0,
            tree_height: 12.0,
            tree_radius: 4.5,
            speed_multiplier: 1.5,
            emissive: false,
            metalness: 0.9,
            roughness: 0.1,
        }
    }
}

impl OrnamentConfig {
    /// Gold baubles.
    pub fn gold_baubles() -> Self {
        Self {
            name: "gold baubles".to_string(),
            count: 150,
            color: rgb(0xFFD700),
            scale: 0.25,
            chaos_radius: 15.0,
            tree_height: 12.0,
            tree_radius: 4.5,
            speed_multiplier: 1.2,
            ..Default::default()
        }
    }

    /// Deep red baubles.
    pub fn red_baubles() -> Self {
        Self {
            name: "red baubles".to_string(),
            count: 80,
            color: rgb(0x8B0000),
            scale: 0.3,
            chaos_radius: 16.0,
            tree_height: 12.0,
            tree_radius: 4.8,
            speed_multiplier: 1.0,
            ..Default::default()
        }
    }

    /// Gift boxes: heavier, slower, lower on the tree.
    pub fn gifts() -> Self {
        Self {
            name: "gifts".to_string(),
            count: 40,
            shape: OrnamentShape::Box,
            color: rgb(0xFFFFFF),
            scale: 0.4,
            chaos_radius: 12.0,
            tree_height: 6.0,
            tree_radius: 5.5,
            speed_multiplier: 0.8,
            ..Default::default()
        }
    }

    /// Small emissive fairy lights.
    pub fn lights() -> Self {
        Self {
            name: "lights".to_string(),
            count: 400,
            color: rgb(0xFFFFEE),
            scale: 0.08,
            chaos_radius: 20.0,
            tree_height: 12.0,
            tree_radius: 4.2,
            speed_multiplier: 2.5,
            emissive: true,
            ..Default::default()
        }
    }

    /// Tree volume the ornaments assemble into, widened by
    /// [`ORNAMENT_RADIUS_MARGIN`].
    pub fn tree_shape(&self) -> TreeShape {
        TreeShape::new(self.tree_height, self.tree_radius + ORNAMENT_RADIUS_MARGIN)
    }
}

/// The singleton star topper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub chaos_position: Vec3,
    pub target_position: Vec3,
    pub position_rate: f32,
    pub scale_rate: f32,
    /// Scale while scattered.
    pub resting_scale: f32,
    /// Scale on top of the tree.
    pub full_scale: f32,
    /// Spin about Y in radians per second.
    pub spin_speed: f32,
    pub sway_frequency: f32,
    pub sway_amplitude: f32,
    pub color: Vec3,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            chaos_position: Vec3::new(0.0, 20.0, 0.0),
            target_position: Vec3::new(0.0, 6.2, 0.0),
            position_rate: 1.5,
            scale_rate: 2.0,
            resting_scale: 0.1,
            full_scale: 1.0,
            spin_speed: 0.5,
            sway_frequency: 2.0,
            sway_amplitude: 0.1,
            color: rgb(0xFFD700),
        }
    }
}

/// Everything needed to build a [`Scene`](crate::Scene).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// World-space offset of the whole tree.
    pub origin: Vec3,
    pub initial_mode: Mode,
    /// Seed for position generation. `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub foliage: FoliageConfig,
    pub ornaments: Vec<OrnamentConfig>,
    pub star: StarConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, -5.0, 0.0),
            initial_mode: Mode::Chaos,
            seed: None,
            foliage: FoliageConfig::default(),
            ornaments: vec![
                OrnamentConfig::gold_baubles(),
                OrnamentConfig::red_baubles(),
                OrnamentConfig::gifts(),
                OrnamentConfig::lights(),
            ],
            star: StarConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse a JSON scene description.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON scene description from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the construction-time contracts of every group.
    ///
    /// Degenerate geometry (zero tree height, negative radii) would turn into
    /// NaNs in the renderer, so it is rejected here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.origin.is_finite() {
            return Err(ConfigError::invalid("scene", "origin must be finite"));
        }

        let f = &self.foliage;
        check_volume("foliage", f.chaos_radius, f.tree_height, f.tree_radius)?;
        check_non_negative("foliage", "morph_speed", f.morph_speed)?;
        check_non_negative("foliage", "min_size", f.min_size)?;
        if !(f.max_size.is_finite() && f.max_size >= f.min_size) {
            return Err(ConfigError::invalid(
                "foliage",
                format!("max_size {} is below min_size {}", f.max_size, f.min_size),
            ));
        }
        check_non_negative("foliage", "size_attenuation", f.size_attenuation)?;
        check_non_negative("foliage", "wobble_amplitude", f.wobble_amplitude)?;
        check_finite("foliage", "wobble_frequency", f.wobble_frequency)?;

        for o in &self.ornaments {
            check_volume(&o.name, o.chaos_radius, o.tree_height, o.tree_radius)?;
            check_positive(&o.name, "scale", o.scale)?;
            check_non_negative(&o.name, "speed_multiplier", o.speed_multiplier)?;
        }

        let s = &self.star;
        if !(s.chaos_position.is_finite() && s.target_position.is_finite()) {
            return Err(ConfigError::invalid("star", "positions must be finite"));
        }
        check_non_negative("star", "position_rate", s.position_rate)?;
        check_non_negative("star", "scale_rate", s.scale_rate)?;
        check_positive("star", "resting_scale", s.resting_scale)?;
        check_positive("star", "full_scale", s.full_scale)?;
        check_finite("star", "spin_speed", s.spin_speed)?;

        Ok(())
    }
}

fn check_volume(group: &str, chaos_radius: f32, height: f32, radius: f32) -> Result<(), ConfigError> {
    check_non_negative(group, "chaos_radius", chaos_radius)?;
    check_positive(group, "tree_height", height)?;
    check_non_negative(group, "tree_radius", radius)
}

fn check_finite(group: &str, field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(group, format!("{} must be finite, got {}", field, value)))
    }
}

fn check_positive(group: &str, field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(group, format!("{} must be positive, got {}", field, value)))
    }
}

fn check_non_negative(group: &str, field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            group,
            format!("{} must be non-negative, got {}", field, value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preset_matches_stock_tree() {
        let config = SceneConfig::default();
        assert_eq!(config.foliage.count, 3500);
        let counts: Vec<usize> = config.ornaments.iter().map(|o| o.count).collect();
        assert_eq!(counts, vec![150, 80, 40, 400]);
        assert_eq!(config.ornaments[2].shape, OrnamentShape::Box);
        assert!(config.ornaments[3].emissive);
        assert_eq!(config.origin, Vec3::new(0.0, -5.0, 0.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ornament_tree_shape_is_widened() {
        let shape = OrnamentConfig::gold_baubles().tree_shape();
        assert_eq!(shape.base_radius, 5.0);
        assert_eq!(shape.y_offset, -6.0);
    }

    #[test]
    fn test_rgb_endpoints() {
        assert_eq!(rgb(0x000000), Vec3::ZERO);
        let white = rgb(0xFFFFFF);
        assert!((white - Vec3::ONE).abs().max_element() < 1e-5);
        let gold = rgb(0xFFD700);
        assert!((gold.x - 1.0).abs() < 1e-5);
        assert!(gold.y < 0.7 && gold.y > 0.6);
        assert!(gold.z.abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SceneConfig::from_json(
            r#"{ "seed": 7, "initial_mode": "FORMED", "foliage": { "count": 10 } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.initial_mode, Mode::Formed);
        assert_eq!(config.foliage.count, 10);
        assert_eq!(config.foliage.tree_height, 12.0);
        assert_eq!(config.ornaments.len(), 4);
    }

    #[test]
    fn test_json_round_trip_keeps_groups() {
        let config = SceneConfig::default();
        let back = SceneConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_rejects_zero_height() {
        let mut config = SceneConfig::default();
        config.ornaments[1].tree_height = 0.0;
        match config.validate() {
            Err(ConfigError::Invalid { group, reason }) => {
                assert_eq!(group, "red baubles");
                assert!(reason.contains("tree_height"));
            }
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_inverted_sizes_and_nan() {
        let mut config = SceneConfig::default();
        config.foliage.max_size = 0.1;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.star.full_scale = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            SceneConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
