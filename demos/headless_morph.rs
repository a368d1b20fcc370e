//! Drive a scene without a window and watch it converge.
//!
//! Run with: `cargo run --example headless_morph`

use treemorph::prelude::*;
use tracing_subscriber::EnvFilter;

/// Largest distance between any ornament and its current destination.
fn ornament_error(scene: &Scene) -> f32 {
    let formed = scene.current_mode().is_formed();
    scene
        .layers()
        .iter()
        .flat_map(|layer| {
            let positions = layer.group.positions();
            let destinations = if formed { &positions.target } else { &positions.chaos };
            layer
                .group
                .current_positions()
                .iter()
                .zip(destinations)
                .map(|(current, destination)| current.distance(*destination))
        })
        .fold(0.0, f32::max)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut scene = Scene::new(SceneConfig {
        seed: Some(2024),
        ..Default::default()
    })?;

    let mut frames = fixed_frames(1.0 / 60.0);
    for phase in [Mode::Formed, Mode::Chaos] {
        scene.mode_switch().set(phase);
        for frame in frames.by_ref().take(600) {
            scene.update(frame);
            if frame.frame % 100 == 0 {
                tracing::info!(
                    mode = %phase,
                    t = frame.elapsed,
                    blend = scene.morph_uniform().blend,
                    ornament_error = ornament_error(&scene),
                    star_scale = scene.star().scale(),
                    "progress"
                );
            }
        }
    }

    Ok(())
}
