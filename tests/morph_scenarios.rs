//! End-to-end morph scenarios driven by synthetic frames.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use treemorph::instance::InstanceBuffer;
use treemorph::spawn::ConstantSource;
use treemorph::{
    fixed_frames, generate_positions, generate_positions_with, Foliage, FoliageConfig, FrameTime,
    Mode, MorphUniform, OrnamentConfig, OrnamentGroup, Scene, SceneConfig, TreeShape, Vec3,
};

const DT: f32 = 0.016;

fn small_scene(seed: u64) -> Scene {
    let mut config = SceneConfig {
        seed: Some(seed),
        ..Default::default()
    };
    config.foliage.count = 400;
    for o in &mut config.ornaments {
        o.count = 40;
    }
    Scene::new(config).unwrap()
}

#[test]
fn test_generate_lengths_and_finiteness() {
    for count in [1, 7, 400] {
        let set = generate_positions(count, 15.0, 12.0, 5.0);
        assert_eq!(set.chaos_flat().len(), count * 3);
        assert_eq!(set.target_flat().len(), count * 3);
        assert!(set.chaos_flat().iter().all(|v| v.is_finite()));
        assert!(set.target_flat().iter().all(|v| v.is_finite()));
    }
    assert!(generate_positions(0, 15.0, 12.0, 5.0).is_empty());
}

#[test]
fn test_constant_source_pins_single_particle() {
    let set = generate_positions_with(&mut ConstantSource(0.5), 1, 10.0, &TreeShape::new(10.0, 5.0));

    let r_chaos = 0.5f32.cbrt() * 10.0;
    let chaos = set.chaos[0];
    assert!((chaos - Vec3::new(-r_chaos, 0.0, 0.0)).abs().max_element() < 1e-4);

    let r_tree = 0.5f32.sqrt() * 2.5;
    let target = set.target[0];
    assert!((target - Vec3::new(-r_tree, 0.0, 0.0)).abs().max_element() < 1e-4);
}

#[test]
fn test_gpu_engine_400_particles_converge() {
    let config = FoliageConfig {
        count: 400,
        wobble_amplitude: 0.0,
        ..Default::default()
    };
    let mut foliage = Foliage::new(config, &mut SmallRng::seed_from_u64(400));

    let mut uniform = MorphUniform::default();
    for frame in fixed_frames(DT).take(1000) {
        uniform = foliage.update(Mode::Formed, frame);
    }
    assert!(1.0 - uniform.blend < 1e-4);

    for i in 0..400 {
        let p = foliage.particle_position(i, uniform).unwrap();
        let target = foliage.positions().target[i];
        assert!(p.distance(target) < 1e-2, "particle {} at {} not at {}", i, p, target);
    }
}

#[test]
fn test_cpu_engine_400_particles_converge() {
    let config = OrnamentConfig {
        count: 400,
        ..OrnamentConfig::gifts()
    };
    let mut group = OrnamentGroup::new(config, &mut SmallRng::seed_from_u64(400));
    let mut buffer = InstanceBuffer::new(400);

    for frame in fixed_frames(DT).take(1000) {
        group.update(Mode::Formed, frame, &mut buffer);
    }

    for (i, (current, target)) in group
        .current_positions()
        .iter()
        .zip(&group.positions().target)
        .enumerate()
    {
        assert!(current.distance(*target) < 1e-2, "ornament {} did not arrive", i);
        let (_, _, translation) = buffer.get(i).unwrap().to_scale_rotation_translation();
        assert!(translation.distance(*current) < 1e-4);
    }
}

#[test]
fn test_scene_blend_is_monotonic_per_mode() {
    let mut scene = small_scene(1);
    let mut frames = fixed_frames(DT);

    scene.toggle();
    let mut last = 0.0;
    for frame in frames.by_ref().take(400) {
        scene.update(frame);
        let blend = scene.morph_uniform().blend;
        assert!(blend >= last && blend <= 1.0);
        last = blend;
    }

    scene.toggle();
    for frame in frames.take(400) {
        scene.update(frame);
        let blend = scene.morph_uniform().blend;
        assert!(blend <= last && blend >= 0.0);
        last = blend;
    }
}

#[test]
fn test_double_toggle_has_no_jump() {
    let mut scene = small_scene(2);
    let mut frames = fixed_frames(DT);

    scene.toggle();
    for frame in frames.by_ref().take(60) {
        scene.update(frame);
    }

    let blend_before = scene.morph_uniform().blend;
    let before: Vec<Vec<Vec3>> = scene
        .layers()
        .iter()
        .map(|l| l.group.current_positions().to_vec())
        .collect();
    let star_before = scene.star().position();

    assert_eq!(scene.toggle(), Mode::Chaos);
    assert_eq!(scene.toggle(), Mode::Formed);
    let next = frames.next().unwrap();
    scene.update(next);

    // One frame of motion at most: the step factor bounds how far anything moves
    let max_step = (next.delta * 2.5 * 1.4).min(1.0);
    for (layer, old) in scene.layers().iter().zip(&before) {
        let positions = layer.group.positions();
        for (i, (now, was)) in layer.group.current_positions().iter().zip(old).enumerate() {
            let gap = was.distance(positions.target[i]);
            assert!(now.distance(*was) <= gap * max_step + 1e-5);
        }
    }
    assert!(scene.morph_uniform().blend >= blend_before);
    assert!(scene.star().position().distance(star_before) < 1.0);
}

#[test]
fn test_toggle_mid_run_retargets_without_reset() {
    let mut scene = small_scene(3);
    let mut frames = fixed_frames(DT);
    scene.toggle();
    for frame in frames.by_ref().take(30) {
        scene.update(frame);
    }
    let partial = scene.morph_uniform().blend;
    assert!(partial > 0.0 && partial < 1.0);

    scene.toggle();
    scene.update(frames.next().unwrap());
    let after = scene.morph_uniform().blend;
    assert!(after < partial && after > 0.0);
}

#[test]
fn test_scene_settles_back_into_chaos() {
    let mut scene = small_scene(4);
    let mut frames = fixed_frames(DT);
    scene.toggle();
    for frame in frames.by_ref().take(500) {
        scene.update(frame);
    }
    scene.toggle();
    for frame in frames.take(1500) {
        scene.update(frame);
    }

    assert!(scene.morph_uniform().blend < 1e-4);
    for layer in scene.layers() {
        let chaos = &layer.group.positions().chaos;
        for (now, home) in layer.group.current_positions().iter().zip(chaos) {
            assert!(now.distance(*home) < 1e-2);
        }
    }
    assert!((scene.star().scale() - 0.1).abs() < 1e-3);
}

#[test]
fn test_empty_groups_are_harmless() {
    let mut config = SceneConfig {
        seed: Some(5),
        ..Default::default()
    };
    config.foliage.count = 0;
    for o in &mut config.ornaments {
        o.count = 0;
    }
    let mut scene = Scene::new(config).unwrap();
    scene.toggle();
    scene.update(FrameTime::new(DT, DT));

    assert_eq!(scene.foliage().count(), 0);
    for layer in scene.layers() {
        assert_eq!(layer.instances.dirty_marks(), 0);
    }
}
