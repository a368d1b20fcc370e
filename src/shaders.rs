//! WGSL sources for the two render passes.
//!
//! The foliage shader is generated per scene so the wobble and attenuation
//! constants are baked in; the mesh shader is static and takes everything
//! from its material uniform.
//!
//! Both share the camera block at `@group(0) @binding(0)`:
//!
//! | field | type | notes |
//! |-------|------|-------|
//! | `view` | `mat4x4<f32>` | |
//! | `proj` | `mat4x4<f32>` | |
//! | `eye` | `vec4<f32>` | world-space camera position |
//! | `viewport` | `vec2<f32>` | surface size in pixels |
//! | `time` | `f32` | elapsed seconds |

use crate::config::FoliageConfig;
use crate::foliage::{AMBIENT, LIGHT_DIRECTION, SHININESS, SPECULAR_COLOR, SPECULAR_STRENGTH, TINT_VARIANCE};
use crate::Vec3;

/// World-space position of the key light used by the mesh shader.
pub const KEY_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 20.0, 10.0);

const CAMERA_WGSL: &str = r#"struct Camera {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    eye: vec4<f32>,
    viewport: vec2<f32>,
    time: f32,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> camera: Camera;
"#;

fn vec3_literal(v: Vec3) -> String {
    format!("vec3<f32>({:?}, {:?}, {:?})", v.x, v.y, v.z)
}

/// Point-sprite shader for the foliage cloud.
///
/// Each particle is one instance of a six-vertex camera-facing quad. The
/// vertex stage mixes the chaos and tree positions by the blend uniform,
/// adds the bob, and sizes the quad in pixels with perspective attenuation.
/// The fragment stage shades the quad as a soft sphere and discards
/// outside the unit circle.
pub fn foliage_wgsl(config: &FoliageConfig) -> String {
    let wobble_frequency = config.wobble_frequency;
    let wobble_amplitude = config.wobble_amplitude;
    let size_attenuation = config.size_attenuation;
    let light_direction = vec3_literal(LIGHT_DIRECTION);
    let specular_color = vec3_literal(SPECULAR_COLOR);
    let diffuse_share = 1.0 - AMBIENT;

    format!(
        r#"{CAMERA_WGSL}
struct Foliage {{
    origin: vec4<f32>,
    primary: vec4<f32>,
    secondary: vec4<f32>,
    blend: f32,
    time: f32,
    _pad: vec2<f32>,
}};

@group(1) @binding(0)
var<uniform> foliage: Foliage;

const WOBBLE_FREQUENCY: f32 = {wobble_frequency:?};
const WOBBLE_AMPLITUDE: f32 = {wobble_amplitude:?};
const SIZE_ATTENUATION: f32 = {size_attenuation:?};

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) local_pos: vec3<f32>,
}};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) chaos_pos: vec3<f32>,
    @location(1) size: f32,
    @location(2) target_pos: vec3<f32>,
) -> VertexOutput {{
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let corner = corners[vertex_index];

    var pos = mix(chaos_pos, target_pos, vec3<f32>(foliage.blend));
    pos.y += sin(foliage.time * WOBBLE_FREQUENCY + pos.x) * WOBBLE_AMPLITUDE;

    let view_pos = camera.view * vec4<f32>(pos + foliage.origin.xyz, 1.0);
    var clip_pos = camera.proj * view_pos;

    // Pixel diameter, then half of it in NDC per axis
    let pixels = size * (SIZE_ATTENUATION / max(-view_pos.z, 0.001));
    clip_pos.x += corner.x * pixels / camera.viewport.x * clip_pos.w;
    clip_pos.y += corner.y * pixels / camera.viewport.y * clip_pos.w;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.uv = corner;
    out.local_pos = pos;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let r = dot(in.uv, in.uv);
    if r > 1.0 {{
        discard;
    }}

    let normal = normalize(vec3<f32>(in.uv, sqrt(1.0 - r)));
    let light_dir = normalize({light_direction});
    let diffuse = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let specular = pow(max(dot(vec3<f32>(0.0, 0.0, 1.0), reflect_dir), 0.0), {SHININESS:?});

    let h = sin(in.local_pos.x * 12.9898 + in.local_pos.y * 78.233) * 43758.5453;
    let variance = fract(h) * {TINT_VARIANCE:?};
    let base = mix(foliage.primary.rgb, foliage.secondary.rgb, vec3<f32>(variance));

    let color = base * ({AMBIENT:?} + {diffuse_share:?} * diffuse)
        + {specular_color} * specular * {SPECULAR_STRENGTH:?};
    return vec4<f32>(color, 1.0);
}}
"#
    )
}

/// Lit instanced mesh shader used by ornaments and the star.
///
/// Per-instance model matrices arrive as four `vec4` attributes at
/// locations 2..=5. The material block at `@group(1) @binding(0)` holds
/// base colour (alpha in `w`), emissive colour, the group origin and
/// `params`: `x` metalness, `y` roughness, `z > 0.5` for unlit.
pub fn mesh_wgsl() -> String {
    let key_light = vec3_literal(KEY_LIGHT_POSITION);

    format!(
        r#"{CAMERA_WGSL}
struct Material {{
    color: vec4<f32>,
    emissive: vec4<f32>,
    origin: vec4<f32>,
    params: vec4<f32>,
}};

@group(1) @binding(0)
var<uniform> material: Material;

const KEY_LIGHT: vec3<f32> = {key_light};

struct VertexInput {{
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
}};

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {{
    let model = mat4x4<f32>(in.model_0, in.model_1, in.model_2, in.model_3);
    let world = model * vec4<f32>(in.position, 1.0) + vec4<f32>(material.origin.xyz, 0.0);

    var out: VertexOutput;
    out.clip_position = camera.proj * camera.view * world;
    out.world_pos = world.xyz;
    out.normal = (model * vec4<f32>(in.normal, 0.0)).xyz;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    if material.params.z > 0.5 {{
        return material.color;
    }}

    let base = material.color.rgb;
    let metalness = material.params.x;
    let roughness = clamp(material.params.y, 0.02, 1.0);

    let n = normalize(in.normal);
    let v = normalize(camera.eye.xyz - in.world_pos);
    let l = normalize(KEY_LIGHT - in.world_pos);
    let h = normalize(l + v);

    let diffuse = max(dot(n, l), 0.0) * (1.0 - metalness);
    let shininess = exp2(10.0 * (1.0 - roughness) + 1.0);
    let f0 = mix(vec3<f32>(0.04), base, vec3<f32>(metalness));
    let specular = f0 * pow(max(dot(n, h), 0.0), shininess);

    // Cheap sky/ground term so metals are not black without an environment map
    let sky = 0.5 + 0.5 * n.y;
    let ambient = base * (0.15 + 0.35 * metalness * sky);

    let color = ambient + base * diffuse + specular + material.emissive.rgb;
    return vec4<f32>(color, material.color.a);
}}
"#
    )
}
