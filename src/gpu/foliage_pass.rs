//! Point-sprite pass for the foliage cloud.
//!
//! Vertex data is uploaded once. Per frame only the 64-byte foliage
//! uniform changes.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{uniform_layout, DEPTH_FORMAT};
use crate::foliage::FoliageVertex;
use crate::scene::Scene;
use crate::shaders::foliage_wgsl;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct FoliageUniform {
    pub origin: [f32; 4],
    pub primary: [f32; 4],
    pub secondary: [f32; 4],
    pub blend: f32,
    pub time: f32,
    pub _pad: [f32; 2],
}

impl FoliageUniform {
    fn from_scene(scene: &Scene) -> Self {
        let config = scene.foliage().config();
        let morph = scene.morph_uniform();
        Self {
            origin: scene.origin().extend(1.0).to_array(),
            primary: config.primary_color.extend(1.0).to_array(),
            secondary: config.secondary_color.extend(1.0).to_array(),
            blend: morph.blend,
            time: morph.time,
            _pad: [0.0; 2],
        }
    }
}

pub(crate) struct FoliagePass {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    count: u32,
}

impl FoliagePass {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
        scene: &Scene,
    ) -> Self {
        let mut vertices = scene.foliage().vertices();
        let count = vertices.len() as u32;
        if vertices.is_empty() {
            // wgpu rejects empty vertex slices; nothing is drawn anyway
            vertices.push(FoliageVertex::zeroed());
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Foliage Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Foliage Uniform Buffer"),
            contents: bytemuck::bytes_of(&FoliageUniform::from_scene(scene)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layout = uniform_layout(device, "Foliage Bind Group Layout");
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Foliage Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Foliage Shader"),
            source: wgpu::ShaderSource::Wgsl(foliage_wgsl(scene.foliage().config()).into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Foliage Pipeline Layout"),
            bind_group_layouts: &[camera_layout, &layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Foliage Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<FoliageVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3, // chaos
                        },
                        wgpu::VertexAttribute {
                            offset: 12,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32, // size
                        },
                        wgpu::VertexAttribute {
                            offset: 16,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Float32x3, // target
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(color_target(surface_format))],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            vertex_buffer,
            uniform_buffer,
            bind_group,
            count,
        }
    }

    /// Push this frame's blend and time.
    pub fn upload(&self, queue: &wgpu::Queue, scene: &Scene) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&FoliageUniform::from_scene(scene)),
        );
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..6, 0..self.count);
    }
}

/// Sprites blend over whatever is already drawn.
fn color_target(format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
        write_mask: wgpu::ColorWrites::ALL,
    }
}

/// Tested against opaque meshes but never written, so overlapping sprites
/// don't clip each other.
fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: false,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<FoliageUniform>(), 64);
        assert_eq!(std::mem::offset_of!(FoliageUniform, blend), 48);
        assert_eq!(std::mem::offset_of!(FoliageVertex, target), 16);
    }

    #[test]
    fn test_sprites_blend_without_depth_writes() {
        let depth = depth_state();
        assert!(!depth.depth_write_enabled);
        assert_eq!(depth.depth_compare, wgpu::CompareFunction::Less);

        let target = color_target(wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(target.blend, Some(wgpu::BlendState::ALPHA_BLENDING));
    }
}
