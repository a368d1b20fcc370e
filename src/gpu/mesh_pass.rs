//! Instanced mesh pass for ornaments and the star.
//!
//! One batch per instance buffer. Instance data is re-uploaded only for
//! buffers whose dirty flag was set since the last frame.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{uniform_layout, DEPTH_FORMAT};
use crate::config::OrnamentConfig;
use crate::instance::{InstanceBuffer, InstanceRaw, InstanceSink};
use crate::mesh::{Mesh, MeshVertex};
use crate::scene::Scene;
use crate::shaders::mesh_wgsl;
use crate::star::{CORE_RADIUS, GLOW_RADIUS};
use crate::{Vec3, Vec4};

/// Emissive multiplier for glowing ornaments and the star rays.
const EMISSIVE_INTENSITY: f32 = 2.0;
/// Emissive multiplier for the star core.
const CORE_EMISSIVE_INTENSITY: f32 = 4.0;
/// Opacity of the star's glow shell.
const GLOW_ALPHA: f32 = 0.5;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct MaterialUniform {
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    pub origin: [f32; 4],
    /// x metalness, y roughness, z unlit flag.
    pub params: [f32; 4],
}

impl MaterialUniform {
    fn lit(color: Vec3, emissive: Vec3, origin: Vec3, metalness: f32, roughness: f32) -> Self {
        Self {
            color: color.extend(1.0).to_array(),
            emissive: emissive.extend(0.0).to_array(),
            origin: origin.extend(1.0).to_array(),
            params: [metalness, roughness, 0.0, 0.0],
        }
    }

    fn unlit(color: Vec4, origin: Vec3) -> Self {
        Self {
            color: color.to_array(),
            emissive: [0.0; 4],
            origin: origin.extend(1.0).to_array(),
            params: [0.0, 1.0, 1.0, 0.0],
        }
    }

    fn ornament(config: &OrnamentConfig, origin: Vec3) -> Self {
        let emissive = if config.emissive {
            config.color * EMISSIVE_INTENSITY
        } else {
            Vec3::ZERO
        };
        Self::lit(config.color, emissive, origin, config.metalness, config.roughness)
    }
}

struct MeshBatch {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    bind_group: wgpu::BindGroup,
}

impl MeshBatch {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        mesh: &Mesh,
        instances: &InstanceBuffer,
        material: MaterialUniform,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_count = instances.len() as u32;
        let mut raw = instances.raw().to_vec();
        if raw.is_empty() {
            raw.push(InstanceRaw::zeroed());
        }
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", label)),
            contents: bytemuck::cast_slice(&raw),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", label)),
            contents: bytemuck::bytes_of(&material),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", label)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            instance_buffer,
            instance_count,
            bind_group,
        }
    }

    /// Upload if the buffer was flagged since the last call.
    fn sync(&self, queue: &wgpu::Queue, instances: &mut InstanceBuffer) {
        if instances.take_dirty() && self.instance_count > 0 {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances.raw()));
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.instance_count == 0 {
            return;
        }
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }
}

pub(crate) struct MeshPass {
    opaque: wgpu::RenderPipeline,
    translucent: wgpu::RenderPipeline,
    ornaments: Vec<MeshBatch>,
    star_core: MeshBatch,
    star_rays: MeshBatch,
    star_glow: MeshBatch,
}

impl MeshPass {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
        scene: &Scene,
    ) -> Self {
        let layout = uniform_layout(device, "Material Bind Group Layout");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(mesh_wgsl().into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[camera_layout, &layout],
            push_constant_ranges: &[],
        });

        let opaque = create_pipeline(device, &pipeline_layout, &shader, surface_format, false);
        let translucent = create_pipeline(device, &pipeline_layout, &shader, surface_format, true);

        let origin = scene.origin();
        let ornaments = scene
            .layers()
            .iter()
            .map(|layer| {
                let config = layer.group.config();
                MeshBatch::new(
                    device,
                    &layout,
                    &config.name,
                    &Mesh::for_shape(config.shape),
                    &layer.instances,
                    MaterialUniform::ornament(config, origin),
                )
            })
            .collect();

        let star_color = scene.star().config().color;
        let parts = scene.star_parts();
        let star_core = MeshBatch::new(
            device,
            &layout,
            "Star Core",
            &Mesh::octahedron(CORE_RADIUS),
            &parts.core,
            MaterialUniform::lit(star_color, star_color * CORE_EMISSIVE_INTENSITY, origin, 0.0, 1.0),
        );
        let star_rays = MeshBatch::new(
            device,
            &layout,
            "Star Rays",
            &Mesh::cuboid(Vec3::ONE),
            &parts.rays,
            MaterialUniform::lit(star_color, star_color * EMISSIVE_INTENSITY, origin, 0.0, 1.0),
        );
        let star_glow = MeshBatch::new(
            device,
            &layout,
            "Star Glow",
            &Mesh::icosahedron(GLOW_RADIUS),
            &parts.glow,
            MaterialUniform::unlit(star_color.extend(GLOW_ALPHA), origin),
        );

        Self {
            opaque,
            translucent,
            ornaments,
            star_core,
            star_rays,
            star_glow,
        }
    }

    /// Upload every instance buffer the scene flagged this frame.
    pub fn upload(&self, queue: &wgpu::Queue, scene: &mut Scene) {
        for (batch, layer) in self.ornaments.iter().zip(scene.layers_mut()) {
            batch.sync(queue, &mut layer.instances);
        }
        let parts = scene.star_parts_mut();
        self.star_core.sync(queue, &mut parts.core);
        self.star_rays.sync(queue, &mut parts.rays);
        self.star_glow.sync(queue, &mut parts.glow);
    }

    /// Ornaments and the solid star parts, writing depth.
    pub fn draw_opaque(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.opaque);
        for batch in &self.ornaments {
            batch.draw(pass);
        }
        self.star_core.draw(pass);
        self.star_rays.draw(pass);
    }

    /// The star's glow shell, without depth writes. Draw last.
    pub fn draw_translucent(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.translucent);
        self.star_glow.draw(pass);
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    translucent: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(if translucent {
            "Mesh Pipeline (translucent)"
        } else {
            "Mesh Pipeline"
        }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        2 => Float32x4,
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4
                    ],
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(if translucent {
                    wgpu::BlendState::ALPHA_BLENDING
                } else {
                    wgpu::BlendState::REPLACE
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: !translucent,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
