//! Main color pass over the full vertex stream: textured, normal-mapped,
//! lit by the 3 alley lights and shadow-tested against the depth maps the
//! shadow passes wrote earlier in the same frame.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use wgpu::*;

use crate::render::shadows::ShadowMaps;
use crate::render::textures::{load_or_fallback, WgpuTexture};
use crate::scene::vertex::SceneVertex;
use crate::scene::{LightRig, LIGHT_COUNT};
use crate::settings::ViewerSettings;
use crate::shaders::ALLEY_SHADER;

/// The five surface textures the alley samples from. Any of them may be a
/// 1x1 fallback when the file next to the executable is missing.
pub struct SceneTextures {
    pub asphalt: WgpuTexture,
    pub wall: WgpuTexture,
    pub sign: WgpuTexture,
    pub asphalt_normal: WgpuTexture,
    pub wall_normal: WgpuTexture,
}

impl SceneTextures {
    pub fn load(device: &Device, queue: &Queue) -> Self {
        // flat normal (0.5, 0.5, 1.0) keeps normal mapping a no-op when the
        // map is missing
        let flat_normal = [128, 128, 255, 255];
        Self {
            asphalt: load_or_fallback(device, queue, "asphalt.jpg", true, [60, 60, 64, 255]),
            wall: load_or_fallback(device, queue, "wall.jpg", true, [96, 88, 84, 255]),
            sign: load_or_fallback(device, queue, "sign3.png", true, [220, 40, 160, 255]),
            asphalt_normal: load_or_fallback(device, queue, "asphalt_n.jpg", false, flat_normal),
            wall_normal: load_or_fallback(device, queue, "wall_n.jpg", false, flat_normal),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SceneUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    light_space: [[[f32; 4]; 4]; LIGHT_COUNT],
    light_pos: [[f32; 4]; LIGHT_COUNT],
    light_color: [[f32; 4]; LIGHT_COUNT],
    view_pos: [f32; 4],
    // use_textures, use_normal_map, use_fog, use_shadows
    toggles: [f32; 4],
    // exposure, gamma, time_sec, unused
    params: [f32; 4],
}

/// Everything the color pass needs from one frame.
pub struct FrameInputs<'a> {
    pub view: Mat4,
    pub proj: Mat4,
    pub model: Mat4,
    pub camera_pos: Vec3,
    pub lights: &'a LightRig,
    pub light_space: [Mat4; LIGHT_COUNT],
    pub settings: ViewerSettings,
    pub time_sec: f32,
}

pub struct ScenePass {
    pipeline: RenderPipeline,
    uniform_buffer: Buffer,
    bind_group: BindGroup,
}

impl ScenePass {
    pub fn new(
        device: &Device,
        surface_format: TextureFormat,
        textures: &SceneTextures,
        shadows: &ShadowMaps,
    ) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Alley Shader"),
            source: ShaderSource::Wgsl(ALLEY_SHADER.into()),
        });

        let texture_entry = |binding: u32| BindGroupLayoutEntry {
            binding,
            visibility: ShaderStages::FRAGMENT,
            ty: BindingType::Texture {
                sample_type: TextureSampleType::Float { filterable: true },
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let shadow_entry = |binding: u32| BindGroupLayoutEntry {
            binding,
            visibility: ShaderStages::FRAGMENT,
            ty: BindingType::Texture {
                sample_type: TextureSampleType::Depth,
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Alley Bind Group Layout"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                texture_entry(4),
                texture_entry(5),
                BindGroupLayoutEntry {
                    binding: 6,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
                shadow_entry(7),
                shadow_entry(8),
                shadow_entry(9),
                BindGroupLayoutEntry {
                    binding: 10,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let uniform_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("Alley Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SceneUniforms::zeroed()]),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Alley Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::TextureView(&textures.asphalt.view),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::TextureView(&textures.wall.view),
                },
                BindGroupEntry {
                    binding: 3,
                    resource: BindingResource::TextureView(&textures.sign.view),
                },
                BindGroupEntry {
                    binding: 4,
                    resource: BindingResource::TextureView(&textures.asphalt_normal.view),
                },
                BindGroupEntry {
                    binding: 5,
                    resource: BindingResource::TextureView(&textures.wall_normal.view),
                },
                BindGroupEntry {
                    binding: 6,
                    resource: BindingResource::Sampler(&textures.asphalt.sampler),
                },
                BindGroupEntry {
                    binding: 7,
                    resource: BindingResource::TextureView(&shadows.depth_views[0]),
                },
                BindGroupEntry {
                    binding: 8,
                    resource: BindingResource::TextureView(&shadows.depth_views[1]),
                },
                BindGroupEntry {
                    binding: 9,
                    resource: BindingResource::TextureView(&shadows.depth_views[2]),
                },
                BindGroupEntry {
                    binding: 10,
                    resource: BindingResource::Sampler(&shadows.compare_sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Alley Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let blend_state = BlendState {
            color: BlendComponent {
                src_factor: BlendFactor::SrcAlpha,
                dst_factor: BlendFactor::OneMinusSrcAlpha,
                operation: BlendOperation::Add,
            },
            alpha: BlendComponent {
                src_factor: BlendFactor::One,
                dst_factor: BlendFactor::OneMinusSrcAlpha,
                operation: BlendOperation::Add,
            },
        };

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Alley Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[SceneVertex::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(blend_state),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: TextureFormat::Depth24PlusStencil8,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn render(
        &self,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: &TextureView,
        vertex_buffer: &Buffer,
        vertex_count: u32,
        frame: &FrameInputs,
    ) {
        let as_vec4 = |v: Vec3| [v.x, v.y, v.z, 1.0];

        let uniforms = SceneUniforms {
            view: frame.view.to_cols_array_2d(),
            proj: frame.proj.to_cols_array_2d(),
            model: frame.model.to_cols_array_2d(),
            light_space: [
                frame.light_space[0].to_cols_array_2d(),
                frame.light_space[1].to_cols_array_2d(),
                frame.light_space[2].to_cols_array_2d(),
            ],
            light_pos: [
                as_vec4(frame.lights.positions[0]),
                as_vec4(frame.lights.positions[1]),
                as_vec4(frame.lights.positions[2]),
            ],
            light_color: [
                as_vec4(frame.lights.colors[0]),
                as_vec4(frame.lights.colors[1]),
                as_vec4(frame.lights.colors[2]),
            ],
            view_pos: as_vec4(frame.camera_pos),
            toggles: [
                1.0,
                frame.settings.normal_mapping as i32 as f32,
                frame.settings.fog as i32 as f32,
                frame.settings.shadows as i32 as f32,
            ],
            params: [1.15, 2.2, frame.time_sec, 0.0],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Alley Color Pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(Color {
                        r: 0.02,
                        g: 0.02,
                        b: 0.03,
                        a: 1.0,
                    }),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.draw(0..vertex_count, 0..1);
    }
}
