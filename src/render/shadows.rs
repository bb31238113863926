//! Per-light shadow-map state: one depth target and one light-space
//! transform per light, rebuilt every frame because the key light moves.
//! The depth passes render only the shadow-caster range; steam never casts
//! and the ground is the receiving plane, so neither goes in.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use wgpu::*;

use crate::scene::vertex::SceneVertex;
use crate::scene::{SceneRanges, LIGHT_COUNT};
use crate::shaders::SHADOW_DEPTH_SHADER;

pub const SHADOW_RESOLUTION: u32 = 2048;

// All lights aim at the alley's mid-height center, directional-ish.
const SHADOW_TARGET: Vec3 = Vec3::new(0.0, 0.0, 1.6);

// Orthographic volume tuned to the alley's physical size.
const ORTHO_HALF_X: f32 = 4.0;
const ORTHO_HALF_Y: f32 = 7.0;
const NEAR_Z: f32 = 0.1;
const FAR_Z: f32 = 25.0;

/// View from the light toward the fixed scene target. The up vector swaps to
/// +Y when the light sits nearly on the vertical axis through the target,
/// where +Z would be parallel to the view direction.
pub fn light_view(light_pos: Vec3) -> Mat4 {
    let mut up = Vec3::Z;
    if (SHADOW_TARGET - light_pos).normalize().dot(up).abs() > 0.98 {
        up = Vec3::Y;
    }
    Mat4::look_at_rh(light_pos, SHADOW_TARGET, up)
}

/// Combined view x projection mapping world positions into the light's
/// depth-comparison space. The main pass must use this exact matrix for its
/// shadow test or lookups silently misalign.
pub fn light_space_matrix(light_pos: Vec3) -> Mat4 {
    let proj = Mat4::orthographic_rh(
        -ORTHO_HALF_X,
        ORTHO_HALF_X,
        -ORTHO_HALF_Y,
        ORTHO_HALF_Y,
        NEAR_Z,
        FAR_Z,
    );
    proj * light_view(light_pos)
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ShadowUniforms {
    light_space: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

pub struct ShadowMaps {
    pipeline: RenderPipeline,
    uniform_buffers: Vec<Buffer>,
    bind_groups: Vec<BindGroup>,
    pub depth_views: Vec<TextureView>,
    pub compare_sampler: Sampler,
}

impl ShadowMaps {
    pub fn new(device: &Device) -> Self {
        let mut depth_views = Vec::with_capacity(LIGHT_COUNT);
        for i in 0..LIGHT_COUNT {
            let texture = device.create_texture(&TextureDescriptor {
                label: Some("Shadow Depth Texture"),
                size: Extent3d {
                    width: SHADOW_RESOLUTION,
                    height: SHADOW_RESOLUTION,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: TextureDimension::D2,
                format: TextureFormat::Depth32Float,
                usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            log::debug!("shadow target {} allocated at {} px", i, SHADOW_RESOLUTION);
            depth_views.push(texture.create_view(&TextureViewDescriptor::default()));
        }

        let compare_sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("Shadow Compare Sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Nearest,
            compare: Some(CompareFunction::LessEqual),
            ..Default::default()
        });

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Shadow Depth Shader"),
            source: ShaderSource::Wgsl(SHADOW_DEPTH_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Shadow Bind Group Layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[SceneVertex::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: None,
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: CompareFunction::LessEqual,
                stencil: StencilState::default(),
                // constant + slope bias against self-shadow acne
                bias: DepthBiasState {
                    constant: 2,
                    slope_scale: 4.0,
                    clamp: 0.0,
                },
            }),
            multisample: MultisampleState::default(),
            multiview: None,
        });

        let mut uniform_buffers = Vec::with_capacity(LIGHT_COUNT);
        let mut bind_groups = Vec::with_capacity(LIGHT_COUNT);
        for _ in 0..LIGHT_COUNT {
            let buffer = device.create_buffer_init(&util::BufferInitDescriptor {
                label: Some("Shadow Uniform Buffer"),
                contents: bytemuck::cast_slice(&[ShadowUniforms {
                    light_space: Mat4::IDENTITY.to_cols_array_2d(),
                    model: Mat4::IDENTITY.to_cols_array_2d(),
                }]),
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            });
            let bind_group = device.create_bind_group(&BindGroupDescriptor {
                label: Some("Shadow Bind Group"),
                layout: &bind_group_layout,
                entries: &[BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            uniform_buffers.push(buffer);
            bind_groups.push(bind_group);
        }

        Self {
            pipeline,
            uniform_buffers,
            bind_groups,
            depth_views,
            compare_sampler,
        }
    }

    /// Depth-only pass per light, drawing exactly the shadow-caster range
    /// with this frame's transforms. `transforms[i]` must be the same matrix
    /// the main pass uses to test against `depth_views[i]`.
    pub fn render(
        &self,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        vertex_buffer: &Buffer,
        ranges: &SceneRanges,
        model: Mat4,
        transforms: &[Mat4; LIGHT_COUNT],
    ) {
        for i in 0..LIGHT_COUNT {
            let uniforms = ShadowUniforms {
                light_space: transforms[i].to_cols_array_2d(),
                model: model.to_cols_array_2d(),
            };
            queue.write_buffer(&self.uniform_buffers[i], 0, bytemuck::cast_slice(&[uniforms]));
        }

        for i in 0..LIGHT_COUNT {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_views[i],
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
            pass.set_bind_group(0, &self.bind_groups[i], &[]);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.draw(
                ranges.casters_first..ranges.casters_first + ranges.shadow_casters_count,
                0..1,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_view_inverse_reproduces_light_position() {
        let light = Vec3::new(-1.5, -4.7, 0.3);
        let eye = light_view(light).inverse().transform_point3(Vec3::ZERO);
        assert!((eye - light).length() < 1e-4);
    }

    #[test]
    fn up_vector_swaps_when_light_is_overhead() {
        // Light straight above the target: +Z is parallel to the view
        // direction, so the matrix must still be well formed.
        let light = Vec3::new(0.0, 0.0, 12.0);
        let m = light_space_matrix(light);
        assert!(m.to_cols_array().iter().all(|f| f.is_finite()));

        let eye = light_view(light).inverse().transform_point3(Vec3::ZERO);
        assert!((eye - light).length() < 1e-3);
    }

    #[test]
    fn target_center_projects_inside_the_ortho_volume() {
        for light in [
            Vec3::new(-1.5, -4.7, 0.3),
            Vec3::new(2.0, 0.5, 2.9),
            Vec3::new(0.0, 2.5, 4.1),
        ] {
            let clip = light_space_matrix(light) * SHADOW_TARGET.extend(1.0);
            let ndc = clip / clip.w;
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
            assert!((0.0..=1.0).contains(&ndc.z));
        }
    }
}
