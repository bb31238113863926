use bytemuck::{Pod, Zeroable};
use wgpu::*;

/// Texture slot selectors carried per-vertex (integer-valued floats, matched
/// in the shader).
pub const TEX_ASPHALT: f32 = 0.0;
pub const TEX_WALL: f32 = 1.0;
pub const TEX_SIGN: f32 = 2.0;
pub const TEX_STEAM: f32 = 3.0;

/// One corner of the static scene stream. Triangles are not indexed; every
/// triangle carries its own flat tangent basis, so corners are intentionally
/// duplicated. For steam billboards the color channel carries a scalar
/// intensity instead of a tint.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 4],
    pub color: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tex_id: f32,
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl SceneVertex {
    pub fn desc() -> VertexBufferLayout<'static> {
        const F32: u64 = std::mem::size_of::<f32>() as u64;
        VertexBufferLayout {
            array_stride: std::mem::size_of::<SceneVertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x4,
                },
                VertexAttribute {
                    offset: 4 * F32,
                    shader_location: 1,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: 7 * F32,
                    shader_location: 2,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: 10 * F32,
                    shader_location: 3,
                    format: VertexFormat::Float32x2,
                },
                VertexAttribute {
                    offset: 12 * F32,
                    shader_location: 4,
                    format: VertexFormat::Float32,
                },
                VertexAttribute {
                    offset: 13 * F32,
                    shader_location: 5,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: 16 * F32,
                    shader_location: 6,
                    format: VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_stride_matches_attribute_layout() {
        // 19 floats, tightly packed.
        assert_eq!(std::mem::size_of::<SceneVertex>(), 19 * 4);
    }
}
