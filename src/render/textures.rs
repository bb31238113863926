use wgpu::*;

pub struct WgpuTexture {
    pub texture: Texture,
    pub view: TextureView,
    pub sampler: Sampler,
}

fn upload_rgba(
    device: &Device,
    queue: &Queue,
    label: &str,
    width: u32,
    height: u32,
    pixels: &[u8],
    srgb: bool,
) -> WgpuTexture {
    let size = Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let format = if srgb {
        TextureFormat::Rgba8UnormSrgb
    } else {
        TextureFormat::Rgba8Unorm
    };
    let texture = device.create_texture(&TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: Origin3d::ZERO,
            aspect: TextureAspect::All,
        },
        pixels,
        ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&TextureViewDescriptor::default());
    let sampler = device.create_sampler(&SamplerDescriptor {
        address_mode_u: AddressMode::Repeat,
        address_mode_v: AddressMode::Repeat,
        address_mode_w: AddressMode::Repeat,
        mag_filter: FilterMode::Linear,
        min_filter: FilterMode::Linear,
        mipmap_filter: FilterMode::Linear,
        ..Default::default()
    });

    WgpuTexture {
        texture,
        view,
        sampler,
    }
}

/// Decode an image file into an RGBA8 texture. Albedo maps want `srgb`,
/// normal maps are linear data.
pub fn load_texture_2d(
    device: &Device,
    queue: &Queue,
    path: &str,
    srgb: bool,
) -> Result<WgpuTexture, String> {
    let data = std::fs::read(path).map_err(|e| format!("failed to read {}: {}", path, e))?;
    let img = image::load_from_memory(&data)
        .map_err(|e| format!("failed to decode {}: {}", path, e))?
        .to_rgba8();

    log::info!("texture OK: {} ({}x{})", path, img.width(), img.height());
    Ok(upload_rgba(device, queue, path, img.width(), img.height(), &img, srgb))
}

/// 1x1 solid-color stand-in for a missing texture so the pipeline layout
/// stays uniform when an asset fails to load.
pub fn solid_texture(device: &Device, queue: &Queue, rgba: [u8; 4], srgb: bool) -> WgpuTexture {
    upload_rgba(device, queue, "Fallback Texture", 1, 1, &rgba, srgb)
}

/// Load with a flat fallback: decode failures are logged and degrade to a
/// solid color, never fatal.
pub fn load_or_fallback(
    device: &Device,
    queue: &Queue,
    path: &str,
    srgb: bool,
    fallback_rgba: [u8; 4],
) -> WgpuTexture {
    match load_texture_2d(device, queue, path, srgb) {
        Ok(tex) => tex,
        Err(e) => {
            log::warn!("{}; rendering without it", e);
            solid_texture(device, queue, fallback_rgba, srgb)
        }
    }
}
