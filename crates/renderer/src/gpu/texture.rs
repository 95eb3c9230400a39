use rasterizer::Bitmap;
use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::fragment::texture_rows;

/// Fixed sampling state of the text texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingParams {
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub wrap_u: wgpu::AddressMode,
    pub wrap_v: wgpu::AddressMode,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            wrap_u: wgpu::AddressMode::ClampToEdge,
            wrap_v: wgpu::AddressMode::ClampToEdge,
        }
    }
}

impl SamplingParams {
    /// Sampler for a single-level texture; the mip filter is irrelevant.
    pub fn sampler_descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("text texture sampler"),
            address_mode_u: self.wrap_u,
            address_mode_v: self.wrap_v,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: self.mag_filter,
            min_filter: self.min_filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        }
    }
}

/// GPU copy of the text bitmap.
///
/// Not bound to any slot on creation; the quad renderer binds it.
pub struct SourceTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub params: SamplingParams,
}

impl SourceTexture {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Copies `bitmap` into a new RGBA8 texture, rows bottom-to-top, no mipmaps.
pub fn upload_bitmap(device: &wgpu::Device, queue: &wgpu::Queue, bitmap: &Bitmap) -> SourceTexture {
    let (width, height) = bitmap.dimensions();
    let rows = texture_rows(bitmap);

    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("text texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        &rows,
    );

    let params = SamplingParams::default();
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&params.sampler_descriptor());

    tracing::debug!(width, height, ?params, "uploaded text texture");

    SourceTexture {
        texture,
        view,
        sampler,
        params,
    }
}
