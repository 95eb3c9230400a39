use std::sync::mpsc;

use anyhow::{Context, Result};
use image::RgbaImage;
use rasterizer::Bitmap;
use wgpu::util::DeviceExt;

use crate::compile::{FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL};

use super::context::GpuContext;
use super::program::{build_program, ShaderProgram, SAMPLER_BINDING, TEXTURE_BINDING, UNIFORM_BINDING};
use super::quad::QuadGeometry;
use super::texture::{upload_bitmap, SourceTexture};
use super::uniforms::QuadUniforms;

/// Format of the offscreen frame; matches the texture so readback is a plain copy.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Everything one draw needs, resolved once at setup.
///
/// Uniform, texture, and sampler bindings live in a single bind group built
/// here, so drawing never looks anything up by name.
pub struct QuadRenderer {
    pub program: ShaderProgram,
    pub texture: SourceTexture,
    pub geometry: QuadGeometry,
    pub uniforms: QuadUniforms,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl QuadRenderer {
    pub fn new(ctx: &GpuContext, bitmap: &Bitmap) -> Result<Self> {
        let (width, height) = bitmap.dimensions();
        ctx.ensure_fits(width, height)?;

        let texture = upload_bitmap(&ctx.device, &ctx.queue, bitmap);
        let program = build_program(
            &ctx.device,
            VERTEX_SHADER_GLSL,
            FRAGMENT_SHADER_GLSL,
            TARGET_FORMAT,
        )
        .context("failed to build quad shader program")?;
        let geometry = QuadGeometry::new(&ctx.device);

        let uniforms = QuadUniforms::new(width, height);
        let uniform_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad bind group"),
            layout: &program.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: UNIFORM_BINDING,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: TEXTURE_BINDING,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        Ok(Self {
            program,
            texture,
            geometry,
            uniforms,
            uniform_buffer,
            bind_group,
            width,
            height,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Renders the single frame into a fresh offscreen texture.
    ///
    /// The target is cleared to transparent black before the quad is drawn.
    pub fn draw(&self, ctx: &GpuContext) -> wgpu::Texture {
        let target = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frame target"),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());

        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_viewport(0.0, 0.0, self.width as f32, self.height as f32, 0.0, 1.0);
            render_pass.set_pipeline(&self.program.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.geometry.buffer.slice(..));
            render_pass.draw(0..self.geometry.vertex_count, 0..1);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));

        tracing::debug!(
            width = self.width,
            height = self.height,
            vertices = self.geometry.vertex_count,
            "submitted quad draw"
        );

        target
    }
}

/// Row pitch of a readback buffer, padded to wgpu's copy alignment.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Copies an RGBA8 texture back to host memory.
pub fn read_back(ctx: &GpuContext, texture: &wgpu::Texture) -> Result<RgbaImage> {
    let (width, height) = (texture.width(), texture.height());
    let bytes_per_row = padded_bytes_per_row(width);

    let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("frame readback"),
        size: u64::from(bytes_per_row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("readback encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    ctx.queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (sender, receiver) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    ctx.device
        .poll(wgpu::PollType::Wait)
        .context("failed to wait for frame readback")?;
    receiver
        .recv()
        .context("readback callback was dropped")?
        .context("failed to map readback buffer")?;

    let row_bytes = (width * 4) as usize;
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    {
        let mapped = slice.get_mapped_range();
        for row in mapped.chunks(bytes_per_row as usize).take(height as usize) {
            pixels.extend_from_slice(&row[..row_bytes]);
        }
    }
    buffer.unmap();

    RgbaImage::from_raw(width, height, pixels)
        .context("readback produced an unexpected number of bytes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(500), 2048);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(250), 1024);
    }
}
