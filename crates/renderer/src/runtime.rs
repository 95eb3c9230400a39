use std::fmt;

use anyhow::{Context, Result};
use image::RgbaImage;
use rasterizer::Bitmap;

use crate::compile::{compile_program, FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL};
use crate::gpu::{read_back, GpuContext, QuadRenderer};
use crate::reference::render_reference;
use crate::types::{AdapterProfile, BackendChoice};

/// Path that actually produced a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsedBackend {
    Gpu { adapter: AdapterProfile },
    Cpu,
}

impl fmt::Display for UsedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsedBackend::Gpu { adapter } => write!(f, "gpu ({})", adapter.name),
            UsedBackend::Cpu => f.write_str("cpu"),
        }
    }
}

/// One rendered frame; pixels are premultiplied, rows top-to-bottom.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub pixels: RgbaImage,
    pub backend: UsedBackend,
}

/// Renders the bitmap through the quad program exactly once.
pub fn render(bitmap: &Bitmap, choice: BackendChoice) -> Result<RenderedFrame> {
    match choice {
        BackendChoice::Cpu => render_cpu(bitmap),
        BackendChoice::Gpu => render_gpu(bitmap),
        BackendChoice::Auto => match GpuContext::headless() {
            Ok(ctx) => render_with(&ctx, bitmap),
            Err(err) => {
                tracing::warn!("no GPU available ({err:#}); using CPU reference renderer");
                render_cpu(bitmap)
            }
        },
    }
}

fn render_gpu(bitmap: &Bitmap) -> Result<RenderedFrame> {
    let ctx = GpuContext::headless()?;
    render_with(&ctx, bitmap)
}

/// Draws on an existing context and reads the frame back.
pub fn render_with(ctx: &GpuContext, bitmap: &Bitmap) -> Result<RenderedFrame> {
    let renderer = QuadRenderer::new(ctx, bitmap)?;
    let target = renderer.draw(ctx);
    let pixels = read_back(ctx, &target).context("failed to read rendered frame")?;
    Ok(RenderedFrame {
        pixels,
        backend: UsedBackend::Gpu {
            adapter: ctx.adapter_profile.clone(),
        },
    })
}

fn render_cpu(bitmap: &Bitmap) -> Result<RenderedFrame> {
    compile_program(VERTEX_SHADER_GLSL, FRAGMENT_SHADER_GLSL)
        .context("failed to build quad shader program")?;
    let pixels = render_reference(bitmap);
    tracing::debug!(
        width = pixels.width(),
        height = pixels.height(),
        "rendered frame on CPU"
    );
    Ok(RenderedFrame {
        pixels,
        backend: UsedBackend::Cpu,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn cpu_backend_renders_premultiplied_frame() {
        let bitmap = Bitmap::from_image(RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 128])));
        let frame = render(&bitmap, BackendChoice::Cpu).unwrap();
        assert_eq!(frame.backend, UsedBackend::Cpu);
        assert_eq!(frame.pixels.dimensions(), (8, 8));
        assert!(frame.pixels.pixels().all(|pixel| pixel.0 == [128, 0, 0, 128]));
    }

    #[test]
    fn auto_backend_always_produces_a_frame() {
        let bitmap = Bitmap::from_image(RgbaImage::new(4, 4));
        let frame = render(&bitmap, BackendChoice::Auto).unwrap();
        assert_eq!(frame.pixels.dimensions(), (4, 4));
    }

    #[test]
    fn backend_display_names() {
        assert_eq!(UsedBackend::Cpu.to_string(), "cpu");
    }
}
