use image::{Rgba, RgbaImage};
use rasterizer::Bitmap;
use renderer::gpu::{
    build_program, upload_bitmap, GpuContext, QuadRenderer, SamplingParams, TARGET_FORMAT,
};
use renderer::{
    render_reference, render_with, ProgramError, ShaderStageKind, UsedBackend,
    FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL,
};

const BROKEN_VERTEX: &str = r"#version 450
layout(location = 0) in vec2 position;
void main( {
    gl_Position = vec4(position, 0.0, 1.0);
}
";

const BROKEN_FRAGMENT: &str = r"#version 450
layout(location = 0) out vec4 outColor;
void main() {
    outColor = vec4(1.0, 0.0, 0.0, 1.0)
}
";

const FRAGMENT_WITH_VARYING: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;
void main() {
    outColor = vec4(v_uv, 0.0, 1.0);
}
";

fn gpu() -> Option<GpuContext> {
    match GpuContext::headless() {
        Ok(ctx) => Some(ctx),
        Err(err) => {
            eprintln!("skipping GPU test: {err:#}");
            None
        }
    }
}

/// Red/green/blue bands with a transparent corner, distinct top and bottom.
fn banded_bitmap(size: u32) -> Bitmap {
    let image = RgbaImage::from_fn(size, size, |x, y| {
        if x < size / 4 && y < size / 4 {
            Rgba([0, 0, 0, 0])
        } else if y < size / 3 {
            Rgba([255, 0, 0, 128])
        } else if y < 2 * size / 3 {
            Rgba([0, 255, 0, 255])
        } else {
            Rgba([0, 0, 255, 64])
        }
    });
    Bitmap::from_image(image)
}

#[test]
fn uploaded_texture_matches_bitmap() {
    let Some(ctx) = gpu() else { return };
    let bitmap = banded_bitmap(64);
    let texture = upload_bitmap(&ctx.device, &ctx.queue, &bitmap);
    assert_eq!(texture.dimensions(), (64, 64));
    assert_eq!(texture.params, SamplingParams::default());
    assert_eq!(texture.texture.mip_level_count(), 1);
}

#[test]
fn gpu_frame_matches_cpu_reference() {
    let Some(ctx) = gpu() else { return };
    let bitmap = banded_bitmap(64);

    let renderer = QuadRenderer::new(&ctx, &bitmap).expect("quad renderer");
    assert_eq!(renderer.dimensions(), (64, 64));
    assert_eq!(renderer.geometry.vertex_count, 6);

    let frame = render_with(&ctx, &bitmap).expect("gpu render");
    assert!(matches!(frame.backend, UsedBackend::Gpu { .. }));

    let expected = render_reference(&bitmap);
    assert_eq!(frame.pixels.dimensions(), expected.dimensions());
    for (x, y, actual) in frame.pixels.enumerate_pixels() {
        let reference = expected.get_pixel(x, y);
        for channel in 0..4 {
            let diff = (i16::from(actual.0[channel]) - i16::from(reference.0[channel])).abs();
            assert!(
                diff <= 2,
                "pixel ({x}, {y}) channel {channel}: gpu {:?} vs cpu {:?}",
                actual.0,
                reference.0
            );
        }
    }

    // Upright output: the transparent corner stays top-left.
    assert_eq!(frame.pixels.get_pixel(2, 2).0, [0, 0, 0, 0]);
    let band = frame.pixels.get_pixel(40, 4).0;
    assert!(band[0] > 100 && band[1] == 0 && band[3] > 100, "{band:?}");
}

#[test]
fn builtin_program_builds_on_device() {
    let Some(ctx) = gpu() else { return };
    build_program(&ctx.device, VERTEX_SHADER_GLSL, FRAGMENT_SHADER_GLSL, TARGET_FORMAT)
        .expect("builtin shaders build");
}

#[test]
fn broken_fragment_stage_is_named_on_device() {
    let Some(ctx) = gpu() else { return };
    let err = build_program(&ctx.device, VERTEX_SHADER_GLSL, BROKEN_FRAGMENT, TARGET_FORMAT)
        .err()
        .expect("fragment stage must fail");
    assert_eq!(err.stage(), Some(ShaderStageKind::Fragment));
    assert!(matches!(err, ProgramError::Compile { ref log, .. } if !log.is_empty()));
}

#[test]
fn broken_vertex_stage_is_named_on_device() {
    let Some(ctx) = gpu() else { return };
    let err = build_program(&ctx.device, BROKEN_VERTEX, FRAGMENT_SHADER_GLSL, TARGET_FORMAT)
        .err()
        .expect("vertex stage must fail");
    assert_eq!(err.stage(), Some(ShaderStageKind::Vertex));
}

#[test]
fn mismatched_interface_fails_to_link_on_device() {
    let Some(ctx) = gpu() else { return };
    let err = build_program(&ctx.device, VERTEX_SHADER_GLSL, FRAGMENT_WITH_VARYING, TARGET_FORMAT)
        .err()
        .expect("program must fail to link");
    assert_eq!(err.stage(), None);
    assert!(matches!(err, ProgramError::Link { .. }));
}
