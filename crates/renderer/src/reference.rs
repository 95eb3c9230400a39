//! Software rendition of the quad pass.
//!
//! Evaluates the fragment stage for every pixel of the viewport, sampling the
//! bottom-up texture rows with bilinear filtering and clamp-to-edge wrapping,
//! exactly as the GPU sampler is configured. Output is premultiplied.

use image::{Rgba, RgbaImage};
use rasterizer::Bitmap;

use crate::fragment::{fragment_uv, premultiply, texture_rows, to_bytes, to_unit};

pub fn render_reference(bitmap: &Bitmap) -> RgbaImage {
    let texels = texture_rows(bitmap);
    let (width, height) = texels.dimensions();
    let resolution = [width as f32, height as f32];

    RgbaImage::from_fn(width, height, |x, y| {
        let frag_coord = [x as f32 + 0.5, y as f32 + 0.5];
        let uv = fragment_uv(frag_coord, resolution);
        Rgba(to_bytes(premultiply(sample_linear_clamped(&texels, uv))))
    })
}

/// Bilinear lookup with texel centers at half-integer coordinates.
fn sample_linear_clamped(texels: &RgbaImage, uv: [f32; 2]) -> [f32; 4] {
    let (width, height) = texels.dimensions();
    if width == 0 || height == 0 {
        return [0.0; 4];
    }

    let u = uv[0] * width as f32 - 0.5;
    let v = uv[1] * height as f32 - 0.5;
    let x0 = u.floor();
    let y0 = v.floor();
    let fx = u - x0;
    let fy = v - y0;

    let fetch = |x: f32, y: f32| -> [f32; 4] {
        let cx = (x as i64).clamp(0, i64::from(width) - 1) as u32;
        let cy = (y as i64).clamp(0, i64::from(height) - 1) as u32;
        to_unit(texels.get_pixel(cx, cy).0)
    };

    let top_left = fetch(x0, y0);
    let top_right = fetch(x0 + 1.0, y0);
    let bottom_left = fetch(x0, y0 + 1.0);
    let bottom_right = fetch(x0 + 1.0, y0 + 1.0);

    let mut out = [0.0; 4];
    for channel in 0..4 {
        let top = top_left[channel] + (top_right[channel] - top_left[channel]) * fx;
        let bottom = bottom_left[channel] + (bottom_right[channel] - bottom_left[channel]) * fx;
        out[channel] = top + (bottom - top) * fy;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadrants() -> Bitmap {
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 128]));
        image.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 0]));
        image.put_pixel(1, 1, Rgba([255, 255, 255, 64]));
        Bitmap::from_image(image)
    }

    #[test]
    fn output_is_upright_and_premultiplied() {
        let frame = render_reference(&quadrants());
        assert_eq!(frame.dimensions(), (2, 2));
        assert_eq!(frame.get_pixel(0, 0).0, [128, 0, 0, 128]);
        assert_eq!(frame.get_pixel(1, 0).0, [0, 255, 0, 255]);
        assert_eq!(frame.get_pixel(0, 1).0, [0, 0, 0, 0]);
        assert_eq!(frame.get_pixel(1, 1).0, [64, 64, 64, 64]);
    }

    #[test]
    fn transparent_bitmap_renders_transparent_frame() {
        let frame = render_reference(&Bitmap::from_image(RgbaImage::new(16, 16)));
        assert!(frame.as_raw().iter().all(|&byte| byte == 0));
    }

    #[test]
    fn clamped_sampling_never_wraps() {
        let mut texels = RgbaImage::new(2, 1);
        texels.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        let left_edge = sample_linear_clamped(&texels, [0.0, 0.5]);
        let right_edge = sample_linear_clamped(&texels, [1.0, 0.5]);
        assert_eq!(left_edge, [1.0; 4]);
        assert_eq!(right_edge, [0.0; 4]);
    }
}
