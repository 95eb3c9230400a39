//! CPU mirror of the fragment stage math.
//!
//! These functions compute exactly what `FRAGMENT_SHADER_GLSL` computes, one
//! fragment at a time. The CPU reference renderer is built on them and tests
//! use them to pin the shader's behavior down.

use image::imageops::flip_vertical;
use image::RgbaImage;
use rasterizer::Bitmap;

/// Scales color by alpha: `(r·a, g·a, b·a, a)`.
pub fn premultiply(texel: [f32; 4]) -> [f32; 4] {
    let [r, g, b, a] = texel;
    [r * a, g * a, b * a, a]
}

/// Inverse of [`premultiply`]; fully transparent pixels become `(0, 0, 0, 0)`.
pub fn unpremultiply(pixel: [f32; 4]) -> [f32; 4] {
    let [r, g, b, a] = pixel;
    if a <= 0.0 {
        return [0.0; 4];
    }
    [
        (r / a).clamp(0.0, 1.0),
        (g / a).clamp(0.0, 1.0),
        (b / a).clamp(0.0, 1.0),
        a,
    ]
}

/// Mirrors a y coordinate about the viewport height.
pub fn flip_y(y: f32, resolution_y: f32) -> f32 {
    resolution_y - y
}

/// Texture coordinate sampled for the fragment at `frag_coord`.
pub fn fragment_uv(frag_coord: [f32; 2], resolution: [f32; 2]) -> [f32; 2] {
    [
        frag_coord[0] / resolution[0],
        flip_y(frag_coord[1], resolution[1]) / resolution[1],
    ]
}

/// Bitmap rows reordered bottom-to-top, the layout the texture is uploaded in.
pub fn texture_rows(bitmap: &Bitmap) -> RgbaImage {
    flip_vertical(bitmap.image())
}

pub(crate) fn to_unit(pixel: [u8; 4]) -> [f32; 4] {
    pixel.map(|channel| f32::from(channel) / 255.0)
}

pub(crate) fn to_bytes(pixel: [f32; 4]) -> [u8; 4] {
    pixel.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Converts a premultiplied image to straight alpha in place.
pub fn unpremultiply_image(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        pixel.0 = to_bytes(unpremultiply(to_unit(pixel.0)));
    }
}
