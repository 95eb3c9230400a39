use image::{Rgba, RgbaImage};

/// Straight-alpha RGBA pixels with rows stored top to bottom.
///
/// A `Bitmap` is written once by [`rasterize_text`](crate::rasterize_text)
/// and only read afterwards; there is no public way to mutate it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pixels: RgbaImage,
}

impl Bitmap {
    /// Wraps pixels produced elsewhere (synthetic test patterns, decoded files).
    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub(crate) fn transparent(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Tightly packed RGBA8 bytes, `width * 4` per row.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Source-over composites `color` scaled by `coverage` at `(x, y)`.
    ///
    /// Coordinates outside the surface are ignored.
    pub(crate) fn blend_coverage(&mut self, x: i64, y: i64, coverage: u8, color: [f32; 4]) {
        if coverage == 0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u64, y as u64);
        if x >= u64::from(self.width()) || y >= u64::from(self.height()) {
            return;
        }

        let pixel = self.pixels.get_pixel_mut(x as u32, y as u32);
        *pixel = source_over(*pixel, color, f32::from(coverage) / 255.0);
    }
}

fn source_over(dst: Rgba<u8>, color: [f32; 4], coverage: f32) -> Rgba<u8> {
    let src_alpha = (color[3] * coverage).clamp(0.0, 1.0);
    if src_alpha <= 0.0 {
        return dst;
    }

    let dst_alpha = f32::from(dst[3]) / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

    let mut out = [0u8; 4];
    for channel in 0..3 {
        let src = color[channel].clamp(0.0, 1.0);
        let dst_value = f32::from(dst[channel]) / 255.0;
        let blended = (src * src_alpha + dst_value * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        out[channel] = to_byte(blended);
    }
    out[3] = to_byte(out_alpha);
    Rgba(out)
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_HALF: [f32; 4] = [1.0, 0.0, 0.0, 0.5];

    #[test]
    fn full_coverage_on_transparent_keeps_fill_color() {
        let mut bitmap = Bitmap::transparent(2, 2);
        bitmap.blend_coverage(1, 0, 255, RED_HALF);
        assert_eq!(bitmap.pixel(1, 0), [255, 0, 0, 128]);
        assert_eq!(bitmap.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn partial_coverage_scales_alpha_only() {
        let mut bitmap = Bitmap::transparent(1, 1);
        bitmap.blend_coverage(0, 0, 128, RED_HALF);
        let [r, g, b, a] = bitmap.pixel(0, 0);
        assert_eq!((r, g, b), (255, 0, 0));
        assert_eq!(a, 64);
    }

    #[test]
    fn overlapping_coverage_accumulates_alpha() {
        let mut bitmap = Bitmap::transparent(1, 1);
        bitmap.blend_coverage(0, 0, 255, RED_HALF);
        bitmap.blend_coverage(0, 0, 255, RED_HALF);
        let [r, g, b, a] = bitmap.pixel(0, 0);
        assert_eq!((r, g, b), (255, 0, 0));
        assert!((191..=192).contains(&a), "alpha was {a}");
    }

    #[test]
    fn out_of_bounds_writes_are_clipped() {
        let mut bitmap = Bitmap::transparent(2, 2);
        bitmap.blend_coverage(-1, 0, 255, RED_HALF);
        bitmap.blend_coverage(0, 2, 255, RED_HALF);
        bitmap.blend_coverage(5, 5, 255, RED_HALF);
        assert!(bitmap.as_raw().iter().all(|&byte| byte == 0));
    }
}
