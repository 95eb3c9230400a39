//! Turning a rendered frame into files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::fragment::unpremultiply_image;
use crate::types::AlphaMode;

/// Backing resolution versus the size the frame is presented at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub backing: u32,
    pub display: u32,
}

impl Presentation {
    pub fn new(backing: u32, display_scale: f32) -> Self {
        let display = ((backing as f32 * display_scale).round() as u32).clamp(1, backing.max(1));
        Self { backing, display }
    }

    /// Top-left corner that centers the display copy in a `width × height` viewport.
    ///
    /// Negative when the viewport is smaller than the display size.
    pub fn centered_origin(&self, viewport: (u32, u32)) -> (i64, i64) {
        let display = i64::from(self.display);
        (
            (i64::from(viewport.0) - display) / 2,
            (i64::from(viewport.1) - display) / 2,
        )
    }
}

/// Converts premultiplied framebuffer pixels into the requested file encoding.
pub fn encode_alpha(frame: &RgbaImage, mode: AlphaMode) -> RgbaImage {
    let mut encoded = frame.clone();
    if mode == AlphaMode::Straight {
        unpremultiply_image(&mut encoded);
    }
    encoded
}

/// Resamples a premultiplied frame down to display density.
///
/// Filtering premultiplied pixels keeps transparent texels from bleeding
/// color into the glyph edges.
pub fn display_copy(frame: &RgbaImage, presentation: Presentation) -> RgbaImage {
    if presentation.display == frame.width() && presentation.display == frame.height() {
        return frame.clone();
    }
    imageops::resize(
        frame,
        presentation.display,
        presentation.display,
        FilterType::Triangle,
    )
}

/// Places `image` centered on a transparent `width × height` canvas.
pub fn composite_centered(
    image: &RgbaImage,
    presentation: Presentation,
    viewport: (u32, u32),
) -> RgbaImage {
    let mut canvas = RgbaImage::new(viewport.0, viewport.1);
    let (x, y) = presentation.centered_origin(viewport);
    imageops::replace(&mut canvas, image, x, y);
    canvas
}

/// Writes a PNG, creating parent directories as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "wrote png"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn default_presentation_is_half_density() {
        let presentation = Presentation::new(500, 0.5);
        assert_eq!(presentation.backing, 500);
        assert_eq!(presentation.display, 250);
    }

    #[test]
    fn centers_display_copy_in_viewport() {
        let presentation = Presentation::new(500, 0.5);
        assert_eq!(presentation.centered_origin((1280, 720)), (515, 235));
        assert_eq!(presentation.centered_origin((100, 100)), (-75, -75));
    }

    #[test]
    fn straight_export_unpremultiplies() {
        let frame = RgbaImage::from_pixel(1, 1, Rgba([128, 0, 0, 128]));
        assert_eq!(encode_alpha(&frame, AlphaMode::Straight).get_pixel(0, 0).0, [255, 0, 0, 128]);
        assert_eq!(
            encode_alpha(&frame, AlphaMode::Premultiplied).get_pixel(0, 0).0,
            [128, 0, 0, 128]
        );
    }

    #[test]
    fn display_copy_has_display_size() {
        let frame = RgbaImage::from_pixel(500, 500, Rgba([64, 0, 0, 64]));
        let copy = display_copy(&frame, Presentation::new(500, 0.5));
        assert_eq!(copy.dimensions(), (250, 250));
        assert_eq!(copy.get_pixel(125, 125).0, [64, 0, 0, 64]);
    }

    #[test]
    fn composite_leaves_border_transparent() {
        let copy = RgbaImage::from_pixel(250, 250, Rgba([255, 0, 0, 255]));
        let canvas = composite_centered(&copy, Presentation::new(500, 0.5), (1280, 720));
        assert_eq!(canvas.dimensions(), (1280, 720));
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(canvas.get_pixel(515, 235).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(764, 484).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(765, 485).0, [0, 0, 0, 0]);
    }

    #[test]
    fn save_png_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.png");
        let image = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 4]));
        save_png(&image, &path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded, image);
    }
}
