use fontdue::Font;

use crate::surface::Bitmap;

/// One run of text: what to draw, how big, where, and in which color.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub content: String,
    /// Glyph em size in pixels.
    pub font_px: f32,
    /// Pen start on the x axis.
    pub origin_x: f32,
    /// Baseline position, measured down from the top edge.
    pub baseline: f32,
    /// Straight-alpha fill color, channels in `0.0..=1.0`.
    pub color: [f32; 4],
}

impl TextStyle {
    /// Sizes the run for a surface of `height` pixels: the font is a third of
    /// the height (floored) and the baseline sits a third of the way down.
    pub fn for_surface(content: impl Into<String>, height: u32, color: [f32; 4]) -> Self {
        Self {
            content: content.into(),
            font_px: (height / 3) as f32,
            origin_x: 0.0,
            baseline: height as f32 / 3.0,
            color,
        }
    }
}

/// Draws `style` onto a fresh transparent `width × height` surface.
///
/// There is no wrapping or fitting; glyphs that run past an edge are clipped.
pub fn rasterize_text(font: &Font, style: &TextStyle, width: u32, height: u32) -> Bitmap {
    let mut bitmap = Bitmap::transparent(width, height);
    let mut pen_x = style.origin_x;
    let mut previous: Option<char> = None;

    for ch in style.content.chars() {
        if let Some(prev) = previous {
            pen_x += font.horizontal_kern(prev, ch, style.font_px).unwrap_or(0.0);
        }

        let (metrics, coverage) = font.rasterize(ch, style.font_px);
        let left = (pen_x + metrics.xmin as f32).round() as i64;
        let top = (style.baseline - (metrics.ymin as f32 + metrics.height as f32)).round() as i64;

        for row in 0..metrics.height {
            for column in 0..metrics.width {
                let value = coverage[row * metrics.width + column];
                bitmap.blend_coverage(left + column as i64, top + row as i64, value, style.color);
            }
        }

        pen_x += metrics.advance_width;
        previous = Some(ch);
    }

    tracing::debug!(
        text = %style.content,
        font_px = style.font_px,
        baseline = style.baseline,
        width,
        height,
        advance = pen_x - style.origin_x,
        "rasterized text surface"
    );

    bitmap
}
