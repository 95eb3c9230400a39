//! Offscreen text rasterization.
//!
//! Produces the single bitmap the renderer uploads as a texture: a square
//! RGBA surface with one run of text drawn at a third of its height. Glyph
//! outlines come from `fontdue`; system fonts are located through `fontdb`.

mod font;
mod surface;
mod text;

pub use font::{load_font, FontSource, LoadedFont};
pub use surface::Bitmap;
pub use text::{rasterize_text, TextStyle};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("no system font matches family '{family}'")]
    NoSystemFont { family: String },
    #[error("failed to read font file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse font {origin}: {reason}")]
    Parse { origin: String, reason: String },
}
