//! Renderer crate for hellotex.
//!
//! Takes the text bitmap produced by `rasterizer` and pushes it through a
//! single textured quad. The flow is:
//!
//! ```text
//!   Bitmap ──▶ upload_bitmap ──▶ SourceTexture ─┐
//!                                               ├─▶ QuadRenderer::draw ──▶ read_back ──▶ export
//!   GLSL pair ──▶ build_program ──▶ ShaderProgram ┘
//! ```
//!
//! Without an adapter, `reference` evaluates the same fragment math on the
//! CPU so a frame is still produced.

mod compile;
pub mod export;
mod fragment;
pub mod gpu;
mod reference;
mod runtime;
mod types;

pub use compile::{
    compile_program, compile_stage, CompiledProgram, CompiledStage, ProgramError,
    FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL,
};
pub use fragment::{
    flip_y, fragment_uv, premultiply, texture_rows, unpremultiply, unpremultiply_image,
};
pub use reference::render_reference;
pub use runtime::{render, render_with, RenderedFrame, UsedBackend};
pub use types::{AdapterProfile, AlphaMode, BackendChoice, ShaderStageKind};
