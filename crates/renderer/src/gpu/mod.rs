//! Headless wgpu path for the single quad frame.
//!
//! - `context` requests an adapter and device with no surface attached.
//! - `texture` uploads the text bitmap with fixed sampling parameters.
//! - `program` compiles the GLSL pair and builds the linked pipeline.
//! - `quad` holds the static six-vertex buffer.
//! - `uniforms` mirrors the `QuadParams` block.
//! - `frame` binds everything once, draws, and reads the frame back.

mod context;
mod frame;
mod program;
mod quad;
mod texture;
mod uniforms;

pub use context::GpuContext;
pub use frame::{padded_bytes_per_row, read_back, QuadRenderer, TARGET_FORMAT};
pub use program::{build_program, ShaderProgram};
pub use quad::{QuadGeometry, QuadVertex, QUAD_VERTICES};
pub use texture::{upload_bitmap, SamplingParams, SourceTexture};
pub use uniforms::QuadUniforms;
