use std::collections::BTreeSet;

use wgpu::naga;
use wgpu::naga::front::glsl;
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::types::ShaderStageKind;

/// Failure to turn the shader pair into a usable program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStageKind, log: String },
    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
}

impl ProgramError {
    /// Stage that failed to compile, if this is a compile error.
    pub fn stage(&self) -> Option<ShaderStageKind> {
        match self {
            ProgramError::Compile { stage, .. } => Some(*stage),
            ProgramError::Link { .. } => None,
        }
    }
}

/// One stage that parsed and validated cleanly.
#[derive(Debug)]
pub struct CompiledStage {
    pub stage: ShaderStageKind,
    pub source: String,
    pub module: naga::Module,
}

impl CompiledStage {
    /// Whether the module carries a `main` entry point for its stage.
    pub fn has_entry_point(&self) -> bool {
        self.module
            .entry_points
            .iter()
            .any(|entry| entry.stage == self.stage.naga())
    }
}

/// A vertex/fragment pair whose interfaces agree.
#[derive(Debug)]
pub struct CompiledProgram {
    pub vertex: CompiledStage,
    pub fragment: CompiledStage,
}

/// Parses and validates one GLSL stage.
pub fn compile_stage(source: &str, stage: ShaderStageKind) -> Result<CompiledStage, ProgramError> {
    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(stage.naga()), source)
        .map_err(|errors| ProgramError::Compile {
            stage,
            log: errors.to_string(),
        })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|error| ProgramError::Compile {
            stage,
            log: error.emit_to_string(source),
        })?;

    let compiled = CompiledStage {
        stage,
        source: source.to_string(),
        module,
    };
    if !compiled.has_entry_point() {
        return Err(ProgramError::Compile {
            stage,
            log: format!("no `main` entry point for the {stage} stage"),
        });
    }

    Ok(compiled)
}

/// Compiles both stages, then checks that they link.
///
/// The vertex stage is compiled first; a failure in either stage aborts
/// before the other result is used.
pub fn compile_program(
    vertex_source: &str,
    fragment_source: &str,
) -> Result<CompiledProgram, ProgramError> {
    let vertex = compile_stage(vertex_source, ShaderStageKind::Vertex)?;
    let fragment = compile_stage(fragment_source, ShaderStageKind::Fragment)?;
    check_interface(&vertex, &fragment)?;
    Ok(CompiledProgram { vertex, fragment })
}

/// Every fragment input location must be written by the vertex stage.
fn check_interface(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<(), ProgramError> {
    let outputs = vertex_output_locations(&vertex.module);
    let inputs = fragment_input_locations(&fragment.module);

    let missing: Vec<String> = inputs
        .difference(&outputs)
        .map(|location| location.to_string())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    Err(ProgramError::Link {
        log: format!(
            "fragment input location(s) {} are not written by the vertex stage",
            missing.join(", ")
        ),
    })
}

fn vertex_output_locations(module: &naga::Module) -> BTreeSet<u32> {
    let mut locations = BTreeSet::new();
    for entry in module
        .entry_points
        .iter()
        .filter(|entry| entry.stage == naga::ShaderStage::Vertex)
    {
        if let Some(result) = &entry.function.result {
            collect_locations(module, result.ty, result.binding.as_ref(), &mut locations);
        }
    }
    locations
}

fn fragment_input_locations(module: &naga::Module) -> BTreeSet<u32> {
    let mut locations = BTreeSet::new();
    for entry in module
        .entry_points
        .iter()
        .filter(|entry| entry.stage == naga::ShaderStage::Fragment)
    {
        for argument in &entry.function.arguments {
            collect_locations(module, argument.ty, argument.binding.as_ref(), &mut locations);
        }
    }
    locations
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// Passes the quad corner straight through to clip space.
pub const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 position;

void main() {
    gl_Position = vec4(position, 0.0, 1.0);
}
";

/// Samples the text texture and premultiplies color by alpha.
///
/// The y flip maps the fragment position onto texture rows stored
/// bottom-to-top, so the final frame comes out upright.
pub const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform QuadParams {
    vec2 resolution;
} params;

layout(set = 0, binding = 1) uniform texture2D tex0_texture;
layout(set = 0, binding = 2) uniform sampler tex0_sampler;

void main() {
    vec2 coordinate = vec2(gl_FragCoord.x, params.resolution.y - gl_FragCoord.y);
    vec2 uv = coordinate / params.resolution;
    vec4 pixel = texture(sampler2D(tex0_texture, tex0_sampler), uv);
    outColor = vec4(pixel.rgb * pixel.a, pixel.a);
}
";

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn builtin_pair_compiles_and_links() {
        let program = compile_program(VERTEX_SHADER_GLSL, FRAGMENT_SHADER_GLSL)
            .expect("builtin shaders compile");
        assert_eq!(program.vertex.stage, ShaderStageKind::Vertex);
        assert_eq!(program.fragment.stage, ShaderStageKind::Fragment);
        assert!(program.vertex.has_entry_point());
        assert!(program.fragment.has_entry_point());
    }

    #[test]
    fn vertex_syntax_error_names_vertex_stage() {
        let err = compile_program(BROKEN_VERTEX, FRAGMENT_SHADER_GLSL).unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStageKind::Vertex));
        match err {
            ProgramError::Compile { log, .. } => assert!(!log.is_empty()),
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn fragment_syntax_error_names_fragment_stage() {
        let err = compile_program(VERTEX_SHADER_GLSL, BROKEN_FRAGMENT).unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStageKind::Fragment));
        assert!(err.to_string().starts_with("fragment shader failed to compile"));
    }

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let err = compile_program(VERTEX_SHADER_GLSL, FRAGMENT_WITH_VARYING).unwrap_err();
        assert_eq!(err.stage(), None);
        match err {
            ProgramError::Link { log } => assert!(log.contains('0')),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn builtin_fragment_reads_no_varyings() {
        let fragment = compile_stage(FRAGMENT_SHADER_GLSL, ShaderStageKind::Fragment).unwrap();
        assert!(fragment_input_locations(&fragment.module).is_empty());
    }
}
