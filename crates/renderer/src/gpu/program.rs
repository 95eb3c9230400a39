use std::borrow::Cow;

use crate::compile::{compile_program, CompiledStage, ProgramError};
use crate::types::ShaderStageKind;

use super::quad::QuadVertex;

/// Bind group 0 of the quad program: `QuadParams`, `tex0` texture, `tex0` sampler.
pub const UNIFORM_BINDING: u32 = 0;
pub const TEXTURE_BINDING: u32 = 1;
pub const SAMPLER_BINDING: u32 = 2;

/// Linked vertex + fragment pipeline and the layout its resources bind to.
pub struct ShaderProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// Compiles, links, and builds the quad pipeline.
///
/// Compile failures name the stage; interface mismatches and pipeline
/// validation failures are reported as link errors. Stage modules are dropped
/// once the pipeline owns them.
pub fn build_program(
    device: &wgpu::Device,
    vertex_source: &str,
    fragment_source: &str,
    target_format: wgpu::TextureFormat,
) -> Result<ShaderProgram, ProgramError> {
    let compiled = compile_program(vertex_source, fragment_source)?;
    let vertex_module = create_module(device, &compiled.vertex)?;
    let fragment_module = create_module(device, &compiled.fragment)?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("quad bind group layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: UNIFORM_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: TEXTURE_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: SAMPLER_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("quad pipeline layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("quad pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some("main"),
            buffers: &[QuadVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    });

    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(ProgramError::Link {
            log: error.to_string(),
        });
    }

    tracing::debug!(?target_format, "linked quad shader program");

    Ok(ShaderProgram {
        pipeline,
        bind_group_layout,
    })
}

fn create_module(
    device: &wgpu::Device,
    compiled: &CompiledStage,
) -> Result<wgpu::ShaderModule, ProgramError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(match compiled.stage {
            ShaderStageKind::Vertex => "quad vertex",
            ShaderStageKind::Fragment => "quad fragment",
        }),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(compiled.source.as_str()),
            stage: compiled.stage.naga(),
            defines: &[],
        },
    });

    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ProgramError::Compile {
            stage: compiled.stage,
            log: error.to_string(),
        }),
        None => Ok(module),
    }
}
