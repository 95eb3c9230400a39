use std::fmt;

use wgpu::naga::ShaderStage;

/// The two programmable stages of the quad program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
}

impl ShaderStageKind {
    pub(crate) fn naga(self) -> ShaderStage {
        match self {
            ShaderStageKind::Vertex => ShaderStage::Vertex,
            ShaderStageKind::Fragment => ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStageKind::Vertex => f.write_str("vertex"),
            ShaderStageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Rendering path requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendChoice {
    /// Prefer the GPU; fall back to the CPU reference path without an adapter.
    #[default]
    Auto,
    /// Require a GPU adapter.
    Gpu,
    /// Evaluate the fragment stage on the CPU.
    Cpu,
}

/// How exported pixels encode alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    /// Color channels divided back out of alpha (what PNG viewers expect).
    #[default]
    Straight,
    /// Framebuffer bytes as rendered.
    Premultiplied,
}

/// Summary of the adapter that rendered a frame, for logs and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension_2d: u32,
}

impl AdapterProfile {
    pub(crate) fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
        }
    }

    /// True for CPU rasterizers such as llvmpipe, lavapipe, or WARP.
    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
            || ["llvmpipe", "lavapipe", "swiftshader", "warp"]
                .iter()
                .any(|needle| self.name.to_ascii_lowercase().contains(needle))
    }
}
