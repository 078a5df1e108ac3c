/// Backend-agnostic vocabulary for render pass descriptions
///
/// Every value here maps one-to-one onto a native equivalent in each backend.
/// The `SWAPCHAIN` format is a placeholder resolved when the render pass is realized.

use bitflags::bitflags;
use crate::error::Result;
use crate::engine_bail_validation;

// ============================================================================
// FORMATS
// ============================================================================

/// Attachment image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    /// Resolved to the concrete swapchain format at realization time
    SWAPCHAIN,

    // 8-bit normalized
    R8_UNORM,
    R8G8_UNORM,
    R8G8B8_UNORM,
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,
    R8_SNORM,
    R8G8_SNORM,
    R8G8B8A8_SNORM,

    // 16-bit
    R16_UNORM,
    R16_SFLOAT,
    R16G16_UNORM,
    R16G16_SFLOAT,
    R16G16B16A16_UNORM,
    R16G16B16A16_SFLOAT,

    // 32-bit
    R32_UINT,
    R32_SINT,
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Depth
    D16_UNORM,
    D32_SFLOAT,

    // Depth-stencil
    D16_UNORM_S8_UINT,
    D24_UNORM_S8_UINT,
    D32_SFLOAT_S8_UINT,

    // sRGB
    R8G8B8A8_SRGB,
    B8G8R8A8_SRGB,
}

impl TextureFormat {
    /// True for depth and depth-stencil formats
    pub fn is_depth_format(self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM
                | TextureFormat::D32_SFLOAT
                | TextureFormat::D16_UNORM_S8_UINT
                | TextureFormat::D24_UNORM_S8_UINT
                | TextureFormat::D32_SFLOAT_S8_UINT
        )
    }

    /// True when the format carries a stencil component
    pub fn has_stencil_component(self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM_S8_UINT
                | TextureFormat::D24_UNORM_S8_UINT
                | TextureFormat::D32_SFLOAT_S8_UINT
        )
    }

    /// True for concrete color formats (the swapchain token is not one)
    pub fn is_color_format(self) -> bool {
        !self.is_depth_format() && self != TextureFormat::SWAPCHAIN
    }

    /// Resolve the swapchain token against a concrete surface format
    pub fn resolve(self, swapchain_format: TextureFormat) -> TextureFormat {
        match self {
            TextureFormat::SWAPCHAIN => swapchain_format,
            other => other,
        }
    }
}

// ============================================================================
// MULTISAMPLING
// ============================================================================

/// Multisample count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SampleCount {
    /// 1 sample (no multisampling)
    #[default]
    S1,
    S2,
    S4,
    S8,
    S16,
    S32,
    S64,
}

impl SampleCount {
    /// Number of samples per pixel
    pub fn count(self) -> u32 {
        match self {
            SampleCount::S1 => 1,
            SampleCount::S2 => 2,
            SampleCount::S4 => 4,
            SampleCount::S8 => 8,
            SampleCount::S16 => 16,
            SampleCount::S32 => 32,
            SampleCount::S64 => 64,
        }
    }

    /// Parse a raw sample count, rejecting anything outside 1/2/4/8/16/32/64
    pub fn from_count(samples: u32) -> Result<Self> {
        Ok(match samples {
            1 => SampleCount::S1,
            2 => SampleCount::S2,
            4 => SampleCount::S4,
            8 => SampleCount::S8,
            16 => SampleCount::S16,
            32 => SampleCount::S32,
            64 => SampleCount::S64,
            _ => engine_bail_validation!("galaxy3d::render_pass",
                "Invalid sample count: {}. Must be one of 1, 2, 4, 8, 16, 32, 64", samples),
        })
    }

    pub fn is_multisampled(self) -> bool {
        self != SampleCount::S1
    }
}

// ============================================================================
// LOAD / STORE / LAYOUT
// ============================================================================

/// Load operation at the start of a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    /// Load existing content
    Load,
    /// Clear to the attachment's clear value
    Clear,
    /// Don't care about existing content
    DontCare,
}

/// Store operation at the end of a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Store the rendered content
    Store,
    /// Don't care about storing the content
    DontCare,
}

/// Image layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    /// Undefined layout (initial state, contents discarded)
    Undefined,
    General,
    /// Layout for color attachment
    ColorAttachment,
    /// Layout for depth/stencil attachment
    DepthStencilAttachment,
    DepthStencilReadOnly,
    /// Layout for shader read-only access
    ShaderReadOnly,
    TransferSrc,
    TransferDst,
    /// Layout for presenting to swapchain
    PresentSrc,
    /// Depth read-only, stencil writable
    DepthReadOnlyStencilAttachment,
    /// Depth writable, stencil read-only
    DepthAttachmentStencilReadOnly,
}

/// Pipeline bind point of a subpass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineBindPoint {
    #[default]
    Graphics,
    Compute,
}

// ============================================================================
// SYNCHRONIZATION MASKS
// ============================================================================

bitflags! {
    /// Pipeline stages used by subpass dependencies
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStageFlags: u32 {
        const TOP_OF_PIPE = 1 << 0;
        const DRAW_INDIRECT = 1 << 1;
        const VERTEX_INPUT = 1 << 2;
        const VERTEX_SHADER = 1 << 3;
        const TESSELLATION_CONTROL_SHADER = 1 << 4;
        const TESSELLATION_EVALUATION_SHADER = 1 << 5;
        const GEOMETRY_SHADER = 1 << 6;
        const FRAGMENT_SHADER = 1 << 7;
        const EARLY_FRAGMENT_TESTS = 1 << 8;
        const LATE_FRAGMENT_TESTS = 1 << 9;
        const COLOR_ATTACHMENT_OUTPUT = 1 << 10;
        const COMPUTE_SHADER = 1 << 11;
        const TRANSFER = 1 << 12;
        const BOTTOM_OF_PIPE = 1 << 13;
        const ALL_GRAPHICS = 1 << 14;
        const ALL_COMMANDS = 1 << 15;
    }
}

bitflags! {
    /// Memory access types used by subpass dependencies (empty = none)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const INDIRECT_COMMAND_READ = 1 << 0;
        const INDEX_READ = 1 << 1;
        const VERTEX_ATTRIBUTE_READ = 1 << 2;
        const UNIFORM_READ = 1 << 3;
        const INPUT_ATTACHMENT_READ = 1 << 4;
        const SHADER_READ = 1 << 5;
        const SHADER_WRITE = 1 << 6;
        const COLOR_ATTACHMENT_READ = 1 << 7;
        const COLOR_ATTACHMENT_WRITE = 1 << 8;
        const DEPTH_STENCIL_ATTACHMENT_READ = 1 << 9;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 1 << 10;
        const TRANSFER_READ = 1 << 11;
        const TRANSFER_WRITE = 1 << 12;
        const HOST_READ = 1 << 13;
        const HOST_WRITE = 1 << 14;
        const MEMORY_READ = 1 << 15;
        const MEMORY_WRITE = 1 << 16;
    }
}

bitflags! {
    /// Subpass dependency flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DependencyFlags: u32 {
        const BY_REGION = 1 << 0;
        const VIEW_LOCAL = 1 << 1;
        const DEVICE_GROUP = 1 << 2;
    }
}

// ============================================================================
// CLEAR VALUES
// ============================================================================

/// Clear value of an attachment
///
/// The kind must match the attachment format: `Color` for color formats,
/// `DepthStencil` for depth formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// RGBA color
    Color([f32; 4]),
    /// Depth and optional stencil
    DepthStencil { depth: f32, stencil: Option<u32> },
}

impl ClearValue {
    pub fn is_color(&self) -> bool {
        matches!(self, ClearValue::Color(_))
    }

    /// Opaque black
    pub const BLACK: ClearValue = ClearValue::Color([0.0, 0.0, 0.0, 1.0]);

    /// Transparent black
    pub const TRANSPARENT: ClearValue = ClearValue::Color([0.0, 0.0, 0.0, 0.0]);

    /// Far plane depth, no stencil
    pub const DEPTH_ONE: ClearValue = ClearValue::DepthStencil { depth: 1.0, stencil: None };
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
