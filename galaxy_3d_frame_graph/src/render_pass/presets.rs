/// Catalog of ready-made render pass configurations
///
/// Every preset goes through `RenderPassBuilder`, so each returned config carries
/// exactly one subpass synthesized from its attachments.

use crate::error::Result;
use crate::render_pass::builder::RenderPassBuilder;
use crate::render_pass::config::{AttachmentDesc, RenderPassConfig};
use crate::render_pass::types::{ClearValue, ImageLayout, LoadOp, SampleCount, StoreOp, TextureFormat};

/// Format of the off-screen HDR color targets
pub const HDR_FORMAT: TextureFormat = TextureFormat::R16G16B16A16_SFLOAT;

/// Format shared by every depth attachment of the catalog
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::D32_SFLOAT;

fn depth_clear() -> ClearValue {
    ClearValue::DepthStencil { depth: 1.0, stencil: None }
}

// ============================================================================
// SCENE PASSES
// ============================================================================

/// Forward pass: swapchain color + depth shared with the depth pre-pass
///
/// - 0: color (swapchain), cleared to opaque black, presented
/// - 1: depth (d32), loaded from the pre-pass and kept for transparency
pub fn forward() -> Result<RenderPassConfig> {
    RenderPassBuilder::new()
        .set_name("Forward Rendering")
        .add_color_attachment(
            AttachmentDesc::new(TextureFormat::SWAPCHAIN)
                .load_op(LoadOp::Clear)
                .store_op(StoreOp::Store)
                .final_layout(ImageLayout::PresentSrc)
                .clear(ClearValue::BLACK),
        )?
        .add_depth_attachment(
            AttachmentDesc::new(DEPTH_FORMAT)
                .load_op(LoadOp::Load)
                .store_op(StoreOp::Store)
                .initial_layout(ImageLayout::DepthStencilAttachment),
        )?
        .build()
}

/// G-buffer pass: position, normal, albedo, specular + depth, all sampled afterwards
pub fn deferred_geometry() -> Result<RenderPassConfig> {
    let target = |format: TextureFormat, clear: ClearValue| {
        AttachmentDesc::new(format)
            .load_op(LoadOp::Clear)
            .store_op(StoreOp::Store)
            .final_layout(ImageLayout::ShaderReadOnly)
            .clear(clear)
    };

    RenderPassBuilder::new()
        .set_name("Deferred G-Buffer Pass")
        .add_color_attachment(target(TextureFormat::R32G32B32A32_SFLOAT, ClearValue::TRANSPARENT))?
        .add_color_attachment(target(TextureFormat::R16G16B16A16_SFLOAT, ClearValue::TRANSPARENT))?
        .add_color_attachment(target(TextureFormat::R8G8B8A8_UNORM, ClearValue::BLACK))?
        .add_color_attachment(target(TextureFormat::R8G8B8A8_UNORM, ClearValue::BLACK))?
        .add_depth_attachment(target(DEPTH_FORMAT, depth_clear()))?
        .build()
}

/// Lighting pass reading the G-buffer as textures, writing the swapchain
pub fn deferred_lighting() -> Result<RenderPassConfig> {
    RenderPassBuilder::new()
        .set_name("Deferred Lighting Pass")
        .add_color_attachment(
            AttachmentDesc::new(TextureFormat::SWAPCHAIN)
                .load_op(LoadOp::Clear)
                .store_op(StoreOp::Store)
                .final_layout(ImageLayout::PresentSrc)
                .clear(ClearValue::BLACK),
        )?
        .build()
}

/// Depth-only shadow map, sampled by later passes
pub fn shadow_map() -> Result<RenderPassConfig> {
    RenderPassBuilder::new()
        .set_name("Shadow Map")
        .add_depth_attachment(
            AttachmentDesc::new(DEPTH_FORMAT)
                .load_op(LoadOp::Clear)
                .store_op(StoreOp::Store)
                .final_layout(ImageLayout::ShaderReadOnly)
                .clear(depth_clear()),
        )?
        .build()
}

/// Depth pre-pass feeding forward and transparency with early-z depth
pub fn depth_pre_pass(samples: SampleCount) -> Result<RenderPassConfig> {
    RenderPassBuilder::new()
        .set_name("Depth Pre-Pass")
        .add_depth_attachment(
            AttachmentDesc::new(DEPTH_FORMAT)
                .samples(samples.count())
                .load_op(LoadOp::Clear)
                .store_op(StoreOp::Store)
                .final_layout(ImageLayout::DepthStencilAttachment)
                .clear(depth_clear()),
        )?
        .build()
}

/// Per-pixel light index target (tiled/clustered lighting)
pub fn light_culling() -> Result<RenderPassConfig> {
    RenderPassBuilder::new()
        .set_name("Light Culling")
        .add_color_attachment(
            AttachmentDesc::new(TextureFormat::R32_UINT)
                .load_op(LoadOp::DontCare)
                .store_op(StoreOp::Store)
                .final_layout(ImageLayout::ShaderReadOnly),
        )?
        .build()
}

/// Translucent geometry drawn over the opaque color with the existing depth
pub fn transparency(samples: SampleCount) -> Result<RenderPassConfig> {
    RenderPassBuilder::new()
        .set_name("Transparency Pass")
        .add_color_attachment(
            AttachmentDesc::new(HDR_FORMAT)
                .samples(samples.count())
                .load_op(LoadOp::Load)
                .store_op(StoreOp::Store)
                .initial_layout(ImageLayout::ColorAttachment)
                .final_layout(ImageLayout::ColorAttachment),
        )?
        .add_depth_attachment(
            AttachmentDesc::new(DEPTH_FORMAT)
                .samples(samples.count())
                .load_op(LoadOp::Load)
                .store_op(StoreOp::Store)
                .initial_layout(ImageLayout::DepthStencilAttachment)
                .final_layout(ImageLayout::DepthStencilAttachment),
        )?
        .build()
}

// ============================================================================
// SCREEN-SPACE PASSES
// ============================================================================

/// Single full-screen output; presented when targeting the swapchain, sampled otherwise
pub fn post_process(output_format: TextureFormat) -> Result<RenderPassConfig> {
    let final_layout = if output_format == TextureFormat::SWAPCHAIN {
        ImageLayout::PresentSrc
    } else {
        ImageLayout::ShaderReadOnly
    };

    RenderPassBuilder::new()
        .set_name("Post-Processing Pass")
        .add_color_attachment(
            AttachmentDesc::new(output_format)
                .load_op(LoadOp::DontCare)
                .store_op(StoreOp::Store)
                .final_layout(final_layout),
        )?
        .build()
}

/// Ambient occlusion term (single channel)
pub fn ssao() -> Result<RenderPassConfig> {
    sampled_target("SSAO Calculation", TextureFormat::R8_UNORM)
}

/// Bright areas extracted from the HDR scene
pub fn bloom_bright() -> Result<RenderPassConfig> {
    sampled_target("Bloom Bright Pass", HDR_FORMAT)
}

/// One direction of a separable blur
pub fn blur(format: TextureFormat) -> Result<RenderPassConfig> {
    sampled_target("Blur Pass", format)
}

fn sampled_target(name: &str, format: TextureFormat) -> Result<RenderPassConfig> {
    RenderPassBuilder::new()
        .set_name(name)
        .add_color_attachment(
            AttachmentDesc::new(format)
                .load_op(LoadOp::DontCare)
                .store_op(StoreOp::Store)
                .final_layout(ImageLayout::ShaderReadOnly),
        )?
        .build()
}

/// Render-to-texture with an optional throwaway depth buffer
pub fn offscreen(format: TextureFormat, with_depth: bool) -> Result<RenderPassConfig> {
    let mut builder = RenderPassBuilder::new();
    builder.set_name("Off-screen Rendering").add_color_attachment(
        AttachmentDesc::new(format)
            .load_op(LoadOp::Clear)
            .store_op(StoreOp::Store)
            .final_layout(ImageLayout::ShaderReadOnly)
            .clear(ClearValue::BLACK),
    )?;

    if with_depth {
        builder.add_depth_attachment(
            AttachmentDesc::new(DEPTH_FORMAT)
                .load_op(LoadOp::Clear)
                .store_op(StoreOp::DontCare)
                .clear(depth_clear()),
        )?;
    }

    builder.build()
}

/// Tone mapping straight into the swapchain
pub fn tone_mapping() -> Result<RenderPassConfig> {
    RenderPassBuilder::new()
        .set_name("Tone Mapping")
        .add_color_attachment(
            AttachmentDesc::new(TextureFormat::SWAPCHAIN)
                .load_op(LoadOp::DontCare)
                .store_op(StoreOp::Store)
                .final_layout(ImageLayout::PresentSrc),
        )?
        .build()
}

/// Last pass: composite into the presentable image
pub fn final_composite() -> Result<RenderPassConfig> {
    RenderPassBuilder::new()
        .set_name("Final Composite")
        .add_color_attachment(
            AttachmentDesc::new(TextureFormat::SWAPCHAIN)
                .load_op(LoadOp::Clear)
                .store_op(StoreOp::Store)
                .initial_layout(ImageLayout::Undefined)
                .final_layout(ImageLayout::PresentSrc)
                .clear(ClearValue::BLACK),
        )?
        .build()
}

#[cfg(test)]
#[path = "presets_tests.rs"]
mod tests;
