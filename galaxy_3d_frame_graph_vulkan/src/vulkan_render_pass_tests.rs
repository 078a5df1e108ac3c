//! Unit tests for render pass description translation
//!
//! Builds the Vulkan description from agnostic configs without a GPU.

use super::*;
use galaxy_3d_frame_graph::galaxy3d::Error;
use galaxy_3d_frame_graph::galaxy3d::render_pass::{
    presets, AccessFlags, AttachmentConfig, DependencyFlags, ImageLayout, LoadOp,
    PipelineStageFlags, SampleCount, StoreOp, SubpassConfig, SubpassDependency, SubpassIndex,
};

fn color(format: TextureFormat) -> AttachmentConfig {
    AttachmentConfig {
        load_op: LoadOp::Clear,
        store_op: StoreOp::Store,
        ..AttachmentConfig::new(format)
    }
}

// ============================================================================
// ATTACHMENTS
// ============================================================================

#[test]
fn test_swapchain_token_takes_surface_format() {
    let config = presets::forward().unwrap();
    let layout = RenderPassLayout::from_config(&config, TextureFormat::B8G8R8A8_SRGB).unwrap();

    assert_eq!(layout.attachments.len(), 2);
    assert_eq!(layout.attachments[0].format, vk::Format::B8G8R8A8_SRGB);
    assert_eq!(layout.attachments[0].final_layout, vk::ImageLayout::PRESENT_SRC_KHR);
    assert_eq!(layout.attachments[1].format, vk::Format::D32_SFLOAT);
    assert_eq!(layout.attachments[1].load_op, vk::AttachmentLoadOp::LOAD);
    assert_eq!(
        layout.attachments[1].initial_layout,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
    );
}

#[test]
fn test_unresolved_swapchain_token_is_rejected() {
    let config = presets::final_composite().unwrap();
    let result = RenderPassLayout::from_config(&config, TextureFormat::SWAPCHAIN);
    assert!(matches!(result, Err(Error::ValidationError(_))));
}

#[test]
fn test_missing_final_layout_follows_format() {
    let config = RenderPassConfig {
        attachments: vec![
            color(TextureFormat::R8G8B8A8_UNORM),
            AttachmentConfig::new(TextureFormat::D24_UNORM_S8_UINT),
        ],
        ..RenderPassConfig::default()
    };
    let layout = RenderPassLayout::from_config(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();

    assert_eq!(layout.attachments[0].final_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
    assert_eq!(
        layout.attachments[1].final_layout,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
    );
}

#[test]
fn test_sample_count_is_carried() {
    let config = presets::transparency(SampleCount::S4).unwrap();
    let layout = RenderPassLayout::from_config(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();

    assert!(layout
        .attachments
        .iter()
        .all(|attachment| attachment.samples == vk::SampleCountFlags::TYPE_4));
}

// ============================================================================
// SUBPASSES
// ============================================================================

#[test]
fn test_default_subpass_binds_color_and_depth() {
    let config = RenderPassConfig {
        attachments: vec![
            color(TextureFormat::R8G8B8A8_UNORM),
            AttachmentConfig::new(TextureFormat::D32_SFLOAT),
            color(TextureFormat::R16G16B16A16_SFLOAT),
        ],
        ..RenderPassConfig::default()
    };
    let layout = RenderPassLayout::from_config(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();

    assert_eq!(layout.subpasses.len(), 1);
    let subpass = &layout.subpasses[0];
    assert_eq!(subpass.bind_point, vk::PipelineBindPoint::GRAPHICS);
    assert_eq!(
        subpass.color.iter().map(|r| r.attachment).collect::<Vec<_>>(),
        vec![0, 2]
    );
    assert!(subpass
        .color
        .iter()
        .all(|r| r.layout == vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL));
    let depth = subpass.depth_stencil.expect("depth reference");
    assert_eq!(depth.attachment, 1);
    assert_eq!(depth.layout, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);
}

#[test]
fn test_declared_subpasses_are_kept() {
    let config = RenderPassConfig {
        attachments: vec![
            color(TextureFormat::R8G8B8A8_UNORM),
            color(TextureFormat::R8G8B8A8_UNORM),
        ],
        subpasses: vec![
            SubpassConfig {
                color_attachments: vec![AttachmentReference::new(0, ImageLayout::ColorAttachment)],
                preserve_attachments: vec![1],
                ..SubpassConfig::default()
            },
            SubpassConfig {
                color_attachments: vec![AttachmentReference::new(1, ImageLayout::ColorAttachment)],
                input_attachments: vec![AttachmentReference::new(0, ImageLayout::ShaderReadOnly)],
                ..SubpassConfig::default()
            },
        ],
        ..RenderPassConfig::default()
    };
    let layout = RenderPassLayout::from_config(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();

    assert_eq!(layout.subpasses.len(), 2);
    assert_eq!(layout.subpasses[0].preserve, vec![1]);
    assert!(layout.subpasses[0].depth_stencil.is_none());
    assert_eq!(layout.subpasses[1].input.len(), 1);
    assert_eq!(layout.subpasses[1].input[0].layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
}

#[test]
fn test_resolve_references_are_translated() {
    let config = RenderPassConfig {
        attachments: vec![
            AttachmentConfig {
                samples: SampleCount::S4,
                ..color(TextureFormat::R8G8B8A8_UNORM)
            },
            color(TextureFormat::R8G8B8A8_UNORM),
        ],
        subpasses: vec![SubpassConfig {
            color_attachments: vec![AttachmentReference::new(0, ImageLayout::ColorAttachment)],
            resolve_attachments: vec![AttachmentReference::new(1, ImageLayout::ColorAttachment)],
            ..SubpassConfig::default()
        }],
        ..RenderPassConfig::default()
    };
    let layout = RenderPassLayout::from_config(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();

    assert_eq!(layout.subpasses[0].resolve.len(), 1);
    assert_eq!(layout.subpasses[0].resolve[0].attachment, 1);

    let descriptions = layout.subpass_descriptions();
    assert_eq!(descriptions[0].color_attachment_count, 1);
    assert!(!descriptions[0].p_resolve_attachments.is_null());
}

#[test]
fn test_subpass_descriptions_without_optional_references() {
    let config = presets::deferred_lighting().unwrap();
    let layout = RenderPassLayout::from_config(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();
    let descriptions = layout.subpass_descriptions();

    assert_eq!(descriptions.len(), 1);
    assert_eq!(descriptions[0].color_attachment_count, 1);
    assert!(descriptions[0].p_resolve_attachments.is_null());
    assert!(descriptions[0].p_depth_stencil_attachment.is_null());
}

// ============================================================================
// DEPENDENCIES
// ============================================================================

#[test]
fn test_dependencies_are_wired() {
    let config = RenderPassConfig {
        attachments: vec![color(TextureFormat::R8G8B8A8_UNORM)],
        dependencies: vec![SubpassDependency {
            src_subpass: SubpassIndex::External,
            dst_subpass: SubpassIndex::Index(0),
            src_stage_mask: PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            dst_stage_mask: PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            src_access_mask: AccessFlags::empty(),
            dst_access_mask: AccessFlags::COLOR_ATTACHMENT_WRITE,
            dependency_flags: DependencyFlags::BY_REGION,
        }],
        ..RenderPassConfig::default()
    };
    let layout = RenderPassLayout::from_config(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();

    assert_eq!(layout.dependencies.len(), 1);
    let dependency = layout.dependencies[0];
    assert_eq!(dependency.src_subpass, vk::SUBPASS_EXTERNAL);
    assert_eq!(dependency.dst_subpass, 0);
    assert_eq!(dependency.src_stage_mask, vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT);
    assert_eq!(dependency.dst_access_mask, vk::AccessFlags::COLOR_ATTACHMENT_WRITE);
    assert_eq!(dependency.dependency_flags, vk::DependencyFlags::BY_REGION);
}

#[test]
fn test_presets_translate_without_dependencies() {
    let configs = [
        presets::forward(),
        presets::deferred_geometry(),
        presets::shadow_map(),
        presets::post_process(TextureFormat::SWAPCHAIN),
        presets::offscreen(TextureFormat::R8G8B8A8_UNORM, true),
    ];

    for config in configs {
        let config = config.unwrap();
        let layout = RenderPassLayout::from_config(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();
        assert_eq!(layout.attachments.len(), config.attachment_count());
        assert_eq!(layout.subpasses.len(), 1);
        assert!(layout.dependencies.is_empty());
    }
}
