//! Integration tests for VulkanGraphicsDevice
//!
//! These tests verify that VulkanGraphicsDevice correctly implements the GraphicsDevice trait.
//! All tests require a GPU and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_graphics_device_tests -- --ignored

mod gpu_test_utils;

use galaxy_3d_frame_graph::galaxy3d::Error;
use galaxy_3d_frame_graph::galaxy3d::render::{
    AcquireResult, FramebufferDesc, GraphicsDevice, ImageDesc, PresentResult,
};
use galaxy_3d_frame_graph::galaxy3d::render_pass::{presets, ClearValue, SampleCount, TextureFormat};
use gpu_test_utils::{get_test_graphics_device, TEST_HEIGHT, TEST_WIDTH};
use serial_test::serial;
use std::sync::Arc;

// ============================================================================
// IMAGE TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_create_color_image_and_view() {
    let device = get_test_graphics_device();

    let desc = ImageDesc::attachment("color", 256, 128, TextureFormat::R16G16B16A16_SFLOAT, SampleCount::S1);
    let image = device.create_image(&desc).unwrap();
    let view = device.create_image_view(&image).unwrap();

    assert_eq!(image.width(), 256);
    assert_eq!(image.height(), 128);
    assert_eq!(image.samples(), SampleCount::S1);
    assert_eq!(view.format(), TextureFormat::R16G16B16A16_SFLOAT);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_create_multisampled_depth_image() {
    let device = get_test_graphics_device();

    let desc = ImageDesc::attachment("depth", 64, 64, TextureFormat::D32_SFLOAT, SampleCount::S4);
    let image = device.create_image(&desc).unwrap();
    let view = device.create_image_view(&image).unwrap();

    assert_eq!(image.samples(), SampleCount::S4);
    assert_eq!(view.width(), 64);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_image_rejects_swapchain_token() {
    let device = get_test_graphics_device();

    let desc = ImageDesc::attachment("bad", 64, 64, TextureFormat::SWAPCHAIN, SampleCount::S1);
    assert!(matches!(device.create_image(&desc), Err(Error::ValidationError(_))));
}

// ============================================================================
// RENDER PASS / FRAMEBUFFER TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_create_every_preset() {
    let device = get_test_graphics_device();

    let configs = [
        presets::forward(),
        presets::deferred_geometry(),
        presets::deferred_lighting(),
        presets::shadow_map(),
        presets::depth_pre_pass(SampleCount::S1),
        presets::light_culling(),
        presets::transparency(SampleCount::S1),
        presets::post_process(TextureFormat::SWAPCHAIN),
        presets::ssao(),
        presets::bloom_bright(),
        presets::blur(TextureFormat::R16G16B16A16_SFLOAT),
        presets::offscreen(TextureFormat::R8G8B8A8_UNORM, true),
        presets::tone_mapping(),
        presets::final_composite(),
    ];

    for config in configs {
        let config = config.unwrap();
        let render_pass = device
            .create_render_pass(&config, TextureFormat::B8G8R8A8_UNORM)
            .unwrap_or_else(|e| panic!("preset '{}' failed: {}", config.label(), e));
        assert_eq!(render_pass.attachment_count(), config.attachment_count());
        assert_eq!(render_pass.name(), config.label());
    }
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_framebuffer_checks_attachment_count() {
    let device = get_test_graphics_device();

    let config = presets::offscreen(TextureFormat::R8G8B8A8_UNORM, true).unwrap();
    let render_pass = device.create_render_pass(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();

    let color = device
        .create_image(&ImageDesc::attachment("color", 128, 128, TextureFormat::R8G8B8A8_UNORM, SampleCount::S1))
        .unwrap();
    let depth = device
        .create_image(&ImageDesc::attachment("depth", 128, 128, TextureFormat::D32_SFLOAT, SampleCount::S1))
        .unwrap();
    let color_view = device.create_image_view(&color).unwrap();
    let depth_view = device.create_image_view(&depth).unwrap();

    let missing_depth = device.create_framebuffer(&FramebufferDesc {
        render_pass: &render_pass,
        attachments: vec![color_view.clone()],
        width: 128,
        height: 128,
    });
    assert!(matches!(missing_depth, Err(Error::ValidationError(_))));

    let framebuffer = device
        .create_framebuffer(&FramebufferDesc {
            render_pass: &render_pass,
            attachments: vec![color_view, depth_view],
            width: 128,
            height: 128,
        })
        .unwrap();
    assert_eq!(framebuffer.attachment_count(), 2);
    assert_eq!(framebuffer.width(), 128);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_framebuffer_rebuild() {
    let device = get_test_graphics_device();

    let config = presets::light_culling().unwrap();
    let render_pass = device.create_render_pass(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();
    let tiles = device
        .create_image(&ImageDesc::attachment("tiles", 128, 128, TextureFormat::R32_UINT, SampleCount::S1))
        .unwrap();
    let view = device.create_image_view(&tiles).unwrap();

    let mut framebuffer = device
        .create_framebuffer(&FramebufferDesc {
            render_pass: &render_pass,
            attachments: vec![view],
            width: 128,
            height: 128,
        })
        .unwrap();

    let framebuffer_mut = Arc::get_mut(&mut framebuffer).unwrap();
    framebuffer_mut.rebuild(64, 32).unwrap();
    assert!(matches!(framebuffer_mut.rebuild(0, 32), Err(Error::ValidationError(_))));

    assert_eq!(framebuffer.width(), 64);
    assert_eq!(framebuffer.height(), 32);
    assert_eq!(framebuffer.attachment_count(), 1);
}

// ============================================================================
// COMMAND LIST / SUBMISSION TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_record_and_submit_offscreen_pass() {
    let device = get_test_graphics_device();

    let config = presets::offscreen(TextureFormat::R8G8B8A8_UNORM, false).unwrap();
    let render_pass = device.create_render_pass(&config, TextureFormat::B8G8R8A8_UNORM).unwrap();
    let color = device
        .create_image(&ImageDesc::attachment("target", 64, 64, TextureFormat::R8G8B8A8_UNORM, SampleCount::S1))
        .unwrap();
    let framebuffer = device
        .create_framebuffer(&FramebufferDesc {
            render_pass: &render_pass,
            attachments: vec![device.create_image_view(&color).unwrap()],
            width: 64,
            height: 64,
        })
        .unwrap();

    let mut commands = device.create_command_list().unwrap();
    commands.begin().unwrap();
    commands.begin_render_pass(&render_pass, &framebuffer, &[ClearValue::BLACK]).unwrap();
    commands.end_render_pass().unwrap();
    commands.end().unwrap();

    let wait = device.create_semaphore().unwrap();
    let signal = device.create_semaphore().unwrap();
    let fence = device.create_fence(false).unwrap();

    // Submission waits on a semaphore: let an acquire signal it
    let mut swapchain = device.create_swapchain(TEST_WIDTH, TEST_HEIGHT).unwrap();
    match swapchain.acquire_next_image(wait.as_ref()).unwrap() {
        AcquireResult::Acquired { .. } => {}
        AcquireResult::OutOfDate => return,
    }

    device.submit(commands.as_ref(), wait.as_ref(), signal.as_ref(), fence.as_ref()).unwrap();
    assert!(fence.wait(u64::MAX).unwrap());
    fence.reset().unwrap();
    device.wait_idle().unwrap();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_command_list_state_errors() {
    let device = get_test_graphics_device();
    let mut commands = device.create_command_list().unwrap();

    assert!(commands.end().is_err(), "end() without begin() must fail");
    assert!(commands.end_render_pass().is_err());

    commands.begin().unwrap();
    assert!(commands.begin().is_err(), "begin() twice must fail");
    commands.end().unwrap();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_fence_timeout_is_not_an_error() {
    let device = get_test_graphics_device();

    let unsignaled = device.create_fence(false).unwrap();
    assert!(!unsignaled.wait(1_000).unwrap());

    let signaled = device.create_fence(true).unwrap();
    assert!(signaled.wait(0).unwrap());
    signaled.reset().unwrap();
    assert!(!signaled.wait(0).unwrap());
}

// ============================================================================
// SWAPCHAIN TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_swapchain_images_and_frame_count() {
    let device = get_test_graphics_device();
    let swapchain = device.create_swapchain(TEST_WIDTH, TEST_HEIGHT).unwrap();

    assert!(swapchain.image_count() >= 2);
    assert_eq!(swapchain.images().len(), swapchain.image_count());
    assert_eq!(swapchain.image_views().len(), swapchain.image_count());
    assert_eq!(swapchain.frame_count(), device.config().max_frames_in_flight);
    assert_ne!(swapchain.format(), TextureFormat::SWAPCHAIN);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_swapchain_zero_extent_is_an_error() {
    let device = get_test_graphics_device();
    assert!(device.create_swapchain(0, TEST_HEIGHT).is_err());

    let mut swapchain = device.create_swapchain(TEST_WIDTH, TEST_HEIGHT).unwrap();
    assert!(swapchain.recreate(TEST_WIDTH, 0).is_err());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_swapchain_recreate_keeps_old_views_alive() {
    let device = get_test_graphics_device();
    let mut swapchain = device.create_swapchain(TEST_WIDTH, TEST_HEIGHT).unwrap();

    let old_views = swapchain.image_views();
    swapchain.recreate(TEST_WIDTH, TEST_HEIGHT).unwrap();
    let new_views = swapchain.image_views();

    assert_eq!(new_views.len(), swapchain.image_count());
    assert!(!Arc::ptr_eq(&old_views[0], &new_views[0]));
    drop(old_views);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_acquire_render_present() {
    let device = get_test_graphics_device();
    let mut swapchain = device.create_swapchain(TEST_WIDTH, TEST_HEIGHT).unwrap();

    let config = presets::final_composite().unwrap();
    let render_pass = device.create_render_pass(&config, swapchain.format()).unwrap();
    let framebuffers: Vec<_> = swapchain
        .image_views()
        .into_iter()
        .map(|view| {
            device
                .create_framebuffer(&FramebufferDesc {
                    render_pass: &render_pass,
                    attachments: vec![view],
                    width: swapchain.width(),
                    height: swapchain.height(),
                })
                .unwrap()
        })
        .collect();

    let image_available = device.create_semaphore().unwrap();
    let render_finished = device.create_semaphore().unwrap();
    let fence = device.create_fence(false).unwrap();
    let mut commands = device.create_command_list().unwrap();

    let image_index = match swapchain.acquire_next_image(image_available.as_ref()).unwrap() {
        AcquireResult::Acquired { image_index, .. } => image_index,
        AcquireResult::OutOfDate => return,
    };

    commands.begin().unwrap();
    commands
        .begin_render_pass(&render_pass, &framebuffers[image_index as usize], &[ClearValue::BLACK])
        .unwrap();
    commands.end_render_pass().unwrap();
    commands.end().unwrap();

    device
        .submit(commands.as_ref(), image_available.as_ref(), render_finished.as_ref(), fence.as_ref())
        .unwrap();
    let presented = swapchain.present(image_index, render_finished.as_ref()).unwrap();
    assert_ne!(presented, PresentResult::OutOfDate);

    assert!(fence.wait(u64::MAX).unwrap());
    device.wait_idle().unwrap();
}
