#![allow(dead_code)]
//! GPU test utilities - Shared Vulkan graphics device for integration tests
//!
//! This module provides a global VulkanGraphicsDevice instance shared across all GPU tests.
//! This avoids the `RecreationAttempt` error from ash-window when creating multiple
//! Vulkan surfaces in the same process.
//!
//! A surface accepts a single live swapchain, so tests creating swapchains or
//! renderers run with `#[serial]` and drop them before returning.

use galaxy_3d_frame_graph::galaxy3d::render::{Config, GraphicsDevice};
use galaxy_3d_frame_graph_vulkan::galaxy3d::VulkanGraphicsDevice;
use std::sync::{Arc, OnceLock};
use winit::event_loop::{EventLoop, EventLoopBuilder};
use winit::window::Window;

// Platform-specific imports for EventLoop threading
#[cfg(target_os = "windows")]
use winit::platform::windows::EventLoopBuilderExtWindows;
#[cfg(all(unix, not(target_os = "macos")))]
use winit::platform::x11::EventLoopBuilderExtX11;

/// Global VulkanGraphicsDevice instance (initialized once)
static GPU_GRAPHICS_DEVICE: OnceLock<Arc<VulkanGraphicsDevice>> = OnceLock::new();

/// Global Window (kept alive for the graphics device)
/// Note: EventLoop is intentionally leaked with mem::forget to keep Window valid
static GPU_WINDOW: OnceLock<Window> = OnceLock::new();

/// Window size used by every GPU test
pub const TEST_WIDTH: u32 = 800;
pub const TEST_HEIGHT: u32 = 600;

/// Get the shared VulkanGraphicsDevice for GPU tests
///
/// Lazily initializes the device on first call.
pub fn get_test_graphics_device() -> Arc<VulkanGraphicsDevice> {
    GPU_GRAPHICS_DEVICE
        .get_or_init(|| {
            let (window, event_loop) = create_test_window();

            let config = Config {
                app_name: "Galaxy3D GPU Tests".to_string(),
                ..Config::default()
            };
            let graphics_device = VulkanGraphicsDevice::new(&window, config)
                .expect("Failed to create VulkanGraphicsDevice for tests");

            // Leak EventLoop intentionally to keep Window valid
            std::mem::forget(event_loop);
            GPU_WINDOW.set(window).ok();

            Arc::new(graphics_device)
        })
        .clone()
}

/// Same device, as the trait object the frame graph consumes
pub fn get_test_device_dyn() -> Arc<dyn GraphicsDevice> {
    get_test_graphics_device()
}

/// Create a hidden test window
///
/// The EventLoop may be created outside the main thread (required for cargo test).
#[allow(deprecated)]
pub fn create_test_window() -> (Window, EventLoop<()>) {
    let event_loop = {
        #[cfg(any(target_os = "windows", all(unix, not(target_os = "macos"))))]
        {
            EventLoopBuilder::new()
                .with_any_thread(true)
                .build()
                .unwrap()
        }
        #[cfg(not(any(target_os = "windows", all(unix, not(target_os = "macos")))))]
        {
            EventLoopBuilder::new().build().unwrap()
        }
    };

    let window_attrs = Window::default_attributes()
        .with_title("GPU Test Window")
        .with_inner_size(winit::dpi::PhysicalSize::new(TEST_WIDTH, TEST_HEIGHT))
        .with_visible(false);

    let window = event_loop.create_window(window_attrs).unwrap();
    (window, event_loop)
}
