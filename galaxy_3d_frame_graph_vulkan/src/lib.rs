/*!
# Galaxy 3D Frame Graph - Vulkan Backend

Vulkan implementation of the `GraphicsDevice` trait of galaxy_3d_frame_graph.

This crate uses the Ash library for Vulkan bindings, ash-window for the window
surface and gpu-allocator for attachment memory. Validation layer support is
compiled in with the `vulkan-validation` feature.

# Example

```no_run
use galaxy_3d_frame_graph::galaxy3d::Renderer;
use galaxy_3d_frame_graph::galaxy3d::render::{Config, RendererOptions};
use galaxy_3d_frame_graph_vulkan::galaxy3d::VulkanGraphicsDevice;
use std::sync::Arc;

# fn run(window: &winit::window::Window) -> galaxy_3d_frame_graph::galaxy3d::Result<()> {
let device = Arc::new(VulkanGraphicsDevice::new(window, Config::default())?);
let mut renderer = Renderer::new(device, 1280, 720, RendererOptions::default())?;
renderer.render_frame()?;
# Ok(())
# }
```
*/

mod vulkan_context;
mod vulkan_debug;
mod vulkan_format;
mod vulkan_image;
mod vulkan_render_pass;
mod vulkan_frame_buffer;
mod vulkan_sync;
mod vulkan_command_list;
mod vulkan_swapchain;
mod vulkan_graphics_device;

pub mod galaxy3d {
    pub use crate::vulkan_graphics_device::VulkanGraphicsDevice;

    #[cfg(feature = "vulkan-validation")]
    pub use crate::vulkan_debug::enabled::{
        print_validation_stats_report, validation_stats, ValidationStats,
    };
}
