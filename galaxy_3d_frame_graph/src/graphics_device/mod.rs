/// Graphics device module - backend-facing traits and descriptors

pub mod graphics_device;
pub mod image;
pub mod render_pass;
pub mod frame_buffer;
pub mod sync;
pub mod command_list;
pub mod swapchain;

pub use graphics_device::*;
pub use image::*;
pub use render_pass::*;
pub use frame_buffer::*;
pub use sync::*;
pub use command_list::*;
pub use swapchain::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
