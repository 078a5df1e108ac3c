/// Framebuffer trait - binds image views to a render pass
///
/// Created once per stage and swapchain image, recreated only when the
/// attachments change (e.g., window resize).

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{ImageView, RenderPass};

/// Framebuffer created via `GraphicsDevice::create_framebuffer()`
pub trait Framebuffer: Send + Sync {
    /// Get the width in pixels
    fn width(&self) -> u32;

    /// Get the height in pixels
    fn height(&self) -> u32;

    fn attachment_count(&self) -> usize;

    /// Recreate the native framebuffer over the same views at a new size
    ///
    /// Only the owner of the last reference can call this, through `Arc::get_mut`.
    fn rebuild(&mut self, width: u32, height: u32) -> Result<()>;
}

/// Descriptor for creating a framebuffer
pub struct FramebufferDesc<'a> {
    /// The render pass this framebuffer is compatible with
    pub render_pass: &'a Arc<dyn RenderPass>,
    /// One view per render pass attachment, in attachment order
    pub attachments: Vec<Arc<dyn ImageView>>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}
