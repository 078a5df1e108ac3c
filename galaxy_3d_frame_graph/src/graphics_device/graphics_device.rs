/// GraphicsDevice trait - factory for every GPU object the frame graph needs

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    CommandList, Fence, Framebuffer, FramebufferDesc, Image, ImageDesc, ImageView, RenderPass,
    Semaphore, Swapchain,
};
use crate::render_pass::{RenderPassConfig, TextureFormat};

// ============================================================================
// Configuration
// ============================================================================

/// Device configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Frame slots recorded ahead of the GPU, independent of the swapchain image count
    pub max_frames_in_flight: usize,
    /// Use mailbox presentation when the surface offers it
    pub prefer_mailbox: bool,
    /// Timeout applied to every fence wait, in nanoseconds
    pub fence_timeout_ns: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Galaxy3D Application".to_string(),
            app_version: (1, 0, 0),
            max_frames_in_flight: 2,
            prefer_mailbox: true,
            fence_timeout_ns: u64::MAX,
        }
    }
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Central factory interface implemented by each backend
///
/// Every created object is released when its last handle is dropped.
pub trait GraphicsDevice: Send + Sync {
    /// Device configuration
    fn config(&self) -> &Config;

    /// Realize a render pass description
    ///
    /// # Arguments
    ///
    /// * `config` - Agnostic description (validated again by the backend)
    /// * `swapchain_format` - Concrete format substituted for `TextureFormat::SWAPCHAIN`
    fn create_render_pass(
        &self,
        config: &RenderPassConfig,
        swapchain_format: TextureFormat,
    ) -> Result<Arc<dyn RenderPass>>;

    /// Allocate a 2D image with its own device memory
    fn create_image(&self, desc: &ImageDesc) -> Result<Arc<dyn Image>>;

    /// Create a view covering the whole image
    fn create_image_view(&self, image: &Arc<dyn Image>) -> Result<Arc<dyn ImageView>>;

    /// Bind views to a render pass at fixed dimensions
    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    /// Create a fence, optionally already signaled
    fn create_fence(&self, signaled: bool) -> Result<Arc<dyn Fence>>;

    fn create_semaphore(&self) -> Result<Arc<dyn Semaphore>>;

    /// Allocate a primary command list
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Create the presentation swapchain for the device surface
    fn create_swapchain(&self, width: u32, height: u32) -> Result<Box<dyn Swapchain>>;

    /// Submit recorded commands
    ///
    /// # Arguments
    ///
    /// * `commands` - Recorded command list
    /// * `wait` - Semaphore waited at color attachment output (image available)
    /// * `signal` - Semaphore signaled on completion (render finished)
    /// * `fence` - Fence signaled on completion (frame slot)
    fn submit(
        &self,
        commands: &dyn CommandList,
        wait: &dyn Semaphore,
        signal: &dyn Semaphore,
        fence: &dyn Fence,
    ) -> Result<()>;

    /// Block until the device has finished all submitted work
    fn wait_idle(&self) -> Result<()>;
}
