/// Swapchain trait - for window presentation

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Image, ImageView, Semaphore};
use crate::render_pass::TextureFormat;

/// Outcome of an image acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireResult {
    /// An image is ready once the signal semaphore fires
    Acquired { image_index: u32, suboptimal: bool },
    /// The surface changed; the swapchain must be rebuilt before rendering
    OutOfDate,
}

/// Outcome of a presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentResult {
    Presented,
    /// Presented, but the swapchain no longer matches the surface exactly
    Suboptimal,
    /// Not presented; the swapchain must be rebuilt
    OutOfDate,
}

/// Swapchain for presenting rendered images to a window
///
/// Owns its presentable images and views: the handles it hands out are borrowed
/// and stay valid until the next `recreate()` or until the swapchain is dropped.
pub trait Swapchain: Send + Sync {
    /// Acquire the next presentable image
    ///
    /// # Arguments
    ///
    /// * `signal` - Semaphore signaled when the image is available
    fn acquire_next_image(&mut self, signal: &dyn Semaphore) -> Result<AcquireResult>;

    /// Present an image once `wait` is signaled
    ///
    /// # Arguments
    ///
    /// * `image_index` - Index of the image to present (from acquire_next_image)
    /// * `wait` - Render-finished semaphore of the frame
    fn present(&mut self, image_index: u32, wait: &dyn Semaphore) -> Result<PresentResult>;

    /// Recreate the swapchain (e.g., after window resize)
    ///
    /// Zero width or height is an error; callers skip minimized windows.
    fn recreate(&mut self, width: u32, height: u32) -> Result<()>;

    /// Get the number of images in the swapchain
    fn image_count(&self) -> usize;

    /// Frame slots to use with this swapchain (`Config::max_frames_in_flight`, whatever the image count)
    fn frame_count(&self) -> usize;

    /// Get the width of the swapchain images in pixels
    fn width(&self) -> u32;

    /// Get the height of the swapchain images in pixels
    fn height(&self) -> u32;

    /// Get the pixel format of the swapchain images
    fn format(&self) -> TextureFormat;

    /// Presentable images, by image index
    fn images(&self) -> Vec<Arc<dyn Image>>;

    /// Views over the presentable images, by image index
    fn image_views(&self) -> Vec<Arc<dyn ImageView>>;
}
