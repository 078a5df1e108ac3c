//! Renderer - per-window frame driver
//!
//! Owns the swapchain, the frame graph, the frame-in-flight primitives and one
//! command list per frame slot, and runs the per-frame protocol:
//! wait fence, acquire, wait for the image's previous user, tag, record,
//! reset fence, submit, present, advance the frame slot.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::frame_sync::FrameSync;
use crate::graphics_device::{AcquireResult, CommandList, GraphicsDevice, PresentResult, Swapchain};
use crate::pipeline::{PipelineOptions, RenderPipeline};
use crate::{engine_bail_validation, engine_debug, engine_info, engine_trace};

const SOURCE: &str = "galaxy3d::renderer";

// ============================================================================
// Options / status
// ============================================================================

/// Renderer options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererOptions {
    /// Color the final composite clears the presentable image to
    pub clear_color: [f32; 4],
    /// Frame graph options (shadow map size, initial MSAA)
    pub pipeline: PipelineOptions,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            pipeline: PipelineOptions::default(),
        }
    }
}

/// Outcome of `Renderer::render_frame()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Frame submitted and handed to presentation
    Presented { image_index: u32 },
    /// Swapchain out of date at acquire; nothing rendered until `rebuild_frame()`
    OutOfDate,
    /// Nothing rendered: minimized, waiting for a rebuild, or a fence wait timed out
    Skipped,
}

// ============================================================================
// Renderer
// ============================================================================

pub struct Renderer {
    device: Arc<dyn GraphicsDevice>,
    options: RendererOptions,
    pipeline: Option<RenderPipeline>,
    swapchain: Option<Box<dyn Swapchain>>,
    sync: Option<FrameSync>,
    command_lists: Vec<Box<dyn CommandList>>,
    frame_index: usize,
    needs_rebuild: bool,
    /// An acquired image was abandoned; its semaphore must not be reused
    sync_stale: bool,
    minimized: bool,
    disposed: bool,
}

impl Renderer {
    /// Create the swapchain, sync objects, command lists and frame graph
    ///
    /// # Arguments
    ///
    /// * `device` - Graphics device (shared with the caller)
    /// * `width`, `height` - Initial surface size (non-zero)
    /// * `options` - Clear color and frame graph options
    pub fn new(device: Arc<dyn GraphicsDevice>, width: u32, height: u32, options: RendererOptions) -> Result<Self> {
        if width == 0 || height == 0 {
            engine_bail_validation!(SOURCE, "Renderer needs a non-zero initial size, got {}x{}", width, height);
        }

        let swapchain = device.create_swapchain(width, height)?;
        let frame_count = swapchain.frame_count();
        let sync = FrameSync::new(device.as_ref(), frame_count, swapchain.image_count())?;
        let command_lists = allocate_command_lists(device.as_ref(), frame_count)?;

        let pipeline = RenderPipeline::new(
            device.clone(),
            swapchain.width(),
            swapchain.height(),
            swapchain.format(),
            swapchain.images(),
            swapchain.image_views(),
            options.pipeline,
        )?;

        engine_info!(SOURCE, "Renderer created: {}x{}, {} swapchain images, {} frames in flight",
            swapchain.width(), swapchain.height(), swapchain.image_count(), frame_count);

        Ok(Self {
            device,
            options,
            pipeline: Some(pipeline),
            swapchain: Some(swapchain),
            sync: Some(sync),
            command_lists,
            frame_index: 0,
            needs_rebuild: false,
            sync_stale: false,
            minimized: false,
            disposed: false,
        })
    }

    // ===== ACCESSORS =====

    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.options.clear_color = color;
    }

    pub fn pipeline(&self) -> Option<&RenderPipeline> {
        self.pipeline.as_ref()
    }

    /// Mutable frame graph access (MSAA, custom post-process stages)
    pub fn pipeline_mut(&mut self) -> Option<&mut RenderPipeline> {
        self.pipeline.as_mut()
    }

    pub fn swapchain(&self) -> Option<&dyn Swapchain> {
        self.swapchain.as_deref()
    }

    pub fn sync(&self) -> Option<&FrameSync> {
        self.sync.as_ref()
    }

    /// Frame slot used by the next `render_frame()`
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn command_list_count(&self) -> usize {
        self.command_lists.len()
    }

    /// True after an out-of-date acquire, until `rebuild_frame()` runs
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ===== FRAME =====

    /// Render and present one frame
    ///
    /// Out-of-date acquisition marks the renderer for rebuild; suboptimal and
    /// out-of-date presentation are ignored (the next acquire reports them).
    pub fn render_frame(&mut self) -> Result<FrameStatus> {
        if self.disposed {
            return Err(Error::InvalidResource("Renderer is disposed".to_string()));
        }
        if self.minimized || self.needs_rebuild {
            return Ok(FrameStatus::Skipped);
        }

        let (Some(swapchain), Some(sync), Some(pipeline)) =
            (self.swapchain.as_mut(), self.sync.as_mut(), self.pipeline.as_ref())
        else {
            return Err(Error::InvalidResource("Renderer is not initialized".to_string()));
        };
        if !pipeline.is_built() {
            self.needs_rebuild = true;
            return Err(Error::InvalidResource("Render pipeline is not built".to_string()));
        }

        let frame = self.frame_index;
        if !sync.wait_for_fence(frame)? {
            return Ok(FrameStatus::Skipped);
        }

        let image_index = match swapchain.acquire_next_image(sync.image_available(frame)?.as_ref())? {
            AcquireResult::Acquired { image_index, suboptimal } => {
                if suboptimal {
                    engine_trace!(SOURCE, "Acquired suboptimal swapchain image {}", image_index);
                }
                image_index
            }
            AcquireResult::OutOfDate => {
                engine_debug!(SOURCE, "Swapchain out of date, rebuild required");
                self.needs_rebuild = true;
                return Ok(FrameStatus::OutOfDate);
            }
        };

        let image = image_index as usize;
        if !sync.wait_if_image_in_flight(image)? {
            // The acquired image and its semaphore are abandoned: start over with fresh sync objects
            self.needs_rebuild = true;
            self.sync_stale = true;
            return Ok(FrameStatus::Skipped);
        }
        sync.tag_image_with_frame_fence(image, frame);

        let commands = self.command_lists.get_mut(frame).ok_or_else(|| Error::InvalidResource(
            format!("No command list for frame slot {}", frame)))?;
        if let Err(err) = record_frame(commands.as_mut(), pipeline, image_index, self.options.clear_color) {
            // The acquired image and its signaled semaphore are abandoned with the recording
            commands.reset()?;
            self.needs_rebuild = true;
            self.sync_stale = true;
            return Err(err);
        }

        sync.reset_fence(frame)?;
        self.device.submit(
            commands.as_ref(),
            sync.image_available(frame)?.as_ref(),
            sync.render_finished(frame)?.as_ref(),
            sync.in_flight_fence(frame)?.as_ref(),
        )?;

        match swapchain.present(image_index, sync.render_finished(frame)?.as_ref())? {
            PresentResult::Presented => {}
            PresentResult::Suboptimal | PresentResult::OutOfDate => {
                engine_trace!(SOURCE, "Presentation of image {} reported a stale swapchain", image_index);
            }
        }

        self.frame_index = (frame + 1) % sync.max_frames_in_flight();
        Ok(FrameStatus::Presented { image_index })
    }

    /// Recreate the swapchain for a new surface size and propagate it
    ///
    /// A zero width or height marks the renderer minimized and leaves everything
    /// else untouched. Sync objects are recreated only when the frame count changed
    /// (per-image tags are always reset); command lists are reallocated only when
    /// their count differs from the frame count.
    pub fn rebuild_frame(&mut self, width: u32, height: u32) -> Result<()> {
        if self.disposed {
            return Err(Error::InvalidResource("Renderer is disposed".to_string()));
        }

        self.device.wait_idle()?;

        if width == 0 || height == 0 {
            engine_debug!(SOURCE, "Surface minimized, rendering suspended");
            self.minimized = true;
            return Ok(());
        }
        self.minimized = false;

        let swapchain = self.swapchain.as_mut().ok_or_else(|| Error::InvalidResource(
            "Renderer has no swapchain".to_string()))?;
        swapchain.recreate(width, height)?;
        let frame_count = swapchain.frame_count();
        let image_count = swapchain.image_count();

        let recreate_sync = self.sync_stale
            || self.sync.as_ref().map_or(true, |sync| sync.max_frames_in_flight() != frame_count);
        if recreate_sync {
            self.sync = None;
            self.sync = Some(FrameSync::new(self.device.as_ref(), frame_count, image_count)?);
            self.sync_stale = false;
            self.frame_index = 0;
        } else if let Some(sync) = self.sync.as_mut() {
            sync.init_per_swapchain_images(image_count);
        }

        if self.command_lists.len() != frame_count {
            engine_debug!(SOURCE, "Reallocating command lists: {} -> {}", self.command_lists.len(), frame_count);
            self.command_lists = allocate_command_lists(self.device.as_ref(), frame_count)?;
        }
        if self.frame_index >= frame_count {
            self.frame_index = 0;
        }

        let pipeline = self.pipeline.as_mut().ok_or_else(|| Error::InvalidResource(
            "Renderer has no render pipeline".to_string()))?;
        pipeline.update_swapchain(swapchain.images(), swapchain.image_views(), Some(swapchain.format()))?;

        self.needs_rebuild = false;
        engine_debug!(SOURCE, "Frame rebuilt: {}x{}, {} images, {} frames in flight",
            swapchain.width(), swapchain.height(), image_count, frame_count);
        Ok(())
    }

    // ===== LIFECYCLE =====

    /// Wait for the device, then release pipeline, swapchain, sync objects and command lists
    ///
    /// Calling this again does nothing.
    pub fn dispose(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }

        self.device.wait_idle()?;

        self.pipeline = None;
        self.swapchain = None;
        self.sync = None;
        self.command_lists.clear();
        self.disposed = true;

        engine_debug!(SOURCE, "Renderer disposed");
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // Errors are already logged by the device
        let _ = self.dispose();
    }
}

fn record_frame(
    commands: &mut dyn CommandList,
    pipeline: &RenderPipeline,
    image_index: u32,
    clear_color: [f32; 4],
) -> Result<()> {
    commands.begin()?;
    pipeline.record(commands, image_index, clear_color)?;
    commands.end()
}

fn allocate_command_lists(device: &dyn GraphicsDevice, count: usize) -> Result<Vec<Box<dyn CommandList>>> {
    (0..count).map(|_| device.create_command_list()).collect()
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
