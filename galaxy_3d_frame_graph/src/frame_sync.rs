//! Frame-in-flight synchronization
//!
//! Two index spaces live here: frame slots (`max_frames_in_flight`, usually 2) and
//! swapchain images (usually 2 to 4). Each frame slot owns an image-available
//! semaphore, a render-finished semaphore and a fence created signaled, so the
//! very first wait on a slot returns immediately. Each swapchain image carries an
//! optional tag naming the frame slot whose submission last used it.
//!
//! Per-frame protocol (driven by the caller):
//!
//! 1. `wait_for_fence(frame)`
//! 2. acquire an image with `image_available(frame)`
//! 3. `wait_if_image_in_flight(image)`
//! 4. `tag_image_with_frame_fence(image, frame)`
//! 5. `reset_fence(frame)`, then submit signaling `render_finished(frame)` and `in_flight_fence(frame)`
//! 6. present waiting on `render_finished(frame)`

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::graphics_device::{Fence, GraphicsDevice, Semaphore};
use crate::{engine_bail, engine_debug, engine_trace, engine_warn};

const SOURCE: &str = "galaxy3d::sync";

/// Per-frame semaphores and fences plus per-image fence tags
pub struct FrameSync {
    image_available: Vec<Arc<dyn Semaphore>>,
    render_finished: Vec<Arc<dyn Semaphore>>,
    in_flight: Vec<Arc<dyn Fence>>,
    /// Frame slot whose fence guards each swapchain image
    images_in_flight: Vec<Option<usize>>,
    fence_timeout_ns: u64,
}

impl FrameSync {
    /// Create the primitives for `max_frames_in_flight` slots and `image_count` images
    ///
    /// Fences use the device's configured timeout.
    pub fn new(device: &dyn GraphicsDevice, max_frames_in_flight: usize, image_count: usize) -> Result<Self> {
        if max_frames_in_flight == 0 {
            engine_bail!(SOURCE, "FrameSync needs at least one frame in flight");
        }

        let mut image_available = Vec::with_capacity(max_frames_in_flight);
        let mut render_finished = Vec::with_capacity(max_frames_in_flight);
        let mut in_flight = Vec::with_capacity(max_frames_in_flight);

        for _ in 0..max_frames_in_flight {
            image_available.push(device.create_semaphore()?);
            render_finished.push(device.create_semaphore()?);
            // Signaled, so the first wait on each slot does not block
            in_flight.push(device.create_fence(true)?);
        }

        engine_debug!(SOURCE, "Created sync objects: {} frame slots, {} swapchain images",
            max_frames_in_flight, image_count);

        Ok(Self {
            image_available,
            render_finished,
            in_flight,
            images_in_flight: vec![None; image_count],
            fence_timeout_ns: device.config().fence_timeout_ns,
        })
    }

    pub fn max_frames_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Number of tracked swapchain images
    pub fn image_count(&self) -> usize {
        self.images_in_flight.len()
    }

    pub fn fence_timeout_ns(&self) -> u64 {
        self.fence_timeout_ns
    }

    fn check_frame(&self, frame: usize) -> Result<()> {
        if frame >= self.in_flight.len() {
            return Err(Error::InvalidResource(format!(
                "Frame slot {} out of range (max frames in flight: {})", frame, self.in_flight.len())));
        }
        Ok(())
    }

    /// Semaphore signaled when the acquired image is available
    pub fn image_available(&self, frame: usize) -> Result<&Arc<dyn Semaphore>> {
        self.check_frame(frame)?;
        Ok(&self.image_available[frame])
    }

    /// Semaphore signaled when the slot's submission finishes rendering
    pub fn render_finished(&self, frame: usize) -> Result<&Arc<dyn Semaphore>> {
        self.check_frame(frame)?;
        Ok(&self.render_finished[frame])
    }

    /// Fence signaled when the slot's submission completes
    pub fn in_flight_fence(&self, frame: usize) -> Result<&Arc<dyn Fence>> {
        self.check_frame(frame)?;
        Ok(&self.in_flight[frame])
    }

    /// Block until the slot's previous submission finished
    ///
    /// Returns `Ok(false)` if the timeout elapsed first; the slot must then not be reused yet.
    pub fn wait_for_fence(&self, frame: usize) -> Result<bool> {
        self.check_frame(frame)?;
        let signaled = self.in_flight[frame].wait(self.fence_timeout_ns)?;
        if !signaled {
            engine_trace!(SOURCE, "Timed out waiting for frame slot {}", frame);
        }
        Ok(signaled)
    }

    /// Return the slot's fence to unsignaled, right before submitting with it
    pub fn reset_fence(&self, frame: usize) -> Result<()> {
        self.check_frame(frame)?;
        self.in_flight[frame].reset()
    }

    /// Wait for the frame slot that last used `image`, then clear its tag
    ///
    /// Untagged or out-of-range images return `Ok(true)` immediately. On timeout the
    /// tag is kept and `Ok(false)` is returned.
    pub fn wait_if_image_in_flight(&mut self, image: usize) -> Result<bool> {
        let Some(slot) = self.images_in_flight.get(image).copied().flatten() else {
            return Ok(true);
        };

        if !self.in_flight[slot].wait(self.fence_timeout_ns)? {
            engine_warn!(SOURCE, "Swapchain image {} still in use by frame slot {} after timeout", image, slot);
            return Ok(false);
        }

        self.images_in_flight[image] = None;
        Ok(true)
    }

    /// Record that `image` is now guarded by the fence of `frame`
    ///
    /// Out-of-range indices are ignored.
    pub fn tag_image_with_frame_fence(&mut self, image: usize, frame: usize) {
        if frame >= self.in_flight.len() {
            return;
        }
        if let Some(tag) = self.images_in_flight.get_mut(image) {
            *tag = Some(frame);
        }
    }

    /// Frame slot currently guarding `image`
    pub fn image_tag(&self, image: usize) -> Option<usize> {
        self.images_in_flight.get(image).copied().flatten()
    }

    /// Resize and clear the per-image tags after a swapchain recreation
    pub fn init_per_swapchain_images(&mut self, count: usize) {
        engine_debug!(SOURCE, "Tracking {} swapchain images (was {})", count, self.images_in_flight.len());
        self.images_in_flight = vec![None; count];
    }
}

#[cfg(test)]
#[path = "frame_sync_tests.rs"]
mod tests;
