/// CommandList trait - for recording frame commands

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Framebuffer, Image, RenderPass};
use crate::render_pass::ClearValue;

/// Command list for recording rendering commands
///
/// Commands are recorded and later submitted via `GraphicsDevice::submit()`.
pub trait CommandList: Send + Sync {
    /// Begin recording commands (discards anything previously recorded)
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Drop whatever was recorded and return to the initial state
    ///
    /// Valid in any state, including mid-render-pass after a failed recording.
    fn reset(&mut self) -> Result<()>;

    /// Begin a render pass
    ///
    /// # Arguments
    ///
    /// * `render_pass` - The render pass to begin
    /// * `framebuffer` - Framebuffer whose views match the pass attachments
    /// * `clear_values` - One clear value per attachment
    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn RenderPass>,
        framebuffer: &Arc<dyn Framebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Resolve a multisampled color image into a single-sample image
    ///
    /// Must be recorded outside a render pass. Both images end in the layout
    /// they started in (color attachment).
    fn resolve_image(&mut self, src: &Arc<dyn Image>, dst: &Arc<dyn Image>) -> Result<()>;
}
