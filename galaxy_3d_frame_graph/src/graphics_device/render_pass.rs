/// RenderPass trait - a realized `RenderPassConfig`

/// Native render pass created by `GraphicsDevice::create_render_pass()`
pub trait RenderPass: Send + Sync {
    /// Number of attachments a compatible framebuffer must provide
    fn attachment_count(&self) -> usize;

    /// Debug name taken from the config
    fn name(&self) -> &str;
}
