/// Framebuffer - Vulkan implementation of the Framebuffer trait
///
/// Wraps a VkFramebuffer that binds image views to a render pass.
/// Created once per stage and swapchain image, reused each frame.

use galaxy_3d_frame_graph::galaxy3d::Result;
use galaxy_3d_frame_graph::galaxy3d::render::{
    Framebuffer as RendererFramebuffer, FramebufferDesc, ImageView as RendererImageView,
    RenderPass as RendererRenderPass,
};
use galaxy_3d_frame_graph::{engine_bail_validation, engine_err};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_image::ImageView;
use crate::vulkan_render_pass::RenderPass;

/// Vulkan framebuffer implementation
///
/// Keeps its views and render pass alive. Destroyed when dropped.
pub(crate) struct Framebuffer {
    /// Vulkan framebuffer handle
    pub(crate) framebuffer: vk::Framebuffer,
    width: u32,
    height: u32,
    attachments: Vec<Arc<dyn RendererImageView>>,
    render_pass: Arc<dyn RendererRenderPass>,
    ctx: Arc<GpuContext>,
}

impl Framebuffer {
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &FramebufferDesc) -> Result<Self> {
        let expected = desc.render_pass.attachment_count();
        if desc.attachments.is_empty() || desc.attachments.len() != expected {
            engine_bail_validation!("galaxy3d::vulkan",
                "Framebuffer for '{}': {} views given, render pass has {} attachments",
                desc.render_pass.name(), desc.attachments.len(), expected);
        }
        if desc.width == 0 || desc.height == 0 {
            engine_bail_validation!("galaxy3d::vulkan",
                "Framebuffer for '{}' has a zero extent ({}x{})",
                desc.render_pass.name(), desc.width, desc.height);
        }

        let framebuffer = Self::create_native(&ctx, desc.render_pass, &desc.attachments, desc.width, desc.height)?;

        Ok(Self {
            framebuffer,
            width: desc.width,
            height: desc.height,
            attachments: desc.attachments.clone(),
            render_pass: desc.render_pass.clone(),
            ctx,
        })
    }

    fn create_native(
        ctx: &GpuContext,
        render_pass: &Arc<dyn RendererRenderPass>,
        attachments: &[Arc<dyn RendererImageView>],
        width: u32,
        height: u32,
    ) -> Result<vk::Framebuffer> {
        let (vk_render_pass, views) = unsafe {
            let vk_render_pass = RenderPass::from_dyn(render_pass.as_ref()).instance();
            let views: Vec<vk::ImageView> = attachments
                .iter()
                .map(|view| ImageView::from_dyn(view.as_ref()).view)
                .collect();
            (vk_render_pass, views)
        };

        let framebuffer_info = vk::FramebufferCreateInfo::default()
            .render_pass(vk_render_pass)
            .attachments(&views)
            .width(width)
            .height(height)
            .layers(1);

        unsafe { ctx.device.create_framebuffer(&framebuffer_info, None) }
            .map_err(|e| engine_err!("galaxy3d::vulkan",
                "Failed to create framebuffer for '{}': {:?}", render_pass.name(), e))
    }

    /// Downcast a framebuffer created by this backend
    ///
    /// # Safety
    ///
    /// `framebuffer` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(framebuffer: &dyn RendererFramebuffer) -> &Framebuffer {
        &*(framebuffer as *const dyn RendererFramebuffer as *const Framebuffer)
    }
}

impl RendererFramebuffer for Framebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    fn rebuild(&mut self, width: u32, height: u32) -> Result<()> {
        if self.attachments.is_empty() {
            engine_bail_validation!("galaxy3d::vulkan",
                "Framebuffer for '{}' has no attachments", self.render_pass.name());
        }
        if width == 0 || height == 0 {
            engine_bail_validation!("galaxy3d::vulkan",
                "Framebuffer for '{}' has a zero extent ({}x{})", self.render_pass.name(), width, height);
        }

        let framebuffer = Self::create_native(&self.ctx, &self.render_pass, &self.attachments, width, height)?;
        unsafe {
            self.ctx.device.destroy_framebuffer(self.framebuffer, None);
        }
        self.framebuffer = framebuffer;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}
