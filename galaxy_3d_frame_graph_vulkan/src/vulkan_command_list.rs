/// CommandList - Vulkan implementation of the CommandList trait

use galaxy_3d_frame_graph::galaxy3d::{Error, Result};
use galaxy_3d_frame_graph::galaxy3d::render::{
    CommandList as RendererCommandList,
    Framebuffer as RendererFramebuffer,
    Image as RendererImage,
    RenderPass as RendererRenderPass,
};
use galaxy_3d_frame_graph::galaxy3d::render_pass::ClearValue;
use galaxy_3d_frame_graph::{engine_bail, engine_err, engine_error};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{aspect_mask, clear_value_to_vk};
use crate::vulkan_frame_buffer::Framebuffer;
use crate::vulkan_image::Image;
use crate::vulkan_render_pass::RenderPass;

/// Vulkan command list implementation
///
/// Owns a command pool with a single resettable primary buffer.
pub(crate) struct CommandList {
    /// Command pool for allocating command buffers
    command_pool: vk::CommandPool,
    /// Command buffer for recording
    pub(crate) command_buffer: vk::CommandBuffer,
    /// Whether the command list is currently recording
    is_recording: bool,
    /// Whether we're inside a render pass
    in_render_pass: bool,
    ctx: Arc<GpuContext>,
}

impl CommandList {
    /// Create a new command list on the graphics queue family
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        unsafe {
            let command_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(ctx.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = ctx.device.create_command_pool(&command_pool_create_info, None)
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to create command pool: {:?}", e);
                    Error::BackendError(format!("Failed to create command pool: {:?}", e))
                })?;

            let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = match ctx.device.allocate_command_buffers(&command_buffer_allocate_info) {
                Ok(buffers) => buffers,
                Err(e) => {
                    ctx.device.destroy_command_pool(command_pool, None);
                    engine_error!("galaxy3d::vulkan", "Failed to allocate command buffer: {:?}", e);
                    return Err(Error::BackendError(format!("Failed to allocate command buffers: {:?}", e)));
                }
            };

            Ok(Self {
                command_pool,
                command_buffer: command_buffers[0],
                is_recording: false,
                in_render_pass: false,
                ctx,
            })
        }
    }

    /// Downcast a command list created by this backend
    ///
    /// # Safety
    ///
    /// `commands` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(commands: &dyn RendererCommandList) -> &CommandList {
        &*(commands as *const dyn RendererCommandList as *const CommandList)
    }

    fn color_barrier(
        image: vk::Image,
        aspect: vk::ImageAspectFlags,
        old_layout: vk::ImageLayout,
        new_layout: vk::ImageLayout,
        src_access: vk::AccessFlags,
        dst_access: vk::AccessFlags,
    ) -> vk::ImageMemoryBarrier<'static> {
        vk::ImageMemoryBarrier::default()
            .old_layout(old_layout)
            .new_layout(new_layout)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            })
            .src_access_mask(src_access)
            .dst_access_mask(dst_access)
    }
}

impl RendererCommandList for CommandList {
    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            engine_bail!("galaxy3d::vulkan", "Command list already recording");
        }

        unsafe {
            self.ctx.device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| Error::BackendError(format!("Failed to reset command buffer: {:?}", e)))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

            self.ctx.device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| Error::BackendError(format!("Failed to begin command buffer: {:?}", e)))?;
        }

        self.is_recording = true;
        self.in_render_pass = false;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if !self.is_recording {
            engine_bail!("galaxy3d::vulkan", "Command list not recording");
        }
        if self.in_render_pass {
            engine_bail!("galaxy3d::vulkan", "Render pass not ended before ending command list");
        }

        unsafe {
            self.ctx.device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| Error::BackendError(format!("Failed to end command buffer: {:?}", e)))?;
        }

        self.is_recording = false;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        unsafe {
            self.ctx.device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to reset command buffer: {:?}", e))?;
        }

        self.is_recording = false;
        self.in_render_pass = false;
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn RendererRenderPass>,
        framebuffer: &Arc<dyn RendererFramebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        if !self.is_recording {
            engine_bail!("galaxy3d::vulkan", "Command list not recording");
        }
        if self.in_render_pass {
            engine_bail!("galaxy3d::vulkan", "Already inside a render pass");
        }
        if framebuffer.attachment_count() != render_pass.attachment_count() {
            engine_bail!("galaxy3d::vulkan",
                "Render pass '{}' has {} attachments, framebuffer has {}",
                render_pass.name(), render_pass.attachment_count(), framebuffer.attachment_count());
        }

        let vk_clear_values: Vec<vk::ClearValue> = clear_values.iter().map(clear_value_to_vk).collect();

        unsafe {
            let vk_render_pass = RenderPass::from_dyn(render_pass.as_ref());
            let vk_framebuffer = Framebuffer::from_dyn(framebuffer.as_ref());

            let render_pass_begin_info = vk::RenderPassBeginInfo::default()
                .render_pass(vk_render_pass.instance())
                .framebuffer(vk_framebuffer.framebuffer)
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent: vk::Extent2D {
                        width: framebuffer.width(),
                        height: framebuffer.height(),
                    },
                })
                .clear_values(&vk_clear_values);

            self.ctx.device.cmd_begin_render_pass(
                self.command_buffer,
                &render_pass_begin_info,
                vk::SubpassContents::INLINE,
            );
        }

        self.in_render_pass = true;
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        if !self.in_render_pass {
            engine_bail!("galaxy3d::vulkan", "Not inside a render pass");
        }

        unsafe {
            self.ctx.device.cmd_end_render_pass(self.command_buffer);
        }

        self.in_render_pass = false;
        Ok(())
    }

    fn resolve_image(&mut self, src: &Arc<dyn RendererImage>, dst: &Arc<dyn RendererImage>) -> Result<()> {
        if !self.is_recording {
            engine_bail!("galaxy3d::vulkan", "Command list not recording");
        }
        if self.in_render_pass {
            engine_bail!("galaxy3d::vulkan", "resolve_image recorded inside a render pass");
        }
        if !src.samples().is_multisampled() || dst.samples().is_multisampled() {
            engine_bail!("galaxy3d::vulkan",
                "resolve_image expects a multisampled source and a single-sample destination ({} -> {} samples)",
                src.samples().count(), dst.samples().count());
        }
        if src.width() != dst.width() || src.height() != dst.height() {
            engine_bail!("galaxy3d::vulkan",
                "resolve_image extent mismatch: {}x{} -> {}x{}",
                src.width(), src.height(), dst.width(), dst.height());
        }

        let aspect = aspect_mask(src.format());
        let extent = vk::Extent3D { width: src.width(), height: src.height(), depth: 1 };

        unsafe {
            let src_image = Image::from_dyn(src.as_ref()).image;
            let dst_image = Image::from_dyn(dst.as_ref()).image;
            let device = &self.ctx.device;

            let to_transfer = [
                Self::color_barrier(
                    src_image, aspect,
                    vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                    vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
                    vk::AccessFlags::TRANSFER_READ,
                ),
                // Previous content of the destination is fully overwritten
                Self::color_barrier(
                    dst_image, aspect,
                    vk::ImageLayout::UNDEFINED,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::AccessFlags::empty(),
                    vk::AccessFlags::TRANSFER_WRITE,
                ),
            ];
            device.cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                vk::PipelineStageFlags::TRANSFER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &to_transfer,
            );

            let subresource = vk::ImageSubresourceLayers {
                aspect_mask: aspect,
                mip_level: 0,
                base_array_layer: 0,
                layer_count: 1,
            };
            let region = vk::ImageResolve {
                src_subresource: subresource,
                src_offset: vk::Offset3D { x: 0, y: 0, z: 0 },
                dst_subresource: subresource,
                dst_offset: vk::Offset3D { x: 0, y: 0, z: 0 },
                extent,
            };
            device.cmd_resolve_image(
                self.command_buffer,
                src_image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                dst_image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );

            let to_attachment = [
                Self::color_barrier(
                    src_image, aspect,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                    vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                    vk::AccessFlags::TRANSFER_READ,
                    vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
                ),
                Self::color_barrier(
                    dst_image, aspect,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                    vk::AccessFlags::TRANSFER_WRITE,
                    vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
                ),
            ];
            device.cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &to_attachment,
            );
        }

        Ok(())
    }
}

impl Drop for CommandList {
    fn drop(&mut self) {
        unsafe {
            // Frees the command buffer with the pool
            self.ctx.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
