/// RenderPass - Vulkan implementation of the RenderPass trait
///
/// `RenderPassLayout` turns a `RenderPassConfig` into owned Vulkan descriptions
/// (no device needed), `RenderPass` realizes it.

use galaxy_3d_frame_graph::galaxy3d::Result;
use galaxy_3d_frame_graph::galaxy3d::render::RenderPass as RendererRenderPass;
use galaxy_3d_frame_graph::galaxy3d::render_pass::{
    AttachmentReference, RenderPassConfig, TextureFormat,
};
use galaxy_3d_frame_graph::{engine_bail_validation, engine_err, engine_trace};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{
    access_to_vk, bind_point_to_vk, dependency_flags_to_vk, format_to_vk, image_layout_to_vk,
    load_op_to_vk, pipeline_stages_to_vk, sample_count_to_vk, store_op_to_vk, subpass_index_to_vk,
};

// ============================================================================
// Description
// ============================================================================

/// Attachment references of one subpass
#[derive(Debug, Clone)]
pub(crate) struct SubpassLayout {
    pub bind_point: vk::PipelineBindPoint,
    pub color: Vec<vk::AttachmentReference>,
    pub depth_stencil: Option<vk::AttachmentReference>,
    pub input: Vec<vk::AttachmentReference>,
    pub resolve: Vec<vk::AttachmentReference>,
    pub preserve: Vec<u32>,
}

/// Owned Vulkan description of a render pass
#[derive(Debug, Clone)]
pub(crate) struct RenderPassLayout {
    pub attachments: Vec<vk::AttachmentDescription>,
    pub subpasses: Vec<SubpassLayout>,
    pub dependencies: Vec<vk::SubpassDependency>,
}

fn reference_to_vk(reference: &AttachmentReference) -> vk::AttachmentReference {
    vk::AttachmentReference::default()
        .attachment(reference.attachment)
        .layout(image_layout_to_vk(reference.layout))
}

impl RenderPassLayout {
    /// Translate a validated config
    ///
    /// `SWAPCHAIN` attachments take `swapchain_format`. An empty subpass list
    /// becomes the default subpass over all attachments.
    pub(crate) fn from_config(config: &RenderPassConfig, swapchain_format: TextureFormat) -> Result<Self> {
        let mut attachments = Vec::with_capacity(config.attachments.len());
        for attachment in &config.attachments {
            let format = attachment.format.resolve(swapchain_format);
            if format == TextureFormat::SWAPCHAIN {
                engine_bail_validation!("galaxy3d::vulkan",
                    "Render pass '{}': swapchain format token used without a concrete swapchain format",
                    config.label());
            }

            attachments.push(vk::AttachmentDescription::default()
                .format(format_to_vk(format))
                .samples(sample_count_to_vk(attachment.samples))
                .load_op(load_op_to_vk(attachment.load_op))
                .store_op(store_op_to_vk(attachment.store_op))
                .stencil_load_op(load_op_to_vk(attachment.stencil_load_op))
                .stencil_store_op(store_op_to_vk(attachment.stencil_store_op))
                .initial_layout(image_layout_to_vk(attachment.initial_layout))
                .final_layout(image_layout_to_vk(attachment.effective_final_layout())));
        }

        let subpasses = config
            .effective_subpasses()
            .iter()
            .map(|subpass| SubpassLayout {
                bind_point: bind_point_to_vk(subpass.bind_point),
                color: subpass.color_attachments.iter().map(reference_to_vk).collect(),
                depth_stencil: subpass.depth_stencil_attachment.as_ref().map(reference_to_vk),
                input: subpass.input_attachments.iter().map(reference_to_vk).collect(),
                resolve: subpass.resolve_attachments.iter().map(reference_to_vk).collect(),
                preserve: subpass.preserve_attachments.clone(),
            })
            .collect();

        let dependencies = config
            .dependencies
            .iter()
            .map(|dependency| vk::SubpassDependency::default()
                .src_subpass(subpass_index_to_vk(dependency.src_subpass))
                .dst_subpass(subpass_index_to_vk(dependency.dst_subpass))
                .src_stage_mask(pipeline_stages_to_vk(dependency.src_stage_mask))
                .dst_stage_mask(pipeline_stages_to_vk(dependency.dst_stage_mask))
                .src_access_mask(access_to_vk(dependency.src_access_mask))
                .dst_access_mask(access_to_vk(dependency.dst_access_mask))
                .dependency_flags(dependency_flags_to_vk(dependency.dependency_flags)))
            .collect();

        Ok(Self { attachments, subpasses, dependencies })
    }

    /// Subpass descriptions borrowing this layout's reference arrays
    fn subpass_descriptions(&self) -> Vec<vk::SubpassDescription<'_>> {
        self.subpasses
            .iter()
            .map(|subpass| {
                let mut description = vk::SubpassDescription::default()
                    .pipeline_bind_point(subpass.bind_point)
                    .color_attachments(&subpass.color)
                    .input_attachments(&subpass.input)
                    .preserve_attachments(&subpass.preserve);
                // Resolve references must match the color count when present
                if !subpass.resolve.is_empty() {
                    description = description.resolve_attachments(&subpass.resolve);
                }
                if let Some(depth) = subpass.depth_stencil.as_ref() {
                    description = description.depth_stencil_attachment(depth);
                }
                description
            })
            .collect()
    }
}

// ============================================================================
// RenderPass
// ============================================================================

/// Vulkan render pass implementation
pub(crate) struct RenderPass {
    /// Vulkan render pass handle
    pub(crate) render_pass: vk::RenderPass,
    name: String,
    attachment_count: usize,
    ctx: Arc<GpuContext>,
}

impl RenderPass {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        config: &RenderPassConfig,
        swapchain_format: TextureFormat,
    ) -> Result<Self> {
        config.validate()?;
        let layout = RenderPassLayout::from_config(config, swapchain_format)?;
        let subpasses = layout.subpass_descriptions();

        let render_pass_info = vk::RenderPassCreateInfo::default()
            .attachments(&layout.attachments)
            .subpasses(&subpasses)
            .dependencies(&layout.dependencies);

        let render_pass = unsafe { ctx.device.create_render_pass(&render_pass_info, None) }
            .map_err(|e| engine_err!("galaxy3d::vulkan",
                "Failed to create render pass '{}': {:?}", config.label(), e))?;

        engine_trace!("galaxy3d::vulkan", "Render pass '{}' created ({} attachments, {} subpasses, {} dependencies)",
            config.label(), layout.attachments.len(), layout.subpasses.len(), layout.dependencies.len());

        Ok(Self {
            render_pass,
            name: config.label().to_string(),
            attachment_count: config.attachment_count(),
            ctx,
        })
    }

    /// Native handle
    pub(crate) fn instance(&self) -> vk::RenderPass {
        self.render_pass
    }

    /// Downcast a render pass created by this backend
    ///
    /// # Safety
    ///
    /// `render_pass` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(render_pass: &dyn RendererRenderPass) -> &RenderPass {
        &*(render_pass as *const dyn RendererRenderPass as *const RenderPass)
    }
}

impl RendererRenderPass for RenderPass {
    fn attachment_count(&self) -> usize {
        self.attachment_count
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_render_pass(self.render_pass, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_render_pass_tests.rs"]
mod tests;
