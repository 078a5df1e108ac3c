/// Fluent builder for `RenderPassConfig`
///
/// Mutating methods validate eagerly and return `Result<&mut Self>` so calls chain
/// with `?`. `build()` is the only method producing a config.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_frame_graph::galaxy3d::render_pass::*;
///
/// # fn main() -> galaxy_3d_frame_graph::galaxy3d::Result<()> {
/// let config = RenderPassBuilder::new()
///     .set_name("Forward")
///     .add_color_attachment(AttachmentDesc::new(TextureFormat::SWAPCHAIN))?
///     .add_depth_attachment(AttachmentDesc::new(TextureFormat::D32_SFLOAT))?
///     .build()?;
/// assert_eq!(config.subpasses.len(), 1);
/// # Ok(())
/// # }
/// ```

use crate::error::Result;
use crate::{engine_bail_validation, engine_warn};
use crate::render_pass::config::{
    classify_attachment_references, AttachmentConfig, AttachmentDesc, RenderPassConfig,
    SubpassConfig, SubpassDependency, SubpassIndex,
};
use crate::render_pass::types::{
    AccessFlags, DependencyFlags, ImageLayout, LoadOp, PipelineStageFlags, SampleCount, StoreOp,
    TextureFormat,
};

#[derive(Debug, Default)]
pub struct RenderPassBuilder {
    name: Option<String>,
    attachments: Vec<AttachmentConfig>,
    subpasses: Vec<SubpassConfig>,
    dependencies: Vec<SubpassDependency>,
    multi_subpass_warned: bool,
}

impl RenderPassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debug name
    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    // ===== ATTACHMENTS =====

    /// Add a color attachment
    ///
    /// Defaults: 1 sample, clear/store, stencil don't-care, undefined initial layout,
    /// final layout `PresentSrc` for the swapchain token else `ColorAttachment`.
    pub fn add_color_attachment(&mut self, desc: AttachmentDesc) -> Result<&mut Self> {
        let final_layout = if desc.format == TextureFormat::SWAPCHAIN {
            ImageLayout::PresentSrc
        } else {
            ImageLayout::ColorAttachment
        };

        let attachment = AttachmentConfig {
            format: desc.format,
            samples: SampleCount::from_count(desc.samples.unwrap_or(1))?,
            load_op: desc.load_op.unwrap_or(LoadOp::Clear),
            store_op: desc.store_op.unwrap_or(StoreOp::Store),
            stencil_load_op: desc.stencil_load_op.unwrap_or(LoadOp::DontCare),
            stencil_store_op: desc.stencil_store_op.unwrap_or(StoreOp::DontCare),
            initial_layout: desc.initial_layout.unwrap_or(ImageLayout::Undefined),
            final_layout: Some(desc.final_layout.unwrap_or(final_layout)),
            clear_value: desc.clear_value,
        };

        self.push_attachment(attachment)
    }

    /// Add a depth or depth-stencil attachment
    ///
    /// Fails before touching the builder if the format is not a depth format.
    /// Defaults: clear/don't-care, stencil load `Clear` only when the format has
    /// a stencil component, final layout `DepthStencilAttachment`.
    pub fn add_depth_attachment(&mut self, desc: AttachmentDesc) -> Result<&mut Self> {
        if !desc.format.is_depth_format() {
            engine_bail_validation!("galaxy3d::render_pass",
                "Format {:?} is not a depth format", desc.format);
        }

        let stencil_load = if desc.format.has_stencil_component() {
            LoadOp::Clear
        } else {
            LoadOp::DontCare
        };

        let attachment = AttachmentConfig {
            format: desc.format,
            samples: SampleCount::from_count(desc.samples.unwrap_or(1))?,
            load_op: desc.load_op.unwrap_or(LoadOp::Clear),
            store_op: desc.store_op.unwrap_or(StoreOp::DontCare),
            stencil_load_op: desc.stencil_load_op.unwrap_or(stencil_load),
            stencil_store_op: desc.stencil_store_op.unwrap_or(StoreOp::DontCare),
            initial_layout: desc.initial_layout.unwrap_or(ImageLayout::Undefined),
            final_layout: Some(desc.final_layout.unwrap_or(ImageLayout::DepthStencilAttachment)),
            clear_value: desc.clear_value,
        };

        self.push_attachment(attachment)
    }

    /// Add a fully specified attachment
    pub fn add_attachment(&mut self, attachment: AttachmentConfig) -> Result<&mut Self> {
        self.push_attachment(attachment)
    }

    fn push_attachment(&mut self, attachment: AttachmentConfig) -> Result<&mut Self> {
        attachment.validate()?;
        self.attachments.push(attachment);
        Ok(self)
    }

    /// Set the sample count of every attachment added so far
    pub fn with_multisample(&mut self, samples: u32) -> Result<&mut Self> {
        let samples = SampleCount::from_count(samples)?;
        for attachment in &mut self.attachments {
            attachment.samples = samples;
        }
        Ok(self)
    }

    // ===== SUBPASSES =====

    /// Add a subpass after checking its references against the current attachments
    ///
    /// A second subpass is accepted, but some backends only support one:
    /// a warning is logged the first time it happens.
    pub fn add_subpass(&mut self, subpass: SubpassConfig) -> Result<&mut Self> {
        subpass.validate(self.attachments.len())?;
        self.subpasses.push(subpass);

        if self.subpasses.len() > 1 && !self.multi_subpass_warned {
            self.multi_subpass_warned = true;
            engine_warn!("galaxy3d::render_pass",
                "Render pass '{}' declares more than one subpass; not every backend supports multiple subpasses",
                self.label());
        }
        Ok(self)
    }

    /// Add the subpass binding every attachment: colors in order, first depth last
    pub fn create_default_subpass(&mut self) -> Result<&mut Self> {
        let subpass = classify_attachment_references(&self.attachments).into_subpass();
        self.add_subpass(subpass)
    }

    // ===== DEPENDENCIES =====

    pub fn add_dependency(&mut self, dependency: SubpassDependency) -> Result<&mut Self> {
        dependency.validate(self.subpasses.len())?;
        self.dependencies.push(dependency);
        Ok(self)
    }

    /// Add the usual external -> subpass 0 color output dependency
    pub fn add_default_external_dependency(&mut self) -> Result<&mut Self> {
        if self.subpasses.is_empty() {
            engine_bail_validation!("galaxy3d::render_pass",
                "Cannot add external dependency: no subpasses defined");
        }

        self.add_dependency(SubpassDependency {
            src_subpass: SubpassIndex::External,
            dst_subpass: SubpassIndex::Index(0),
            src_stage_mask: PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            dst_stage_mask: PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            src_access_mask: AccessFlags::empty(),
            dst_access_mask: AccessFlags::COLOR_ATTACHMENT_WRITE,
            dependency_flags: DependencyFlags::empty(),
        })
    }

    // ===== BUILD =====

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    pub fn subpass_count(&self) -> usize {
        self.subpasses.len()
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    /// Produce the config
    ///
    /// Synthesizes the default subpass when none was added, revalidates every
    /// subpass and returns copies that no later builder call can alter.
    pub fn build(&mut self) -> Result<RenderPassConfig> {
        if self.attachments.is_empty() {
            engine_bail_validation!("galaxy3d::render_pass",
                "Cannot build render pass '{}': no attachments defined", self.label());
        }

        if self.subpasses.is_empty() {
            self.create_default_subpass()?;
        } else if self.subpasses.len() > 1 {
            engine_warn!("galaxy3d::render_pass",
                "Building render pass '{}' with {} subpasses", self.label(), self.subpasses.len());
        }

        for subpass in &self.subpasses {
            subpass.validate(self.attachments.len())?;
        }

        Ok(RenderPassConfig {
            attachments: self.attachments.clone(),
            subpasses: self.subpasses.clone(),
            dependencies: self.dependencies.clone(),
            name: self.name.clone(),
        })
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
