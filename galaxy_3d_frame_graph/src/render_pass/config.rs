/// Render pass description consumed by every backend
///
/// `RenderPassConfig` is the boundary between the agnostic description (built by
/// `RenderPassBuilder` or taken from the preset catalog) and the native render pass.

use crate::error::Result;
use crate::engine_bail_validation;
use crate::render_pass::types::{
    AccessFlags, ClearValue, DependencyFlags, ImageLayout, LoadOp, PipelineBindPoint,
    PipelineStageFlags, SampleCount, StoreOp, TextureFormat,
};

// ============================================================================
// ATTACHMENTS
// ============================================================================

/// Fully specified attachment of a render pass
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentConfig {
    /// Image format (may be the swapchain token)
    pub format: TextureFormat,
    /// Samples per pixel
    pub samples: SampleCount,
    /// Color/depth load operation
    pub load_op: LoadOp,
    /// Color/depth store operation
    pub store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    /// Layout the image is in when the pass begins
    pub initial_layout: ImageLayout,
    /// Layout after the pass. `None` lets the backend pick from the format.
    pub final_layout: Option<ImageLayout>,
    /// Clear value used when `load_op` is `Clear`
    pub clear_value: Option<ClearValue>,
}

impl AttachmentConfig {
    /// Attachment with every operation set to don't-care and an undefined initial layout
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            samples: SampleCount::S1,
            load_op: LoadOp::DontCare,
            store_op: StoreOp::DontCare,
            stencil_load_op: LoadOp::DontCare,
            stencil_store_op: StoreOp::DontCare,
            initial_layout: ImageLayout::Undefined,
            final_layout: None,
            clear_value: None,
        }
    }

    /// Final layout, falling back to the attachment role
    pub fn effective_final_layout(&self) -> ImageLayout {
        match self.final_layout {
            Some(layout) => layout,
            None if self.format.is_depth_format() => ImageLayout::DepthStencilAttachment,
            None => ImageLayout::ColorAttachment,
        }
    }

    /// Check that the clear value kind matches the format
    pub fn validate(&self) -> Result<()> {
        match self.clear_value {
            Some(ClearValue::Color(_)) if self.format.is_depth_format() => {
                engine_bail_validation!("galaxy3d::render_pass",
                    "Cannot use color clear value for depth format {:?}", self.format);
            }
            Some(ClearValue::DepthStencil { .. }) if !self.format.is_depth_format() => {
                engine_bail_validation!("galaxy3d::render_pass",
                    "Cannot use depth/stencil clear value for color format {:?}", self.format);
            }
            _ => Ok(()),
        }
    }
}

/// Partially specified attachment handed to the builder
///
/// Unset fields receive the builder's role-specific defaults.
/// `samples` stays a raw count so that unsupported values are rejected at insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentDesc {
    pub format: TextureFormat,
    pub samples: Option<u32>,
    pub load_op: Option<LoadOp>,
    pub store_op: Option<StoreOp>,
    pub stencil_load_op: Option<LoadOp>,
    pub stencil_store_op: Option<StoreOp>,
    pub initial_layout: Option<ImageLayout>,
    pub final_layout: Option<ImageLayout>,
    pub clear_value: Option<ClearValue>,
}

impl AttachmentDesc {
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            samples: None,
            load_op: None,
            store_op: None,
            stencil_load_op: None,
            stencil_store_op: None,
            initial_layout: None,
            final_layout: None,
            clear_value: None,
        }
    }

    pub fn samples(mut self, samples: u32) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn load_op(mut self, op: LoadOp) -> Self {
        self.load_op = Some(op);
        self
    }

    pub fn store_op(mut self, op: StoreOp) -> Self {
        self.store_op = Some(op);
        self
    }

    pub fn stencil_ops(mut self, load: LoadOp, store: StoreOp) -> Self {
        self.stencil_load_op = Some(load);
        self.stencil_store_op = Some(store);
        self
    }

    pub fn initial_layout(mut self, layout: ImageLayout) -> Self {
        self.initial_layout = Some(layout);
        self
    }

    pub fn final_layout(mut self, layout: ImageLayout) -> Self {
        self.final_layout = Some(layout);
        self
    }

    pub fn clear(mut self, value: ClearValue) -> Self {
        self.clear_value = Some(value);
        self
    }
}

// ============================================================================
// SUBPASSES
// ============================================================================

/// Reference from a subpass to one attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentReference {
    /// Index into `RenderPassConfig::attachments`
    pub attachment: u32,
    /// Layout during the subpass
    pub layout: ImageLayout,
}

impl AttachmentReference {
    pub fn new(attachment: u32, layout: ImageLayout) -> Self {
        Self { attachment, layout }
    }
}

/// One subpass of a render pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubpassConfig {
    pub bind_point: PipelineBindPoint,
    pub color_attachments: Vec<AttachmentReference>,
    pub depth_stencil_attachment: Option<AttachmentReference>,
    /// Attachments read from a previous subpass
    pub input_attachments: Vec<AttachmentReference>,
    /// MSAA resolve targets; empty, or one per color attachment
    pub resolve_attachments: Vec<AttachmentReference>,
    /// Attachments untouched by this subpass whose content must survive it
    pub preserve_attachments: Vec<u32>,
}

impl SubpassConfig {
    /// Check resolve arity and that every reference lies in `[0, attachment_count)`
    pub fn validate(&self, attachment_count: usize) -> Result<()> {
        if !self.resolve_attachments.is_empty()
            && self.resolve_attachments.len() != self.color_attachments.len()
        {
            engine_bail_validation!("galaxy3d::render_pass",
                "Resolve attachments count ({}) must match color attachments count ({})",
                self.resolve_attachments.len(), self.color_attachments.len());
        }

        let check = |reference: &AttachmentReference, kind: &str| -> Result<()> {
            if reference.attachment as usize >= attachment_count {
                engine_bail_validation!("galaxy3d::render_pass",
                    "Invalid {} attachment reference: {} ({} attachments defined)",
                    kind, reference.attachment, attachment_count);
            }
            Ok(())
        };

        for reference in &self.color_attachments {
            check(reference, "color")?;
        }
        if let Some(reference) = &self.depth_stencil_attachment {
            check(reference, "depth-stencil")?;
        }
        for reference in &self.input_attachments {
            check(reference, "input")?;
        }
        for reference in &self.resolve_attachments {
            check(reference, "resolve")?;
        }
        for &index in &self.preserve_attachments {
            if index as usize >= attachment_count {
                engine_bail_validation!("galaxy3d::render_pass",
                    "Invalid preserve attachment reference: {} ({} attachments defined)",
                    index, attachment_count);
            }
        }
        Ok(())
    }
}

// ============================================================================
// DEPENDENCIES
// ============================================================================

/// Subpass endpoint of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubpassIndex {
    Index(u32),
    /// Work outside the render pass
    External,
}

/// Execution and memory dependency between two subpasses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpassDependency {
    pub src_subpass: SubpassIndex,
    pub dst_subpass: SubpassIndex,
    pub src_stage_mask: PipelineStageFlags,
    pub dst_stage_mask: PipelineStageFlags,
    pub src_access_mask: AccessFlags,
    pub dst_access_mask: AccessFlags,
    pub dependency_flags: DependencyFlags,
}

impl SubpassDependency {
    /// Check subpass indices against `subpass_count` and forbid backward dependencies
    pub fn validate(&self, subpass_count: usize) -> Result<()> {
        for (side, index) in [("source", self.src_subpass), ("destination", self.dst_subpass)] {
            if let SubpassIndex::Index(i) = index {
                if i as usize >= subpass_count {
                    engine_bail_validation!("galaxy3d::render_pass",
                        "Invalid {} subpass: {} ({} subpasses defined, or External)",
                        side, i, subpass_count);
                }
            }
        }

        if let (SubpassIndex::Index(src), SubpassIndex::Index(dst)) = (self.src_subpass, self.dst_subpass) {
            if src > dst {
                engine_bail_validation!("galaxy3d::render_pass",
                    "Source subpass ({}) cannot come after destination subpass ({})", src, dst);
            }
        }
        Ok(())
    }
}

// ============================================================================
// RENDER PASS
// ============================================================================

/// Complete agnostic render pass description
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderPassConfig {
    pub attachments: Vec<AttachmentConfig>,
    /// Empty means "one subpass over all attachments"
    pub subpasses: Vec<SubpassConfig>,
    pub dependencies: Vec<SubpassDependency>,
    /// Debug name
    pub name: Option<String>,
}

impl RenderPassConfig {
    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    /// Debug name or a placeholder
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    /// Subpasses to realize: the declared ones, or the default one synthesized from attachments
    pub fn effective_subpasses(&self) -> Vec<SubpassConfig> {
        if self.subpasses.is_empty() {
            vec![classify_attachment_references(&self.attachments).into_subpass()]
        } else {
            self.subpasses.clone()
        }
    }

    /// Validate the whole description before realization
    pub fn validate(&self) -> Result<()> {
        if self.attachments.is_empty() {
            engine_bail_validation!("galaxy3d::render_pass",
                "Render pass '{}' has no attachments", self.label());
        }
        for attachment in &self.attachments {
            attachment.validate()?;
        }
        for subpass in &self.subpasses {
            subpass.validate(self.attachments.len())?;
        }
        let subpass_count = self.subpasses.len().max(1);
        for dependency in &self.dependencies {
            dependency.validate(subpass_count)?;
        }
        Ok(())
    }
}

// ============================================================================
// ATTACHMENT CLASSIFICATION
// ============================================================================

/// Color and depth references derived from an attachment list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttachmentClassification {
    /// Color and swapchain attachments, in declaration order
    pub color: Vec<AttachmentReference>,
    /// First depth attachment, if any
    pub depth: Option<AttachmentReference>,
}

impl AttachmentClassification {
    /// Graphics subpass binding exactly these references
    pub fn into_subpass(self) -> SubpassConfig {
        SubpassConfig {
            color_attachments: self.color,
            depth_stencil_attachment: self.depth,
            ..SubpassConfig::default()
        }
    }
}

/// Partition attachments into color references and at most one depth reference
///
/// Shared by the builder's default subpass and by backend realization so that both
/// bind the same attachments for the same list. The first depth attachment wins;
/// later depth attachments are left unreferenced.
pub fn classify_attachment_references(attachments: &[AttachmentConfig]) -> AttachmentClassification {
    let mut classification = AttachmentClassification::default();

    for (index, attachment) in attachments.iter().enumerate() {
        let index = index as u32;
        if attachment.format.is_depth_format() {
            if classification.depth.is_none() {
                classification.depth = Some(AttachmentReference::new(index, ImageLayout::DepthStencilAttachment));
            }
        } else {
            classification.color.push(AttachmentReference::new(index, ImageLayout::ColorAttachment));
        }
    }

    classification
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
