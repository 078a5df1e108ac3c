/// RenderStage - one realized render pass of the pipeline with its resources
///
/// A stage owns the framebuffers and the images/views it allocated, and holds
/// borrowed views produced elsewhere (an earlier stage, the swapchain). Owned and
/// borrowed handles are kept apart so that disposal only ever releases what the
/// stage allocated.

use std::sync::Arc;

use crate::graphics_device::{Framebuffer, Image, ImageView, RenderPass};
use crate::render_pass::{ClearValue, RenderPassConfig};
use crate::engine_debug;

/// Position of a stage in the fixed pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    ShadowMap,
    DepthPrePass,
    LightCulling,
    Forward,
    Transparency,
    CustomPostProcess,
    FinalComposite,
}

/// User-registered post-process pass, inserted between transparency and the final composite
#[derive(Debug, Clone, PartialEq)]
pub struct CustomPostProcess {
    /// Unique stage name
    pub name: String,
    /// Single color attachment; the stage allocates one target of that format per swapchain image
    pub config: RenderPassConfig,
}

impl CustomPostProcess {
    pub fn new(name: &str, config: RenderPassConfig) -> Self {
        Self { name: name.to_string(), config }
    }
}

/// Realized stage: render pass, framebuffers and attachment resources
pub struct RenderStage {
    name: String,
    kind: StageKind,
    config: RenderPassConfig,
    render_pass: Option<Arc<dyn RenderPass>>,
    framebuffers: Vec<Arc<dyn Framebuffer>>,
    color_images: Vec<Arc<dyn Image>>,
    color_views: Vec<Arc<dyn ImageView>>,
    depth_images: Vec<Arc<dyn Image>>,
    depth_views: Vec<Arc<dyn ImageView>>,
    /// Single-sample MSAA resolve destinations (never framebuffer attachments)
    resolve_images: Vec<Arc<dyn Image>>,
    resolve_views: Vec<Arc<dyn ImageView>>,
    /// Views owned by someone else, referenced by this stage's framebuffers
    borrowed_views: Vec<Arc<dyn ImageView>>,
    disposed: bool,
}

impl RenderStage {
    pub fn new(name: &str, kind: StageKind, config: RenderPassConfig, render_pass: Arc<dyn RenderPass>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            config,
            render_pass: Some(render_pass),
            framebuffers: Vec::new(),
            color_images: Vec::new(),
            color_views: Vec::new(),
            depth_images: Vec::new(),
            depth_views: Vec::new(),
            resolve_images: Vec::new(),
            resolve_views: Vec::new(),
            borrowed_views: Vec::new(),
            disposed: false,
        }
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// Description the render pass was realized from
    pub fn config(&self) -> &RenderPassConfig {
        &self.config
    }

    /// None once disposed
    pub fn render_pass(&self) -> Option<&Arc<dyn RenderPass>> {
        self.render_pass.as_ref()
    }

    pub fn framebuffers(&self) -> &[Arc<dyn Framebuffer>] {
        &self.framebuffers
    }

    /// Framebuffer used for `image_index`
    ///
    /// Stages with a single framebuffer (shadow map) use it for every image.
    pub fn framebuffer(&self, image_index: usize) -> Option<&Arc<dyn Framebuffer>> {
        if self.framebuffers.len() == 1 {
            return self.framebuffers.first();
        }
        self.framebuffers.get(image_index)
    }

    pub fn color_images(&self) -> &[Arc<dyn Image>] {
        &self.color_images
    }

    pub fn color_views(&self) -> &[Arc<dyn ImageView>] {
        &self.color_views
    }

    pub fn depth_images(&self) -> &[Arc<dyn Image>] {
        &self.depth_images
    }

    pub fn depth_views(&self) -> &[Arc<dyn ImageView>] {
        &self.depth_views
    }

    pub fn resolve_images(&self) -> &[Arc<dyn Image>] {
        &self.resolve_images
    }

    pub fn resolve_views(&self) -> &[Arc<dyn ImageView>] {
        &self.resolve_views
    }

    pub fn borrowed_views(&self) -> &[Arc<dyn ImageView>] {
        &self.borrowed_views
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// One clear value per attachment, in attachment order
    ///
    /// Attachments without a configured clear value get a neutral one matching
    /// their kind (ignored by the backend unless the load op clears).
    pub fn clear_values(&self) -> Vec<ClearValue> {
        self.config
            .attachments
            .iter()
            .map(|attachment| match attachment.clear_value {
                Some(value) => value,
                None if attachment.format.is_depth_format() => ClearValue::DEPTH_ONE,
                None => ClearValue::BLACK,
            })
            .collect()
    }

    // ===== BUILDING =====

    pub fn add_framebuffer(&mut self, framebuffer: Arc<dyn Framebuffer>) {
        self.framebuffers.push(framebuffer);
    }

    pub fn add_color_target(&mut self, image: Arc<dyn Image>, view: Arc<dyn ImageView>) {
        self.color_images.push(image);
        self.color_views.push(view);
    }

    pub fn add_depth_target(&mut self, image: Arc<dyn Image>, view: Arc<dyn ImageView>) {
        self.depth_images.push(image);
        self.depth_views.push(view);
    }

    pub fn add_resolve_target(&mut self, image: Arc<dyn Image>, view: Arc<dyn ImageView>) {
        self.resolve_images.push(image);
        self.resolve_views.push(view);
    }

    pub fn add_borrowed_view(&mut self, view: Arc<dyn ImageView>) {
        self.borrowed_views.push(view);
    }

    // ===== DISPOSAL =====

    /// Release framebuffers, then owned views, then owned images, then the render pass
    ///
    /// Borrowed views are only forgotten; their owner releases them. Calling this on a
    /// disposed stage does nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.framebuffers.clear();

        self.borrowed_views.clear();
        self.color_views.clear();
        self.depth_views.clear();
        self.resolve_views.clear();

        self.color_images.clear();
        self.depth_images.clear();
        self.resolve_images.clear();

        self.render_pass = None;
        self.disposed = true;

        engine_debug!("galaxy3d::pipeline", "Stage '{}' disposed", self.name);
    }
}

impl Drop for RenderStage {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "render_stage_tests.rs"]
mod tests;
