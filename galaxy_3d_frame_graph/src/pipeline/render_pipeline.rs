/// RenderPipeline - fixed multi-stage frame graph
///
/// Stages are built in this order, each one consuming resources of earlier ones:
///
/// 1. Shadow map (depth only, fixed size, one framebuffer)
/// 2. Depth pre-pass (depth per swapchain image, at the current sample count)
/// 3. Light culling (`R32_UINT` target per swapchain image)
/// 4. Forward (HDR color per swapchain image + pre-pass depth; MSAA adds resolve targets)
/// 5. Transparency (forward color + pre-pass depth, nothing allocated)
/// 6. Custom post-process stages, in registration order
/// 7. Final composite (swapchain views)
///
/// There is no partial update: every change (size, swapchain, MSAA, custom stages)
/// disposes all stages in reverse order and builds them again.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::graphics_device::{
    CommandList, Framebuffer, FramebufferDesc, GraphicsDevice, Image, ImageDesc, ImageView,
};
use crate::pipeline::render_stage::{CustomPostProcess, RenderStage, StageKind};
use crate::render_pass::presets::{self, DEPTH_FORMAT, HDR_FORMAT};
use crate::render_pass::{ClearValue, ImageLayout, RenderPassConfig, SampleCount, TextureFormat};
use crate::{engine_bail_validation, engine_debug, engine_error, engine_info, engine_warn};

const SOURCE: &str = "galaxy3d::pipeline";

// ============================================================================
// Options
// ============================================================================

/// Pipeline construction options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Width and height of the shadow map, in pixels
    pub shadow_map_size: u32,
    /// Sample count to build with; None renders single-sampled
    pub msaa: Option<SampleCount>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            shadow_map_size: 2048,
            msaa: None,
        }
    }
}

/// Single-sample images the forward color is resolved into (one per swapchain image)
#[derive(Clone)]
pub struct MsaaResolveTarget {
    pub images: Vec<Arc<dyn Image>>,
    pub views: Vec<Arc<dyn ImageView>>,
}

// ============================================================================
// RenderPipeline
// ============================================================================

/// Reconfigurable state kept aside while a rebuild is attempted
struct PipelineState {
    msaa_enabled: bool,
    sample_count: SampleCount,
    custom_configs: Vec<CustomPostProcess>,
}

pub struct RenderPipeline {
    device: Arc<dyn GraphicsDevice>,
    options: PipelineOptions,
    width: u32,
    height: u32,
    swapchain_format: TextureFormat,
    swapchain_images: Vec<Arc<dyn Image>>,
    swapchain_views: Vec<Arc<dyn ImageView>>,
    msaa_enabled: bool,
    sample_count: SampleCount,
    custom_configs: Vec<CustomPostProcess>,

    shadow_map: Option<RenderStage>,
    depth_pre_pass: Option<RenderStage>,
    light_culling: Option<RenderStage>,
    forward: Option<RenderStage>,
    transparency: Option<RenderStage>,
    custom_post_process: Vec<RenderStage>,
    final_composite: Option<RenderStage>,

    rebuild_count: usize,
}

impl RenderPipeline {
    /// Build every stage for the given swapchain
    ///
    /// # Arguments
    ///
    /// * `device` - Device creating render passes, images and framebuffers
    /// * `width`, `height` - Swapchain extent
    /// * `swapchain_format` - Concrete format of the presentable images
    /// * `swapchain_images`, `swapchain_views` - Presentable images and their views (borrowed)
    /// * `options` - Pipeline options
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        width: u32,
        height: u32,
        swapchain_format: TextureFormat,
        swapchain_images: Vec<Arc<dyn Image>>,
        swapchain_views: Vec<Arc<dyn ImageView>>,
        options: PipelineOptions,
    ) -> Result<Self> {
        check_extent(width, height)?;
        check_swapchain(&swapchain_images, &swapchain_views, swapchain_format)?;
        if let Some(samples) = options.msaa {
            check_msaa_samples(samples)?;
        }
        if options.shadow_map_size == 0 {
            engine_bail_validation!(SOURCE, "Shadow map size must be non-zero");
        }

        let mut pipeline = Self {
            device,
            options,
            width,
            height,
            swapchain_format,
            swapchain_images,
            swapchain_views,
            msaa_enabled: options.msaa.is_some(),
            sample_count: options.msaa.unwrap_or(SampleCount::S1),
            custom_configs: Vec::new(),
            shadow_map: None,
            depth_pre_pass: None,
            light_culling: None,
            forward: None,
            transparency: None,
            custom_post_process: Vec::new(),
            final_composite: None,
            rebuild_count: 0,
        };

        pipeline.build_pipeline()?;
        Ok(pipeline)
    }

    // ===== ACCESSORS =====

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn swapchain_format(&self) -> TextureFormat {
        self.swapchain_format
    }

    /// Number of swapchain images the per-image stages are built for
    pub fn image_count(&self) -> usize {
        self.swapchain_views.len()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn msaa_enabled(&self) -> bool {
        self.msaa_enabled
    }

    pub fn sample_count(&self) -> SampleCount {
        self.sample_count
    }

    /// Number of full rebuilds performed since construction
    pub fn rebuild_count(&self) -> usize {
        self.rebuild_count
    }

    /// True when every stage is built
    pub fn is_built(&self) -> bool {
        self.final_composite.is_some()
    }

    pub fn shadow_map_stage(&self) -> Option<&RenderStage> {
        self.shadow_map.as_ref()
    }

    pub fn depth_pre_pass_stage(&self) -> Option<&RenderStage> {
        self.depth_pre_pass.as_ref()
    }

    pub fn light_culling_stage(&self) -> Option<&RenderStage> {
        self.light_culling.as_ref()
    }

    pub fn forward_stage(&self) -> Option<&RenderStage> {
        self.forward.as_ref()
    }

    pub fn transparency_stage(&self) -> Option<&RenderStage> {
        self.transparency.as_ref()
    }

    pub fn custom_post_process_stages(&self) -> &[RenderStage] {
        &self.custom_post_process
    }

    pub fn final_composite_stage(&self) -> Option<&RenderStage> {
        self.final_composite.as_ref()
    }

    /// Registered custom post-process descriptions, in insertion order
    pub fn custom_post_processes(&self) -> &[CustomPostProcess] {
        &self.custom_configs
    }

    /// Built stages in execution order
    pub fn stages(&self) -> Vec<&RenderStage> {
        let mut stages: Vec<&RenderStage> = Vec::with_capacity(6 + self.custom_post_process.len());
        stages.extend(self.shadow_map.iter());
        stages.extend(self.depth_pre_pass.iter());
        stages.extend(self.light_culling.iter());
        stages.extend(self.forward.iter());
        stages.extend(self.transparency.iter());
        stages.extend(self.custom_post_process.iter());
        stages.extend(self.final_composite.iter());
        stages
    }

    /// Forward stage resolve targets, only while MSAA is active
    ///
    /// The resolve itself is recorded by `record()` right after the transparency pass.
    pub fn msaa_resolve_target(&self) -> Option<MsaaResolveTarget> {
        if !self.msaa_enabled {
            return None;
        }
        let forward = self.forward.as_ref()?;
        Some(MsaaResolveTarget {
            images: forward.resolve_images().to_vec(),
            views: forward.resolve_views().to_vec(),
        })
    }

    // ===== RECONFIGURATION =====

    /// Enable or disable MSAA, rebuilding only when the state actually changes
    ///
    /// Disabling forces one sample whatever `samples` says.
    pub fn set_msaa(&mut self, enabled: bool, samples: SampleCount) -> Result<()> {
        let samples = if enabled { samples } else { SampleCount::S1 };
        if enabled {
            check_msaa_samples(samples)?;
        }
        if self.msaa_enabled == enabled && self.sample_count == samples && self.is_built() {
            return Ok(());
        }

        let previous = self.snapshot();
        self.msaa_enabled = enabled;
        self.sample_count = samples;
        engine_info!(SOURCE, "MSAA {} ({} samples)",
            if enabled { "enabled" } else { "disabled" }, samples.count());

        self.rebuild_or_restore(previous)
    }

    /// Register a post-process stage after the existing ones and rebuild
    ///
    /// The config must carry exactly one concrete color attachment; names are unique.
    pub fn add_custom_post_process(&mut self, post_process: CustomPostProcess) -> Result<()> {
        post_process.config.validate()?;

        let attachments = &post_process.config.attachments;
        if attachments.len() != 1
            || !attachments[0].format.is_color_format()
            || attachments[0].format == TextureFormat::SWAPCHAIN
        {
            engine_bail_validation!(SOURCE,
                "Custom post-process '{}' must have exactly one non-swapchain color attachment",
                post_process.name);
        }
        if self.custom_configs.iter().any(|c| c.name == post_process.name) {
            engine_bail_validation!(SOURCE,
                "Custom post-process '{}' is already registered", post_process.name);
        }

        engine_debug!(SOURCE, "Adding custom post-process stage '{}'", post_process.name);
        let previous = self.snapshot();
        self.custom_configs.push(post_process);
        self.rebuild_or_restore(previous)
    }

    /// Remove a post-process stage by name and rebuild
    ///
    /// Returns false (and does not rebuild) when no stage has that name.
    pub fn remove_custom_post_process(&mut self, name: &str) -> Result<bool> {
        let Some(index) = self.custom_configs.iter().position(|c| c.name == name) else {
            return Ok(false);
        };

        engine_debug!(SOURCE, "Removing custom post-process stage '{}'", name);
        let previous = self.snapshot();
        self.custom_configs.remove(index);
        self.rebuild_or_restore(previous)?;
        Ok(true)
    }

    /// Remove every post-process stage; does nothing when none is registered
    pub fn clear_custom_post_process(&mut self) -> Result<()> {
        if self.custom_configs.is_empty() {
            return Ok(());
        }

        engine_debug!(SOURCE, "Clearing {} custom post-process stages", self.custom_configs.len());
        let previous = self.snapshot();
        self.custom_configs.clear();
        self.rebuild_or_restore(previous)
    }

    fn snapshot(&self) -> PipelineState {
        PipelineState {
            msaa_enabled: self.msaa_enabled,
            sample_count: self.sample_count,
            custom_configs: self.custom_configs.clone(),
        }
    }

    /// Rebuild after a reconfiguration; on failure put `previous` back and rebuild it
    ///
    /// The original error is returned either way.
    fn rebuild_or_restore(&mut self, previous: PipelineState) -> Result<()> {
        let Err(err) = self.rebuild(self.width, self.height) else {
            return Ok(());
        };

        engine_warn!(SOURCE, "Reconfiguration failed ({}), restoring previous pipeline state", err);
        self.msaa_enabled = previous.msaa_enabled;
        self.sample_count = previous.sample_count;
        self.custom_configs = previous.custom_configs;
        if let Err(restore_err) = self.rebuild(self.width, self.height) {
            engine_error!(SOURCE, "Previous pipeline state could not be rebuilt: {}", restore_err);
        }
        Err(err)
    }

    /// Dispose every stage and build them again at `width` x `height`
    pub fn rebuild(&mut self, width: u32, height: u32) -> Result<()> {
        check_extent(width, height)?;
        engine_debug!(SOURCE, "Rebuilding render pipeline: {}x{}", width, height);

        self.width = width;
        self.height = height;
        self.rebuild_count += 1;

        self.dispose_pipeline();
        self.build_pipeline()
    }

    /// Replace the borrowed swapchain images/views (and format, if given), then rebuild
    ///
    /// The new extent is taken from the first image.
    pub fn update_swapchain(
        &mut self,
        swapchain_images: Vec<Arc<dyn Image>>,
        swapchain_views: Vec<Arc<dyn ImageView>>,
        swapchain_format: Option<TextureFormat>,
    ) -> Result<()> {
        let format = swapchain_format.unwrap_or(self.swapchain_format);
        check_swapchain(&swapchain_images, &swapchain_views, format)?;

        let (width, height) = match swapchain_images.first() {
            Some(image) => (image.width(), image.height()),
            None => (self.width, self.height),
        };

        engine_debug!(SOURCE, "Updating swapchain references: {} images, {:?}",
            swapchain_images.len(), format);

        // Borrowers go first, so the old swapchain views are only referenced by the caller
        self.dispose_pipeline();
        self.swapchain_images = swapchain_images;
        self.swapchain_views = swapchain_views;
        self.swapchain_format = format;

        self.rebuild(width, height)
    }

    // ===== RECORDING =====

    /// Record every stage for `image_index`
    ///
    /// Each stage's render pass is begun on the framebuffer of that image and ended.
    /// With MSAA on, the forward color is resolved right after the transparency pass.
    /// The final composite clears the presentable image to `clear_color`.
    pub fn record(&self, commands: &mut dyn CommandList, image_index: u32, clear_color: [f32; 4]) -> Result<()> {
        if !self.is_built() {
            return Err(Error::InvalidResource("Render pipeline is not built".to_string()));
        }
        let index = image_index as usize;
        if index >= self.image_count() {
            return Err(Error::InvalidResource(format!(
                "Swapchain image {} out of range ({} images)", index, self.image_count())));
        }

        for stage in self.stages() {
            let mut clear_values = stage.clear_values();
            if stage.kind() == StageKind::FinalComposite {
                if let Some(first) = clear_values.first_mut() {
                    *first = ClearValue::Color(clear_color);
                }
            }

            let render_pass = stage.render_pass().ok_or_else(|| Error::InvalidResource(
                format!("Stage '{}' has no render pass", stage.name())))?;
            let framebuffer = stage.framebuffer(index).ok_or_else(|| Error::InvalidResource(
                format!("Stage '{}' has no framebuffer for image {}", stage.name(), index)))?;

            commands.begin_render_pass(render_pass, framebuffer, &clear_values)?;
            commands.end_render_pass()?;

            if stage.kind() == StageKind::Transparency && self.msaa_enabled {
                self.record_resolve(commands, index)?;
            }
        }

        Ok(())
    }

    fn record_resolve(&self, commands: &mut dyn CommandList, index: usize) -> Result<()> {
        let forward = self.forward.as_ref().ok_or_else(|| Error::InvalidResource(
            "Forward stage missing".to_string()))?;

        match (forward.color_images().get(index), forward.resolve_images().get(index)) {
            (Some(color), Some(resolve)) => commands.resolve_image(color, resolve),
            _ => Err(Error::InvalidResource(format!("No MSAA resolve target for image {}", index))),
        }
    }

    // ===== LIFECYCLE =====

    /// Dispose every stage (reverse build order)
    pub fn dispose(&mut self) {
        if self.is_built() {
            engine_debug!(SOURCE, "Disposing render pipeline");
        }
        self.dispose_pipeline();
    }

    fn build_pipeline(&mut self) -> Result<()> {
        engine_debug!(SOURCE, "Building render pipeline: {}x{}, {} images, {} samples",
            self.width, self.height, self.image_count(), self.sample_count.count());

        if let Err(err) = self.build_stages() {
            self.dispose_pipeline();
            return Err(err);
        }

        engine_debug!(SOURCE, "Render pipeline built: {} stages", self.stages().len());
        Ok(())
    }

    fn build_stages(&mut self) -> Result<()> {
        self.shadow_map = Some(self.build_shadow_map_stage()?);
        self.depth_pre_pass = Some(self.build_depth_pre_pass_stage()?);
        self.light_culling = Some(self.build_light_culling_stage()?);
        self.forward = Some(self.build_forward_stage()?);
        self.transparency = Some(self.build_transparency_stage()?);

        let custom = self
            .custom_configs
            .iter()
            .map(|post_process| self.build_custom_post_process_stage(post_process))
            .collect::<Result<Vec<_>>>()?;
        self.custom_post_process = custom;

        self.final_composite = Some(self.build_final_composite_stage()?);
        Ok(())
    }

    /// Reverse build order: borrowers release their handles before owners
    fn dispose_pipeline(&mut self) {
        if let Some(mut stage) = self.final_composite.take() {
            stage.dispose();
        }
        while let Some(mut stage) = self.custom_post_process.pop() {
            stage.dispose();
        }
        for slot in [
            &mut self.transparency,
            &mut self.forward,
            &mut self.light_culling,
            &mut self.depth_pre_pass,
            &mut self.shadow_map,
        ] {
            if let Some(mut stage) = slot.take() {
                stage.dispose();
            }
        }
    }

    // ===== STAGE BUILDERS =====

    fn realize(&self, name: &str, kind: StageKind, config: RenderPassConfig) -> Result<RenderStage> {
        let render_pass = self.device.create_render_pass(&config, self.swapchain_format)?;
        Ok(RenderStage::new(name, kind, config, render_pass))
    }

    fn create_target(
        &self,
        name: &str,
        format: TextureFormat,
        samples: SampleCount,
        width: u32,
        height: u32,
    ) -> Result<(Arc<dyn Image>, Arc<dyn ImageView>)> {
        let image = self.device.create_image(&ImageDesc::attachment(name, width, height, format, samples))?;
        let view = self.device.create_image_view(&image)?;
        Ok((image, view))
    }

    fn create_framebuffer(
        &self,
        stage: &RenderStage,
        attachments: Vec<Arc<dyn ImageView>>,
        width: u32,
        height: u32,
    ) -> Result<Arc<dyn Framebuffer>> {
        let render_pass = stage.render_pass().ok_or_else(|| Error::InvalidResource(
            format!("Stage '{}' has no render pass", stage.name())))?;
        self.device.create_framebuffer(&FramebufferDesc { render_pass, attachments, width, height })
    }

    fn build_shadow_map_stage(&self) -> Result<RenderStage> {
        let size = self.options.shadow_map_size;
        let mut stage = self.realize("Shadow Map", StageKind::ShadowMap, presets::shadow_map()?)?;

        let (image, view) = self.create_target("Shadow Map Depth", DEPTH_FORMAT, SampleCount::S1, size, size)?;
        let framebuffer = self.create_framebuffer(&stage, vec![view.clone()], size, size)?;
        stage.add_depth_target(image, view);
        stage.add_framebuffer(framebuffer);

        engine_debug!(SOURCE, "Shadow map stage created ({}x{})", size, size);
        Ok(stage)
    }

    fn build_depth_pre_pass_stage(&self) -> Result<RenderStage> {
        let config = presets::depth_pre_pass(self.sample_count)?;
        let mut stage = self.realize("Depth Pre-Pass", StageKind::DepthPrePass, config)?;

        for i in 0..self.image_count() {
            let (image, view) = self.create_target(
                &format!("Depth Pre-Pass Depth #{}", i), DEPTH_FORMAT, self.sample_count, self.width, self.height)?;
            let framebuffer = self.create_framebuffer(&stage, vec![view.clone()], self.width, self.height)?;
            stage.add_depth_target(image, view);
            stage.add_framebuffer(framebuffer);
        }

        engine_debug!(SOURCE, "Depth pre-pass stage created");
        Ok(stage)
    }

    fn build_light_culling_stage(&self) -> Result<RenderStage> {
        let mut stage = self.realize("Light Culling", StageKind::LightCulling, presets::light_culling()?)?;

        for i in 0..self.image_count() {
            let (image, view) = self.create_target(
                &format!("Light Culling #{}", i), TextureFormat::R32_UINT, SampleCount::S1, self.width, self.height)?;
            let framebuffer = self.create_framebuffer(&stage, vec![view.clone()], self.width, self.height)?;
            stage.add_color_target(image, view);
            stage.add_framebuffer(framebuffer);
        }

        engine_debug!(SOURCE, "Light culling stage created");
        Ok(stage)
    }

    /// Forward pass retargeted to an off-screen HDR color at the current sample count
    fn forward_config(&self) -> Result<RenderPassConfig> {
        let mut config = presets::forward()?;
        for attachment in &mut config.attachments {
            attachment.samples = self.sample_count;
            if !attachment.format.is_depth_format() {
                attachment.format = HDR_FORMAT;
                attachment.final_layout = Some(ImageLayout::ColorAttachment);
            }
        }
        Ok(config)
    }

    fn build_forward_stage(&self) -> Result<RenderStage> {
        let depth_views = self.depth_pre_pass_views()?;
        let mut stage = self.realize("Forward Rendering", StageKind::Forward, self.forward_config()?)?;

        for (i, depth_view) in depth_views.into_iter().enumerate() {
            let (image, view) = self.create_target(
                &format!("Forward Color #{}", i), HDR_FORMAT, self.sample_count, self.width, self.height)?;

            if self.msaa_enabled {
                let (resolve_image, resolve_view) = self.create_target(
                    &format!("Forward Resolve #{}", i), HDR_FORMAT, SampleCount::S1, self.width, self.height)?;
                stage.add_resolve_target(resolve_image, resolve_view);
            }

            let framebuffer = self.create_framebuffer(
                &stage, vec![view.clone(), depth_view.clone()], self.width, self.height)?;
            stage.add_color_target(image, view);
            stage.add_borrowed_view(depth_view);
            stage.add_framebuffer(framebuffer);
        }

        engine_debug!(SOURCE, "Forward stage created (msaa: {})", self.msaa_enabled);
        Ok(stage)
    }

    fn build_transparency_stage(&self) -> Result<RenderStage> {
        let depth_views = self.depth_pre_pass_views()?;
        let color_views = self
            .forward
            .as_ref()
            .map(|stage| stage.color_views().to_vec())
            .ok_or_else(|| Error::InvalidResource("Forward stage missing".to_string()))?;

        let config = presets::transparency(self.sample_count)?;
        let mut stage = self.realize("Transparency", StageKind::Transparency, config)?;

        for (color_view, depth_view) in color_views.into_iter().zip(depth_views) {
            let framebuffer = self.create_framebuffer(
                &stage, vec![color_view.clone(), depth_view.clone()], self.width, self.height)?;
            stage.add_borrowed_view(color_view);
            stage.add_borrowed_view(depth_view);
            stage.add_framebuffer(framebuffer);
        }

        engine_debug!(SOURCE, "Transparency stage created");
        Ok(stage)
    }

    fn build_custom_post_process_stage(&self, post_process: &CustomPostProcess) -> Result<RenderStage> {
        let format = post_process.config.attachments.first().map(|a| a.format).unwrap_or(HDR_FORMAT);
        let mut stage = self.realize(
            &post_process.name, StageKind::CustomPostProcess, post_process.config.clone())?;

        for i in 0..self.image_count() {
            let (image, view) = self.create_target(
                &format!("{} #{}", post_process.name, i), format, SampleCount::S1, self.width, self.height)?;
            let framebuffer = self.create_framebuffer(&stage, vec![view.clone()], self.width, self.height)?;
            stage.add_color_target(image, view);
            stage.add_framebuffer(framebuffer);
        }

        engine_debug!(SOURCE, "Custom post-process stage created: {}", post_process.name);
        Ok(stage)
    }

    fn build_final_composite_stage(&self) -> Result<RenderStage> {
        let mut stage = self.realize("Final Composite", StageKind::FinalComposite, presets::final_composite()?)?;

        for view in &self.swapchain_views {
            let framebuffer = self.create_framebuffer(&stage, vec![view.clone()], self.width, self.height)?;
            stage.add_borrowed_view(view.clone());
            stage.add_framebuffer(framebuffer);
        }

        engine_debug!(SOURCE, "Final composite stage created");
        Ok(stage)
    }

    fn depth_pre_pass_views(&self) -> Result<Vec<Arc<dyn ImageView>>> {
        self.depth_pre_pass
            .as_ref()
            .map(|stage| stage.depth_views().to_vec())
            .ok_or_else(|| Error::InvalidResource("Depth pre-pass stage missing".to_string()))
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        self.dispose_pipeline();
    }
}

fn check_extent(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        engine_bail_validation!(SOURCE, "Render pipeline extent must be non-zero, got {}x{}", width, height);
    }
    Ok(())
}

fn check_msaa_samples(samples: SampleCount) -> Result<()> {
    if !samples.is_multisampled() {
        engine_bail_validation!(SOURCE, "MSAA needs more than one sample, got {:?}", samples);
    }
    Ok(())
}

fn check_swapchain(
    images: &[Arc<dyn Image>],
    views: &[Arc<dyn ImageView>],
    format: TextureFormat,
) -> Result<()> {
    if images.is_empty() || images.len() != views.len() {
        engine_bail_validation!(SOURCE,
            "Swapchain needs matching images and views, got {} images and {} views", images.len(), views.len());
    }
    if format == TextureFormat::SWAPCHAIN {
        engine_bail_validation!(SOURCE, "Swapchain format must be concrete");
    }
    Ok(())
}

#[cfg(test)]
#[path = "render_pipeline_tests.rs"]
mod tests;
