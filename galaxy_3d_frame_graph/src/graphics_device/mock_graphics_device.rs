/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Every mock object appends to one shared, ordered event log:
/// `create:<kind>:<label>` on creation, `destroy:<kind>:<label>` on drop,
/// `cmd:<command>` while recording, plus `submit`, `acquire:<i>`, `present:<i>`,
/// `fence_wait:<id>`, `fence_reset:<id>` and `wait_idle`.
/// Tests read it to check creation counts, destruction order and frame protocol.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::error::Result;
use crate::{engine_bail, engine_bail_validation};
use crate::graphics_device::{
    AcquireResult, CommandList, Config, Fence, Framebuffer, FramebufferDesc, GraphicsDevice, Image,
    ImageDesc, ImageView, PresentResult, RenderPass, Semaphore, Swapchain,
};
use crate::render_pass::{ClearValue, RenderPassConfig, SampleCount, TextureFormat};

/// Shared ordered event log
pub type EventLog = Arc<Mutex<Vec<String>>>;

fn push(events: &EventLog, event: String) {
    events.lock().unwrap().push(event);
}

// ============================================================================
// Mock Image / ImageView
// ============================================================================

#[derive(Debug)]
pub struct MockImage {
    pub label: String,
    pub kind: &'static str,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub samples: SampleCount,
    events: EventLog,
}

impl MockImage {
    fn new(kind: &'static str, label: String, width: u32, height: u32, format: TextureFormat, samples: SampleCount, events: EventLog) -> Self {
        push(&events, format!("create:{}:{}", kind, label));
        Self { label, kind, width, height, format, samples, events }
    }
}

impl Drop for MockImage {
    fn drop(&mut self) {
        push(&self.events, format!("destroy:{}:{}", self.kind, self.label));
    }
}

impl Image for MockImage {
    fn width(&self) -> u32 { self.width }
    fn height(&self) -> u32 { self.height }
    fn format(&self) -> TextureFormat { self.format }
    fn samples(&self) -> SampleCount { self.samples }
}

#[derive(Debug)]
pub struct MockImageView {
    pub label: String,
    pub kind: &'static str,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    events: EventLog,
}

impl MockImageView {
    fn new(kind: &'static str, label: String, width: u32, height: u32, format: TextureFormat, events: EventLog) -> Self {
        push(&events, format!("create:{}:{}", kind, label));
        Self { label, kind, width, height, format, events }
    }
}

impl Drop for MockImageView {
    fn drop(&mut self) {
        push(&self.events, format!("destroy:{}:{}", self.kind, self.label));
    }
}

impl ImageView for MockImageView {
    fn width(&self) -> u32 { self.width }
    fn height(&self) -> u32 { self.height }
    fn format(&self) -> TextureFormat { self.format }
}

// ============================================================================
// Mock RenderPass / Framebuffer
// ============================================================================

#[derive(Debug)]
pub struct MockRenderPass {
    pub name: String,
    pub config: RenderPassConfig,
    pub swapchain_format: TextureFormat,
    events: EventLog,
}

impl Drop for MockRenderPass {
    fn drop(&mut self) {
        push(&self.events, format!("destroy:render_pass:{}", self.name));
    }
}

impl RenderPass for MockRenderPass {
    fn attachment_count(&self) -> usize {
        self.config.attachments.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
pub struct MockFramebuffer {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub attachment_count: usize,
    events: EventLog,
}

impl Drop for MockFramebuffer {
    fn drop(&mut self) {
        push(&self.events, format!("destroy:framebuffer:{}", self.label));
    }
}

impl Framebuffer for MockFramebuffer {
    fn width(&self) -> u32 { self.width }
    fn height(&self) -> u32 { self.height }
    fn attachment_count(&self) -> usize { self.attachment_count }

    fn rebuild(&mut self, width: u32, height: u32) -> Result<()> {
        if self.attachment_count == 0 {
            engine_bail_validation!("galaxy3d::mock", "Framebuffer '{}' has no attachments", self.label);
        }
        push(&self.events, format!("rebuild:framebuffer:{}", self.label));
        self.width = width;
        self.height = height;
        Ok(())
    }
}

// ============================================================================
// Mock Fence / Semaphore
// ============================================================================

#[derive(Debug)]
pub struct MockFence {
    pub id: usize,
    signaled: AtomicBool,
    events: EventLog,
}

impl MockFence {
    pub fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::SeqCst)
    }

    pub fn signal(&self) {
        self.signaled.store(true, Ordering::SeqCst);
    }
}

impl Fence for MockFence {
    fn wait(&self, _timeout_ns: u64) -> Result<bool> {
        push(&self.events, format!("fence_wait:{}", self.id));
        Ok(self.is_signaled())
    }

    fn reset(&self) -> Result<()> {
        push(&self.events, format!("fence_reset:{}", self.id));
        self.signaled.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockFence {
    fn drop(&mut self) {
        push(&self.events, format!("destroy:fence:{}", self.id));
    }
}

#[derive(Debug)]
pub struct MockSemaphore {
    pub id: usize,
    events: EventLog,
}

impl Semaphore for MockSemaphore {}

impl Drop for MockSemaphore {
    fn drop(&mut self) {
        push(&self.events, format!("destroy:semaphore:{}", self.id));
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

#[derive(Debug)]
pub struct MockCommandList {
    pub id: usize,
    pub recording: bool,
    pub in_render_pass: bool,
    fail_next_render_pass: Arc<AtomicBool>,
    events: EventLog,
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.recording {
            engine_bail!("galaxy3d::mock", "begin: command list {} is already recording", self.id);
        }
        self.recording = true;
        push(&self.events, format!("cmd:begin:{}", self.id));
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if !self.recording || self.in_render_pass {
            engine_bail!("galaxy3d::mock", "end: command list {} in invalid state", self.id);
        }
        self.recording = false;
        push(&self.events, format!("cmd:end:{}", self.id));
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.recording = false;
        self.in_render_pass = false;
        push(&self.events, format!("cmd:reset:{}", self.id));
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn RenderPass>,
        framebuffer: &Arc<dyn Framebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        if !self.recording || self.in_render_pass {
            engine_bail!("galaxy3d::mock", "begin_render_pass: command list {} in invalid state", self.id);
        }
        if self.fail_next_render_pass.swap(false, Ordering::SeqCst) {
            engine_bail!("galaxy3d::mock", "begin_render_pass '{}': scripted failure", render_pass.name());
        }
        if framebuffer.attachment_count() != render_pass.attachment_count()
            || clear_values.len() != render_pass.attachment_count()
        {
            engine_bail!("galaxy3d::mock",
                "begin_render_pass '{}': {} attachments, framebuffer has {}, {} clear values",
                render_pass.name(), render_pass.attachment_count(),
                framebuffer.attachment_count(), clear_values.len());
        }
        self.in_render_pass = true;
        push(&self.events, format!("cmd:begin_render_pass:{}", render_pass.name()));
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        if !self.in_render_pass {
            engine_bail!("galaxy3d::mock", "end_render_pass: no render pass active");
        }
        self.in_render_pass = false;
        push(&self.events, "cmd:end_render_pass".to_string());
        Ok(())
    }

    fn resolve_image(&mut self, src: &Arc<dyn Image>, dst: &Arc<dyn Image>) -> Result<()> {
        if self.in_render_pass {
            engine_bail!("galaxy3d::mock", "resolve_image: recorded inside a render pass");
        }
        if !src.samples().is_multisampled() || dst.samples().is_multisampled() {
            engine_bail!("galaxy3d::mock", "resolve_image: expected multisampled source and single-sample destination");
        }
        push(&self.events, format!("cmd:resolve_image:{}x{}", src.samples().count(), dst.samples().count()));
        Ok(())
    }
}

// ============================================================================
// Mock Swapchain
// ============================================================================

/// Scripted results consumed by acquire/present before falling back to success
#[derive(Debug, Default)]
pub struct MockScript {
    pub acquire: VecDeque<AcquireResult>,
    pub present: VecDeque<PresentResult>,
}

pub struct MockSwapchain {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub next_image: u32,
    frame_count: usize,
    images: Vec<Arc<dyn Image>>,
    views: Vec<Arc<dyn ImageView>>,
    image_count_source: Arc<AtomicUsize>,
    frame_count_source: Arc<AtomicUsize>,
    script: Arc<Mutex<MockScript>>,
    events: EventLog,
}

impl MockSwapchain {
    fn create_targets(&mut self) {
        self.views.clear();
        self.images.clear();

        let count = self.image_count_source.load(Ordering::SeqCst);
        self.frame_count = self.frame_count_source.load(Ordering::SeqCst);
        for i in 0..count {
            let label = format!("{} {}x{}", i, self.width, self.height);
            self.images.push(Arc::new(MockImage::new(
                "swapchain_image", label.clone(), self.width, self.height,
                self.format, SampleCount::S1, self.events.clone(),
            )));
            self.views.push(Arc::new(MockImageView::new(
                "swapchain_view", label, self.width, self.height, self.format, self.events.clone(),
            )));
        }
        self.next_image = 0;
    }
}

impl Swapchain for MockSwapchain {
    fn acquire_next_image(&mut self, _signal: &dyn Semaphore) -> Result<AcquireResult> {
        if let Some(result) = self.script.lock().unwrap().acquire.pop_front() {
            if let AcquireResult::Acquired { image_index, .. } = result {
                push(&self.events, format!("acquire:{}", image_index));
            } else {
                push(&self.events, "acquire:out_of_date".to_string());
            }
            return Ok(result);
        }

        let image_index = self.next_image;
        self.next_image = (self.next_image + 1) % self.images.len() as u32;
        push(&self.events, format!("acquire:{}", image_index));
        Ok(AcquireResult::Acquired { image_index, suboptimal: false })
    }

    fn present(&mut self, image_index: u32, _wait: &dyn Semaphore) -> Result<PresentResult> {
        push(&self.events, format!("present:{}", image_index));
        Ok(self.script.lock().unwrap().present.pop_front().unwrap_or(PresentResult::Presented))
    }

    fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            engine_bail!("galaxy3d::mock", "recreate: zero extent {}x{}", width, height);
        }
        push(&self.events, format!("recreate:{}x{}", width, height));
        self.width = width;
        self.height = height;
        self.create_targets();
        Ok(())
    }

    fn image_count(&self) -> usize { self.images.len() }
    fn frame_count(&self) -> usize { self.frame_count }
    fn width(&self) -> u32 { self.width }
    fn height(&self) -> u32 { self.height }
    fn format(&self) -> TextureFormat { self.format }

    fn images(&self) -> Vec<Arc<dyn Image>> {
        self.images.clone()
    }

    fn image_views(&self) -> Vec<Arc<dyn ImageView>> {
        self.views.clone()
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock device that tracks every created resource without a GPU
pub struct MockGraphicsDevice {
    pub config: Config,
    pub events: EventLog,
    /// Image count used by the next swapchain creation/recreation
    pub swapchain_image_count: Arc<AtomicUsize>,
    /// Frame slots reported by the next swapchain creation/recreation
    pub swapchain_frame_count: Arc<AtomicUsize>,
    pub script: Arc<Mutex<MockScript>>,
    /// Make the next image allocation fail with OutOfMemory
    pub fail_next_image: AtomicBool,
    /// Make the next `begin_render_pass` on any command list fail
    pub fail_next_render_pass: Arc<AtomicBool>,
    /// While set, submitted work never completes (fences stay unsignaled)
    pub gpu_stalled: AtomicBool,
    fences: Mutex<Vec<Weak<MockFence>>>,
    next_id: AtomicUsize,
}

impl MockGraphicsDevice {
    /// Create a mock device whose swapchains have 3 images and 2 frame slots
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            events: Arc::new(Mutex::new(Vec::new())),
            swapchain_image_count: Arc::new(AtomicUsize::new(3)),
            swapchain_frame_count: Arc::new(AtomicUsize::new(2)),
            script: Arc::new(Mutex::new(MockScript::default())),
            fail_next_image: AtomicBool::new(false),
            fail_next_render_pass: Arc::new(AtomicBool::new(false)),
            gpu_stalled: AtomicBool::new(false),
            fences: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Snapshot of the event log
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Number of events starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|e| e.starts_with(prefix)).count()
    }

    /// Objects of `kind` created and not yet destroyed
    pub fn live(&self, kind: &str) -> usize {
        let created = self.count(&format!("create:{}:", kind));
        let destroyed = self.count(&format!("destroy:{}:", kind));
        created - destroyed
    }

    /// Queue acquire results returned before the default round-robin
    pub fn script_acquire(&self, result: AcquireResult) {
        self.script.lock().unwrap().acquire.push_back(result);
    }

    /// Queue present results returned before the default `Presented`
    pub fn script_present(&self, result: PresentResult) {
        self.script.lock().unwrap().present.push_back(result);
    }

    /// Stall or release the simulated GPU
    pub fn set_gpu_stalled(&self, stalled: bool) {
        self.gpu_stalled.store(stalled, Ordering::SeqCst);
    }

    /// Signal every live fence, as if all pending work completed
    pub fn complete_all(&self) {
        for mock in self.fences.lock().unwrap().iter().filter_map(|weak| weak.upgrade()) {
            mock.signal();
        }
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn config(&self) -> &Config {
        &self.config
    }

    fn create_render_pass(
        &self,
        config: &RenderPassConfig,
        swapchain_format: TextureFormat,
    ) -> Result<Arc<dyn RenderPass>> {
        config.validate()?;
        let name = config.label().to_string();
        push(&self.events, format!("create:render_pass:{}", name));
        Ok(Arc::new(MockRenderPass {
            name,
            config: config.clone(),
            swapchain_format,
            events: self.events.clone(),
        }))
    }

    fn create_image(&self, desc: &ImageDesc) -> Result<Arc<dyn Image>> {
        if self.fail_next_image.swap(false, Ordering::SeqCst) {
            return Err(crate::error::Error::OutOfMemory);
        }
        if desc.format == TextureFormat::SWAPCHAIN {
            engine_bail!("galaxy3d::mock", "create_image '{}': unresolved swapchain format", desc.name);
        }
        Ok(Arc::new(MockImage::new(
            "image", desc.name.clone(), desc.width, desc.height,
            desc.format, desc.samples, self.events.clone(),
        )))
    }

    fn create_image_view(&self, image: &Arc<dyn Image>) -> Result<Arc<dyn ImageView>> {
        let label = format!("{}x{} #{}", image.width(), image.height(), self.next_id());
        Ok(Arc::new(MockImageView::new(
            "view", label, image.width(), image.height(), image.format(), self.events.clone(),
        )))
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        if desc.attachments.len() != desc.render_pass.attachment_count() {
            engine_bail!("galaxy3d::mock",
                "create_framebuffer '{}': {} views for {} attachments",
                desc.render_pass.name(), desc.attachments.len(), desc.render_pass.attachment_count());
        }
        let label = desc.render_pass.name().to_string();
        push(&self.events, format!("create:framebuffer:{}", label));
        Ok(Arc::new(MockFramebuffer {
            label,
            width: desc.width,
            height: desc.height,
            attachment_count: desc.attachments.len(),
            events: self.events.clone(),
        }))
    }

    fn create_fence(&self, signaled: bool) -> Result<Arc<dyn Fence>> {
        let id = self.next_id();
        push(&self.events, format!("create:fence:{}", id));
        let fence = Arc::new(MockFence {
            id,
            signaled: AtomicBool::new(signaled),
            events: self.events.clone(),
        });
        self.fences.lock().unwrap().push(Arc::downgrade(&fence));
        Ok(fence)
    }

    fn create_semaphore(&self) -> Result<Arc<dyn Semaphore>> {
        let id = self.next_id();
        push(&self.events, format!("create:semaphore:{}", id));
        Ok(Arc::new(MockSemaphore { id, events: self.events.clone() }))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        let id = self.next_id();
        push(&self.events, format!("create:command_list:{}", id));
        Ok(Box::new(MockCommandList {
            id,
            recording: false,
            in_render_pass: false,
            fail_next_render_pass: self.fail_next_render_pass.clone(),
            events: self.events.clone(),
        }))
    }

    fn create_swapchain(&self, width: u32, height: u32) -> Result<Box<dyn Swapchain>> {
        if width == 0 || height == 0 {
            engine_bail!("galaxy3d::mock", "create_swapchain: zero extent {}x{}", width, height);
        }
        let mut swapchain = MockSwapchain {
            width,
            height,
            format: TextureFormat::B8G8R8A8_UNORM,
            next_image: 0,
            frame_count: 0,
            images: Vec::new(),
            views: Vec::new(),
            image_count_source: self.swapchain_image_count.clone(),
            frame_count_source: self.swapchain_frame_count.clone(),
            script: self.script.clone(),
            events: self.events.clone(),
        };
        swapchain.create_targets();
        Ok(Box::new(swapchain))
    }

    fn submit(
        &self,
        _commands: &dyn CommandList,
        _wait: &dyn Semaphore,
        _signal: &dyn Semaphore,
        fence: &dyn Fence,
    ) -> Result<()> {
        push(&self.events, "submit".to_string());
        if self.gpu_stalled.load(Ordering::SeqCst) {
            return Ok(());
        }

        // Work completes instantly: signal the matching mock fence
        let target = fence as *const dyn Fence as *const ();
        let mut fences = self.fences.lock().unwrap();
        fences.retain(|weak| weak.strong_count() > 0);
        for mock in fences.iter().filter_map(|weak| weak.upgrade()) {
            if Arc::as_ptr(&mock) as *const () == target {
                mock.signal();
            }
        }
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        push(&self.events, "wait_idle".to_string());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
