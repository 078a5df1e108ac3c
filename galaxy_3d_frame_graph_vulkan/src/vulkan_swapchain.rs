/// Swapchain - Vulkan implementation of the Swapchain trait
///
/// Presents to the surface owned by the device context. Presentable images and
/// their views are exposed through the agnostic `Image`/`ImageView` traits and
/// keep the `VkSwapchainKHR` they belong to alive, so a swapchain retired by
/// `recreate()` is destroyed only once the last framebuffer using it is gone.

use galaxy_3d_frame_graph::galaxy3d::{Error, Result};
use galaxy_3d_frame_graph::galaxy3d::render::{
    AcquireResult, Config, Image as RendererImage, ImageView as RendererImageView, PresentResult,
    Semaphore as RendererSemaphore, Swapchain as RendererSwapchain,
};
use galaxy_3d_frame_graph::galaxy3d::render_pass::TextureFormat;
use galaxy_3d_frame_graph::{engine_bail, engine_bail_validation, engine_debug, engine_err, engine_error};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::format_from_vk;
use crate::vulkan_image::{Image, ImageView};
use crate::vulkan_sync::Semaphore;

// ============================================================================
// Selection rules
// ============================================================================

/// Pick the surface format: B8G8R8A8_UNORM / SRGB_NONLINEAR when offered,
/// else the first format the engine can name
pub(crate) fn choose_surface_format(
    formats: &[vk::SurfaceFormatKHR],
) -> Option<(vk::SurfaceFormatKHR, TextureFormat)> {
    let preferred = vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    };

    // A single UNDEFINED entry means the surface has no preference
    if formats.len() == 1 && formats[0].format == vk::Format::UNDEFINED {
        return Some((preferred, TextureFormat::B8G8R8A8_UNORM));
    }

    if formats
        .iter()
        .any(|f| f.format == preferred.format && f.color_space == preferred.color_space)
    {
        return Some((preferred, TextureFormat::B8G8R8A8_UNORM));
    }

    formats
        .iter()
        .find_map(|f| format_from_vk(f.format).map(|format| (*f, format)))
}

/// MAILBOX when offered and allowed, FIFO otherwise (always supported)
pub(crate) fn choose_present_mode(modes: &[vk::PresentModeKHR], prefer_mailbox: bool) -> vk::PresentModeKHR {
    if prefer_mailbox && modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Current surface extent, or the requested size clamped to the surface limits
/// when the surface leaves it to the swapchain
pub(crate) fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, width: u32, height: u32) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        vk::Extent2D {
            width: width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
            ),
            height: height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
            ),
        }
    }
}

/// One image more than the minimum, within the maximum (0 = unbounded)
pub(crate) fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let image_count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        image_count.min(capabilities.max_image_count)
    } else {
        image_count
    }
}

// ============================================================================
// SwapchainHandle
// ============================================================================

/// Owner of one `VkSwapchainKHR`, shared by the images created from it
pub(crate) struct SwapchainHandle {
    pub(crate) swapchain: vk::SwapchainKHR,
    loader: ash::khr::swapchain::Device,
    _ctx: Arc<GpuContext>,
}

impl Drop for SwapchainHandle {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

// ============================================================================
// Swapchain
// ============================================================================

/// Vulkan swapchain implementation
pub(crate) struct Swapchain {
    handle: Arc<SwapchainHandle>,
    loader: ash::khr::swapchain::Device,
    images: Vec<Arc<dyn RendererImage>>,
    views: Vec<Arc<dyn RendererImageView>>,
    format: TextureFormat,
    extent: vk::Extent2D,
    prefer_mailbox: bool,
    max_frames_in_flight: usize,
    ctx: Arc<GpuContext>,
}

impl Swapchain {
    /// Create a swapchain for the device surface
    pub(crate) fn new(ctx: Arc<GpuContext>, config: &Config, width: u32, height: u32) -> Result<Self> {
        let loader = ash::khr::swapchain::Device::new(&ctx.instance, &ctx.device);
        let mut swapchain = Self {
            handle: Arc::new(SwapchainHandle {
                swapchain: vk::SwapchainKHR::null(),
                loader: loader.clone(),
                _ctx: ctx.clone(),
            }),
            loader,
            images: Vec::new(),
            views: Vec::new(),
            format: TextureFormat::B8G8R8A8_UNORM,
            extent: vk::Extent2D { width: 0, height: 0 },
            prefer_mailbox: config.prefer_mailbox,
            max_frames_in_flight: config.max_frames_in_flight.max(1),
            ctx,
        };
        swapchain.build(width, height)?;
        Ok(swapchain)
    }

    /// Create a new `VkSwapchainKHR` (retiring the current one) and wrap its images
    fn build(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            engine_bail_validation!("galaxy3d::vulkan",
                "Cannot create a swapchain with a zero extent ({}x{})", width, height);
        }

        let ctx = &self.ctx;
        let (capabilities, formats, present_modes) = unsafe {
            let capabilities = ctx.surface_loader
                .get_physical_device_surface_capabilities(ctx.physical_device, ctx.surface)
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to get surface capabilities: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
                })?;
            let formats = ctx.surface_loader
                .get_physical_device_surface_formats(ctx.physical_device, ctx.surface)
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to query surface formats: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;
            let present_modes = ctx.surface_loader
                .get_physical_device_surface_present_modes(ctx.physical_device, ctx.surface)
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to query present modes: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get present modes: {:?}", e))
                })?;
            (capabilities, formats, present_modes)
        };

        let Some((surface_format, format)) = choose_surface_format(&formats) else {
            engine_bail!("galaxy3d::vulkan", "No supported surface format among {} offered", formats.len());
        };
        let present_mode = choose_present_mode(&present_modes, self.prefer_mailbox);
        let extent = choose_extent(&capabilities, width, height);
        let image_count = choose_image_count(&capabilities);

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(ctx.surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(self.handle.swapchain);

        let handle = unsafe {
            let swapchain = self.loader
                .create_swapchain(&create_info, None)
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to create swapchain: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
                })?;
            Arc::new(SwapchainHandle {
                swapchain,
                loader: self.loader.clone(),
                _ctx: ctx.clone(),
            })
        };

        let vk_images = unsafe { self.loader.get_swapchain_images(handle.swapchain) }
            .map_err(|e| {
                engine_error!("galaxy3d::vulkan", "Failed to get swapchain images: {:?}", e);
                Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
            })?;

        let mut images: Vec<Arc<dyn RendererImage>> = Vec::with_capacity(vk_images.len());
        let mut views: Vec<Arc<dyn RendererImageView>> = Vec::with_capacity(vk_images.len());
        for vk_image in vk_images {
            let image: Arc<dyn RendererImage> = Arc::new(Image::presentable(
                ctx.clone(),
                handle.clone(),
                vk_image,
                extent.width,
                extent.height,
                format,
            ));
            views.push(Arc::new(ImageView::new(ctx.clone(), &image)?));
            images.push(image);
        }

        engine_debug!("galaxy3d::vulkan", "Swapchain created: {}x{}, {:?}, {:?}, {} images",
            extent.width, extent.height, format, present_mode, images.len());

        // The previous handle goes away with the last image still referencing it
        self.handle = handle;
        self.images = images;
        self.views = views;
        self.format = format;
        self.extent = extent;
        Ok(())
    }
}

impl RendererSwapchain for Swapchain {
    fn acquire_next_image(&mut self, signal: &dyn RendererSemaphore) -> Result<AcquireResult> {
        let semaphore = unsafe { Semaphore::from_dyn(signal) }.semaphore;

        let result = unsafe {
            self.loader.acquire_next_image(
                self.handle.swapchain,
                u64::MAX,
                semaphore,
                vk::Fence::null(),
            )
        };

        match result {
            Ok((image_index, suboptimal)) => Ok(AcquireResult::Acquired { image_index, suboptimal }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireResult::OutOfDate),
            Err(e) => Err(engine_err!("galaxy3d::vulkan", "Failed to acquire next swapchain image: {:?}", e)),
        }
    }

    fn present(&mut self, image_index: u32, wait: &dyn RendererSemaphore) -> Result<PresentResult> {
        if image_index as usize >= self.images.len() {
            engine_bail!("galaxy3d::vulkan",
                "present: image_index {} out of range (count: {})", image_index, self.images.len());
        }

        let wait_semaphores = [unsafe { Semaphore::from_dyn(wait) }.semaphore];
        let swapchains = [self.handle.swapchain];
        let image_indices = [image_index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = {
            let _queue = self.ctx.lock_queues()?;
            unsafe { self.loader.queue_present(self.ctx.present_queue, &present_info) }
        };

        match result {
            Ok(false) => Ok(PresentResult::Presented),
            Ok(true) => Ok(PresentResult::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentResult::OutOfDate),
            Err(e) => Err(engine_err!("galaxy3d::vulkan", "Failed to present swapchain image: {:?}", e)),
        }
    }

    fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        unsafe { self.ctx.device.device_wait_idle() }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to wait idle before swapchain recreate: {:?}", e))?;

        self.build(width, height)
    }

    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn frame_count(&self) -> usize {
        self.max_frames_in_flight
    }

    fn width(&self) -> u32 {
        self.extent.width
    }

    fn height(&self) -> u32 {
        self.extent.height
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn images(&self) -> Vec<Arc<dyn RendererImage>> {
        self.images.clone()
    }

    fn image_views(&self) -> Vec<Arc<dyn RendererImageView>> {
        self.views.clone()
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.device_wait_idle().ok();
        }
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
