/// Image and ImageView - Vulkan implementations of the attachment image traits
///
/// Images either own their memory (allocated through gpu-allocator) or belong
/// to a swapchain, in which case they keep the swapchain alive instead.

use galaxy_3d_frame_graph::galaxy3d::{Error, Result};
use galaxy_3d_frame_graph::galaxy3d::render::{Image as RendererImage, ImageDesc, ImageView as RendererImageView};
use galaxy_3d_frame_graph::galaxy3d::render_pass::{SampleCount, TextureFormat};
use galaxy_3d_frame_graph::{engine_bail_validation, engine_err, engine_error, engine_trace};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::{AllocationError, MemoryLocation};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{aspect_mask, format_to_vk, image_usage_to_vk, sample_count_to_vk};
use crate::vulkan_swapchain::SwapchainHandle;

// ============================================================================
// Image
// ============================================================================

/// Vulkan image
pub(crate) struct Image {
    /// Vulkan image
    pub(crate) image: vk::Image,
    /// Device memory, None for swapchain images
    allocation: Option<Allocation>,
    /// Presentable images keep their swapchain alive and are never destroyed here
    _swapchain: Option<Arc<SwapchainHandle>>,
    width: u32,
    height: u32,
    format: TextureFormat,
    samples: SampleCount,
    ctx: Arc<GpuContext>,
}

impl Image {
    /// Create a 2D image and bind freshly allocated device-local memory to it
    pub(crate) fn allocate(ctx: Arc<GpuContext>, desc: &ImageDesc) -> Result<Self> {
        if desc.format == TextureFormat::SWAPCHAIN {
            engine_bail_validation!("galaxy3d::vulkan",
                "Image '{}' cannot use the SWAPCHAIN format token", desc.name);
        }
        if desc.width == 0 || desc.height == 0 {
            engine_bail_validation!("galaxy3d::vulkan",
                "Image '{}' has a zero extent ({}x{})", desc.name, desc.width, desc.height);
        }

        let create_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format_to_vk(desc.format))
            .extent(vk::Extent3D { width: desc.width, height: desc.height, depth: 1 })
            .mip_levels(1)
            .array_layers(1)
            .samples(sample_count_to_vk(desc.samples))
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(image_usage_to_vk(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        unsafe {
            let image = ctx.device.create_image(&create_info, None)
                .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create image '{}': {:?}", desc.name, e))?;

            let requirements = ctx.device.get_image_memory_requirements(image);
            let allocation = {
                let mut allocator = match ctx.lock_allocator() {
                    Ok(allocator) => allocator,
                    Err(e) => {
                        ctx.device.destroy_image(image, None);
                        return Err(e);
                    }
                };
                allocator.allocate(&AllocationCreateDesc {
                    name: &desc.name,
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
            };

            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(e) => {
                    ctx.device.destroy_image(image, None);
                    return Err(allocation_error(&desc.name, e));
                }
            };

            if let Err(e) = ctx.device.bind_image_memory(image, allocation.memory(), allocation.offset()) {
                if let Ok(mut allocator) = ctx.lock_allocator() {
                    allocator.free(allocation).ok();
                }
                ctx.device.destroy_image(image, None);
                return Err(engine_err!("galaxy3d::vulkan",
                    "Failed to bind memory of image '{}': {:?}", desc.name, e));
            }

            engine_trace!("galaxy3d::vulkan", "Image '{}' created ({}x{}, {:?}, {} samples)",
                desc.name, desc.width, desc.height, desc.format, desc.samples.count());

            Ok(Self {
                image,
                allocation: Some(allocation),
                _swapchain: None,
                width: desc.width,
                height: desc.height,
                format: desc.format,
                samples: desc.samples,
                ctx,
            })
        }
    }

    /// Wrap an image owned by a swapchain
    pub(crate) fn presentable(
        ctx: Arc<GpuContext>,
        swapchain: Arc<SwapchainHandle>,
        image: vk::Image,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Self {
        Self {
            image,
            allocation: None,
            _swapchain: Some(swapchain),
            width,
            height,
            format,
            samples: SampleCount::S1,
            ctx,
        }
    }

    /// Downcast an image created by this backend
    ///
    /// # Safety
    ///
    /// `image` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(image: &dyn RendererImage) -> &Image {
        &*(image as *const dyn RendererImage as *const Image)
    }
}

fn allocation_error(name: &str, error: AllocationError) -> Error {
    match error {
        AllocationError::OutOfMemory => {
            engine_error!("galaxy3d::vulkan", "Out of device memory allocating image '{}'", name);
            Error::OutOfMemory
        }
        other => engine_err!("galaxy3d::vulkan", "Failed to allocate memory for image '{}': {:?}", name, other),
    }
}

impl RendererImage for Image {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn samples(&self) -> SampleCount {
        self.samples
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        // Swapchain images are destroyed with their swapchain
        let Some(allocation) = self.allocation.take() else {
            return;
        };

        unsafe {
            if let Ok(mut allocator) = self.ctx.lock_allocator() {
                allocator.free(allocation).ok();
            }
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}

// ============================================================================
// ImageView
// ============================================================================

/// Vulkan image view covering a whole image
pub(crate) struct ImageView {
    /// Vulkan image view
    pub(crate) view: vk::ImageView,
    /// Keeps the viewed image alive
    _image: Arc<dyn RendererImage>,
    width: u32,
    height: u32,
    format: TextureFormat,
    ctx: Arc<GpuContext>,
}

impl ImageView {
    pub(crate) fn new(ctx: Arc<GpuContext>, image: &Arc<dyn RendererImage>) -> Result<Self> {
        let vk_image = unsafe { Image::from_dyn(image.as_ref()) };
        let format = image.format();

        let create_info = vk::ImageViewCreateInfo::default()
            .image(vk_image.image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format_to_vk(format))
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect_mask(format),
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        let view = unsafe { ctx.device.create_image_view(&create_info, None) }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create image view: {:?}", e))?;

        Ok(Self {
            view,
            _image: image.clone(),
            width: image.width(),
            height: image.height(),
            format,
            ctx,
        })
    }

    /// Downcast a view created by this backend
    ///
    /// # Safety
    ///
    /// `view` must have been created by a `VulkanGraphicsDevice` or a Vulkan swapchain.
    pub(crate) unsafe fn from_dyn(view: &dyn RendererImageView) -> &ImageView {
        &*(view as *const dyn RendererImageView as *const ImageView)
    }
}

impl RendererImageView for ImageView {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> TextureFormat {
        self.format
    }
}

impl Drop for ImageView {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_image_view(self.view, None);
        }
    }
}
