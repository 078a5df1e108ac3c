/// VulkanGraphicsDevice - Vulkan implementation of the GraphicsDevice trait
///
/// Creates the instance, the window surface, the logical device and the memory
/// allocator once, then hands out attachment images, render passes,
/// framebuffers, sync objects, command lists and swapchains that all share
/// the same `GpuContext`.

use galaxy_3d_frame_graph::galaxy3d::{Error, Result};
use galaxy_3d_frame_graph::galaxy3d::render::{
    CommandList as RendererCommandList, Config, Fence as RendererFence,
    Framebuffer as RendererFramebuffer, FramebufferDesc, GraphicsDevice, Image as RendererImage,
    ImageDesc, ImageView as RendererImageView, RenderPass as RendererRenderPass,
    Semaphore as RendererSemaphore, Swapchain as RendererSwapchain,
};
use galaxy_3d_frame_graph::galaxy3d::render_pass::{RenderPassConfig, TextureFormat};
use galaxy_3d_frame_graph::{engine_debug, engine_err, engine_error, engine_info};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CString;
use std::sync::Arc;

use crate::vulkan_command_list::CommandList;
use crate::vulkan_context::{GpuContext, GpuContextParts};
use crate::vulkan_debug::{create_messenger, validation_active, validation_extensions, validation_layers};
use crate::vulkan_frame_buffer::Framebuffer;
use crate::vulkan_image::{Image, ImageView};
use crate::vulkan_render_pass::RenderPass;
use crate::vulkan_swapchain::Swapchain;
use crate::vulkan_sync::{Fence, Semaphore};

/// Queue families chosen on a physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueFamilies {
    graphics: u32,
    present: u32,
}

/// Vulkan graphics device
pub struct VulkanGraphicsDevice {
    config: Config,
    ctx: Arc<GpuContext>,
}

impl VulkanGraphicsDevice {
    /// Create a device presenting to `window`
    ///
    /// # Arguments
    ///
    /// * `window` - Window providing the display and window handles of the surface
    /// * `config` - Device configuration
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: Config) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to load Vulkan library: {:?}", e);
                    Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
                })?;

            let app_name = CString::new(config.app_name.as_str())
                .map_err(|e| Error::InitializationFailed(format!("Invalid application name: {}", e)))?;
            let (major, minor, patch) = config.app_version;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, major, minor, patch))
                .engine_name(c"Galaxy3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_3);

            let display_handle = window.display_handle()
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to get display handle: {}", e);
                    Error::InitializationFailed(format!("Failed to get display handle: {}", e))
                })?;
            let window_handle = window.window_handle()
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to get window handle: {}", e);
                    Error::InitializationFailed(format!("Failed to get window handle: {}", e))
                })?;

            let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to get required extensions: {}", e);
                    Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
                })?
                .to_vec();

            let validation = validation_active(config.enable_validation);
            let layer_names = if validation {
                extension_names.extend(validation_extensions());
                validation_layers()
            } else {
                Vec::new()
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to create Vulkan instance: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
                })?;

            let debug = create_messenger(&entry, &instance, validation)?;

            // The surface lives as long as the device; swapchains are rebuilt on it
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                engine_error!("galaxy3d::vulkan", "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            let (physical_device, families) = Self::pick_physical_device(&instance, &surface_loader, surface)?;

            let queue_priorities = [1.0];
            let mut queue_create_infos = vec![
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(families.graphics)
                    .queue_priorities(&queue_priorities),
            ];
            if families.present != families.graphics {
                queue_create_infos.push(
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(families.present)
                        .queue_priorities(&queue_priorities),
                );
            }

            let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
            let device_features = vk::PhysicalDeviceFeatures::default();

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .enabled_features(&device_features);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            let graphics_queue = device.get_device_queue(families.graphics, 0);
            let present_queue = device.get_device_queue(families.present, 0);

            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| {
                engine_error!("galaxy3d::vulkan", "Failed to create GPU allocator: {:?}", e);
                Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
            })?;

            let properties = instance.get_physical_device_properties(physical_device);
            let gpu_name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown".to_string());
            engine_info!("galaxy3d::vulkan", "Vulkan device created on '{}' (graphics family {}, present family {}, validation {})",
                gpu_name, families.graphics, families.present, if validation { "on" } else { "off" });

            let ctx = Arc::new(GpuContext::new(GpuContextParts {
                entry,
                instance,
                debug,
                surface,
                surface_loader,
                physical_device,
                device,
                allocator,
                graphics_queue,
                graphics_queue_family: families.graphics,
                present_queue,
            }));

            Ok(Self { config, ctx })
        }
    }

    /// First suitable device, discrete GPUs first
    unsafe fn pick_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<(vk::PhysicalDevice, QueueFamilies)> {
        let physical_devices = instance
            .enumerate_physical_devices()
            .map_err(|e| {
                engine_error!("galaxy3d::vulkan", "Failed to enumerate physical devices: {:?}", e);
                Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
            })?;

        let mut candidates: Vec<(vk::PhysicalDevice, QueueFamilies, bool)> = physical_devices
            .into_iter()
            .filter(|&device| Self::supports_swapchain(instance, device))
            .filter_map(|device| {
                let families = Self::find_queue_families(instance, surface_loader, surface, device)?;
                let discrete = instance.get_physical_device_properties(device).device_type
                    == vk::PhysicalDeviceType::DISCRETE_GPU;
                Some((device, families, discrete))
            })
            .collect();

        // Stable sort keeps enumeration order among equals
        candidates.sort_by_key(|&(_, _, discrete)| !discrete);

        candidates
            .into_iter()
            .next()
            .map(|(device, families, _)| (device, families))
            .ok_or_else(|| {
                engine_error!("galaxy3d::vulkan", "No Vulkan GPU can render and present to this window");
                Error::InitializationFailed("No suitable Vulkan GPU found".to_string())
            })
    }

    unsafe fn supports_swapchain(instance: &ash::Instance, device: vk::PhysicalDevice) -> bool {
        instance
            .enumerate_device_extension_properties(device)
            .map(|extensions| {
                extensions.iter().any(|extension| {
                    extension.extension_name_as_c_str() == Ok(ash::khr::swapchain::NAME)
                })
            })
            .unwrap_or(false)
    }

    /// Graphics and present families, sharing one family when possible
    unsafe fn find_queue_families(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        device: vk::PhysicalDevice,
    ) -> Option<QueueFamilies> {
        let queue_families = instance.get_physical_device_queue_family_properties(device);
        let presents = |index: u32| {
            surface_loader
                .get_physical_device_surface_support(device, index, surface)
                .unwrap_or(false)
        };

        let graphics: Vec<u32> = queue_families
            .iter()
            .enumerate()
            .filter(|(_, family)| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
            .map(|(index, _)| index as u32)
            .collect();

        if let Some(&shared) = graphics.iter().find(|&&index| presents(index)) {
            return Some(QueueFamilies { graphics: shared, present: shared });
        }

        let graphics = *graphics.first()?;
        let present = (0..queue_families.len() as u32).find(|&index| presents(index))?;
        Some(QueueFamilies { graphics, present })
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn config(&self) -> &Config {
        &self.config
    }

    fn create_render_pass(
        &self,
        config: &RenderPassConfig,
        swapchain_format: TextureFormat,
    ) -> Result<Arc<dyn RendererRenderPass>> {
        Ok(Arc::new(RenderPass::new(self.ctx.clone(), config, swapchain_format)?))
    }

    fn create_image(&self, desc: &ImageDesc) -> Result<Arc<dyn RendererImage>> {
        Ok(Arc::new(Image::allocate(self.ctx.clone(), desc)?))
    }

    fn create_image_view(&self, image: &Arc<dyn RendererImage>) -> Result<Arc<dyn RendererImageView>> {
        Ok(Arc::new(ImageView::new(self.ctx.clone(), image)?))
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn RendererFramebuffer>> {
        Ok(Arc::new(Framebuffer::new(self.ctx.clone(), desc)?))
    }

    fn create_fence(&self, signaled: bool) -> Result<Arc<dyn RendererFence>> {
        Ok(Arc::new(Fence::new(self.ctx.clone(), signaled)?))
    }

    fn create_semaphore(&self) -> Result<Arc<dyn RendererSemaphore>> {
        Ok(Arc::new(Semaphore::new(self.ctx.clone())?))
    }

    fn create_command_list(&self) -> Result<Box<dyn RendererCommandList>> {
        Ok(Box::new(CommandList::new(self.ctx.clone())?))
    }

    fn create_swapchain(&self, width: u32, height: u32) -> Result<Box<dyn RendererSwapchain>> {
        Ok(Box::new(Swapchain::new(self.ctx.clone(), &self.config, width, height)?))
    }

    fn submit(
        &self,
        commands: &dyn RendererCommandList,
        wait: &dyn RendererSemaphore,
        signal: &dyn RendererSemaphore,
        fence: &dyn RendererFence,
    ) -> Result<()> {
        let (command_buffers, wait_semaphores, signal_semaphores, vk_fence) = unsafe {
            (
                [CommandList::from_dyn(commands).command_buffer],
                [Semaphore::from_dyn(wait).semaphore],
                [Semaphore::from_dyn(signal).semaphore],
                Fence::from_dyn(fence).fence,
            )
        };
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        let _queue = self.ctx.lock_queues()?;
        unsafe {
            self.ctx.device
                .queue_submit(self.ctx.graphics_queue, &[submit_info], vk_fence)
                .map_err(|e| match e {
                    vk::Result::ERROR_OUT_OF_DEVICE_MEMORY | vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
                        engine_error!("galaxy3d::vulkan", "Out of memory submitting commands: {:?}", e);
                        Error::OutOfMemory
                    }
                    _ => engine_err!("galaxy3d::vulkan", "Failed to submit command buffer: {:?}", e),
                })
        }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe { self.ctx.device.device_wait_idle() }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to wait for device idle: {:?}", e))
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        // Resources still holding the context keep the device alive
        engine_debug!("galaxy3d::vulkan", "VulkanGraphicsDevice dropped ({} context references left)",
            Arc::strong_count(&self.ctx) - 1);
    }
}
