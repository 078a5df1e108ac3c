/// GpuContext - Shared Vulkan state for every object created by the device
///
/// Contains everything needed for GPU operations:
/// - Instance, surface and logical device
/// - Allocator for image memory
/// - Graphics and present queues
///
/// Every resource (images, render passes, swapchains, ...) keeps an `Arc<GpuContext>`,
/// so the device is destroyed only after the last resource is gone.

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::Mutex;
use galaxy_3d_frame_graph::galaxy3d::{Error, Result};
use galaxy_3d_frame_graph::engine_debug;

use crate::vulkan_debug::DebugMessenger;

/// Shared GPU context for all Vulkan resources
pub(crate) struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    pub physical_device: vk::PhysicalDevice,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop to ensure it's dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Graphics queue for command submission
    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,

    /// Present queue (may be the same as graphics)
    pub present_queue: vk::Queue,

    /// Serializes queue submissions and presentation
    pub queue_lock: Mutex<()>,

    /// Window surface, owned for the whole device lifetime
    pub surface: vk::SurfaceKHR,
    pub surface_loader: ash::khr::surface::Instance,

    pub instance: ash::Instance,

    /// Validation messenger (destroyed before the instance)
    debug: Option<DebugMessenger>,

    /// Keeps the Vulkan library loaded
    _entry: ash::Entry,
}

/// Parts assembled by `VulkanGraphicsDevice::new()`
pub(crate) struct GpuContextParts {
    pub entry: ash::Entry,
    pub instance: ash::Instance,
    pub debug: Option<DebugMessenger>,
    pub surface: vk::SurfaceKHR,
    pub surface_loader: ash::khr::surface::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: ash::Device,
    pub allocator: Allocator,
    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,
    pub present_queue: vk::Queue,
}

impl GpuContext {
    pub fn new(parts: GpuContextParts) -> Self {
        Self {
            device: parts.device,
            physical_device: parts.physical_device,
            allocator: ManuallyDrop::new(Mutex::new(parts.allocator)),
            graphics_queue: parts.graphics_queue,
            graphics_queue_family: parts.graphics_queue_family,
            present_queue: parts.present_queue,
            queue_lock: Mutex::new(()),
            surface: parts.surface,
            surface_loader: parts.surface_loader,
            instance: parts.instance,
            debug: parts.debug,
            _entry: parts.entry,
        }
    }

    /// Lock the allocator, mapping poisoning to a backend error
    pub fn lock_allocator(&self) -> Result<std::sync::MutexGuard<'_, Allocator>> {
        self.allocator
            .lock()
            .map_err(|_| Error::BackendError("GPU allocator lock poisoned".to_string()))
    }

    /// Lock the queues, mapping poisoning to a backend error
    pub fn lock_queues(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.queue_lock
            .lock()
            .map_err(|_| Error::BackendError("Queue lock poisoned".to_string()))
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            // 1. Free the allocator's memory pages while the device is alive
            ManuallyDrop::drop(&mut self.allocator);

            // 2. Device, surface, messenger, instance
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            if let Some(debug) = self.debug.take() {
                debug.destroy();
            }
            self.instance.destroy_instance(None);
        }
        engine_debug!("galaxy3d::vulkan", "Vulkan device destroyed");
    }
}
