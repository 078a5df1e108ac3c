/// Fence and Semaphore - Vulkan synchronization primitives

use galaxy_3d_frame_graph::galaxy3d::Result;
use galaxy_3d_frame_graph::galaxy3d::render::{Fence as RendererFence, Semaphore as RendererSemaphore};
use galaxy_3d_frame_graph::engine_err;
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

// ============================================================================
// Fence
// ============================================================================

pub(crate) struct Fence {
    pub(crate) fence: vk::Fence,
    ctx: Arc<GpuContext>,
}

impl Fence {
    pub(crate) fn new(ctx: Arc<GpuContext>, signaled: bool) -> Result<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let fence_info = vk::FenceCreateInfo::default().flags(flags);

        let fence = unsafe { ctx.device.create_fence(&fence_info, None) }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create fence: {:?}", e))?;

        Ok(Self { fence, ctx })
    }

    /// # Safety
    ///
    /// `fence` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(fence: &dyn RendererFence) -> &Fence {
        &*(fence as *const dyn RendererFence as *const Fence)
    }
}

impl RendererFence for Fence {
    fn wait(&self, timeout_ns: u64) -> Result<bool> {
        match unsafe { self.ctx.device.wait_for_fences(&[self.fence], true, timeout_ns) } {
            Ok(()) => Ok(true),
            Err(vk::Result::TIMEOUT) => Ok(false),
            Err(e) => Err(engine_err!("galaxy3d::vulkan", "Failed to wait for fence: {:?}", e)),
        }
    }

    fn reset(&self) -> Result<()> {
        unsafe { self.ctx.device.reset_fences(&[self.fence]) }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to reset fence: {:?}", e))
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_fence(self.fence, None);
        }
    }
}

// ============================================================================
// Semaphore
// ============================================================================

pub(crate) struct Semaphore {
    pub(crate) semaphore: vk::Semaphore,
    ctx: Arc<GpuContext>,
}

impl Semaphore {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        let semaphore = unsafe { ctx.device.create_semaphore(&vk::SemaphoreCreateInfo::default(), None) }
            .map_err(|e| engine_err!("galaxy3d::vulkan", "Failed to create semaphore: {:?}", e))?;

        Ok(Self { semaphore, ctx })
    }

    /// # Safety
    ///
    /// `semaphore` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(semaphore: &dyn RendererSemaphore) -> &Semaphore {
        &*(semaphore as *const dyn RendererSemaphore as *const Semaphore)
    }
}

impl RendererSemaphore for Semaphore {}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_semaphore(self.semaphore, None);
        }
    }
}
