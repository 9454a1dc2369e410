#![allow(unsafe_code)]
//! CPU-observable fences and GPU-to-GPU semaphores (§3, §4.9).
//!
//! Grounded on `vulkan_synchronization.rs`'s thin wrappers around `vk::Fence`/`vk::Semaphore`.

use ash::version::DeviceV1_0;
use ash::vk;

use crate::error::{Result, RhiError};
use crate::rhi::traits::Fence;
use crate::rhi::vulkan::device::VulkanDevice;

/// A CPU-observable synchronization primitive, created unsignaled (§3, §4.9).
pub struct VulkanFence {
    device: VulkanDevice,
    pub(crate) fence: vk::Fence,
}

impl VulkanFence {
    pub(crate) fn new(device: VulkanDevice) -> Result<VulkanFence> {
        let fence_info = vk::FenceCreateInfo::builder().build();
        let fence = unsafe { device.raw().create_fence(&fence_info, None) }
            .map_err(|err| RhiError::resource_exhausted(format!("failed to create fence: {:?}", err)))?;
        Ok(VulkanFence { device, fence })
    }
}

impl Drop for VulkanFence {
    fn drop(&mut self) {
        unsafe { self.device.raw().destroy_fence(self.fence, None) };
    }
}

impl Fence for VulkanFence {
    fn wait_for(&self, timeout_ns: u64) -> Result<()> {
        let fences = [self.fence];
        match unsafe { self.device.raw().wait_for_fences(&fences, true, timeout_ns) } {
            Ok(()) => Ok(()),
            Err(vk::Result::TIMEOUT) => Err(RhiError::Timeout),
            Err(err) => Err(RhiError::unsupported(format!("wait_for_fences failed: {:?}", err))),
        }
    }

    fn reset(&self) -> Result<()> {
        let fences = [self.fence];
        unsafe { self.device.raw().reset_fences(&fences) }.map_err(|err| RhiError::unsupported(format!("failed to reset fence: {:?}", err)))
    }

    fn is_signaled(&self) -> Result<bool> {
        unsafe { self.device.raw().get_fence_status(self.fence) }
            .map(|_| true)
            .or_else(|err| if err == vk::Result::NOT_READY { Ok(false) } else { Err(RhiError::unsupported(format!("failed to query fence status: {:?}", err))) })
    }
}

/// An opaque GPU-to-GPU semaphore, used internally to order swapchain acquire/present against
/// queue submissions (§3, §4.8).
pub struct VulkanSemaphore {
    device: VulkanDevice,
    pub(crate) semaphore: vk::Semaphore,
}

impl VulkanSemaphore {
    pub(crate) fn new(device: VulkanDevice) -> Result<VulkanSemaphore> {
        let semaphore_info = vk::SemaphoreCreateInfo::builder().build();
        let semaphore = unsafe { device.raw().create_semaphore(&semaphore_info, None) }
            .map_err(|err| RhiError::resource_exhausted(format!("failed to create semaphore: {:?}", err)))?;
        Ok(VulkanSemaphore { device, semaphore })
    }
}

impl Drop for VulkanSemaphore {
    fn drop(&mut self) {
        unsafe { self.device.raw().destroy_semaphore(self.semaphore, None) };
    }
}
