#![allow(unsafe_code)]
//! A Vulkan queue, with thread-local command-buffer pools (§4.7 "Queue").
//!
//! Grounded on `vulkan_queue.rs`'s queue-handle wrapper and `vulkan_command_allocator.rs`'s
//! pool-per-thread idea; recycling completed buffers instead of reallocating every frame follows
//! the same allocator's free-list pattern.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ash::version::DeviceV1_0;
use ash::vk;

use crate::error::{Result, RhiError};
use crate::rhi::enums::{CommandBufferLevel, QueueType};
use crate::rhi::traits::CommandQueue;
use crate::rhi::vulkan::command_buffer::VulkanCommandBuffer;
use crate::rhi::vulkan::device::VulkanDevice;
use crate::rhi::vulkan::Vulkan;

struct ThreadPool {
    pool: vk::CommandPool,
    free_primary: Vec<vk::CommandBuffer>,
    free_secondary: Vec<vk::CommandBuffer>,
}

thread_local! {
    static THREAD_POOLS: RefCell<HashMap<usize, ThreadPool>> = RefCell::new(HashMap::new());
}

pub(crate) struct QueueInner {
    pub(crate) raw: vk::Queue,
    pub(crate) family_index: u32,
    pub(crate) queue_type: QueueType,
    pub(crate) submit_lock: Mutex<()>,
}

/// A queue belonging to one queue family (§4.7). Cheaply `Clone`-able; command-buffer pools live
/// in a thread-local keyed by this queue's identity, so each thread that calls
/// `obtain_command_buffer` gets its own pool without any cross-thread locking on the hot path.
#[derive(Clone)]
pub struct VulkanCommandQueue {
    pub(crate) device: VulkanDevice,
    pub(crate) inner: Arc<QueueInner>,
}

impl VulkanCommandQueue {
    pub(crate) fn new(device: VulkanDevice, raw: vk::Queue, family_index: u32, queue_type: QueueType) -> VulkanCommandQueue {
        VulkanCommandQueue {
            device,
            inner: Arc::new(QueueInner { raw, family_index, queue_type, submit_lock: Mutex::new(()) }),
        }
    }

    fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    pub(crate) fn submit(&self, command_buffer: vk::CommandBuffer, wait: &[(vk::Semaphore, vk::PipelineStageFlags)], signal: &[vk::Semaphore], fence: vk::Fence) -> Result<()> {
        let _guard = self.inner.submit_lock.lock().unwrap();
        let wait_semaphores: Vec<vk::Semaphore> = wait.iter().map(|(s, _)| *s).collect();
        let wait_stages: Vec<vk::PipelineStageFlags> = wait.iter().map(|(_, s)| *s).collect();
        let command_buffers = [command_buffer];

        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(signal)
            .build();

        unsafe {
            self.device
                .raw()
                .queue_submit(self.inner.raw, &[submit_info], fence)
                .map_err(|err| RhiError::unsupported(format!("queue submit failed: {:?}", err)))
        }
    }

    pub(crate) fn present(&self, swapchain_loader: &ash::extensions::khr::Swapchain, wait: &[vk::Semaphore], swapchain: vk::SwapchainKHR, image_index: u32) -> Result<bool> {
        let _guard = self.inner.submit_lock.lock().unwrap();
        let swapchains = [swapchain];
        let indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(wait)
            .swapchains(&swapchains)
            .image_indices(&indices)
            .build();

        match unsafe { swapchain_loader.queue_present(self.inner.raw, &present_info) } {
            Ok(suboptimal) => Ok(suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Err(RhiError::OutOfDate),
            Err(err) => Err(RhiError::unsupported(format!("present failed: {:?}", err))),
        }
    }

    fn with_thread_pool<R>(&self, f: impl FnOnce(&mut ThreadPool, &ash::Device) -> Result<R>) -> Result<R> {
        let identity = self.identity();
        let raw_device = self.device.raw().clone();
        let family_index = self.inner.family_index;

        THREAD_POOLS.with(|pools| {
            let mut pools = pools.borrow_mut();
            let entry = pools.entry(identity);
            let thread_pool = match entry {
                std::collections::hash_map::Entry::Occupied(occupied) => occupied.into_mut(),
                std::collections::hash_map::Entry::Vacant(vacant) => {
                    let pool_info = vk::CommandPoolCreateInfo::builder()
                        .queue_family_index(family_index)
                        .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
                        .build();
                    let pool = unsafe { raw_device.create_command_pool(&pool_info, None) }
                        .map_err(|err| RhiError::resource_exhausted(format!("failed to create command pool: {:?}", err)))?;
                    vacant.insert(ThreadPool { pool, free_primary: Vec::new(), free_secondary: Vec::new() })
                }
            };
            f(thread_pool, &raw_device)
        })
    }
}

impl CommandQueue<Vulkan> for VulkanCommandQueue {
    fn queue_type(&self) -> QueueType {
        self.inner.queue_type
    }

    fn obtain_command_buffer(&self, level: CommandBufferLevel) -> Result<VulkanCommandBuffer> {
        let device = self.device.clone();
        let queue = self.clone();

        self.with_thread_pool(|thread_pool, raw_device| {
            let free_list = match level {
                CommandBufferLevel::Primary => &mut thread_pool.free_primary,
                CommandBufferLevel::Secondary => &mut thread_pool.free_secondary,
            };

            let command_buffer = match free_list.pop() {
                Some(existing) => existing,
                None => {
                    let vk_level = match level {
                        CommandBufferLevel::Primary => vk::CommandBufferLevel::PRIMARY,
                        CommandBufferLevel::Secondary => vk::CommandBufferLevel::SECONDARY,
                    };
                    let alloc_info = vk::CommandBufferAllocateInfo::builder()
                        .command_pool(thread_pool.pool)
                        .level(vk_level)
                        .command_buffer_count(1)
                        .build();
                    unsafe { raw_device.allocate_command_buffers(&alloc_info) }
                        .map_err(|err| RhiError::resource_exhausted(format!("failed to allocate command buffer: {:?}", err)))?[0]
                }
            };

            unsafe {
                raw_device
                    .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                    .map_err(|err| RhiError::unsupported(format!("failed to reset command buffer: {:?}", err)))?;
            }

            let begin_info = vk::CommandBufferBeginInfo::builder()
                .flags(vk::CommandBufferUsageFlags::SIMULTANEOUS_USE)
                .build();
            unsafe {
                raw_device
                    .begin_command_buffer(command_buffer, &begin_info)
                    .map_err(|err| RhiError::unsupported(format!("failed to begin command buffer: {:?}", err)))?;
            }

            Ok(VulkanCommandBuffer::new(device.clone(), queue.clone(), command_buffer, thread_pool.pool, level))
        })
    }

    fn wait_idle(&self) -> Result<()> {
        let _guard = self.inner.submit_lock.lock().unwrap();
        unsafe { self.device.raw().queue_wait_idle(self.inner.raw) }.map_err(|_| RhiError::DeviceLost)
    }
}

impl VulkanCommandQueue {
    /// Obtains a secondary command buffer begun with `RENDER_PASS_CONTINUE` and inheritance
    /// info for `render_pass`/`framebuffer`, for recording within a parallel render pass (§4.7).
    pub(crate) fn obtain_secondary_command_buffer(&self, render_pass: vk::RenderPass, framebuffer: vk::Framebuffer) -> Result<vk::CommandBuffer> {
        self.with_thread_pool(|thread_pool, raw_device| {
            let command_buffer = match thread_pool.free_secondary.pop() {
                Some(existing) => existing,
                None => {
                    let alloc_info = vk::CommandBufferAllocateInfo::builder()
                        .command_pool(thread_pool.pool)
                        .level(vk::CommandBufferLevel::SECONDARY)
                        .command_buffer_count(1)
                        .build();
                    unsafe { raw_device.allocate_command_buffers(&alloc_info) }
                        .map_err(|err| RhiError::resource_exhausted(format!("failed to allocate secondary command buffer: {:?}", err)))?[0]
                }
            };

            unsafe {
                raw_device
                    .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                    .map_err(|err| RhiError::unsupported(format!("failed to reset secondary command buffer: {:?}", err)))?;
            }

            let inheritance_info = vk::CommandBufferInheritanceInfo::builder()
                .render_pass(render_pass)
                .subpass(0)
                .framebuffer(framebuffer)
                .build();
            let begin_info = vk::CommandBufferBeginInfo::builder()
                .flags(vk::CommandBufferUsageFlags::RENDER_PASS_CONTINUE | vk::CommandBufferUsageFlags::SIMULTANEOUS_USE)
                .inheritance_info(&inheritance_info)
                .build();
            unsafe {
                raw_device
                    .begin_command_buffer(command_buffer, &begin_info)
                    .map_err(|err| RhiError::unsupported(format!("failed to begin secondary command buffer: {:?}", err)))?;
            }

            Ok(command_buffer)
        })
    }
}

/// Returns a recycled command buffer to its thread-local free list instead of freeing it; called
/// by [`VulkanCommandBuffer::drop`] once a submitted buffer's fence has been observed signaled by
/// the caller (the RHI does not itself poll for completion — see §9 Open Question 1).
pub(crate) fn recycle(queue: &VulkanCommandQueue, command_buffer: vk::CommandBuffer, level: CommandBufferLevel) {
    let identity = Arc::as_ptr(&queue.inner) as usize;
    THREAD_POOLS.with(|pools| {
        if let Some(thread_pool) = pools.borrow_mut().get_mut(&identity) {
            match level {
                CommandBufferLevel::Primary => thread_pool.free_primary.push(command_buffer),
                CommandBufferLevel::Secondary => thread_pool.free_secondary.push(command_buffer),
            }
        }
    });
}
