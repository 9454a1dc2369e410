#![allow(unsafe_code)]
//! The recordable, then submittable, command buffer (§3, §4.7).
//!
//! Grounded on `vulkan_commandbuffer.rs`'s record/end/submit lifecycle and on `VkRHI.cpp`'s
//! `InferImageBarrierFromDesc` six-step barrier derivation for `transition_texture` (§4.7).

use ash::version::DeviceV1_0;
use ash::vk;

use crate::error::{Result, RhiError};
use crate::rhi::cache::Handle;
use crate::rhi::enums::{CommandBufferLevel, ResourceState};
use crate::rhi::structs::{BufferCopyRegion, ClearValue, PlacedSubresourceFootprint, RenderPassBeginDesc};
use crate::rhi::traits::{CommandBuffer, CommandQueue, Device, Fence, GpuResource};
use crate::rhi::vulkan::convert::*;
use crate::rhi::vulkan::device::VulkanDevice;
use crate::rhi::vulkan::encoder::{VulkanComputeCommandEncoder, VulkanParallelRenderCommandEncoder, VulkanRenderCommandEncoder};
use crate::rhi::vulkan::framebuffer::obtain_framebuffer;
use crate::rhi::vulkan::queue::{self, VulkanCommandQueue};
use crate::rhi::vulkan::resource::{VulkanBuffer, VulkanTexture};
use crate::rhi::vulkan::sync::VulkanFence;
use crate::rhi::vulkan::view::VulkanShaderResourceView;
use crate::rhi::vulkan::Vulkan;
use crate::rhi::vulkan::swapchain::VulkanSwapchain;

/// A recordable, then submittable, list of commands on one queue (§3, §4.7).
///
/// Recycled into its owning queue's thread-local pool on drop rather than freed, on the
/// assumption documented at [`crate::error::RhiError::DeviceLost`]'s call sites: callers hold a
/// command buffer alive until its completion fence (if any) has been observed signalled (§9 Open
/// Question 1).
pub struct VulkanCommandBuffer {
    device: VulkanDevice,
    queue: VulkanCommandQueue,
    pub(crate) command_buffer: vk::CommandBuffer,
    level: CommandBufferLevel,
    ended: bool,
    pending_present: Option<VulkanSwapchain>,
}

impl VulkanCommandBuffer {
    pub(crate) fn new(device: VulkanDevice, queue: VulkanCommandQueue, command_buffer: vk::CommandBuffer, _pool: vk::CommandPool, level: CommandBufferLevel) -> VulkanCommandBuffer {
        VulkanCommandBuffer { device, queue, command_buffer, level, ended: false, pending_present: None }
    }

    fn end_if_open(&mut self) -> Result<()> {
        if self.ended {
            return Ok(());
        }
        unsafe { self.device.raw().end_command_buffer(self.command_buffer) }
            .map_err(|err| RhiError::unsupported(format!("failed to end command buffer: {:?}", err)))?;
        self.ended = true;
        Ok(())
    }
}

impl Drop for VulkanCommandBuffer {
    fn drop(&mut self) {
        queue::recycle(&self.queue, self.command_buffer, self.level);
    }
}

fn clear_value_to_vk(clear: ClearValue) -> vk::ClearValue {
    match clear {
        ClearValue::Color(rgba) => vk::ClearValue { color: vk::ClearColorValue { float32: rgba } },
        ClearValue::DepthStencil(depth, stencil) => vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth, stencil: stencil as u32 },
        },
    }
}

impl CommandBuffer<Vulkan> for VulkanCommandBuffer {
    fn render_command_encoder(&mut self, desc: &RenderPassBeginDesc<'_, VulkanShaderResourceView>) -> Result<VulkanRenderCommandEncoder> {
        let render_pass = self.device.create_render_pass(&desc.render_pass)?;

        let framebuffer = obtain_framebuffer(
            &self.device,
            &render_pass,
            &desc.color_views,
            desc.depth_stencil_view,
            desc.render_area.width,
            desc.render_area.height,
        )?;

        let clear_values: Vec<vk::ClearValue> = desc.clear_values.iter().copied().map(clear_value_to_vk).collect();
        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: desc.render_area.x, y: desc.render_area.y },
            extent: vk::Extent2D { width: desc.render_area.width, height: desc.render_area.height },
        };

        let begin_info = vk::RenderPassBeginInfo::builder()
            .render_pass(render_pass.render_pass)
            .framebuffer(framebuffer.framebuffer)
            .render_area(render_area)
            .clear_values(&clear_values)
            .build();

        unsafe { self.device.raw().cmd_begin_render_pass(self.command_buffer, &begin_info, vk::SubpassContents::INLINE) };

        Ok(VulkanRenderCommandEncoder { device: self.device.clone(), command_buffer: self.command_buffer, is_secondary: false })
    }

    fn compute_command_encoder(&mut self) -> Result<VulkanComputeCommandEncoder> {
        Ok(VulkanComputeCommandEncoder { device: self.device.clone(), command_buffer: self.command_buffer })
    }

    fn parallel_render_command_encoder(&mut self, desc: &RenderPassBeginDesc<'_, VulkanShaderResourceView>) -> Result<VulkanParallelRenderCommandEncoder> {
        let render_pass = self.device.create_render_pass(&desc.render_pass)?;

        let framebuffer = obtain_framebuffer(
            &self.device,
            &render_pass,
            &desc.color_views,
            desc.depth_stencil_view,
            desc.render_area.width,
            desc.render_area.height,
        )?;

        let clear_values: Vec<vk::ClearValue> = desc.clear_values.iter().copied().map(clear_value_to_vk).collect();
        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: desc.render_area.x, y: desc.render_area.y },
            extent: vk::Extent2D { width: desc.render_area.width, height: desc.render_area.height },
        };

        let begin_info = vk::RenderPassBeginInfo::builder()
            .render_pass(render_pass.render_pass)
            .framebuffer(framebuffer.framebuffer)
            .render_area(render_area)
            .clear_values(&clear_values)
            .build();

        unsafe { self.device.raw().cmd_begin_render_pass(self.command_buffer, &begin_info, vk::SubpassContents::SECONDARY_COMMAND_BUFFERS) };

        Ok(VulkanParallelRenderCommandEncoder {
            device: self.device.clone(),
            queue: self.queue.clone(),
            primary_command_buffer: self.command_buffer,
            render_pass: render_pass.render_pass,
            framebuffer: framebuffer.framebuffer,
            secondary_buffers: Vec::new(),
        })
    }

    fn copy_buffer(&mut self, dst: &Handle<VulkanBuffer>, src: &Handle<VulkanBuffer>, region: BufferCopyRegion) -> Result<()> {
        let vk_region = vk::BufferCopy { src_offset: region.src_offset, dst_offset: region.dst_offset, size: region.size };
        unsafe { self.device.raw().cmd_copy_buffer(self.command_buffer, src.buffer, dst.buffer, &[vk_region]) };
        Ok(())
    }

    fn copy_texture(&mut self, dst: &Handle<VulkanTexture>, src: &Handle<VulkanBuffer>, footprint: PlacedSubresourceFootprint) -> Result<()> {
        // 0 tells Vulkan the buffer is tightly packed per `image_extent`; `footprint.row_pitch`
        // only matters to the caller staging data into `src` ahead of this call.
        let region = vk::BufferImageCopy {
            buffer_offset: footprint.buffer_offset,
            buffer_row_length: 0,
            buffer_image_height: 0,
            image_subresource: vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: 0,
                base_array_layer: 0,
                layer_count: 1,
            },
            image_offset: vk::Offset3D { x: footprint.image_offset.x, y: footprint.image_offset.y, z: footprint.image_offset.z },
            image_extent: vk::Extent3D {
                width: footprint.image_extent.width,
                height: footprint.image_extent.height,
                depth: footprint.image_extent.depth,
            },
        };
        unsafe { self.device.raw().cmd_copy_buffer_to_image(self.command_buffer, src.buffer, dst.image, vk::ImageLayout::TRANSFER_DST_OPTIMAL, &[region]) };
        Ok(())
    }

    fn transition_texture(&mut self, texture: &Handle<VulkanTexture>, new_state: ResourceState) -> Result<()> {
        let old_state = texture.state();
        if old_state == new_state {
            return Ok(());
        }

        let old_layout = resource_state_to_image_layout(old_state);
        let new_layout = resource_state_to_image_layout(new_state);

        let mut src_access = access_mask_for_source_layout(old_layout);
        let dst_access = access_mask_for_dest_layout(new_layout);
        if new_layout == vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL && src_access.is_empty() {
            src_access = SHADER_READ_DEFAULT_SOURCE_ACCESS;
        }
        let (src_stage, dst_stage) = pipeline_stages_for_transition(new_layout);

        let aspect_mask = if matches!(new_state, ResourceState::RwDepthStencil) {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        } else {
            vk::ImageAspectFlags::COLOR
        };

        let barrier = vk::ImageMemoryBarrier::builder()
            .old_layout(old_layout)
            .new_layout(new_layout)
            .src_access_mask(src_access)
            .dst_access_mask(dst_access)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(texture.image)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask,
                base_mip_level: 0,
                level_count: vk::REMAINING_MIP_LEVELS,
                base_array_layer: 0,
                layer_count: vk::REMAINING_ARRAY_LAYERS,
            })
            .build();

        unsafe {
            self.device.raw().cmd_pipeline_barrier(
                self.command_buffer,
                src_stage,
                dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            )
        };

        texture.set_state(new_state);
        Ok(())
    }

    fn transition_buffer(&mut self, buffer: &Handle<VulkanBuffer>, new_state: ResourceState) -> Result<()> {
        if !matches!(new_state, ResourceState::VertexAndConstantBuffer | ResourceState::UnorderedAccess) {
            buffer.set_state(new_state);
            return Ok(());
        }

        let old_state = buffer.state();
        if old_state == new_state {
            return Ok(());
        }

        let barrier = vk::BufferMemoryBarrier::builder()
            .src_access_mask(vk::AccessFlags::TRANSFER_WRITE | vk::AccessFlags::HOST_WRITE)
            .dst_access_mask(if new_state == ResourceState::UnorderedAccess {
                vk::AccessFlags::SHADER_READ | vk::AccessFlags::SHADER_WRITE
            } else {
                vk::AccessFlags::VERTEX_ATTRIBUTE_READ | vk::AccessFlags::UNIFORM_READ
            })
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .buffer(buffer.buffer)
            .offset(0)
            .size(vk::WHOLE_SIZE)
            .build();

        unsafe {
            self.device.raw().cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::VERTEX_INPUT | vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::DependencyFlags::empty(),
                &[],
                &[barrier],
                &[],
            )
        };

        buffer.set_state(new_state);
        Ok(())
    }

    fn present(&mut self, swapchain: &VulkanSwapchain) {
        self.pending_present = Some(swapchain.clone());
    }

    fn commit(&mut self, fence: Option<&VulkanFence>) -> Result<()> {
        self.end_if_open()?;

        let native_fence = fence.map(|f| f.fence).unwrap_or_else(vk::Fence::null);

        match self.pending_present.take() {
            Some(swapchain) => {
                let wait = [(swapchain.acquire_semaphore(), vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)];
                let signal = [swapchain.submit_semaphore()];
                self.queue.submit(self.command_buffer, &wait, &signal, native_fence)?;

                let image_index = swapchain.current_index();
                self.queue.present(swapchain.loader(), &signal, swapchain.raw(), image_index)?;
                swapchain.acquire_next_image_internal()?;
            }
            None => {
                self.queue.submit(self.command_buffer, &[], &[], native_fence)?;
            }
        }

        Ok(())
    }

    fn commit_and_wait(&mut self, fence: &VulkanFence, timeout_ns: u64) -> Result<()> {
        self.commit(Some(fence))?;
        fence.wait_for(timeout_ns)?;
        self.queue.wait_idle()
    }
}
