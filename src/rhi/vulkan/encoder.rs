#![allow(unsafe_code)]
//! Render, compute and parallel-render command encoders (§3, §4.7).
//!
//! Grounded on `vulkan_commandbuffer.rs`'s per-encoder `vkCmd*` call sequencing. Encoders wrap a
//! plain `vk::CommandBuffer` value rather than borrowing the owning [`VulkanCommandBuffer`] — the
//! native handle is `Copy`, so there is nothing to borrow-check (§9 Design Notes).

use ash::version::DeviceV1_0;
use ash::vk;

use crate::rhi::enums::PrimitiveTopology;
use crate::rhi::structs::{Rect2D, Viewport};
use crate::rhi::traits::{ComputeCommandEncoder, ParallelRenderCommandEncoder, RenderCommandEncoder};
use crate::rhi::vulkan::device::VulkanDevice;
use crate::rhi::vulkan::pipeline_layout::VulkanBindingGroup;
use crate::rhi::vulkan::pipeline_state::VulkanPipelineState;
use crate::rhi::vulkan::queue::VulkanCommandQueue;
use crate::rhi::vulkan::resource::VulkanBuffer;
use crate::rhi::cache::Handle;
use crate::rhi::vulkan::Vulkan;

/// Records draw commands into an open render pass (§3, §4.7).
///
/// `is_secondary` distinguishes a primary encoder, whose `end` closes the render pass it opened,
/// from a secondary encoder obtained through [`VulkanParallelRenderCommandEncoder`], whose `end`
/// only closes its own recording — the render pass itself is ended by the primary buffer that
/// executes it.
pub struct VulkanRenderCommandEncoder {
    pub(crate) device: VulkanDevice,
    pub(crate) command_buffer: vk::CommandBuffer,
    pub(crate) is_secondary: bool,
}

impl RenderCommandEncoder<Vulkan> for VulkanRenderCommandEncoder {
    fn set_viewport(&mut self, viewport: Viewport) {
        let vk_viewport = vk::Viewport {
            x: viewport.x,
            y: viewport.y,
            width: viewport.width,
            height: viewport.height,
            min_depth: viewport.min_depth,
            max_depth: viewport.max_depth,
        };
        unsafe { self.device.raw().cmd_set_viewport(self.command_buffer, 0, &[vk_viewport]) };
    }

    fn set_scissor(&mut self, rect: Rect2D) {
        let vk_rect = vk::Rect2D {
            offset: vk::Offset2D { x: rect.x, y: rect.y },
            extent: vk::Extent2D { width: rect.width, height: rect.height },
        };
        unsafe { self.device.raw().cmd_set_scissor(self.command_buffer, 0, &[vk_rect]) };
    }

    fn set_vertex_buffer(&mut self, binding: u32, buffer: &Handle<VulkanBuffer>, offset: u64) {
        unsafe { self.device.raw().cmd_bind_vertex_buffers(self.command_buffer, binding, &[buffer.buffer], &[offset]) };
    }

    fn set_index_buffer(&mut self, buffer: &Handle<VulkanBuffer>, offset: u64) {
        unsafe { self.device.raw().cmd_bind_index_buffer(self.command_buffer, buffer.buffer, offset, vk::IndexType::UINT32) };
    }

    fn set_primitive_type(&mut self, _topology: PrimitiveTopology) {
        // Primitive topology is baked into the bound pipeline's fixed-function state at build
        // time on this back-end (§4.5); there is no per-draw dynamic-topology call to make here.
    }

    fn bind_pipeline(&mut self, pipeline: &VulkanPipelineState) {
        unsafe { self.device.raw().cmd_bind_pipeline(self.command_buffer, vk::PipelineBindPoint::GRAPHICS, pipeline.native()) };
    }

    fn bind_binding_group(&mut self, set: u32, group: &VulkanBindingGroup) {
        unsafe {
            self.device.raw().cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                group.pipeline_layout(),
                set,
                &[group.set],
                &[],
            )
        };
    }

    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) {
        unsafe { self.device.raw().cmd_draw(self.command_buffer, vertex_count, instance_count, first_vertex, first_instance) };
    }

    fn draw_indexed_instanced(&mut self, index_count: u32, instance_count: u32, first_index: u32, vertex_offset: i32, first_instance: u32) {
        unsafe {
            self.device
                .raw()
                .cmd_draw_indexed(self.command_buffer, index_count, instance_count, first_index, vertex_offset, first_instance)
        };
    }

    fn end(self) {
        if self.is_secondary {
            unsafe { self.device.raw().end_command_buffer(self.command_buffer).ok() };
        } else {
            unsafe { self.device.raw().cmd_end_render_pass(self.command_buffer) };
        }
    }
}

/// Records dispatches outside of any render pass (§3, §4.7).
pub struct VulkanComputeCommandEncoder {
    pub(crate) device: VulkanDevice,
    pub(crate) command_buffer: vk::CommandBuffer,
}

impl ComputeCommandEncoder<Vulkan> for VulkanComputeCommandEncoder {
    fn bind_pipeline(&mut self, pipeline: &VulkanPipelineState) {
        unsafe { self.device.raw().cmd_bind_pipeline(self.command_buffer, vk::PipelineBindPoint::COMPUTE, pipeline.native()) };
    }

    fn bind_binding_group(&mut self, set: u32, group: &VulkanBindingGroup) {
        unsafe {
            self.device.raw().cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::COMPUTE,
                group.pipeline_layout(),
                set,
                &[group.set],
                &[],
            )
        };
    }

    fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        unsafe { self.device.raw().cmd_dispatch(self.command_buffer, x, y, z) };
    }

    fn end(self) {}
}

/// Records secondary render encoders and batch-executes them into the primary buffer (§3, §4.7).
pub struct VulkanParallelRenderCommandEncoder {
    pub(crate) device: VulkanDevice,
    pub(crate) queue: VulkanCommandQueue,
    pub(crate) primary_command_buffer: vk::CommandBuffer,
    pub(crate) render_pass: vk::RenderPass,
    pub(crate) framebuffer: vk::Framebuffer,
    pub(crate) secondary_buffers: Vec<vk::CommandBuffer>,
}

impl ParallelRenderCommandEncoder<Vulkan> for VulkanParallelRenderCommandEncoder {
    fn sub_render_command_encoder(&mut self) -> crate::error::Result<VulkanRenderCommandEncoder> {
        let command_buffer = self.queue.obtain_secondary_command_buffer(self.render_pass, self.framebuffer)?;
        self.secondary_buffers.push(command_buffer);
        Ok(VulkanRenderCommandEncoder { device: self.device.clone(), command_buffer, is_secondary: true })
    }

    fn end(self) {
        if !self.secondary_buffers.is_empty() {
            unsafe { self.device.raw().cmd_execute_commands(self.primary_command_buffer, &self.secondary_buffers) };
        }
        unsafe { self.device.raw().cmd_end_render_pass(self.primary_command_buffer) };
        for command_buffer in self.secondary_buffers {
            crate::rhi::vulkan::queue::recycle(&self.queue, command_buffer, crate::rhi::enums::CommandBufferLevel::Secondary);
        }
    }
}
