//! The recordable, then submittable, in-memory command buffer (§3, §4.7).
//!
//! Grounded on `vulkan_commandbuffer.rs`'s record/end/submit lifecycle. `copy_buffer` and
//! `copy_texture` actually move bytes between the mock's in-memory resources, so tests exercising
//! staging uploads observe real data rather than a no-op; addressing is a simplified flat linear
//! scheme rather than exact row/depth-pitch semantics, which is sufficient for a back-end with no
//! native tiling. Barriers have no native counterpart: `transition_texture`/`transition_buffer`
//! only update tracked resource state.

use crate::error::{Result, RhiError};
use crate::rhi::cache::Handle;
use crate::rhi::enums::{CommandBufferLevel, ResourceState};
use crate::rhi::mock::device::MockDevice;
use crate::rhi::mock::encoder::{MockComputeCommandEncoder, MockParallelRenderCommandEncoder, MockRenderCommandEncoder};
use crate::rhi::mock::framebuffer::obtain_framebuffer;
use crate::rhi::mock::queue::MockCommandQueue;
use crate::rhi::mock::resource::{bytes_per_texel, MockBuffer, MockTexture};
use crate::rhi::mock::swapchain::MockSwapchain;
use crate::rhi::mock::sync::MockFence;
use crate::rhi::mock::view::MockShaderResourceView;
use crate::rhi::mock::Mock;
use crate::rhi::structs::{BufferCopyRegion, PlacedSubresourceFootprint, RenderPassBeginDesc};
use crate::rhi::traits::{CommandBuffer, CommandQueue, Device, Fence, GpuBuffer, GpuResource, GpuTexture};

/// A recordable, then submittable, list of commands (§3, §4.7). Recording and submission both
/// happen synchronously on the calling thread; there is no native pool to recycle into on drop.
pub struct MockCommandBuffer {
    device: MockDevice,
    queue: MockCommandQueue,
    #[allow(dead_code)]
    level: CommandBufferLevel,
    ended: bool,
    pending_present: Option<MockSwapchain>,
}

impl MockCommandBuffer {
    pub(crate) fn new(device: MockDevice, queue: MockCommandQueue, level: CommandBufferLevel) -> MockCommandBuffer {
        MockCommandBuffer { device, queue, level, ended: false, pending_present: None }
    }
}

impl CommandBuffer<Mock> for MockCommandBuffer {
    fn render_command_encoder(&mut self, desc: &RenderPassBeginDesc<'_, MockShaderResourceView>) -> Result<MockRenderCommandEncoder> {
        let render_pass = self.device.create_render_pass(&desc.render_pass)?;
        obtain_framebuffer(
            &self.device,
            &render_pass,
            &desc.color_views,
            desc.depth_stencil_view,
            desc.render_area.width,
            desc.render_area.height,
        )?;
        Ok(MockRenderCommandEncoder::new(false))
    }

    fn compute_command_encoder(&mut self) -> Result<MockComputeCommandEncoder> {
        Ok(MockComputeCommandEncoder)
    }

    fn parallel_render_command_encoder(
        &mut self,
        desc: &RenderPassBeginDesc<'_, MockShaderResourceView>,
    ) -> Result<MockParallelRenderCommandEncoder> {
        let render_pass = self.device.create_render_pass(&desc.render_pass)?;
        obtain_framebuffer(
            &self.device,
            &render_pass,
            &desc.color_views,
            desc.depth_stencil_view,
            desc.render_area.width,
            desc.render_area.height,
        )?;
        Ok(MockParallelRenderCommandEncoder::new(self.queue.clone()))
    }

    fn copy_buffer(&mut self, dst: &Handle<MockBuffer>, src: &Handle<MockBuffer>, region: BufferCopyRegion) -> Result<()> {
        if region.src_offset + region.size > src.size() || region.dst_offset + region.size > dst.size() {
            return Err(RhiError::invalid_argument("copy_buffer region exceeds a buffer's size"));
        }
        unsafe {
            let src_ptr = src.raw_ptr().add(region.src_offset as usize);
            let dst_ptr = dst.raw_ptr().add(region.dst_offset as usize);
            std::ptr::copy(src_ptr, dst_ptr, region.size as usize);
        }
        Ok(())
    }

    fn copy_texture(&mut self, dst: &Handle<MockTexture>, src: &Handle<MockBuffer>, footprint: PlacedSubresourceFootprint) -> Result<()> {
        let bytes_per_texel = bytes_per_texel(dst.format());
        let row_bytes = footprint.image_extent.width as u64 * bytes_per_texel;
        let copy_size = row_bytes * footprint.image_extent.height as u64 * footprint.image_extent.depth as u64;
        let dst_offset = (footprint.image_offset.z as u64 * footprint.image_extent.height as u64 + footprint.image_offset.y as u64) * row_bytes
            + footprint.image_offset.x as u64 * bytes_per_texel;

        if footprint.buffer_offset + copy_size > src.size() {
            return Err(RhiError::invalid_argument("copy_texture source range exceeds the staging buffer's size"));
        }
        if dst_offset + copy_size > dst.byte_size() {
            return Err(RhiError::invalid_argument("copy_texture destination range exceeds the texture's backing store"));
        }

        unsafe {
            let src_ptr = src.raw_ptr().add(footprint.buffer_offset as usize);
            let dst_ptr = dst.raw_ptr().add(dst_offset as usize);
            std::ptr::copy_nonoverlapping(src_ptr, dst_ptr, copy_size as usize);
        }
        Ok(())
    }

    fn transition_texture(&mut self, texture: &Handle<MockTexture>, new_state: ResourceState) -> Result<()> {
        if texture.state() == new_state {
            return Ok(());
        }
        texture.set_state(new_state);
        Ok(())
    }

    fn transition_buffer(&mut self, buffer: &Handle<MockBuffer>, new_state: ResourceState) -> Result<()> {
        if buffer.state() == new_state {
            return Ok(());
        }
        buffer.set_state(new_state);
        Ok(())
    }

    fn present(&mut self, swapchain: &MockSwapchain) {
        self.pending_present = Some(swapchain.clone());
    }

    fn commit(&mut self, fence: Option<&MockFence>) -> Result<()> {
        if !self.ended {
            self.ended = true;
        }
        if let Some(swapchain) = self.pending_present.take() {
            swapchain.acquire_next_image_internal()?;
        }
        if let Some(fence) = fence {
            fence.signal();
        }
        Ok(())
    }

    fn commit_and_wait(&mut self, fence: &MockFence, timeout_ns: u64) -> Result<()> {
        self.commit(Some(fence))?;
        fence.wait_for(timeout_ns)?;
        self.queue.wait_idle()
    }
}
