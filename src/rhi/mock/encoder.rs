//! Render, compute and parallel-render command encoders (§3, §4.7).
//!
//! Grounded on `vulkan_encoder.rs`'s per-encoder call sequencing; this back-end records no native
//! command stream, so every draw/dispatch/state-setting method is a no-op. `set_primitive_type`
//! is a no-op for the same reason the Vulkan back-end's is: topology is baked into the bound
//! pipeline's fixed-function state at build time, not set per draw.

use crate::error::Result;
use crate::rhi::cache::Handle;
use crate::rhi::enums::PrimitiveTopology;
use crate::rhi::mock::pipeline_layout::MockBindingGroup;
use crate::rhi::mock::pipeline_state::MockPipelineState;
use crate::rhi::mock::queue::MockCommandQueue;
use crate::rhi::mock::resource::MockBuffer;
use crate::rhi::mock::Mock;
use crate::rhi::structs::{Rect2D, Viewport};
use crate::rhi::traits::{ComputeCommandEncoder, ParallelRenderCommandEncoder, RenderCommandEncoder};

/// Records draw commands into an open render pass (§3, §4.7).
pub struct MockRenderCommandEncoder {
    is_secondary: bool,
}

impl MockRenderCommandEncoder {
    pub(crate) fn new(is_secondary: bool) -> MockRenderCommandEncoder {
        MockRenderCommandEncoder { is_secondary }
    }
}

impl RenderCommandEncoder<Mock> for MockRenderCommandEncoder {
    fn set_viewport(&mut self, _viewport: Viewport) {}

    fn set_scissor(&mut self, _rect: Rect2D) {}

    fn set_vertex_buffer(&mut self, _binding: u32, _buffer: &Handle<MockBuffer>, _offset: u64) {}

    fn set_index_buffer(&mut self, _buffer: &Handle<MockBuffer>, _offset: u64) {}

    fn set_primitive_type(&mut self, _topology: PrimitiveTopology) {}

    fn bind_pipeline(&mut self, _pipeline: &MockPipelineState) {}

    fn bind_binding_group(&mut self, _set: u32, _group: &MockBindingGroup) {}

    fn draw_instanced(&mut self, _vertex_count: u32, _instance_count: u32, _first_vertex: u32, _first_instance: u32) {}

    fn draw_indexed_instanced(
        &mut self,
        _index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _first_instance: u32,
    ) {
    }

    fn end(self) {
        let _ = self.is_secondary;
    }
}

/// Records dispatches outside of any render pass (§3, §4.7).
pub struct MockComputeCommandEncoder;

impl ComputeCommandEncoder<Mock> for MockComputeCommandEncoder {
    fn bind_pipeline(&mut self, _pipeline: &MockPipelineState) {}

    fn bind_binding_group(&mut self, _set: u32, _group: &MockBindingGroup) {}

    fn dispatch(&mut self, _x: u32, _y: u32, _z: u32) {}

    fn end(self) {}
}

/// Records secondary render encoders and, on `end`, counts them as executed (§3, §4.7).
pub struct MockParallelRenderCommandEncoder {
    queue: MockCommandQueue,
    sub_encoder_count: u32,
}

impl MockParallelRenderCommandEncoder {
    pub(crate) fn new(queue: MockCommandQueue) -> MockParallelRenderCommandEncoder {
        MockParallelRenderCommandEncoder { queue, sub_encoder_count: 0 }
    }
}

impl ParallelRenderCommandEncoder<Mock> for MockParallelRenderCommandEncoder {
    fn sub_render_command_encoder(&mut self) -> Result<MockRenderCommandEncoder> {
        let _ = &self.queue;
        self.sub_encoder_count += 1;
        Ok(MockRenderCommandEncoder::new(true))
    }

    fn end(self) {
        let _ = self.sub_encoder_count;
    }
}
