//! A mock command queue (§4.7).
//!
//! Grounded on `vulkan_queue.rs`'s queue-handle wrapper; this back-end has no native pool to
//! recycle command buffers from, so `obtain_command_buffer` simply allocates a fresh
//! [`MockCommandBuffer`].

use crate::error::Result;
use crate::rhi::enums::{CommandBufferLevel, QueueType};
use crate::rhi::mock::command_buffer::MockCommandBuffer;
use crate::rhi::mock::device::MockDevice;
use crate::rhi::mock::Mock;
use crate::rhi::traits::CommandQueue;

/// A queue belonging to one queue family (§4.7). Cheaply `Clone`-able.
#[derive(Clone)]
pub struct MockCommandQueue {
    device: MockDevice,
    queue_type: QueueType,
}

impl MockCommandQueue {
    pub(crate) fn new(device: MockDevice, queue_type: QueueType) -> MockCommandQueue {
        MockCommandQueue { device, queue_type }
    }
}

impl CommandQueue<Mock> for MockCommandQueue {
    fn queue_type(&self) -> QueueType {
        self.queue_type
    }

    fn obtain_command_buffer(&self, level: CommandBufferLevel) -> Result<MockCommandBuffer> {
        Ok(MockCommandBuffer::new(self.device.clone(), self.clone(), level))
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}
