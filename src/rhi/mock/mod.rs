//! The in-memory back-end, for exercising RHI client code without a GPU (§9 supplement).
//!
//! Grounded on the Vulkan back-end's module layout and wired together the same way, through a
//! zero-sized [`Mock`] marker type implementing [`crate::rhi::traits::Backend`]. Every object
//! family here reproduces the same invariants the Vulkan back-end enforces — cached render passes
//! and framebuffers, atomic resource state, idempotent pipeline rebuilds — without touching any
//! native graphics API.

pub(crate) mod device;
pub(crate) mod encoder;
pub(crate) mod framebuffer;
pub(crate) mod pipeline_layout;
pub(crate) mod pipeline_state;
pub(crate) mod queue;
pub(crate) mod render_pass;
pub(crate) mod resource;
pub(crate) mod sampler;
pub(crate) mod swapchain;
pub(crate) mod sync;
pub(crate) mod view;

mod command_buffer;

pub use command_buffer::MockCommandBuffer;
pub use device::{MockDevice, MockFactory};
pub use encoder::{MockComputeCommandEncoder, MockParallelRenderCommandEncoder, MockRenderCommandEncoder};
pub use framebuffer::MockFramebuffer;
pub use pipeline_layout::{MockBindingGroup, MockPipelineLayout};
pub use pipeline_state::MockPipelineState;
pub use queue::MockCommandQueue;
pub use render_pass::MockRenderPass;
pub use resource::{MockBuffer, MockTexture};
pub use sampler::MockSampler;
pub use swapchain::MockSwapchain;
pub use sync::{MockFence, MockSemaphore};
pub use view::{MockShaderResourceView, MockUnorderedAccessView};

use crate::rhi::cache::Handle;
use crate::rhi::traits::Backend;

/// The in-memory [`Backend`] marker type (§9 supplement). Every associated type below is
/// implemented in this module's sibling files; this type itself carries no state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Mock;

impl Backend for Mock {
    type SurfaceHandle = ();

    type Factory = MockFactory;
    type Device = MockDevice;
    type CommandQueue = MockCommandQueue;
    type CommandBuffer = MockCommandBuffer;
    type RenderCommandEncoder = MockRenderCommandEncoder;
    type ComputeCommandEncoder = MockComputeCommandEncoder;
    type ParallelRenderCommandEncoder = MockParallelRenderCommandEncoder;
    type Buffer = Handle<MockBuffer>;
    type Texture = Handle<MockTexture>;
    type ShaderResourceView = MockShaderResourceView;
    type UnorderedAccessView = MockUnorderedAccessView;
    type Sampler = MockSampler;
    type PipelineLayout = MockPipelineLayout;
    type BindingGroup = MockBindingGroup;
    type RenderPass = Handle<MockRenderPass>;
    type Framebuffer = Handle<MockFramebuffer>;
    type PipelineState = MockPipelineState;
    type Swapchain = MockSwapchain;
    type Fence = MockFence;
    type Semaphore = MockSemaphore;
}
