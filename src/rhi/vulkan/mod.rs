//! The Vulkan back-end, implemented on top of `ash` (§4).
//!
//! Grounded on the teacher's own Vulkan back-end module layout: one file per object family,
//! wired together here through a single zero-sized [`Vulkan`] marker type that implements
//! [`crate::rhi::traits::Backend`].

pub(crate) mod convert;
pub(crate) mod device;
pub(crate) mod encoder;
pub(crate) mod factory;
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

pub use command_buffer::VulkanCommandBuffer;
pub use device::VulkanDevice;
pub use encoder::{VulkanComputeCommandEncoder, VulkanParallelRenderCommandEncoder, VulkanRenderCommandEncoder};
pub use factory::VulkanFactory;
pub use framebuffer::VulkanFramebuffer;
pub use pipeline_layout::{VulkanBindingGroup, VulkanPipelineLayout};
pub use pipeline_state::VulkanPipelineState;
pub use queue::VulkanCommandQueue;
pub use render_pass::VulkanRenderPass;
pub use resource::{VulkanBuffer, VulkanTexture};
pub use sampler::VulkanSampler;
pub use swapchain::VulkanSwapchain;
pub use sync::{VulkanFence, VulkanSemaphore};
pub use view::{VulkanShaderResourceView, VulkanUnorderedAccessView};

use crate::rhi::cache::Handle;
use crate::rhi::traits::Backend;
use ash::vk;

/// The Vulkan [`Backend`] marker type. Every associated type below is implemented in this
/// module's sibling files; this type itself carries no state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Vulkan;

impl Backend for Vulkan {
    type SurfaceHandle = vk::SurfaceKHR;

    type Factory = VulkanFactory;
    type Device = VulkanDevice;
    type CommandQueue = VulkanCommandQueue;
    type CommandBuffer = VulkanCommandBuffer;
    type RenderCommandEncoder = VulkanRenderCommandEncoder;
    type ComputeCommandEncoder = VulkanComputeCommandEncoder;
    type ParallelRenderCommandEncoder = VulkanParallelRenderCommandEncoder;
    type Buffer = Handle<VulkanBuffer>;
    type Texture = Handle<VulkanTexture>;
    type ShaderResourceView = VulkanShaderResourceView;
    type UnorderedAccessView = VulkanUnorderedAccessView;
    type Sampler = VulkanSampler;
    type PipelineLayout = VulkanPipelineLayout;
    type BindingGroup = VulkanBindingGroup;
    type RenderPass = Handle<VulkanRenderPass>;
    type Framebuffer = Handle<VulkanFramebuffer>;
    type PipelineState = VulkanPipelineState;
    type Swapchain = VulkanSwapchain;
    type Fence = VulkanFence;
    type Semaphore = VulkanSemaphore;
}
