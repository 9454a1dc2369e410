//! The back-end-agnostic RHI contracts.
//!
//! Grounded on `rhi_traits.rs` in the teacher: one umbrella [`Backend`] trait collects every
//! object family as an associated type, and each family gets its own capability trait generic
//! over `Backend`. [`crate::rhi::vulkan`] implements these contracts for Vulkan via `ash`;
//! [`crate::rhi::mock`] implements them in-memory for GPU-less tests.
//!
//! Object handles returned by these traits are plain values, not borrows: every concrete handle
//! wraps a `Copy` native handle (a Vulkan handle is an opaque integer) alongside a reference
//! counted link back to its owning device, so encoders and resources can be passed around and
//! stored without fighting the borrow checker. Concurrent misuse across threads is caught by the
//! native validation layer or this crate's own `debug_assert!`s, not by the type system — this
//! mirrors the original interface's assertion-based contract (§9 Design Notes).

use crate::error::Result;
use crate::rhi::structs::*;
use crate::shader::ShaderBundle;
use crate::surface::Surface;

/// Collects one concrete back-end's object types.
///
/// A `Backend` implementation (e.g. `vulkan::Vulkan`, `mock::Mock`) is a zero-sized marker type;
/// all state lives in the associated handle types.
pub trait Backend: Sized + 'static {
    /// The platform object a [`Surface`] implementation must produce for this back-end (a
    /// `vk::SurfaceKHR` for Vulkan).
    type SurfaceHandle;

    /// Enumerates adapters and creates swapchains.
    type Factory: Factory<Self>;
    /// The root object creator for a single physical adapter.
    type Device: Device<Self>;
    /// A queue belonging to one queue family.
    type CommandQueue: CommandQueue<Self>;
    /// A recordable, then submittable, list of commands.
    type CommandBuffer: CommandBuffer<Self>;
    /// Records render commands into a command buffer.
    type RenderCommandEncoder: RenderCommandEncoder<Self>;
    /// Records compute commands into a command buffer.
    type ComputeCommandEncoder: ComputeCommandEncoder<Self>;
    /// Records a render pass whose contents come from secondary command buffers.
    type ParallelRenderCommandEncoder: ParallelRenderCommandEncoder<Self>;
    /// A device-memory-backed linear buffer.
    type Buffer: GpuBuffer;
    /// A device-memory-backed image.
    type Texture: GpuTexture;
    /// A read-only view over a resource.
    type ShaderResourceView;
    /// A read-write view over a resource.
    type UnorderedAccessView;
    /// Immutable sampler state.
    type Sampler;
    /// The shader-visible binding schema derived from reflected shader stages.
    type PipelineLayout: PipelineLayout<Self>;
    /// One allocated, writable set of descriptor bindings.
    type BindingGroup: BindingGroup<Self>;
    /// A cached render-pass object.
    type RenderPass;
    /// A cached framebuffer object.
    type Framebuffer;
    /// A compiled render or compute pipeline.
    type PipelineState: PipelineState<Self>;
    /// A presentable chain of swapchain images.
    type Swapchain: Swapchain<Self>;
    /// A CPU-observable fence.
    type Fence: Fence;
    /// An opaque GPU-to-GPU semaphore.
    type Semaphore;
}

/// Discovers physical adapters and creates the objects that sit above a single device (§4.1).
pub trait Factory<B: Backend> {
    /// Enumerates every physical GPU, wrapping each in a lazily-initialized [`Device`].
    fn enumerate_devices(&self) -> Result<Vec<B::Device>>;

    /// Creates a swapchain presenting to `surface` via `queue`.
    ///
    /// `queue`'s family must support presentation to the target surface. `desc` is clamped to the
    /// surface's capabilities and updated in place to reflect the values actually used.
    fn create_swapchain<W: Surface<B::SurfaceHandle>>(
        &self,
        device: &B::Device,
        queue: &B::CommandQueue,
        window: &mut W,
        desc: &mut SwapchainDesc,
    ) -> Result<B::Swapchain>;

    /// Whether this factory was created with validation/debug-report messages enabled.
    fn validation_enabled(&self) -> bool;
}

/// The sole creator of every RHI object tied to a single physical adapter (§4.2).
pub trait Device<B: Backend> {
    /// Immutable properties of the underlying physical adapter.
    fn properties(&self) -> &PhysicalDeviceProperties;

    /// Creates a command queue of the requested family.
    fn create_command_queue(&self, queue_type: crate::rhi::enums::QueueType) -> Result<B::CommandQueue>;

    /// Allocates and binds a buffer.
    fn create_buffer(&self, desc: &BufferDesc) -> Result<B::Buffer>;

    /// Allocates and binds a texture.
    fn create_texture(&self, desc: &TextureDesc) -> Result<B::Texture>;

    /// Creates a read-only view over `texture`.
    fn create_shader_resource_view(&self, texture: &B::Texture, desc: &ViewDesc) -> Result<B::ShaderResourceView>;

    /// Creates a read-write view over `texture`.
    fn create_unordered_access_view(&self, texture: &B::Texture, desc: &ViewDesc) -> Result<B::UnorderedAccessView>;

    /// Creates an immutable sampler.
    fn create_sampler(&self, desc: &SamplerDesc) -> Result<B::Sampler>;

    /// Builds a pipeline layout from a merged shader-reflection descriptor.
    fn create_pipeline_layout(&self, desc: &PipelineLayoutDesc) -> Result<B::PipelineLayout>;

    /// Looks up, or creates and caches, the render pass matching `desc`.
    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<B::RenderPass>;

    /// Creates a render pipeline state bound to `render_pass` and `layout`.
    fn create_render_pipeline_state(
        &self,
        desc: &RenderPipelineDesc,
        layout: &B::PipelineLayout,
        render_pass: &B::RenderPass,
    ) -> Result<B::PipelineState>;

    /// Creates a compute pipeline state.
    fn create_compute_pipeline_state(&self, desc: &ComputePipelineDesc, layout: &B::PipelineLayout) -> Result<B::PipelineState>;

    /// Creates an unsignaled fence.
    fn create_fence(&self) -> Result<B::Fence>;

    /// Scans the adapter's memory-type array for the first index whose bit is set in
    /// `type_bits` and whose properties are a superset of `required`. Fails with
    /// [`crate::error::RhiError::NotFound`] if none match (§4.2).
    fn find_memory_type(&self, type_bits: u32, required: crate::rhi::enums::MemoryAccessFlags) -> Result<u32>;

    /// Returns the row/depth pitch and byte offset of one subresource (§9 supplement).
    fn query_texture_subresource_layout(&self, texture: &B::Texture, spec: SubResourceSpec) -> Result<SubResourceLayout>;

    /// Blocks until every queue owned by this device has finished all submitted work.
    fn wait_idle(&self) -> Result<()>;
}

/// A single logical buffer or texture (§3).
pub trait GpuResource {
    /// The resource's current logical state, as last observed by a `transition` call.
    fn state(&self) -> crate::rhi::enums::ResourceState;

    /// A debug name assigned at creation, if any.
    fn debug_name(&self) -> Option<&str>;
}

/// A linear buffer resource (§3, §4.3).
pub trait GpuBuffer: GpuResource {
    /// Size in bytes, fixed at creation.
    fn size(&self) -> u64;

    /// Maps `size` bytes starting at `offset` for host access. Only valid on host-visible memory;
    /// the caller must not call this while a command buffer referencing the mapped range is
    /// in flight unless the memory is host-coherent and the required barrier has been issued
    /// (§4.3 — the RHI does not enforce this contract).
    ///
    /// # Safety
    /// The returned pointer is valid only until the matching `unmap` call, and aliases any prior
    /// mapping of the same buffer; the caller must not read or write outside `[offset, offset +
    /// size)` or retain the pointer past `unmap`.
    unsafe fn map(&self, offset: u64, size: u64) -> Result<*mut u8>;

    /// Ends a mapping started by `map`.
    fn unmap(&self);
}

/// An image resource (§3, §4.3).
pub trait GpuTexture: GpuResource {
    /// Size in texels.
    fn extent(&self) -> Extent3D;

    /// Pixel format, immutable after creation.
    fn format(&self) -> crate::rhi::enums::PixelFormat;

    /// Number of mip levels.
    fn mip_levels(&self) -> u32;

    /// Number of array layers.
    fn array_layers(&self) -> u32;
}

/// A queue belonging to one queue family; owns per-thread command-buffer pools (§4.7 "Queue").
pub trait CommandQueue<B: Backend> {
    /// This queue's family kind.
    fn queue_type(&self) -> crate::rhi::enums::QueueType;

    /// Obtains a command buffer from the calling thread's pool, recycling a completed buffer if
    /// one is available or allocating a fresh one, and begins recording immediately.
    fn obtain_command_buffer(&self, level: crate::rhi::enums::CommandBufferLevel) -> Result<B::CommandBuffer>;

    /// Blocks the calling thread until every submission on this queue has completed.
    fn wait_idle(&self) -> Result<()>;
}

/// A recordable, then submittable, list of GPU commands (§3, §4.7).
pub trait CommandBuffer<B: Backend> {
    /// Begins a render pass (creating or reusing the cached render pass/framebuffer) and returns
    /// an encoder borrowing this buffer's recording state.
    fn render_command_encoder(&mut self, desc: &RenderPassBeginDesc<'_, B::ShaderResourceView>) -> Result<B::RenderCommandEncoder>;

    /// Returns a compute encoder; no native call is made until the first bind/dispatch.
    fn compute_command_encoder(&mut self) -> Result<B::ComputeCommandEncoder>;

    /// Begins a render pass whose contents will come from secondary command buffers.
    fn parallel_render_command_encoder(
        &mut self,
        desc: &RenderPassBeginDesc<'_, B::ShaderResourceView>,
    ) -> Result<B::ParallelRenderCommandEncoder>;

    /// Copies a byte range between two buffers.
    fn copy_buffer(&mut self, dst: &B::Buffer, src: &B::Buffer, region: BufferCopyRegion) -> Result<()>;

    /// Copies from a staging buffer into an image, per one placed-subresource footprint. Only the
    /// Buffer→Image direction is supported (§4.7, §9 Design Note 3).
    fn copy_texture(&mut self, dst: &B::Texture, src: &B::Buffer, footprint: PlacedSubresourceFootprint) -> Result<()>;

    /// Records a pipeline barrier moving `texture` from its current state to `new_state`,
    /// updating the texture's tracked state. A same-state transition is a no-op (§8).
    fn transition_texture(&mut self, texture: &B::Texture, new_state: crate::rhi::enums::ResourceState) -> Result<()>;

    /// As [`CommandBuffer::transition_texture`], for buffers (only `VertexAndConstantBuffer` and
    /// `UnorderedAccess` targets emit a barrier; other targets are a no-op, §4.7).
    fn transition_buffer(&mut self, buffer: &B::Buffer, new_state: crate::rhi::enums::ResourceState) -> Result<()>;

    /// Stashes `swapchain` so its image is presented during the next `commit`. Records no
    /// command by itself.
    fn present(&mut self, swapchain: &B::Swapchain);

    /// Ends recording if still open, submits to the owning queue (signaling `fence` if given,
    /// and wiring up swapchain semaphores if a present is pending), then issues the stashed
    /// present and re-acquires the swapchain's next image. Does not wait for completion beyond
    /// what presenting requires.
    fn commit(&mut self, fence: Option<&B::Fence>) -> Result<()>;

    /// As [`CommandBuffer::commit`], but additionally waits on `fence` and then calls
    /// `queue.wait_idle()` before returning — the original interface's `commit` behavior,
    /// preserved under an explicit name per §9 Open Question 1.
    fn commit_and_wait(&mut self, fence: &B::Fence, timeout_ns: u64) -> Result<()>;
}

/// Records commands of one class into a borrowed command buffer (§3).
pub trait RenderCommandEncoder<B: Backend> {
    /// Sets the viewport transform.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Sets the scissor rectangle.
    fn set_scissor(&mut self, rect: Rect2D);

    /// Binds a vertex buffer at the given binding slot.
    fn set_vertex_buffer(&mut self, binding: u32, buffer: &B::Buffer, offset: u64);

    /// Binds the index buffer.
    fn set_index_buffer(&mut self, buffer: &B::Buffer, offset: u64);

    /// Sets the assembled-primitive topology for subsequent draws.
    fn set_primitive_type(&mut self, topology: crate::rhi::enums::PrimitiveTopology);

    /// Binds a render pipeline state.
    fn bind_pipeline(&mut self, pipeline: &B::PipelineState);

    /// Binds a binding group at the given set index.
    fn bind_binding_group(&mut self, set: u32, group: &B::BindingGroup);

    /// Issues a non-indexed draw (§9 supplement).
    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);

    /// Issues an indexed draw.
    fn draw_indexed_instanced(&mut self, index_count: u32, instance_count: u32, first_index: u32, vertex_offset: i32, first_instance: u32);

    /// Ends the render pass this encoder was recording into.
    fn end(self);
}

/// Records compute commands into a borrowed command buffer (§3).
pub trait ComputeCommandEncoder<B: Backend> {
    /// Binds a compute pipeline state.
    fn bind_pipeline(&mut self, pipeline: &B::PipelineState);

    /// Binds a binding group at the given set index.
    fn bind_binding_group(&mut self, set: u32, group: &B::BindingGroup);

    /// Dispatches `(x, y, z)` workgroups (§9 supplement).
    fn dispatch(&mut self, x: u32, y: u32, z: u32);

    /// Ends recording on this encoder.
    fn end(self);
}

/// Begins a render pass whose contents are recorded by secondary encoders and later batch
/// executed into the primary buffer (§3, §4.7).
pub trait ParallelRenderCommandEncoder<B: Backend> {
    /// Allocates and begins a secondary render encoder continuing this render pass.
    fn sub_render_command_encoder(&mut self) -> Result<B::RenderCommandEncoder>;

    /// Executes every secondary buffer recorded through this encoder and ends the render pass.
    fn end(self);
}

/// Derives a descriptor-set layout, descriptor pool and native pipeline layout from merged
/// shader reflection (§4.4).
pub trait PipelineLayout<B: Backend> {
    /// Allocates one descriptor set from this layout's pool.
    fn obtain_binding_group(&self) -> Result<B::BindingGroup>;
}

/// One allocated, writable descriptor set (§3, §4.4).
pub trait BindingGroup<B: Backend> {
    /// Writes a buffer (uniform or storage) into `slot`.
    fn update_buffer(&self, slot: u32, buffer: &B::Buffer);

    /// Writes a sampled-image-plus-sampler pair into `slot`.
    fn update_image(&self, slot: u32, view: &B::ShaderResourceView, sampler: &B::Sampler);

    /// Writes a storage image into `slot`.
    fn update_storage_image(&self, slot: u32, view: &B::UnorderedAccessView);
}

/// An immutable, cached compiled pipeline (§3, §4.5).
pub trait PipelineState<B: Backend> {
    /// Whether this is a render or compute pipeline.
    fn kind(&self) -> PipelineStateKind;

    /// (Re)builds the native pipeline if it has not been built yet; a no-op once built (§8).
    fn rebuild(&mut self) -> Result<()>;

    /// Serializes this pipeline's private pipeline cache to `path`.
    fn save_cache(&self, path: &std::path::Path) -> Result<()>;

    /// Seeds this pipeline's private pipeline cache from a blob previously written by
    /// [`PipelineState::save_cache`].
    fn load_cache(&mut self, path: &std::path::Path) -> Result<()>;
}

/// Distinguishes the two [`PipelineState`] variants without a separate trait per kind (§9 Design
/// Note: deep inheritance → tagged variant).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PipelineStateKind {
    /// A render (graphics) pipeline.
    Render,
    /// A compute pipeline.
    Compute,
}

/// A queue of presentable images backing a surface (§3, §4.8).
pub trait Swapchain<B: Backend> {
    /// Returns the wrapped texture at the current buffer index.
    fn get_current_texture(&self) -> &B::Texture;

    /// Index of the currently acquired image.
    fn current_index(&self) -> u32;

    /// Acquires the next image, signaling the swapchain's `render_finished` semaphore.
    /// `SUBOPTIMAL` is accepted and logged; `OUT_OF_DATE` is logged and surfaced as
    /// [`crate::error::RhiError::OutOfDate`].
    fn acquire_next_image(&mut self) -> Result<()>;

    /// Re-queries surface capabilities and, if the extent changed, recreates the swapchain and
    /// its wrapped textures. A no-op if the extent is unchanged (§8).
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// The swapchain's current buffer extent.
    fn extent(&self) -> Extent2D;
}

/// A CPU-observable synchronization primitive, created unsignaled (§3, §4.9).
pub trait Fence {
    /// Blocks up to `timeout_ns` nanoseconds for the fence to become signaled.
    fn wait_for(&self, timeout_ns: u64) -> Result<()>;

    /// Returns the fence to the unsignaled state.
    fn reset(&self) -> Result<()>;

    /// Non-blocking query of whether the fence is currently signaled.
    fn is_signaled(&self) -> Result<bool>;
}

/// Suppresses "shader bundle unused" warnings for back-ends (such as the mock) that accept but
/// do not compile shader bundles.
pub fn ignore_unused_bundle(_bundle: &ShaderBundle) {}
