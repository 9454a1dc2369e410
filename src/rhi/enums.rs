//! Plain enumerations used across the RHI surface.
//!
//! Grounded on `rhi_enums.rs` in the teacher and on `RHIEnums.h` in the original interface this
//! crate models; the original exposes both `ERS_*` and `NGFX_RESOURCE_STATE_*` spellings of the
//! resource-state enum with overlapping members (Design Note 2 in `DESIGN.md`) — only one logical
//! enum is exposed here.

use bitflags::bitflags;

/// The vendor of a physical adapter, informational only.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PhysicalDeviceManufacturer {
    /// NVIDIA.
    Nvidia,
    /// AMD.
    Amd,
    /// Intel.
    Intel,
    /// Any other vendor.
    Other,
}

/// The class of a physical adapter.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PhysicalDeviceType {
    /// An integrated GPU sharing memory with the CPU.
    Integrated,
    /// A discrete GPU with its own memory.
    Discrete,
    /// A virtualized adapter (e.g. behind a hypervisor).
    Virtual,
    /// A software rasterizer running on the CPU.
    Cpu,
    /// Any other adapter class.
    Other,
}

/// The queue family kind a [`crate::rhi::CommandQueue`] belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum QueueType {
    /// Supports graphics, compute and transfer operations.
    Graphics,
    /// Supports compute and transfer operations.
    Compute,
    /// Supports transfer operations only.
    Transfer,
}

/// Whether a command buffer is a primary buffer submitted directly to a queue, or a secondary
/// buffer executed from within a primary buffer's render pass.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CommandBufferLevel {
    /// Submitted directly to a queue.
    Primary,
    /// Executed from within a primary buffer's render pass.
    Secondary,
}

/// The logical usage state of a [`crate::rhi::GpuResource`] (§3, §4.7, §6).
///
/// This is the single logical enum the two overlapping spellings in the original interface
/// collapse to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ResourceState {
    /// State has not been established; the GPU may do anything with the resource.
    Undefined,
    /// Usable for anything, but not optimal for any particular access pattern.
    Common,
    /// Ready to be presented to a swapchain's surface.
    Present,
    /// Bound as a color or depth/stencil render target.
    RenderTarget,
    /// Readable by a shader stage.
    ShaderResource,
    /// The destination of a transfer (copy/blit) operation.
    TransferDst,
    /// The source of a transfer (copy/blit) operation.
    TransferSrc,
    /// Bound as a read-write depth/stencil attachment.
    RwDepthStencil,
    /// Readable as a vertex or uniform/constant buffer (buffers only).
    VertexAndConstantBuffer,
    /// Readable and writable as a storage (unordered-access) buffer (buffers only).
    UnorderedAccess,
    /// Mapped for host access; no GPU operation may touch the resource in this state.
    Mapped,
}

/// Native descriptor kind a binding resolves to once merged into a pipeline layout (§4.4).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DescriptorType {
    /// A uniform/constant buffer.
    UniformBuffer,
    /// A standalone sampler.
    Sampler,
    /// A sampled (read-only) image.
    SampledImage,
    /// A sampler fused with a sampled image.
    CombinedImageSampler,
    /// A storage (read-write) image.
    StorageImage,
    /// A storage (read-write) buffer.
    StorageBuffer,
    /// A read-write texel buffer view.
    StorageTexelBuffer,
}

impl DescriptorType {
    /// Maps a reflected [`crate::shader::BindingType`] to its native descriptor type, per the
    /// table in §4.4. Returns `None` for `Undefined`/`Constants`, which are not descriptor-pool
    /// resources (the latter is a push-constant range).
    pub fn from_binding_type(binding_type: crate::shader::BindingType) -> Option<DescriptorType> {
        use crate::shader::BindingType;
        match binding_type {
            BindingType::Block => Some(DescriptorType::UniformBuffer),
            BindingType::Sampler => Some(DescriptorType::Sampler),
            BindingType::SampledImage => Some(DescriptorType::SampledImage),
            BindingType::CombinedImageSampler => Some(DescriptorType::CombinedImageSampler),
            BindingType::StorageImage => Some(DescriptorType::StorageImage),
            BindingType::StorageBuffer => Some(DescriptorType::StorageBuffer),
            BindingType::RwTexelBuffer => Some(DescriptorType::StorageTexelBuffer),
            BindingType::Undefined | BindingType::Constants => None,
        }
    }
}

/// Minimum pixel-format set a back-end must support a bijective mapping for (§6).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    /// 16-bit unsigned integer per channel, four channels.
    Rgba16Uint,
    /// 32-bit float per channel, four channels.
    Rgba32Float,
    /// 8-bit unsigned normalized per channel, four channels.
    Rgba8Unorm,
    /// `Rgba8Unorm` interpreted in the sRGB color space.
    Rgba8UnormSrgb,
    /// Packed 11/11/10-bit float, three channels.
    R11g11b10Float,
    /// 32-bit depth, no stencil.
    D32Float,
    /// 32-bit float per channel, three channels.
    Rgb32Float,
    /// 8-bit unsigned normalized per channel, three channels.
    Rgb8Unorm,
    /// 8-bit unsigned normalized per channel, four channels, blue-first.
    Bgra8Unorm,
    /// `Bgra8Unorm` interpreted in the sRGB color space.
    Bgra8UnormSrgb,
    /// 16-bit float per channel, four channels.
    Rgba16Float,
    /// 24-bit depth plus 8-bit stencil.
    D24UnormS8Uint,
}

/// Dimensionality of a [`crate::rhi::GpuResource::Texture`] (§3).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TextureDimension {
    /// A 1-dimensional texture.
    D1,
    /// A 2-dimensional texture.
    D2,
    /// A 3-dimensional (volume) texture.
    D3,
    /// A cube map of six 2D faces.
    Cube,
    /// An array of 2D textures.
    Array,
}

/// Requested swapchain present mode, in decreasing preference order (§4.8).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PresentMode {
    /// Lowest-latency tearing-free mode; falls back if unsupported.
    Mailbox,
    /// Tearing present, lowest latency when `Mailbox` is unavailable.
    Immediate,
    /// Always supported, vsynced FIFO present.
    Fifo,
}

/// Assembled-primitive topology for a render pipeline.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PrimitiveTopology {
    /// Independent points.
    PointList,
    /// Independent line segments.
    LineList,
    /// A connected line strip.
    LineStrip,
    /// Independent triangles.
    TriangleList,
    /// A connected triangle strip.
    TriangleStrip,
}

/// Per-vertex-buffer-binding input rate.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum VertexInputRate {
    /// Advance the binding once per vertex.
    Vertex,
    /// Advance the binding once per instance.
    Instance,
}

/// Rasterizer cull mode.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CullMode {
    /// Cull no faces.
    None,
    /// Cull front-facing faces.
    Front,
    /// Cull back-facing faces.
    Back,
}

/// Winding order that determines front-facing triangles.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FrontFace {
    /// Counter-clockwise winding is front-facing.
    CounterClockwise,
    /// Clockwise winding is front-facing.
    Clockwise,
}

/// Rasterizer polygon fill mode.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FillMode {
    /// Fill polygon interiors.
    Solid,
    /// Draw polygon edges only.
    Wireframe,
}

/// Comparison function used by depth tests, stencil tests and samplers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CompareOp {
    /// Comparison always fails.
    Never,
    /// Passes if the new value is less than the stored value.
    Less,
    /// Passes if the values are equal.
    Equal,
    /// Passes if the new value is less than or equal to the stored value.
    LessEqual,
    /// Passes if the new value is greater than the stored value.
    Greater,
    /// Passes if the values are not equal.
    NotEqual,
    /// Passes if the new value is greater than or equal to the stored value.
    GreaterEqual,
    /// Comparison always passes.
    Always,
}

/// An operation applied to the stencil buffer on pass/fail.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StencilOp {
    /// Keep the current value.
    Keep,
    /// Set the value to zero.
    Zero,
    /// Replace the value with the reference value.
    Replace,
    /// Increment the value, clamping at the format's maximum.
    IncrementClamp,
    /// Decrement the value, clamping at zero.
    DecrementClamp,
    /// Bitwise-invert the value.
    Invert,
    /// Increment the value, wrapping on overflow.
    IncrementWrap,
    /// Decrement the value, wrapping on underflow.
    DecrementWrap,
}

/// Source/destination factor in a blend equation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BlendFactor {
    /// Constant zero.
    Zero,
    /// Constant one.
    One,
    /// The fragment's source color/alpha.
    SrcColor,
    /// One minus the fragment's source color/alpha.
    OneMinusSrcColor,
    /// The framebuffer's destination color/alpha.
    DstColor,
    /// One minus the framebuffer's destination color/alpha.
    OneMinusDstColor,
    /// The fragment's source alpha.
    SrcAlpha,
    /// One minus the fragment's source alpha.
    OneMinusSrcAlpha,
    /// The framebuffer's destination alpha.
    DstAlpha,
    /// One minus the framebuffer's destination alpha.
    OneMinusDstAlpha,
}

/// How source and destination blend terms combine.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BlendOp {
    /// `src + dst`.
    Add,
    /// `src - dst`.
    Subtract,
    /// `dst - src`.
    ReverseSubtract,
    /// `min(src, dst)`.
    Min,
    /// `max(src, dst)`.
    Max,
}

/// Texel filtering mode used by a sampler.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FilterMode {
    /// Nearest-neighbor sampling.
    Nearest,
    /// Bilinear/trilinear sampling.
    Linear,
}

/// Texture-coordinate addressing mode used outside the `[0, 1)` range.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AddressMode {
    /// Tile the texture.
    Repeat,
    /// Tile the texture, mirroring every other tile.
    MirroredRepeat,
    /// Clamp to the edge texel.
    ClampToEdge,
    /// Clamp to a fixed border color.
    ClampToBorder,
}

bitflags! {
    /// Flags describing which GPU pipeline stages an operation affects (§4.7 transitions).
    pub struct PipelineStageFlags: u32 {
        /// The very start of the pipeline; no prior work is waited on.
        const TOP_OF_PIPE = 0x0000_0001;
        /// Vertex attribute fetch.
        const VERTEX_INPUT = 0x0000_0004;
        /// Vertex shader stage.
        const VERTEX_SHADER = 0x0000_0008;
        /// Fragment shader stage.
        const FRAGMENT_SHADER = 0x0000_0080;
        /// The stage writing to color attachments.
        const COLOR_ATTACHMENT_OUTPUT = 0x0000_0400;
        /// Compute shader stage.
        const COMPUTE_SHADER = 0x0000_0800;
        /// Copy/blit/resolve operations.
        const TRANSFER = 0x0000_1000;
        /// The very end of the pipeline.
        const BOTTOM_OF_PIPE = 0x0000_2000;
        /// Host (CPU) access.
        const HOST = 0x0000_4000;
        /// Every graphics stage.
        const ALL_GRAPHICS = 0x0000_8000;
        /// Every pipeline stage.
        const ALL_COMMANDS = 0x0001_0000;
    }
}

bitflags! {
    /// Flags describing which memory-access types a barrier affects (§4.7 transitions).
    pub struct ResourceAccessFlags: u32 {
        /// No access.
        const NONE = 0x0000_0000;
        /// Read as an index buffer.
        const INDEX_READ = 0x0000_0002;
        /// Read as a vertex attribute.
        const VERTEX_ATTRIBUTE_READ = 0x0000_0004;
        /// Read as a uniform/constant buffer.
        const UNIFORM_READ = 0x0000_0008;
        /// Read by a shader stage.
        const SHADER_READ = 0x0000_0020;
        /// Written by a shader stage.
        const SHADER_WRITE = 0x0000_0040;
        /// Read from a color attachment.
        const COLOR_ATTACHMENT_READ = 0x0000_0080;
        /// Written to a color attachment.
        const COLOR_ATTACHMENT_WRITE = 0x0000_0100;
        /// Read from a depth/stencil attachment.
        const DEPTH_STENCIL_ATTACHMENT_READ = 0x0000_0200;
        /// Written to a depth/stencil attachment.
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 0x0000_0400;
        /// Read as the source of a transfer.
        const TRANSFER_READ = 0x0000_0800;
        /// Written as the destination of a transfer.
        const TRANSFER_WRITE = 0x0000_1000;
        /// Read by the host.
        const HOST_READ = 0x0000_2000;
        /// Written by the host.
        const HOST_WRITE = 0x0000_4000;
        /// Read by any access type.
        const MEMORY_READ = 0x0000_8000;
        /// Written by any access type.
        const MEMORY_WRITE = 0x0001_0000;
    }
}

bitflags! {
    /// Which planes of a texture a view or barrier addresses.
    pub struct ImageAspectFlags: u32 {
        /// The color plane.
        const COLOR = 0x0000_0001;
        /// The depth plane.
        const DEPTH = 0x0000_0002;
        /// The stencil plane.
        const STENCIL = 0x0000_0004;
    }
}

bitflags! {
    /// How a buffer's storage may be viewed (§4.3).
    pub struct BufferViewFlags: u32 {
        /// Usable as a vertex buffer.
        const VERTEX = 0x01;
        /// Usable as an index buffer.
        const INDEX = 0x02;
        /// Usable as a uniform/constant buffer.
        const UNIFORM = 0x04;
        /// Usable as a storage buffer.
        const STORAGE = 0x08;
        /// Usable as a uniform texel buffer.
        const UNIFORM_TEXEL = 0x10;
        /// Usable as a storage texel buffer.
        const STORAGE_TEXEL = 0x20;
    }
}

bitflags! {
    /// What kind of view a texture's default view (and any explicitly requested view) serves as
    /// (§4.3): this determines the default view's aspect mask.
    pub struct TextureViewFlags: u32 {
        /// Usable as a shader-resource (sampled) view.
        const SHADER_RESOURCE = 0x01;
        /// Usable as a color render-target view.
        const RENDER_TARGET = 0x02;
        /// Usable as a depth/stencil view.
        const DEPTH_STENCIL = 0x04;
        /// Usable as an unordered-access (storage image) view.
        const UNORDERED_ACCESS = 0x08;
    }
}

bitflags! {
    /// How a resource's memory may be accessed by the host and device (§4.3).
    pub struct MemoryAccessFlags: u32 {
        /// Visible to the host for mapping.
        const HOST_VISIBLE = 0x01;
        /// Resident in device-local memory.
        const DEVICE_LOCAL = 0x02;
        /// Host writes are automatically visible to the device without an explicit flush.
        const HOST_COHERENT = 0x04;
        /// Host reads observe device writes without an explicit invalidate.
        const HOST_CACHED = 0x08;
    }
}

bitflags! {
    /// Creation-time transfer usage a resource will be used for (§4.3).
    pub struct ResourceCreationFlags: u32 {
        /// No special creation usage.
        const NONE = 0x00;
        /// May be used as the source of a transfer.
        const TRANSFER_SRC = 0x01;
        /// May be used as the destination of a transfer.
        const TRANSFER_DST = 0x02;
    }
}
