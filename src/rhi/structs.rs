//! Plain descriptor and snapshot structs used across the RHI surface.
//!
//! Grounded on `rhi_structs.rs` in the teacher and on `RHIStructs.h` in the original interface
//! this crate models.

use crate::rhi::enums::*;
use crate::shader::ShaderBundle;

/// Immutable snapshot of a physical adapter's properties (§3 `Gpu`).
#[derive(Debug, Clone)]
pub struct PhysicalDeviceProperties {
    /// The adapter's vendor.
    pub manufacturer: PhysicalDeviceManufacturer,
    /// Vendor-assigned device id.
    pub device_id: u32,
    /// Human-readable device name as reported by the driver.
    pub device_name: String,
    /// The adapter's class.
    pub device_type: PhysicalDeviceType,
    /// Maximum number of simultaneously bound color attachments.
    pub max_color_attachments: u32,
}

/// One entry of an adapter's memory-type array, as scanned by `find_memory_type` (§4.2).
#[derive(Debug, Clone, Copy)]
pub struct MemoryTypeInfo {
    /// Index into the adapter's memory-type array.
    pub index: u32,
    /// Which heap this memory type is backed by.
    pub heap_index: u32,
    /// The access properties this memory type offers.
    pub properties: MemoryAccessFlags,
}

/// Which queue family an adapter exposes, and what it supports.
#[derive(Debug, Clone, Copy)]
pub struct QueueFamilyInfo {
    /// Index of the queue family, passed to native queue-creation calls.
    pub index: u32,
    /// The family's capability.
    pub queue_type: QueueType,
    /// Number of queues available in this family.
    pub queue_count: u32,
}

/// A three-dimensional size in texels, used for texture and copy extents.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Extent3D {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels (1 for non-volume textures).
    pub depth: u32,
}

/// A three-dimensional offset in texels.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Offset3D {
    /// X offset.
    pub x: i32,
    /// Y offset.
    pub y: i32,
    /// Z offset.
    pub z: i32,
}

/// A viewport transform recorded by `set_viewport` (§9 supplement).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Minimum depth value mapped by the viewport.
    pub min_depth: f32,
    /// Maximum depth value mapped by the viewport.
    pub max_depth: f32,
}

/// An axis-aligned pixel rectangle, used for scissor rects.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Rect2D {
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// One (mip, array-layer, aspect) slice addressed by a view or a barrier.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SubResourceRange {
    /// Which plane(s) this range addresses.
    pub aspect: ImageAspectFlags,
    /// First mip level.
    pub base_mip_level: u32,
    /// Number of mip levels.
    pub mip_level_count: u32,
    /// First array layer.
    pub base_array_layer: u32,
    /// Number of array layers.
    pub array_layer_count: u32,
}

impl Default for SubResourceRange {
    fn default() -> Self {
        SubResourceRange {
            aspect: ImageAspectFlags::empty(),
            base_mip_level: 0,
            mip_level_count: 1,
            base_array_layer: 0,
            array_layer_count: 1,
        }
    }
}

/// The row/depth pitch and byte offset of one subresource, returned by
/// `query_texture_subresource_layout` (§9 supplement).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SubResourceLayout {
    /// Byte offset of the subresource within the texture's backing memory.
    pub offset: u64,
    /// Total byte size of the subresource.
    pub size: u64,
    /// Byte stride between consecutive rows.
    pub row_pitch: u64,
    /// Byte stride between consecutive array layers or depth slices.
    pub array_pitch: u64,
    /// Byte stride between consecutive depth slices of a 3D texture.
    pub depth_pitch: u64,
}

/// Which subresource to query the layout of.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SubResourceSpec {
    /// Plane to query.
    pub aspect: ImageAspectFlags,
    /// Mip level to query.
    pub mip_level: u32,
    /// Array layer to query.
    pub array_layer: u32,
}

/// Descriptor for creating a [`crate::rhi::GpuResource::Buffer`] (§4.3).
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Size in bytes.
    pub size: u64,
    /// How the buffer's storage may be viewed.
    pub view_flags: BufferViewFlags,
    /// Transfer usage.
    pub creation_flags: ResourceCreationFlags,
    /// Required memory access properties.
    pub access_flags: MemoryAccessFlags,
    /// Optional debug name surfaced to validation layers.
    pub debug_name: Option<String>,
}

/// Descriptor for creating a [`crate::rhi::GpuResource::Texture`] (§4.3).
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Dimensionality.
    pub dimension: TextureDimension,
    /// Size in texels.
    pub extent: Extent3D,
    /// Number of mip levels.
    pub mip_levels: u32,
    /// Number of array layers (1 for non-array textures).
    pub array_layers: u32,
    /// Pixel format.
    pub format: PixelFormat,
    /// Multisample sample count (1 for non-multisampled textures).
    pub sample_count: u32,
    /// How the texture's default view may be used; determines the default aspect mask.
    pub view_flags: TextureViewFlags,
    /// Transfer usage.
    pub creation_flags: ResourceCreationFlags,
    /// Required memory access properties.
    pub access_flags: MemoryAccessFlags,
    /// Optional debug name surfaced to validation layers.
    pub debug_name: Option<String>,
}

/// Descriptor for creating a shader-resource or unordered-access view over a resource (§4.3).
#[derive(Debug, Clone)]
pub struct ViewDesc {
    /// The subresource range the view addresses.
    pub range: SubResourceRange,
    /// Pixel format to reinterpret the resource as; `None` reuses the resource's own format.
    pub format: Option<PixelFormat>,
}

/// Immutable filtering/addressing/compare/LOD state for a sampler (§3).
#[derive(Debug, Clone, Copy)]
pub struct SamplerDesc {
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Mipmap selection filter.
    pub mip_filter: FilterMode,
    /// Addressing mode along U.
    pub address_u: AddressMode,
    /// Addressing mode along V.
    pub address_v: AddressMode,
    /// Addressing mode along W.
    pub address_w: AddressMode,
    /// Comparison function for shadow samplers; `None` disables comparison sampling.
    pub compare: Option<CompareOp>,
    /// Minimum level of detail.
    pub min_lod: f32,
    /// Maximum level of detail.
    pub max_lod: f32,
    /// Maximum anisotropic filtering samples; `1.0` disables anisotropy.
    pub max_anisotropy: f32,
}

/// One shader-visible resource binding slot, already reflected and ready to merge (§4.4).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BindingSlot {
    /// The descriptor set this binding lives in.
    pub set: u32,
    /// The binding index within its set.
    pub binding: u32,
    /// Array length; 1 for a non-array binding.
    pub count: u32,
    /// Native descriptor type.
    pub descriptor_type: DescriptorType,
    /// Which shader stages need access to this binding.
    pub stages: crate::shader::ShaderStageFlags,
}

/// Input to `create_pipeline_layout`: the merged reflection of every shader stage sharing the
/// layout (§4.4).
#[derive(Debug, Clone, Default)]
pub struct PipelineLayoutDesc {
    /// The merged, deduplicated binding slots.
    pub bindings: Vec<BindingSlot>,
    /// Descriptor-set indices referenced by `bindings`.
    pub sets: Vec<u32>,
}

/// Describes a single attachment of a render pass (§3, §4.6).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct AttachmentDesc {
    /// Pixel format of the attachment.
    pub format: PixelFormat,
    /// Operation applied when the render pass begins.
    pub load_op: LoadOp,
    /// Operation applied when the render pass ends.
    pub store_op: StoreOp,
}

/// What happens to an attachment's previous contents when a render pass begins.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LoadOp {
    /// Preserve existing contents.
    Load,
    /// Clear to a fixed value.
    Clear,
    /// Leave contents undefined (fastest, use when the pass fully overwrites the attachment).
    DontCare,
}

/// What happens to an attachment's contents when a render pass ends.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum StoreOp {
    /// Write results back to memory.
    Store,
    /// Discard results (valid only for attachments not read afterward).
    DontCare,
}

/// Descriptor for `create_render_pass` (§4.6); hashed (format, load, store) per attachment —
/// clear values are intentionally excluded from the compatibility hash.
#[derive(Debug, Clone, Default)]
pub struct RenderPassDesc {
    /// Color attachments, in binding order.
    pub color_attachments: Vec<AttachmentDesc>,
    /// Optional depth/stencil attachment.
    pub depth_stencil_attachment: Option<AttachmentDesc>,
}

/// A clear value applied to an attachment whose `load_op` is `Clear`; excluded from the
/// render-pass cache's compatibility hash (§4.6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// RGBA clear color.
    Color([f32; 4]),
    /// Depth and stencil clear values.
    DepthStencil(f32, u8),
}

/// Descriptor for `render_command_encoder`: the render pass plus its concrete attachment
/// resources, bound and cleared together (§4.6, §4.7).
#[derive(Clone)]
pub struct RenderPassBeginDesc<'a, V> {
    /// The render pass's static description (used for cache lookup).
    pub render_pass: RenderPassDesc,
    /// The concrete views backing each color attachment, in the same order.
    pub color_views: Vec<&'a V>,
    /// The concrete view backing the depth/stencil attachment, if any.
    pub depth_stencil_view: Option<&'a V>,
    /// Per-attachment clear values, aligned with `color_views` plus, if present, the
    /// depth/stencil attachment last.
    pub clear_values: Vec<ClearValue>,
    /// Render area in pixels.
    pub render_area: Rect2D,
}

/// Per-attachment blend state (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct BlendAttachmentDesc {
    /// Whether blending is enabled for this attachment.
    pub enabled: bool,
    /// Source color blend factor.
    pub src_color: BlendFactor,
    /// Destination color blend factor.
    pub dst_color: BlendFactor,
    /// Color blend operation.
    pub color_op: BlendOp,
    /// Source alpha blend factor.
    pub src_alpha: BlendFactor,
    /// Destination alpha blend factor.
    pub dst_alpha: BlendFactor,
    /// Alpha blend operation.
    pub alpha_op: BlendOp,
}

/// Fixed-function rasterizer state (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct RasterizerDesc {
    /// Polygon fill mode.
    pub fill_mode: FillMode,
    /// Face culling mode.
    pub cull_mode: CullMode,
    /// Winding order considered front-facing.
    pub front_face: FrontFace,
    /// Constant depth bias.
    pub depth_bias: f32,
    /// Slope-scaled depth bias.
    pub depth_bias_slope_scale: f32,
}

/// One stencil face's test/op state.
#[derive(Debug, Clone, Copy)]
pub struct StencilFaceDesc {
    /// Operation applied on stencil test failure.
    pub fail_op: StencilOp,
    /// Operation applied on depth test failure (stencil test passed).
    pub depth_fail_op: StencilOp,
    /// Operation applied when both tests pass.
    pub pass_op: StencilOp,
    /// Comparison function for the stencil test.
    pub compare_op: CompareOp,
}

/// Fixed-function depth/stencil state (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct DepthStencilDesc {
    /// Whether the depth test is enabled.
    pub depth_test_enable: bool,
    /// Whether passing depth-test fragments write to the depth buffer.
    pub depth_write_enable: bool,
    /// Depth comparison function.
    pub depth_compare_op: CompareOp,
    /// Whether the stencil test is enabled.
    pub stencil_test_enable: bool,
    /// Front-facing fragments' stencil state.
    pub front_face: StencilFaceDesc,
    /// Back-facing fragments' stencil state.
    pub back_face: StencilFaceDesc,
}

/// One vertex attribute's layout within its bound buffer (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct VertexAttributeDesc {
    /// Shader input location this attribute binds to.
    pub location: u32,
    /// Which vertex buffer binding slot this attribute reads from.
    pub binding: u32,
    /// Reflected scalar/vector format, as a GLSL-style type name.
    pub format: &'static str,
    /// Byte offset of this attribute within one vertex of its binding.
    pub offset: u32,
}

/// One bound vertex-buffer slot's stride and advance rate (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct VertexBindingDesc {
    /// Binding slot index, matched against `VertexAttributeDesc::binding`.
    pub binding: u32,
    /// Byte stride between consecutive elements.
    pub stride: u32,
    /// Whether this binding advances per vertex or per instance.
    pub input_rate: VertexInputRate,
}

/// The assembled vertex-input state of a render pipeline (§4.5).
#[derive(Debug, Clone, Default)]
pub struct VertexInputDesc {
    /// Bound vertex-buffer slots.
    pub bindings: Vec<VertexBindingDesc>,
    /// Attributes sourced from those slots.
    pub attributes: Vec<VertexAttributeDesc>,
}

/// Up to five shader stages that may participate in a render pipeline (§4.5).
#[derive(Debug, Clone, Default)]
pub struct RenderShaderStages {
    /// Vertex stage, required.
    pub vertex: Option<ShaderBundle>,
    /// Fragment/pixel stage.
    pub fragment: Option<ShaderBundle>,
    /// Geometry stage.
    pub geometry: Option<ShaderBundle>,
    /// Tessellation-evaluation (domain) stage.
    pub domain: Option<ShaderBundle>,
    /// Tessellation-control (hull) stage.
    pub hull: Option<ShaderBundle>,
}

/// Descriptor for `create_render_pipeline_state` (§4.5).
#[derive(Debug, Clone)]
pub struct RenderPipelineDesc {
    /// Rasterizer fixed-function state.
    pub rasterizer: RasterizerDesc,
    /// Per-attachment blend state, aligned with the render pass's color attachments.
    pub blend: Vec<BlendAttachmentDesc>,
    /// Depth/stencil fixed-function state.
    pub depth_stencil: DepthStencilDesc,
    /// Vertex-input assembly state.
    pub vertex_input: VertexInputDesc,
    /// Assembled-primitive topology.
    pub topology: PrimitiveTopology,
    /// Tessellation patch control-point count; 0 if tessellation is unused.
    pub tessellation_patch_size: u32,
    /// Shader stages assembled into the pipeline.
    pub shaders: RenderShaderStages,
}

/// Descriptor for `create_compute_pipeline_state` (§4.5).
#[derive(Debug, Clone)]
pub struct ComputePipelineDesc {
    /// The compute shader bundle.
    pub shader: ShaderBundle,
}

/// Descriptor for `create_swapchain` (§4.1, §4.8); actual buffer count/extent may be clamped to
/// surface capabilities and are reflected back via mutation of this struct.
#[derive(Debug, Clone)]
pub struct SwapchainDesc {
    /// Requested surface pixel format.
    pub format: PixelFormat,
    /// Requested swapchain extent.
    pub extent: Extent2D,
    /// Requested number of buffered images.
    pub buffer_count: u32,
    /// Requested present mode preference.
    pub present_mode: PresentMode,
}

/// A two-dimensional size in pixels.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Extent2D {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A region copied by `copy_buffer` (§4.7).
#[derive(Debug, Clone, Copy)]
pub struct BufferCopyRegion {
    /// Byte offset within the source buffer.
    pub src_offset: u64,
    /// Byte offset within the destination buffer.
    pub dst_offset: u64,
    /// Number of bytes to copy.
    pub size: u64,
}

/// One placed-subresource footprint describing a buffer-side region for `copy_texture`'s
/// Buffer→Image staging path (§4.7).
#[derive(Debug, Clone, Copy)]
pub struct PlacedSubresourceFootprint {
    /// Byte offset of the footprint's first row within the buffer.
    pub buffer_offset: u64,
    /// Row pitch in bytes.
    pub row_pitch: u32,
    /// Copied region extent in texels.
    pub image_extent: Extent3D,
    /// Destination offset in texels within the image.
    pub image_offset: Offset3D,
}
