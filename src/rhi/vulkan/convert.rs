//! Pure, device-less conversions between RHI enums and their Vulkan equivalents.
//!
//! Grounded on `RHIEnums.h`'s `EPixelFormat`/resource-state tables and on `VkRHI.cpp`'s
//! `g_ResourceState[]` array and `InferImageBarrierFromDesc` (§6, §4.7).

use crate::rhi::enums::*;
use crate::rhi::structs::Extent2D;
use ash::vk;

/// The bijective pixel-format table required by §6. Both directions are total functions over
/// the minimum required format set; an unmapped native format is never produced by this
/// back-end, so the reverse direction cannot fail.
pub fn pixel_format_to_vk(format: PixelFormat) -> vk::Format {
    match format {
        PixelFormat::Rgba16Uint => vk::Format::R16G16B16A16_UINT,
        PixelFormat::Rgba32Float => vk::Format::R32G32B32A32_SFLOAT,
        PixelFormat::Rgba8Unorm => vk::Format::R8G8B8A8_UNORM,
        PixelFormat::Rgba8UnormSrgb => vk::Format::R8G8B8A8_SRGB,
        PixelFormat::R11g11b10Float => vk::Format::B10G11R11_UFLOAT_PACK32,
        PixelFormat::D32Float => vk::Format::D32_SFLOAT,
        PixelFormat::Rgb32Float => vk::Format::R32G32B32_SFLOAT,
        PixelFormat::Rgb8Unorm => vk::Format::R8G8B8_UNORM,
        PixelFormat::Bgra8Unorm => vk::Format::B8G8R8A8_UNORM,
        PixelFormat::Bgra8UnormSrgb => vk::Format::B8G8R8A8_SRGB,
        PixelFormat::Rgba16Float => vk::Format::R16G16B16A16_SFLOAT,
        PixelFormat::D24UnormS8Uint => vk::Format::D24_UNORM_S8_UINT,
    }
}

/// The inverse of [`pixel_format_to_vk`], for surface-format negotiation in `create_swapchain`.
pub fn vk_format_to_pixel_format(format: vk::Format) -> Option<PixelFormat> {
    match format {
        vk::Format::R16G16B16A16_UINT => Some(PixelFormat::Rgba16Uint),
        vk::Format::R32G32B32A32_SFLOAT => Some(PixelFormat::Rgba32Float),
        vk::Format::R8G8B8A8_UNORM => Some(PixelFormat::Rgba8Unorm),
        vk::Format::R8G8B8A8_SRGB => Some(PixelFormat::Rgba8UnormSrgb),
        vk::Format::B10G11R11_UFLOAT_PACK32 => Some(PixelFormat::R11g11b10Float),
        vk::Format::D32_SFLOAT => Some(PixelFormat::D32Float),
        vk::Format::R32G32B32_SFLOAT => Some(PixelFormat::Rgb32Float),
        vk::Format::R8G8B8_UNORM => Some(PixelFormat::Rgb8Unorm),
        vk::Format::B8G8R8A8_UNORM => Some(PixelFormat::Bgra8Unorm),
        vk::Format::B8G8R8A8_SRGB => Some(PixelFormat::Bgra8UnormSrgb),
        vk::Format::R16G16B16A16_SFLOAT => Some(PixelFormat::Rgba16Float),
        vk::Format::D24_UNORM_S8_UINT => Some(PixelFormat::D24UnormS8Uint),
        _ => None,
    }
}

/// Maps a logical resource state to its required image layout, per the §6 table.
pub fn resource_state_to_image_layout(state: ResourceState) -> vk::ImageLayout {
    match state {
        ResourceState::Common => vk::ImageLayout::GENERAL,
        ResourceState::Present => vk::ImageLayout::PRESENT_SRC_KHR,
        ResourceState::RenderTarget => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ResourceState::ShaderResource => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        ResourceState::TransferDst => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        ResourceState::TransferSrc => vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
        ResourceState::RwDepthStencil => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        // Buffer-only and transient states carry no image layout; treat them as UNDEFINED so a
        // texture accidentally passed one of these states gets a conservative full barrier.
        ResourceState::Undefined
        | ResourceState::VertexAndConstantBuffer
        | ResourceState::UnorderedAccess
        | ResourceState::Mapped => vk::ImageLayout::UNDEFINED,
    }
}

/// Derives the source access mask implied by an image layout a transition is leaving (§4.7 step 2).
pub fn access_mask_for_source_layout(layout: vk::ImageLayout) -> vk::AccessFlags {
    match layout {
        vk::ImageLayout::PREINITIALIZED => vk::AccessFlags::HOST_WRITE,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL => vk::AccessFlags::TRANSFER_WRITE,
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL => vk::AccessFlags::SHADER_READ,
        _ => vk::AccessFlags::empty(),
    }
}

/// Derives the destination access mask implied by an image layout a transition is entering
/// (§4.7 step 3). Returns `None` for `SHADER_READ_ONLY_OPTIMAL` so the caller can apply the
/// documented default-source fallback when no source mask was otherwise established.
pub fn access_mask_for_dest_layout(layout: vk::ImageLayout) -> vk::AccessFlags {
    match layout {
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL => vk::AccessFlags::TRANSFER_WRITE,
        vk::ImageLayout::TRANSFER_SRC_OPTIMAL => vk::AccessFlags::TRANSFER_READ,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL => vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL => vk::AccessFlags::SHADER_READ,
        _ => vk::AccessFlags::empty(),
    }
}

/// The default source-access fallback applied when a transition targets `SHADER_READ_ONLY` and
/// no other source access mask was established (§4.7 step 3).
pub const SHADER_READ_DEFAULT_SOURCE_ACCESS: vk::AccessFlags = vk::AccessFlags::from_raw(
    vk::AccessFlags::HOST_WRITE.as_raw() | vk::AccessFlags::TRANSFER_WRITE.as_raw(),
);

/// The (source, destination) pipeline-stage pair for a transition, with the two documented
/// overrides applied (§4.7 step 4).
pub fn pipeline_stages_for_transition(dest_layout: vk::ImageLayout) -> (vk::PipelineStageFlags, vk::PipelineStageFlags) {
    let mut src = vk::PipelineStageFlags::TOP_OF_PIPE;
    let mut dst = vk::PipelineStageFlags::BOTTOM_OF_PIPE;

    if dest_layout == vk::ImageLayout::PRESENT_SRC_KHR {
        src = vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT;
    }
    if dest_layout == vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL {
        dst = vk::PipelineStageFlags::ALL_GRAPHICS;
    }

    (src, dst)
}

/// Maps a descriptor type to its native Vulkan equivalent (§4.4).
pub fn descriptor_type_to_vk(descriptor_type: DescriptorType) -> vk::DescriptorType {
    match descriptor_type {
        DescriptorType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        DescriptorType::Sampler => vk::DescriptorType::SAMPLER,
        DescriptorType::SampledImage => vk::DescriptorType::SAMPLED_IMAGE,
        DescriptorType::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        DescriptorType::StorageImage => vk::DescriptorType::STORAGE_IMAGE,
        DescriptorType::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
        DescriptorType::StorageTexelBuffer => vk::DescriptorType::STORAGE_TEXEL_BUFFER,
    }
}

/// Maps the crate's shader-stage flags to Vulkan's.
pub fn shader_stage_flags_to_vk(flags: crate::shader::ShaderStageFlags) -> vk::ShaderStageFlags {
    use crate::shader::ShaderStageFlags as S;
    let mut vk_flags = vk::ShaderStageFlags::empty();
    if flags.contains(S::VERTEX) {
        vk_flags |= vk::ShaderStageFlags::VERTEX;
    }
    if flags.contains(S::FRAGMENT) {
        vk_flags |= vk::ShaderStageFlags::FRAGMENT;
    }
    if flags.contains(S::GEOMETRY) {
        vk_flags |= vk::ShaderStageFlags::GEOMETRY;
    }
    if flags.contains(S::TESS_CONTROL) {
        vk_flags |= vk::ShaderStageFlags::TESSELLATION_CONTROL;
    }
    if flags.contains(S::TESS_EVAL) {
        vk_flags |= vk::ShaderStageFlags::TESSELLATION_EVALUATION;
    }
    if flags.contains(S::COMPUTE) {
        vk_flags |= vk::ShaderStageFlags::COMPUTE;
    }
    vk_flags
}

/// Maps a single shader stage to its Vulkan equivalent, for shader-module creation.
pub fn shader_stage_to_vk(stage: crate::shader::ShaderStage) -> vk::ShaderStageFlags {
    use crate::shader::ShaderStage;
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
        ShaderStage::Geometry => vk::ShaderStageFlags::GEOMETRY,
        ShaderStage::TessControl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
        ShaderStage::TessEval => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
        ShaderStage::Compute => vk::ShaderStageFlags::COMPUTE,
    }
}

pub fn compare_op_to_vk(op: CompareOp) -> vk::CompareOp {
    match op {
        CompareOp::Never => vk::CompareOp::NEVER,
        CompareOp::Less => vk::CompareOp::LESS,
        CompareOp::Equal => vk::CompareOp::EQUAL,
        CompareOp::LessEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareOp::Greater => vk::CompareOp::GREATER,
        CompareOp::NotEqual => vk::CompareOp::NOT_EQUAL,
        CompareOp::GreaterEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareOp::Always => vk::CompareOp::ALWAYS,
    }
}

pub fn stencil_op_to_vk(op: StencilOp) -> vk::StencilOp {
    match op {
        StencilOp::Keep => vk::StencilOp::KEEP,
        StencilOp::Zero => vk::StencilOp::ZERO,
        StencilOp::Replace => vk::StencilOp::REPLACE,
        StencilOp::IncrementClamp => vk::StencilOp::INCREMENT_AND_CLAMP,
        StencilOp::DecrementClamp => vk::StencilOp::DECREMENT_AND_CLAMP,
        StencilOp::Invert => vk::StencilOp::INVERT,
        StencilOp::IncrementWrap => vk::StencilOp::INCREMENT_AND_WRAP,
        StencilOp::DecrementWrap => vk::StencilOp::DECREMENT_AND_WRAP,
    }
}

pub fn blend_factor_to_vk(factor: BlendFactor) -> vk::BlendFactor {
    match factor {
        BlendFactor::Zero => vk::BlendFactor::ZERO,
        BlendFactor::One => vk::BlendFactor::ONE,
        BlendFactor::SrcColor => vk::BlendFactor::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => vk::BlendFactor::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => vk::BlendFactor::DST_COLOR,
        BlendFactor::OneMinusDstColor => vk::BlendFactor::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
    }
}

pub fn blend_op_to_vk(op: BlendOp) -> vk::BlendOp {
    match op {
        BlendOp::Add => vk::BlendOp::ADD,
        BlendOp::Subtract => vk::BlendOp::SUBTRACT,
        BlendOp::ReverseSubtract => vk::BlendOp::REVERSE_SUBTRACT,
        BlendOp::Min => vk::BlendOp::MIN,
        BlendOp::Max => vk::BlendOp::MAX,
    }
}

pub fn cull_mode_to_vk(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

pub fn front_face_to_vk(front_face: FrontFace) -> vk::FrontFace {
    match front_face {
        FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
    }
}

pub fn fill_mode_to_vk(mode: FillMode) -> vk::PolygonMode {
    match mode {
        FillMode::Solid => vk::PolygonMode::FILL,
        FillMode::Wireframe => vk::PolygonMode::LINE,
    }
}

pub fn primitive_topology_to_vk(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        PrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
        PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
        PrimitiveTopology::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
        PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
    }
}

pub fn vertex_input_rate_to_vk(rate: VertexInputRate) -> vk::VertexInputRate {
    match rate {
        VertexInputRate::Vertex => vk::VertexInputRate::VERTEX,
        VertexInputRate::Instance => vk::VertexInputRate::INSTANCE,
    }
}

pub fn filter_mode_to_vk(mode: FilterMode) -> vk::Filter {
    match mode {
        FilterMode::Nearest => vk::Filter::NEAREST,
        FilterMode::Linear => vk::Filter::LINEAR,
    }
}

pub fn mipmap_mode_to_vk(mode: FilterMode) -> vk::SamplerMipmapMode {
    match mode {
        FilterMode::Nearest => vk::SamplerMipmapMode::NEAREST,
        FilterMode::Linear => vk::SamplerMipmapMode::LINEAR,
    }
}

pub fn address_mode_to_vk(mode: AddressMode) -> vk::SamplerAddressMode {
    match mode {
        AddressMode::Repeat => vk::SamplerAddressMode::REPEAT,
        AddressMode::MirroredRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
        AddressMode::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        AddressMode::ClampToBorder => vk::SamplerAddressMode::CLAMP_TO_BORDER,
    }
}

pub fn load_op_to_vk(op: crate::rhi::structs::LoadOp) -> vk::AttachmentLoadOp {
    use crate::rhi::structs::LoadOp;
    match op {
        LoadOp::Load => vk::AttachmentLoadOp::LOAD,
        LoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
        LoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
    }
}

pub fn store_op_to_vk(op: crate::rhi::structs::StoreOp) -> vk::AttachmentStoreOp {
    use crate::rhi::structs::StoreOp;
    match op {
        StoreOp::Store => vk::AttachmentStoreOp::STORE,
        StoreOp::DontCare => vk::AttachmentStoreOp::DONT_CARE,
    }
}

pub fn image_aspect_flags_to_vk(flags: ImageAspectFlags) -> vk::ImageAspectFlags {
    let mut vk_flags = vk::ImageAspectFlags::empty();
    if flags.contains(ImageAspectFlags::COLOR) {
        vk_flags |= vk::ImageAspectFlags::COLOR;
    }
    if flags.contains(ImageAspectFlags::DEPTH) {
        vk_flags |= vk::ImageAspectFlags::DEPTH;
    }
    if flags.contains(ImageAspectFlags::STENCIL) {
        vk_flags |= vk::ImageAspectFlags::STENCIL;
    }
    vk_flags
}

pub fn extent2d_to_vk(extent: Extent2D) -> vk::Extent2D {
    vk::Extent2D { width: extent.width, height: extent.height }
}

pub fn extent2d_from_vk(extent: vk::Extent2D) -> Extent2D {
    Extent2D { width: extent.width, height: extent.height }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_format_round_trips_through_vk_format() {
        let formats = [
            PixelFormat::Rgba16Uint,
            PixelFormat::Rgba32Float,
            PixelFormat::Rgba8Unorm,
            PixelFormat::Rgba8UnormSrgb,
            PixelFormat::R11g11b10Float,
            PixelFormat::D32Float,
            PixelFormat::Rgb32Float,
            PixelFormat::Rgb8Unorm,
            PixelFormat::Bgra8Unorm,
            PixelFormat::Bgra8UnormSrgb,
            PixelFormat::Rgba16Float,
            PixelFormat::D24UnormS8Uint,
        ];
        for format in formats {
            let native = pixel_format_to_vk(format);
            assert_eq!(vk_format_to_pixel_format(native), Some(format));
        }
    }

    #[test]
    fn present_override_sets_source_stage_to_color_attachment_output() {
        let (src, _dst) = pipeline_stages_for_transition(vk::ImageLayout::PRESENT_SRC_KHR);
        assert_eq!(src, vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT);
    }

    #[test]
    fn color_attachment_override_sets_dest_stage_to_all_graphics() {
        let (_src, dst) = pipeline_stages_for_transition(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        assert_eq!(dst, vk::PipelineStageFlags::ALL_GRAPHICS);
    }

    #[test]
    fn default_stage_pair_is_top_to_bottom_of_pipe() {
        let (src, dst) = pipeline_stages_for_transition(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
        assert_eq!(src, vk::PipelineStageFlags::TOP_OF_PIPE);
        assert_eq!(dst, vk::PipelineStageFlags::BOTTOM_OF_PIPE);
    }
}
