#![allow(unsafe_code)]
//! Buffers and textures: fused native-object-plus-memory creation (§4.3).
//!
//! Grounded on `vulkan_memory.rs`/`vulkan_image.rs`: allocate the native object, query its memory
//! requirements, find a matching memory type via [`VulkanDevice::find_memory_type`], allocate and
//! bind. The original splits allocation and binding across a separate `VulkanMemory` object tracked
//! in a `Vec` on the device; this crate fuses the two steps into the resource's own constructor
//! and lets the resource's `Drop` free its own memory, since nothing else in this design aliases
//! one allocation across resources.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use ash::version::DeviceV1_0;
use ash::vk;

use crate::error::{Result, RhiError};
use crate::rhi::enums::{MemoryAccessFlags, PixelFormat, ResourceCreationFlags, ResourceState};
use crate::rhi::structs::{BufferDesc, Extent3D, SubResourceLayout, SubResourceSpec, TextureDesc};
use crate::rhi::traits::{Device, GpuBuffer, GpuResource, GpuTexture};
use crate::rhi::vulkan::convert::*;
use crate::rhi::vulkan::device::{memory_access_flags_to_vk, VulkanDevice};

fn state_to_u8(state: ResourceState) -> u8 {
    match state {
        ResourceState::Undefined => 0,
        ResourceState::Common => 1,
        ResourceState::Present => 2,
        ResourceState::RenderTarget => 3,
        ResourceState::ShaderResource => 4,
        ResourceState::TransferDst => 5,
        ResourceState::TransferSrc => 6,
        ResourceState::RwDepthStencil => 7,
        ResourceState::VertexAndConstantBuffer => 8,
        ResourceState::UnorderedAccess => 9,
        ResourceState::Mapped => 10,
    }
}

fn u8_to_state(value: u8) -> ResourceState {
    match value {
        1 => ResourceState::Common,
        2 => ResourceState::Present,
        3 => ResourceState::RenderTarget,
        4 => ResourceState::ShaderResource,
        5 => ResourceState::TransferDst,
        6 => ResourceState::TransferSrc,
        7 => ResourceState::RwDepthStencil,
        8 => ResourceState::VertexAndConstantBuffer,
        9 => ResourceState::UnorderedAccess,
        10 => ResourceState::Mapped,
        _ => ResourceState::Undefined,
    }
}

fn buffer_usage_to_vk(desc: &BufferDesc) -> vk::BufferUsageFlags {
    use crate::rhi::enums::BufferViewFlags as F;
    let mut usage = vk::BufferUsageFlags::empty();
    if desc.view_flags.contains(F::VERTEX) {
        usage |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }
    if desc.view_flags.contains(F::INDEX) {
        usage |= vk::BufferUsageFlags::INDEX_BUFFER;
    }
    if desc.view_flags.contains(F::UNIFORM) {
        usage |= vk::BufferUsageFlags::UNIFORM_BUFFER;
    }
    if desc.view_flags.contains(F::STORAGE) {
        usage |= vk::BufferUsageFlags::STORAGE_BUFFER;
    }
    if desc.view_flags.contains(F::UNIFORM_TEXEL) {
        usage |= vk::BufferUsageFlags::UNIFORM_TEXEL_BUFFER;
    }
    if desc.view_flags.contains(F::STORAGE_TEXEL) {
        usage |= vk::BufferUsageFlags::STORAGE_TEXEL_BUFFER;
    }
    if desc.creation_flags.contains(crate::rhi::enums::ResourceCreationFlags::TRANSFER_SRC) {
        usage |= vk::BufferUsageFlags::TRANSFER_SRC;
    }
    if desc.creation_flags.contains(crate::rhi::enums::ResourceCreationFlags::TRANSFER_DST) {
        usage |= vk::BufferUsageFlags::TRANSFER_DST;
    }
    usage
}

fn texture_usage_to_vk(desc: &TextureDesc) -> vk::ImageUsageFlags {
    use crate::rhi::enums::TextureViewFlags as F;
    let mut usage = vk::ImageUsageFlags::empty();
    if desc.view_flags.contains(F::SHADER_RESOURCE) {
        usage |= vk::ImageUsageFlags::SAMPLED;
    }
    if desc.view_flags.contains(F::RENDER_TARGET) {
        usage |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if desc.view_flags.contains(F::DEPTH_STENCIL) {
        usage |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
    }
    if desc.view_flags.contains(F::UNORDERED_ACCESS) {
        usage |= vk::ImageUsageFlags::STORAGE;
    }
    if desc.creation_flags.contains(crate::rhi::enums::ResourceCreationFlags::TRANSFER_SRC) {
        usage |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if desc.creation_flags.contains(crate::rhi::enums::ResourceCreationFlags::TRANSFER_DST) {
        usage |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    usage
}

fn image_type_for(dimension: crate::rhi::enums::TextureDimension) -> vk::ImageType {
    use crate::rhi::enums::TextureDimension;
    match dimension {
        TextureDimension::D1 => vk::ImageType::TYPE_1D,
        TextureDimension::D2 | TextureDimension::Cube | TextureDimension::Array => vk::ImageType::TYPE_2D,
        TextureDimension::D3 => vk::ImageType::TYPE_3D,
    }
}

/// A device-memory-backed linear buffer (§3, §4.3).
pub struct VulkanBuffer {
    device: VulkanDevice,
    pub(crate) buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: u64,
    state: AtomicU8,
    debug_name: Option<String>,
}

impl VulkanBuffer {
    pub(crate) fn new(device: VulkanDevice, desc: &BufferDesc) -> Result<Arc<VulkanBuffer>> {
        let raw_device = device.raw();

        let buffer_info = vk::BufferCreateInfo::builder()
            .size(desc.size)
            .usage(buffer_usage_to_vk(desc))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .build();
        let buffer = unsafe { raw_device.create_buffer(&buffer_info, None) }
            .map_err(|err| RhiError::resource_exhausted(format!("failed to create buffer: {:?}", err)))?;

        let requirements = unsafe { raw_device.get_buffer_memory_requirements(buffer) };
        let memory_type = match device.find_memory_type(requirements.memory_type_bits, desc.access_flags) {
            Ok(index) => index,
            Err(err) => {
                unsafe { raw_device.destroy_buffer(buffer, None) };
                return Err(err);
            }
        };

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type)
            .build();
        let memory = match unsafe { raw_device.allocate_memory(&alloc_info, None) } {
            Ok(memory) => memory,
            Err(err) => {
                unsafe { raw_device.destroy_buffer(buffer, None) };
                return Err(RhiError::resource_exhausted(format!("failed to allocate buffer memory: {:?}", err)));
            }
        };

        if let Err(err) = unsafe { raw_device.bind_buffer_memory(buffer, memory, 0) } {
            unsafe {
                raw_device.destroy_buffer(buffer, None);
                raw_device.free_memory(memory, None);
            }
            return Err(RhiError::unsupported(format!("failed to bind buffer memory: {:?}", err)));
        }

        Ok(Arc::new(VulkanBuffer {
            device,
            buffer,
            memory,
            size: desc.size,
            state: AtomicU8::new(state_to_u8(ResourceState::Undefined)),
            debug_name: desc.debug_name.clone(),
        }))
    }

    pub(crate) fn set_state(&self, state: ResourceState) {
        self.state.store(state_to_u8(state), Ordering::Relaxed);
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        unsafe {
            let raw = self.device.raw();
            raw.destroy_buffer(self.buffer, None);
            raw.free_memory(self.memory, None);
        }
    }
}

impl GpuResource for VulkanBuffer {
    fn state(&self) -> ResourceState {
        u8_to_state(self.state.load(Ordering::Relaxed))
    }

    fn debug_name(&self) -> Option<&str> {
        self.debug_name.as_deref()
    }
}

impl GpuBuffer for VulkanBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    unsafe fn map(&self, offset: u64, size: u64) -> Result<*mut u8> {
        let ptr = self
            .device
            .raw()
            .map_memory(self.memory, offset, size, vk::MemoryMapFlags::empty())
            .map_err(|err| RhiError::unsupported(format!("failed to map buffer memory: {:?}", err)))?;
        self.set_state(ResourceState::Mapped);
        Ok(ptr as *mut u8)
    }

    fn unmap(&self) {
        unsafe { self.device.raw().unmap_memory(self.memory) };
    }
}

/// A device-memory-backed image (§3, §4.3).
pub struct VulkanTexture {
    device: VulkanDevice,
    pub(crate) image: vk::Image,
    memory: Option<vk::DeviceMemory>,
    pub(crate) format: PixelFormat,
    extent: Extent3D,
    mip_levels: u32,
    array_layers: u32,
    state: AtomicU8,
    debug_name: Option<String>,
    /// `true` for swapchain-owned images, whose native `vk::Image` and memory are owned by the
    /// swapchain and must not be destroyed here (§4.8).
    borrowed: bool,
}

impl VulkanTexture {
    pub(crate) fn new(device: VulkanDevice, desc: &TextureDesc) -> Result<Arc<VulkanTexture>> {
        let raw_device = device.raw();

        // Staged uploads (device-local or TransferDst) want driver-chosen tiling; anything else
        // is written directly through a mapped pointer and needs a defined initial layout (§4.3).
        let staged = desc.access_flags.contains(MemoryAccessFlags::DEVICE_LOCAL) || desc.creation_flags.contains(ResourceCreationFlags::TRANSFER_DST);
        let (tiling, initial_layout) =
            if staged { (vk::ImageTiling::OPTIMAL, vk::ImageLayout::UNDEFINED) } else { (vk::ImageTiling::LINEAR, vk::ImageLayout::PREINITIALIZED) };

        let image_info = vk::ImageCreateInfo::builder()
            .image_type(image_type_for(desc.dimension))
            .format(pixel_format_to_vk(desc.format))
            .extent(vk::Extent3D { width: desc.extent.width, height: desc.extent.height, depth: desc.extent.depth })
            .mip_levels(desc.mip_levels)
            .array_layers(desc.array_layers)
            .samples(sample_count_flags(desc.sample_count))
            .tiling(tiling)
            .usage(texture_usage_to_vk(desc))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(initial_layout)
            .build();
        let image = unsafe { raw_device.create_image(&image_info, None) }
            .map_err(|err| RhiError::resource_exhausted(format!("failed to create image: {:?}", err)))?;

        let requirements = unsafe { raw_device.get_image_memory_requirements(image) };
        let memory_type = match device.find_memory_type(requirements.memory_type_bits, desc.access_flags) {
            Ok(index) => index,
            Err(err) => {
                unsafe { raw_device.destroy_image(image, None) };
                return Err(err);
            }
        };

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type)
            .build();
        let memory = match unsafe { raw_device.allocate_memory(&alloc_info, None) } {
            Ok(memory) => memory,
            Err(err) => {
                unsafe { raw_device.destroy_image(image, None) };
                return Err(RhiError::resource_exhausted(format!("failed to allocate image memory: {:?}", err)));
            }
        };

        if let Err(err) = unsafe { raw_device.bind_image_memory(image, memory, 0) } {
            unsafe {
                raw_device.destroy_image(image, None);
                raw_device.free_memory(memory, None);
            }
            return Err(RhiError::unsupported(format!("failed to bind image memory: {:?}", err)));
        }

        Ok(Arc::new(VulkanTexture {
            device,
            image,
            memory: Some(memory),
            format: desc.format,
            extent: desc.extent,
            mip_levels: desc.mip_levels,
            array_layers: desc.array_layers,
            state: AtomicU8::new(state_to_u8(ResourceState::Undefined)),
            debug_name: desc.debug_name.clone(),
            borrowed: false,
        }))
    }

    /// Wraps a swapchain-owned `vk::Image` without taking ownership of it (§4.8).
    pub(crate) fn from_swapchain_image(device: VulkanDevice, image: vk::Image, format: PixelFormat, extent: Extent3D) -> Arc<VulkanTexture> {
        Arc::new(VulkanTexture {
            device,
            image,
            memory: None,
            format,
            extent,
            mip_levels: 1,
            array_layers: 1,
            state: AtomicU8::new(state_to_u8(ResourceState::Undefined)),
            debug_name: Some("Backbuffer".to_string()),
            borrowed: true,
        })
    }

    pub(crate) fn set_state(&self, state: ResourceState) {
        self.state.store(state_to_u8(state), Ordering::Relaxed);
    }

    pub(crate) fn query_subresource_layout(&self, device: &VulkanDevice, spec: SubResourceSpec) -> Result<SubResourceLayout> {
        let subresource = vk::ImageSubresource {
            aspect_mask: image_aspect_flags_to_vk(spec.aspect),
            mip_level: spec.mip_level,
            array_layer: spec.array_layer,
        };
        let layout = unsafe { device.raw().get_image_subresource_layout(self.image, subresource) };
        Ok(SubResourceLayout {
            offset: layout.offset,
            size: layout.size,
            row_pitch: layout.row_pitch,
            array_pitch: layout.array_pitch,
            depth_pitch: layout.depth_pitch,
        })
    }
}

impl Drop for VulkanTexture {
    fn drop(&mut self) {
        if self.borrowed {
            return;
        }
        unsafe {
            let raw = self.device.raw();
            raw.destroy_image(self.image, None);
            if let Some(memory) = self.memory {
                raw.free_memory(memory, None);
            }
        }
    }
}

impl GpuResource for VulkanTexture {
    fn state(&self) -> ResourceState {
        u8_to_state(self.state.load(Ordering::Relaxed))
    }

    fn debug_name(&self) -> Option<&str> {
        self.debug_name.as_deref()
    }
}

impl GpuTexture for VulkanTexture {
    fn extent(&self) -> Extent3D {
        self.extent
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    fn array_layers(&self) -> u32 {
        self.array_layers
    }
}

fn sample_count_flags(sample_count: u32) -> vk::SampleCountFlags {
    match sample_count {
        1 => vk::SampleCountFlags::TYPE_1,
        2 => vk::SampleCountFlags::TYPE_2,
        4 => vk::SampleCountFlags::TYPE_4,
        8 => vk::SampleCountFlags::TYPE_8,
        16 => vk::SampleCountFlags::TYPE_16,
        _ => vk::SampleCountFlags::TYPE_1,
    }
}
