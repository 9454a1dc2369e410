//! In-memory buffers and textures (§3, §4.3).
//!
//! Grounded on `vulkan_memory.rs`/`vulkan_image.rs`'s fused allocate-plus-bind constructors; this
//! back-end has no native allocator to bind against, so a buffer's storage is a plain `Vec<u8>`
//! and a texture's is a flat byte array sized from its extent and format. `state_to_u8`/
//! `u8_to_state` mirror the Vulkan back-end's own atomic-state encoding (`rhi/vulkan/resource.rs`)
//! so the two back-ends observe identical `ResourceState` transitions in shared tests.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::error::{Result, RhiError};
use crate::rhi::cache::Handle;
use crate::rhi::enums::{PixelFormat, ResourceState};
use crate::rhi::structs::{BufferDesc, Extent3D, TextureDesc};
use crate::rhi::traits::{GpuBuffer, GpuResource, GpuTexture};
use crate::rhi::mock::device::MockDevice;

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

/// Bytes occupied by one texel of `format`, used to size a mock texture's backing store and to
/// compute `query_texture_subresource_layout`'s pitches. Not part of the bijective format table
/// in §6 — that table only constrains the two directions between `PixelFormat` and a native
/// format enum, which this back-end has none of.
pub(crate) fn bytes_per_texel(format: PixelFormat) -> u64 {
    match format {
        PixelFormat::Rgba16Uint | PixelFormat::Rgba16Float => 8,
        PixelFormat::Rgba32Float => 16,
        PixelFormat::Rgba8Unorm | PixelFormat::Rgba8UnormSrgb => 4,
        PixelFormat::R11g11b10Float => 4,
        PixelFormat::D32Float => 4,
        PixelFormat::Rgb32Float => 12,
        PixelFormat::Rgb8Unorm => 3,
        PixelFormat::Bgra8Unorm | PixelFormat::Bgra8UnormSrgb => 4,
        PixelFormat::D24UnormS8Uint => 4,
    }
}

/// A `Vec<u8>`-backed linear buffer (§3, §4.3).
pub struct MockBuffer {
    storage: UnsafeCell<Vec<u8>>,
    size: u64,
    state: AtomicU8,
    mapped: AtomicBool,
    debug_name: Option<String>,
}

// `storage` is only accessed through `map`/`unmap`/`raw_ptr`, whose callers are required by the
// `GpuBuffer::map` contract (traits.rs) to serialize their own access.
unsafe impl Send for MockBuffer {}
unsafe impl Sync for MockBuffer {}

impl MockBuffer {
    pub(crate) fn new(_device: MockDevice, desc: &BufferDesc) -> Result<Handle<MockBuffer>> {
        if desc.size == 0 {
            return Err(RhiError::invalid_argument("buffer size must be non-zero"));
        }
        Ok(Handle::new(MockBuffer {
            storage: UnsafeCell::new(vec![0u8; desc.size as usize]),
            size: desc.size,
            state: AtomicU8::new(state_to_u8(ResourceState::Undefined)),
            mapped: AtomicBool::new(false),
            debug_name: desc.debug_name.clone(),
        }))
    }

    pub(crate) fn set_state(&self, state: ResourceState) {
        self.state.store(state_to_u8(state), Ordering::Relaxed);
    }

    /// Raw pointer to this buffer's backing storage, for `copy_buffer`/`copy_texture`. Callers
    /// must stay within `[0, size)`.
    pub(crate) unsafe fn raw_ptr(&self) -> *mut u8 {
        (*self.storage.get()).as_mut_ptr()
    }
}

impl GpuResource for MockBuffer {
    fn state(&self) -> ResourceState {
        u8_to_state(self.state.load(Ordering::Relaxed))
    }

    fn debug_name(&self) -> Option<&str> {
        self.debug_name.as_deref()
    }
}

impl GpuBuffer for MockBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    unsafe fn map(&self, offset: u64, size: u64) -> Result<*mut u8> {
        if offset + size > self.size {
            return Err(RhiError::invalid_argument("map range exceeds buffer size"));
        }
        debug_assert!(!self.mapped.load(Ordering::Acquire), "buffer is already mapped");
        self.mapped.store(true, Ordering::Release);
        self.set_state(ResourceState::Mapped);
        Ok(self.raw_ptr().add(offset as usize))
    }

    fn unmap(&self) {
        self.mapped.store(false, Ordering::Release);
    }
}

/// A flat-byte-array-backed image (§3, §4.3).
pub struct MockTexture {
    storage: UnsafeCell<Vec<u8>>,
    format: PixelFormat,
    extent: Extent3D,
    mip_levels: u32,
    array_layers: u32,
    state: AtomicU8,
    debug_name: Option<String>,
}

unsafe impl Send for MockTexture {}
unsafe impl Sync for MockTexture {}

impl MockTexture {
    pub(crate) fn new(_device: MockDevice, desc: &TextureDesc) -> Result<Handle<MockTexture>> {
        let byte_size = bytes_per_texel(desc.format) * desc.extent.width as u64 * desc.extent.height as u64 * desc.extent.depth as u64 * desc.array_layers as u64;
        Ok(Handle::new(MockTexture {
            storage: UnsafeCell::new(vec![0u8; byte_size as usize]),
            format: desc.format,
            extent: desc.extent,
            mip_levels: desc.mip_levels,
            array_layers: desc.array_layers,
            state: AtomicU8::new(state_to_u8(ResourceState::Undefined)),
            debug_name: desc.debug_name.clone(),
        }))
    }

    /// Wraps a swapchain-owned backbuffer image (§4.8).
    pub(crate) fn from_swapchain(format: PixelFormat, extent: Extent3D) -> Handle<MockTexture> {
        let byte_size = bytes_per_texel(format) * extent.width as u64 * extent.height as u64 * extent.depth as u64;
        Handle::new(MockTexture {
            storage: UnsafeCell::new(vec![0u8; byte_size as usize]),
            format,
            extent,
            mip_levels: 1,
            array_layers: 1,
            state: AtomicU8::new(state_to_u8(ResourceState::Undefined)),
            debug_name: Some("Backbuffer".to_string()),
        })
    }

    pub(crate) fn set_state(&self, state: ResourceState) {
        self.state.store(state_to_u8(state), Ordering::Relaxed);
    }

    pub(crate) fn byte_size(&self) -> u64 {
        unsafe { (*self.storage.get()).len() as u64 }
    }

    /// Raw pointer to this texture's backing storage, for `copy_texture`.
    pub(crate) unsafe fn raw_ptr(&self) -> *mut u8 {
        (*self.storage.get()).as_mut_ptr()
    }
}

impl GpuResource for MockTexture {
    fn state(&self) -> ResourceState {
        u8_to_state(self.state.load(Ordering::Relaxed))
    }

    fn debug_name(&self) -> Option<&str> {
        self.debug_name.as_deref()
    }
}

impl GpuTexture for MockTexture {
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
