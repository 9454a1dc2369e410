//! The presentable in-memory swapchain (§4.1, §4.8).
//!
//! Grounded on `vulkan_swapchain.rs`'s paired acquire/replace-wholesale design: every clone of a
//! `MockSwapchain` shares the same acquired image index through an `Arc<Inner>`, and `resize`
//! swaps in a freshly built `Inner` rather than mutating fields in place.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::rhi::cache::Handle;
use crate::rhi::enums::{PixelFormat, PresentMode};
use crate::rhi::mock::resource::MockTexture;
use crate::rhi::mock::Mock;
use crate::rhi::structs::{Extent2D, Extent3D, SwapchainDesc};
use crate::rhi::traits::Swapchain;

struct Inner {
    images: Vec<Handle<MockTexture>>,
    current_index: AtomicU32,
    extent: Extent2D,
    format: PixelFormat,
    present_mode: PresentMode,
}

fn build_inner(desc: &mut SwapchainDesc) -> Inner {
    desc.buffer_count = desc.buffer_count.clamp(2, 8);
    let images = (0..desc.buffer_count)
        .map(|_| MockTexture::from_swapchain(desc.format, Extent3D { width: desc.extent.width, height: desc.extent.height, depth: 1 }))
        .collect();

    Inner { images, current_index: AtomicU32::new(0), extent: desc.extent, format: desc.format, present_mode: desc.present_mode }
}

/// The in-memory swapchain (§3, §4.8). Cheaply `Clone`-able; every clone shares the same acquired
/// image index.
#[derive(Clone)]
pub struct MockSwapchain {
    inner: Arc<Inner>,
}

impl MockSwapchain {
    pub(crate) fn new(desc: &mut SwapchainDesc) -> Result<MockSwapchain> {
        let swapchain = MockSwapchain { inner: Arc::new(build_inner(desc)) };
        swapchain.acquire_next_image_internal()?;
        Ok(swapchain)
    }

    /// Advances to the next backbuffer, wrapping around the image count. Takes `&self` so a
    /// swapchain clone stashed in a pending present (§4.7) can re-acquire without the command
    /// buffer borrowing it mutably.
    pub(crate) fn acquire_next_image_internal(&self) -> Result<()> {
        let next = (self.inner.current_index.load(Ordering::Acquire) + 1) % self.inner.images.len() as u32;
        self.inner.current_index.store(next, Ordering::Release);
        Ok(())
    }
}

impl Swapchain<Mock> for MockSwapchain {
    fn get_current_texture(&self) -> &Handle<MockTexture> {
        &self.inner.images[self.inner.current_index.load(Ordering::Acquire) as usize]
    }

    fn current_index(&self) -> u32 {
        self.inner.current_index.load(Ordering::Acquire)
    }

    fn acquire_next_image(&mut self) -> Result<()> {
        self.acquire_next_image_internal()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if self.inner.extent.width == width && self.inner.extent.height == height {
            return Ok(());
        }
        let mut desc = SwapchainDesc {
            format: self.inner.format,
            extent: Extent2D { width, height },
            buffer_count: self.inner.images.len() as u32,
            present_mode: self.inner.present_mode,
        };
        self.inner = Arc::new(build_inner(&mut desc));
        self.acquire_next_image_internal()
    }

    fn extent(&self) -> Extent2D {
        self.inner.extent
    }
}
