#![allow(unsafe_code)]
//! The presentable swapchain: surface capability negotiation, backbuffer wrapping and the
//! acquire/submit semaphore pair a present cycle waits and signals on (§4.1, §4.8).
//!
//! Grounded on `vulkan_swapchain.rs`'s capability-query-then-clamp construction sequence and its
//! paired acquire/render-finished semaphores. [`VulkanCommandBuffer::present`][present] stashes a
//! clone of the swapchain it presents to and later re-acquires through it from inside `commit`, so
//! the index and semaphores backing a given swapchain are reference-counted (`Arc<Inner>`) rather
//! than privately owned — every clone observes the same acquired image. Image-array and
//! native-handle fields are replaced wholesale on [`VulkanSwapchain::resize`] rather than mutated
//! in place, since resizing is rare and `&mut self` already gives exclusive access to do so. The
//! platform surface is owned separately from this per-generation `Inner` (see `SurfaceOwner`), so
//! a resize's rebuilt `Inner` never races the outgoing one's `Drop` over the same surface handle.
//!
//! [present]: crate::rhi::vulkan::command_buffer::VulkanCommandBuffer::present

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use ash::version::DeviceV1_0;
use ash::vk;
use log::warn;

use crate::error::{Result, RhiError};
use crate::rhi::cache::Handle;
use crate::rhi::enums::PixelFormat;
use crate::rhi::structs::{Extent2D, Extent3D, SwapchainDesc};
use crate::rhi::traits::Swapchain;
use crate::rhi::vulkan::convert::{extent2d_to_vk, pixel_format_to_vk, vk_format_to_pixel_format};
use crate::rhi::vulkan::device::VulkanDevice;
use crate::rhi::vulkan::queue::VulkanCommandQueue;
use crate::rhi::vulkan::resource::VulkanTexture;
use crate::rhi::vulkan::Vulkan;

fn present_mode_to_vk(mode: crate::rhi::enums::PresentMode) -> vk::PresentModeKHR {
    use crate::rhi::enums::PresentMode;
    match mode {
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
    }
}

fn present_mode_from_vk(mode: vk::PresentModeKHR) -> crate::rhi::enums::PresentMode {
    use crate::rhi::enums::PresentMode;
    match mode {
        vk::PresentModeKHR::MAILBOX => PresentMode::Mailbox,
        vk::PresentModeKHR::IMMEDIATE => PresentMode::Immediate,
        _ => PresentMode::Fifo,
    }
}

/// Picks `requested` if supported, else falls back through Mailbox, Immediate, Fifo in that
/// order (§4.8); Fifo is always present per the Vulkan spec, so the fallback never fails.
fn choose_present_mode(requested: crate::rhi::enums::PresentMode, available: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    let preference = [
        present_mode_to_vk(requested),
        vk::PresentModeKHR::MAILBOX,
        vk::PresentModeKHR::IMMEDIATE,
        vk::PresentModeKHR::FIFO,
    ];
    preference.iter().copied().find(|mode| available.contains(mode)).unwrap_or(vk::PresentModeKHR::FIFO)
}

fn choose_surface_format(requested: PixelFormat, available: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    let wanted = pixel_format_to_vk(requested);
    available
        .iter()
        .find(|candidate| candidate.format == wanted && candidate.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR)
        .or_else(|| available.iter().find(|candidate| candidate.format == wanted))
        .copied()
        .unwrap_or_else(|| available[0])
}

fn choose_extent(requested: Extent2D, capabilities: &vk::SurfaceCapabilitiesKHR) -> Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return Extent2D { width: capabilities.current_extent.width, height: capabilities.current_extent.height };
    }
    Extent2D {
        width: requested.width.clamp(capabilities.min_image_extent.width, capabilities.max_image_extent.width),
        height: requested.height.clamp(capabilities.min_image_extent.height, capabilities.max_image_extent.height),
    }
}

fn choose_image_count(requested: u32, capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let requested = requested.max(capabilities.min_image_count);
    if capabilities.max_image_count == 0 {
        requested
    } else {
        requested.min(capabilities.max_image_count)
    }
}

/// Owns the platform surface independently of any one [`Inner`], so that rebuilding the
/// swapchain on [`VulkanSwapchain::resize`] never destroys a surface a still-live `Inner` is
/// using. Destroyed exactly once, when the last `VulkanSwapchain` clone drops.
struct SurfaceOwner {
    loader: ash::extensions::khr::Surface,
    surface: vk::SurfaceKHR,
}

impl Drop for SurfaceOwner {
    fn drop(&mut self) {
        unsafe { self.loader.destroy_surface(self.surface, None) };
    }
}

struct Inner {
    device: VulkanDevice,
    queue: VulkanCommandQueue,
    loader: ash::extensions::khr::Swapchain,
    swapchain: vk::SwapchainKHR,
    images: Vec<Handle<VulkanTexture>>,
    acquire_semaphore: vk::Semaphore,
    submit_semaphore: vk::Semaphore,
    current_index: AtomicU32,
    extent: Extent2D,
    format: PixelFormat,
    present_mode: vk::PresentModeKHR,
}

impl Drop for Inner {
    fn drop(&mut self) {
        unsafe {
            let raw = self.device.raw();
            raw.destroy_semaphore(self.acquire_semaphore, None);
            raw.destroy_semaphore(self.submit_semaphore, None);
            self.loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

fn build_inner(
    device: &VulkanDevice,
    queue: &VulkanCommandQueue,
    surface_loader: &ash::extensions::khr::Surface,
    surface: vk::SurfaceKHR,
    desc: &mut SwapchainDesc,
    old_swapchain: vk::SwapchainKHR,
) -> Result<Inner> {
    let physical_device = device.physical_device();

    let capabilities = unsafe { surface_loader.get_physical_device_surface_capabilities(physical_device, surface) }
        .map_err(|err| RhiError::unsupported(format!("failed to query surface capabilities: {:?}", err)))?;
    let formats = unsafe { surface_loader.get_physical_device_surface_formats(physical_device, surface) }
        .map_err(|err| RhiError::unsupported(format!("failed to query surface formats: {:?}", err)))?;
    let present_modes = unsafe { surface_loader.get_physical_device_surface_present_modes(physical_device, surface) }
        .map_err(|err| RhiError::unsupported(format!("failed to query surface present modes: {:?}", err)))?;

    let chosen_format = choose_surface_format(desc.format, &formats);
    let chosen_present_mode = choose_present_mode(desc.present_mode, &present_modes);
    let extent = choose_extent(desc.extent, &capabilities);
    let image_count = choose_image_count(desc.buffer_count, &capabilities);

    desc.format = vk_format_to_pixel_format(chosen_format.format).unwrap_or(desc.format);
    desc.extent = extent;
    desc.buffer_count = image_count;
    desc.present_mode = present_mode_from_vk(chosen_present_mode);

    let create_info = vk::SwapchainCreateInfoKHR::builder()
        .surface(surface)
        .min_image_count(image_count)
        .image_format(chosen_format.format)
        .image_color_space(chosen_format.color_space)
        .image_extent(extent2d_to_vk(extent))
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST)
        .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        .pre_transform(capabilities.current_transform)
        .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(chosen_present_mode)
        .clipped(true)
        .old_swapchain(old_swapchain)
        .build();

    let loader = ash::extensions::khr::Swapchain::new(device.instance(), device.raw());
    let swapchain = unsafe { loader.create_swapchain(&create_info, None) }
        .map_err(|err| RhiError::unsupported(format!("failed to create swapchain: {:?}", err)))?;

    // `old_swapchain` is retired by the create call above but not destroyed; the `Inner` that
    // owned it destroys it exactly once, in its own `Drop`, once this rebuild replaces it.

    let raw_images = unsafe { loader.get_swapchain_images(swapchain) }
        .map_err(|err| RhiError::unsupported(format!("failed to retrieve swapchain images: {:?}", err)))?;
    let images = raw_images
        .into_iter()
        .map(|image| VulkanTexture::from_swapchain_image(device.clone(), image, desc.format, Extent3D { width: extent.width, height: extent.height, depth: 1 }))
        .collect();

    let semaphore_info = vk::SemaphoreCreateInfo::builder().build();
    let acquire_semaphore = unsafe { device.raw().create_semaphore(&semaphore_info, None) }
        .map_err(|err| RhiError::resource_exhausted(format!("failed to create acquire semaphore: {:?}", err)))?;
    let submit_semaphore = unsafe { device.raw().create_semaphore(&semaphore_info, None) }
        .map_err(|err| RhiError::resource_exhausted(format!("failed to create submit semaphore: {:?}", err)))?;

    Ok(Inner {
        device: device.clone(),
        queue: queue.clone(),
        loader,
        swapchain,
        images,
        acquire_semaphore,
        submit_semaphore,
        current_index: AtomicU32::new(0),
        extent,
        format: desc.format,
        present_mode: chosen_present_mode,
    })
}

/// The Vulkan swapchain (§3, §4.8). Cheaply `Clone`-able; all clones share the same acquired
/// image index and semaphore pair (§9 Design Notes).
#[derive(Clone)]
pub struct VulkanSwapchain {
    surface_owner: Arc<SurfaceOwner>,
    inner: Arc<Inner>,
}

impl VulkanSwapchain {
    pub(crate) fn new(
        device: &VulkanDevice,
        queue: &VulkanCommandQueue,
        surface_loader: ash::extensions::khr::Surface,
        surface: vk::SurfaceKHR,
        desc: &mut SwapchainDesc,
        old_swapchain: Option<vk::SwapchainKHR>,
    ) -> Result<VulkanSwapchain> {
        let surface_owner = Arc::new(SurfaceOwner { loader: surface_loader, surface });
        let inner = build_inner(device, queue, &surface_owner.loader, surface_owner.surface, desc, old_swapchain.unwrap_or_else(vk::SwapchainKHR::null))?;
        let swapchain = VulkanSwapchain { surface_owner, inner: Arc::new(inner) };
        swapchain.acquire_next_image_internal()?;
        Ok(swapchain)
    }

    /// The semaphore a present cycle's submit waits on, signaled by `vkAcquireNextImageKHR`.
    pub(crate) fn acquire_semaphore(&self) -> vk::Semaphore {
        self.inner.acquire_semaphore
    }

    /// The semaphore signaled by the queue submit and waited on by `vkQueuePresentKHR`.
    pub(crate) fn submit_semaphore(&self) -> vk::Semaphore {
        self.inner.submit_semaphore
    }

    pub(crate) fn loader(&self) -> &ash::extensions::khr::Swapchain {
        &self.inner.loader
    }

    pub(crate) fn raw(&self) -> vk::SwapchainKHR {
        self.inner.swapchain
    }

    pub(crate) fn current_index(&self) -> u32 {
        self.inner.current_index.load(Ordering::Acquire)
    }

    /// Acquires the next image through the shared semaphore/index state, callable from `&self` so
    /// a transient clone stashed in a pending present can re-acquire without borrowing its owner
    /// mutably (§9 Open Question 1).
    pub(crate) fn acquire_next_image_internal(&self) -> Result<()> {
        match unsafe { self.inner.loader.acquire_next_image(self.inner.swapchain, u64::MAX, self.inner.acquire_semaphore, vk::Fence::null()) } {
            Ok((index, suboptimal)) => {
                if suboptimal {
                    warn!("swapchain image acquired in a suboptimal configuration");
                }
                self.inner.current_index.store(index, Ordering::Release);
                Ok(())
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Err(RhiError::OutOfDate),
            Err(err) => Err(RhiError::unsupported(format!("failed to acquire next swapchain image: {:?}", err))),
        }
    }
}

impl Swapchain<Vulkan> for VulkanSwapchain {
    fn get_current_texture(&self) -> &Handle<VulkanTexture> {
        &self.inner.images[self.current_index() as usize]
    }

    fn current_index(&self) -> u32 {
        VulkanSwapchain::current_index(self)
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
            present_mode: present_mode_from_vk(self.inner.present_mode),
        };

        let new_inner =
            build_inner(&self.inner.device, &self.inner.queue, &self.surface_owner.loader, self.surface_owner.surface, &mut desc, self.inner.swapchain)?;
        self.inner = Arc::new(new_inner);
        self.acquire_next_image_internal()
    }

    fn extent(&self) -> Extent2D {
        self.inner.extent
    }
}
