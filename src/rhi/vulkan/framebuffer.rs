#![allow(unsafe_code)]
//! Cached framebuffer objects, keyed by (render pass, attachment identities, dimensions) (§4.6).

use ash::version::DeviceV1_0;
use ash::vk;

use crate::error::{Result, RhiError};
use crate::rhi::cache::{hash_framebuffer_key, Handle};
use crate::rhi::vulkan::device::VulkanDevice;
use crate::rhi::vulkan::render_pass::VulkanRenderPass;
use crate::rhi::vulkan::view::VulkanShaderResourceView;

/// A cached framebuffer bound to one concrete set of attachment views (§4.6).
pub struct VulkanFramebuffer {
    device: VulkanDevice,
    pub(crate) framebuffer: vk::Framebuffer,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl VulkanFramebuffer {
    fn new(
        device: &VulkanDevice,
        render_pass: &Handle<VulkanRenderPass>,
        color_views: &[&VulkanShaderResourceView],
        depth_stencil_view: Option<&VulkanShaderResourceView>,
        width: u32,
        height: u32,
    ) -> Result<VulkanFramebuffer> {
        let mut attachments: Vec<vk::ImageView> = color_views.iter().map(|view| view.view).collect();
        if let Some(view) = depth_stencil_view {
            attachments.push(view.view);
        }

        let framebuffer_info = vk::FramebufferCreateInfo::builder()
            .render_pass(render_pass.render_pass)
            .attachments(&attachments)
            .width(width)
            .height(height)
            .layers(1)
            .build();

        let framebuffer = unsafe { device.raw().create_framebuffer(&framebuffer_info, None) }
            .map_err(|err| RhiError::resource_exhausted(format!("failed to create framebuffer: {:?}", err)))?;

        Ok(VulkanFramebuffer { device: device.clone(), framebuffer, width, height })
    }
}

impl Drop for VulkanFramebuffer {
    fn drop(&mut self) {
        unsafe { self.device.raw().destroy_framebuffer(self.framebuffer, None) };
    }
}

/// Looks up, or creates and caches, the framebuffer matching this attachment set (§4.6).
pub(crate) fn obtain_framebuffer(
    device: &VulkanDevice,
    render_pass: &Handle<VulkanRenderPass>,
    color_views: &[&VulkanShaderResourceView],
    depth_stencil_view: Option<&VulkanShaderResourceView>,
    width: u32,
    height: u32,
) -> Result<Handle<VulkanFramebuffer>> {
    let render_pass_identity = std::sync::Arc::as_ptr(render_pass) as usize;
    let mut view_identities: Vec<usize> = color_views.iter().map(|view| view.identity()).collect();
    if let Some(view) = depth_stencil_view {
        view_identities.push(view.identity());
    }

    let key = hash_framebuffer_key(render_pass_identity, &view_identities, width, height);

    {
        let cache = device.inner.framebuffer_cache.lock().unwrap();
        if let Some(existing) = cache.get(&key) {
            return Ok(existing.clone());
        }
    }

    let framebuffer = Handle::new(VulkanFramebuffer::new(device, render_pass, color_views, depth_stencil_view, width, height)?);
    device.inner.framebuffer_cache.lock().unwrap().insert(key, framebuffer.clone());
    Ok(framebuffer)
}
