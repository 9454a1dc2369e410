#![allow(unsafe_code)]
//! Shader-resource and unordered-access views over a texture (§3, §4.3).

use std::sync::Arc;

use ash::version::DeviceV1_0;
use ash::vk;

use crate::error::{Result, RhiError};
use crate::rhi::cache::Handle;
use crate::rhi::structs::{Extent3D, ViewDesc};
use crate::rhi::vulkan::convert::{image_aspect_flags_to_vk, pixel_format_to_vk};
use crate::rhi::vulkan::device::VulkanDevice;
use crate::rhi::vulkan::resource::VulkanTexture;

fn image_view_type_for(texture: &VulkanTexture, extent: Extent3D) -> vk::ImageViewType {
    let _ = texture;
    if extent.depth > 1 {
        vk::ImageViewType::TYPE_3D
    } else {
        vk::ImageViewType::TYPE_2D
    }
}

fn build_view(device: &VulkanDevice, texture: &Handle<VulkanTexture>, desc: &ViewDesc) -> Result<vk::ImageView> {
    use crate::rhi::traits::GpuTexture;

    let format = desc.format.unwrap_or_else(|| texture.format());
    let subresource_range = vk::ImageSubresourceRange {
        aspect_mask: image_aspect_flags_to_vk(desc.range.aspect),
        base_mip_level: desc.range.base_mip_level,
        level_count: desc.range.mip_level_count,
        base_array_layer: desc.range.base_array_layer,
        layer_count: desc.range.array_layer_count,
    };

    let view_info = vk::ImageViewCreateInfo::builder()
        .image(texture.image)
        .view_type(image_view_type_for(texture, texture.extent()))
        .format(pixel_format_to_vk(format))
        .subresource_range(subresource_range)
        .build();

    unsafe { device.raw().create_image_view(&view_info, None) }
        .map_err(|err| RhiError::resource_exhausted(format!("failed to create image view: {:?}", err)))
}

/// A read-only view over a texture (§3, §4.3).
pub struct VulkanShaderResourceView {
    device: VulkanDevice,
    pub(crate) texture: Handle<VulkanTexture>,
    pub(crate) view: vk::ImageView,
}

impl VulkanShaderResourceView {
    pub(crate) fn new(device: &VulkanDevice, texture: &Handle<VulkanTexture>, desc: &ViewDesc) -> Result<VulkanShaderResourceView> {
        let view = build_view(device, texture, desc)?;
        Ok(VulkanShaderResourceView { device: device.clone(), texture: texture.clone(), view })
    }

    /// Returns a stable identity for this view's target image, used to key the framebuffer cache
    /// (§4.6).
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.texture) as usize
    }
}

impl Drop for VulkanShaderResourceView {
    fn drop(&mut self) {
        unsafe { self.device.raw().destroy_image_view(self.view, None) };
    }
}

/// A read-write view over a texture (§3, §4.3).
pub struct VulkanUnorderedAccessView {
    device: VulkanDevice,
    pub(crate) texture: Handle<VulkanTexture>,
    pub(crate) view: vk::ImageView,
}

impl VulkanUnorderedAccessView {
    pub(crate) fn new(device: &VulkanDevice, texture: &Handle<VulkanTexture>, desc: &ViewDesc) -> Result<VulkanUnorderedAccessView> {
        let view = build_view(device, texture, desc)?;
        Ok(VulkanUnorderedAccessView { device: device.clone(), texture: texture.clone(), view })
    }
}

impl Drop for VulkanUnorderedAccessView {
    fn drop(&mut self) {
        unsafe { self.device.raw().destroy_image_view(self.view, None) };
    }
}
