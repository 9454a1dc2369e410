#![allow(unsafe_code)]
//! Immutable sampler state (§3).

use ash::version::DeviceV1_0;
use ash::vk;

use crate::error::{Result, RhiError};
use crate::rhi::structs::SamplerDesc;
use crate::rhi::vulkan::convert::*;
use crate::rhi::vulkan::device::VulkanDevice;

/// An immutable, device-created sampler.
pub struct VulkanSampler {
    device: VulkanDevice,
    pub(crate) sampler: vk::Sampler,
}

impl VulkanSampler {
    pub(crate) fn new(device: &VulkanDevice, desc: &SamplerDesc) -> Result<VulkanSampler> {
        let (compare_enable, compare_op) = match desc.compare {
            Some(op) => (true, compare_op_to_vk(op)),
            None => (false, vk::CompareOp::ALWAYS),
        };

        let sampler_info = vk::SamplerCreateInfo::builder()
            .min_filter(filter_mode_to_vk(desc.min_filter))
            .mag_filter(filter_mode_to_vk(desc.mag_filter))
            .mipmap_mode(mipmap_mode_to_vk(desc.mip_filter))
            .address_mode_u(address_mode_to_vk(desc.address_u))
            .address_mode_v(address_mode_to_vk(desc.address_v))
            .address_mode_w(address_mode_to_vk(desc.address_w))
            .compare_enable(compare_enable)
            .compare_op(compare_op)
            .min_lod(desc.min_lod)
            .max_lod(desc.max_lod)
            .anisotropy_enable(desc.max_anisotropy > 1.0)
            .max_anisotropy(desc.max_anisotropy)
            .build();

        let sampler = unsafe { device.raw().create_sampler(&sampler_info, None) }
            .map_err(|err| RhiError::resource_exhausted(format!("failed to create sampler: {:?}", err)))?;

        Ok(VulkanSampler { device: device.clone(), sampler })
    }
}

impl Drop for VulkanSampler {
    fn drop(&mut self) {
        unsafe { self.device.raw().destroy_sampler(self.sampler, None) };
    }
}
