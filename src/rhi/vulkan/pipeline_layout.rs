#![allow(unsafe_code)]
//! Descriptor-set layout, descriptor pool and native pipeline layout derived from merged shader
//! reflection (§4.4).
//!
//! Grounded on `vulkan_pipeline_interface.rs`'s descriptor-set-layout assembly and
//! `vulkan_descriptor_pool.rs`'s pool sizing; the original sizes one pool per pipeline for a fixed
//! number of "max sets", which this crate keeps as a constant rather than a caller-tunable knob,
//! since the new surface has no equivalent configuration point (§4.4 Non-goal: custom pool
//! sizing).

use std::sync::Mutex;

use ash::version::DeviceV1_0;
use ash::vk;

use crate::error::{Result, RhiError};
use crate::rhi::structs::PipelineLayoutDesc;
use crate::rhi::traits::{BindingGroup, PipelineLayout};
use crate::rhi::vulkan::convert::{descriptor_type_to_vk, shader_stage_flags_to_vk};
use crate::rhi::vulkan::device::VulkanDevice;
use crate::rhi::vulkan::resource::VulkanBuffer;
use crate::rhi::vulkan::sampler::VulkanSampler;
use crate::rhi::vulkan::view::{VulkanShaderResourceView, VulkanUnorderedAccessView};
use crate::rhi::vulkan::Vulkan;
use crate::rhi::cache::Handle;

/// Descriptor sets allocated per pipeline layout before `obtain_binding_group` starts failing with
/// [`crate::error::RhiError::ResourceExhausted`] (§4.4).
const MAX_SETS_PER_LAYOUT: u32 = 64;

/// The merged binding schema shared by every pipeline state built against it (§4.4).
pub struct VulkanPipelineLayout {
    device: VulkanDevice,
    pub(crate) descriptor_set_layout: vk::DescriptorSetLayout,
    pub(crate) pipeline_layout: vk::PipelineLayout,
    descriptor_pool: vk::DescriptorPool,
}

impl VulkanPipelineLayout {
    pub(crate) fn new(device: VulkanDevice, desc: &PipelineLayoutDesc) -> Result<VulkanPipelineLayout> {
        let bindings: Vec<vk::DescriptorSetLayoutBinding> = desc
            .bindings
            .iter()
            .map(|slot| {
                vk::DescriptorSetLayoutBinding::builder()
                    .binding(slot.binding)
                    .descriptor_type(descriptor_type_to_vk(slot.descriptor_type))
                    .descriptor_count(slot.count)
                    .stage_flags(shader_stage_flags_to_vk(slot.stages))
                    .build()
            })
            .collect();

        let layout_info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&bindings).build();
        let descriptor_set_layout = unsafe { device.raw().create_descriptor_set_layout(&layout_info, None) }
            .map_err(|err| RhiError::resource_exhausted(format!("failed to create descriptor set layout: {:?}", err)))?;

        let set_layouts = [descriptor_set_layout];
        let pipeline_layout_info = vk::PipelineLayoutCreateInfo::builder().set_layouts(&set_layouts).build();
        let pipeline_layout = match unsafe { device.raw().create_pipeline_layout(&pipeline_layout_info, None) } {
            Ok(layout) => layout,
            Err(err) => {
                unsafe { device.raw().destroy_descriptor_set_layout(descriptor_set_layout, None) };
                return Err(RhiError::resource_exhausted(format!("failed to create pipeline layout: {:?}", err)));
            }
        };

        let pool_sizes = pool_sizes_for(&desc.bindings);
        let pool_info = vk::DescriptorPoolCreateInfo::builder()
            .max_sets(MAX_SETS_PER_LAYOUT)
            .pool_sizes(&pool_sizes)
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .build();
        let descriptor_pool = match unsafe { device.raw().create_descriptor_pool(&pool_info, None) } {
            Ok(pool) => pool,
            Err(err) => {
                unsafe {
                    device.raw().destroy_pipeline_layout(pipeline_layout, None);
                    device.raw().destroy_descriptor_set_layout(descriptor_set_layout, None);
                }
                return Err(RhiError::resource_exhausted(format!("failed to create descriptor pool: {:?}", err)));
            }
        };

        Ok(VulkanPipelineLayout { device, descriptor_set_layout, pipeline_layout, descriptor_pool })
    }
}

fn pool_sizes_for(bindings: &[crate::rhi::structs::BindingSlot]) -> Vec<vk::DescriptorPoolSize> {
    use std::collections::HashMap;
    let mut counts: HashMap<vk::DescriptorType, u32> = HashMap::new();
    for binding in bindings {
        *counts.entry(descriptor_type_to_vk(binding.descriptor_type)).or_insert(0) += binding.count * MAX_SETS_PER_LAYOUT;
    }
    counts
        .into_iter()
        .map(|(ty, count)| vk::DescriptorPoolSize { ty, descriptor_count: count })
        .collect()
}

impl Drop for VulkanPipelineLayout {
    fn drop(&mut self) {
        unsafe {
            let raw = self.device.raw();
            raw.destroy_descriptor_pool(self.descriptor_pool, None);
            raw.destroy_pipeline_layout(self.pipeline_layout, None);
            raw.destroy_descriptor_set_layout(self.descriptor_set_layout, None);
        }
    }
}

impl PipelineLayout<Vulkan> for VulkanPipelineLayout {
    fn obtain_binding_group(&self) -> Result<VulkanBindingGroup> {
        let set_layouts = [self.descriptor_set_layout];
        let alloc_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(self.descriptor_pool)
            .set_layouts(&set_layouts)
            .build();

        let set = unsafe { self.device.raw().allocate_descriptor_sets(&alloc_info) }
            .map_err(|_| RhiError::resource_exhausted("descriptor pool exhausted"))?[0];

        Ok(VulkanBindingGroup {
            device: self.device.clone(),
            pool: self.descriptor_pool,
            pipeline_layout: self.pipeline_layout,
            set,
            lock: Mutex::new(()),
        })
    }
}

/// One allocated, writable descriptor set (§3, §4.4). Returned to its owning pool when dropped.
pub struct VulkanBindingGroup {
    device: VulkanDevice,
    pool: vk::DescriptorPool,
    pipeline_layout: vk::PipelineLayout,
    pub(crate) set: vk::DescriptorSet,
    lock: Mutex<()>,
}

impl VulkanBindingGroup {
    /// The native pipeline layout this descriptor set is compatible with, used by
    /// `vkCmdBindDescriptorSets` calls in [`crate::rhi::vulkan::encoder`].
    pub(crate) fn pipeline_layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }
}

impl Drop for VulkanBindingGroup {
    fn drop(&mut self) {
        unsafe {
            let sets = [self.set];
            self.device.raw().free_descriptor_sets(self.pool, &sets).ok();
        }
    }
}

impl BindingGroup<Vulkan> for VulkanBindingGroup {
    fn update_buffer(&self, slot: u32, buffer: &Handle<VulkanBuffer>) {
        let _guard = self.lock.lock().unwrap();
        let buffer_info = vk::DescriptorBufferInfo { buffer: buffer.buffer, offset: 0, range: vk::WHOLE_SIZE };
        let buffer_infos = [buffer_info];
        let write = vk::WriteDescriptorSet::builder()
            .dst_set(self.set)
            .dst_binding(slot)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .buffer_info(&buffer_infos)
            .build();
        unsafe { self.device.raw().update_descriptor_sets(&[write], &[]) };
    }

    fn update_image(&self, slot: u32, view: &VulkanShaderResourceView, sampler: &VulkanSampler) {
        let _guard = self.lock.lock().unwrap();
        let image_info = vk::DescriptorImageInfo {
            sampler: sampler.sampler,
            image_view: view.view,
            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        };
        let image_infos = [image_info];
        let write = vk::WriteDescriptorSet::builder()
            .dst_set(self.set)
            .dst_binding(slot)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(&image_infos)
            .build();
        unsafe { self.device.raw().update_descriptor_sets(&[write], &[]) };
    }

    fn update_storage_image(&self, slot: u32, view: &VulkanUnorderedAccessView) {
        let _guard = self.lock.lock().unwrap();
        let image_info = vk::DescriptorImageInfo {
            sampler: vk::Sampler::null(),
            image_view: view.view,
            image_layout: vk::ImageLayout::GENERAL,
        };
        let image_infos = [image_info];
        let write = vk::WriteDescriptorSet::builder()
            .dst_set(self.set)
            .dst_binding(slot)
            .descriptor_type(vk::DescriptorType::STORAGE_IMAGE)
            .image_info(&image_infos)
            .build();
        unsafe { self.device.raw().update_descriptor_sets(&[write], &[]) };
    }
}

