#![allow(unsafe_code)]
//! Cached render-pass objects (§3, §4.6).
//!
//! Grounded on `vulkan_renderpass.rs`'s attachment-description/subpass/subpass-dependency
//! assembly. The teacher's version special-cases an attachment literally named `"Backbuffer"` to
//! read its format and layout from the engine's own swapchain object; this design has no such
//! coupling; every attachment's format and clear behavior is already fully described by its
//! `AttachmentDesc` (§4.6).

use ash::version::DeviceV1_0;
use ash::vk;

use crate::error::{Result, RhiError};
use crate::rhi::structs::RenderPassDesc;
use crate::rhi::vulkan::convert::*;
use crate::rhi::vulkan::device::VulkanDevice;

/// A cached, content-addressed render pass (§4.6).
pub struct VulkanRenderPass {
    device: VulkanDevice,
    pub(crate) render_pass: vk::RenderPass,
    pub(crate) color_attachment_count: usize,
    pub(crate) has_depth_stencil: bool,
}

impl VulkanRenderPass {
    pub(crate) fn new(device: &VulkanDevice, desc: &RenderPassDesc) -> Result<VulkanRenderPass> {
        let mut attachment_descs = Vec::with_capacity(desc.color_attachments.len() + 1);
        let mut color_refs = Vec::with_capacity(desc.color_attachments.len());

        for (index, attachment) in desc.color_attachments.iter().enumerate() {
            attachment_descs.push(
                vk::AttachmentDescription::builder()
                    .format(pixel_format_to_vk(attachment.format))
                    .samples(vk::SampleCountFlags::TYPE_1)
                    .load_op(load_op_to_vk(attachment.load_op))
                    .store_op(store_op_to_vk(attachment.store_op))
                    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .initial_layout(vk::ImageLayout::UNDEFINED)
                    .final_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                    .build(),
            );
            color_refs.push(vk::AttachmentReference {
                attachment: index as u32,
                layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            });
        }

        let depth_ref = desc.depth_stencil_attachment.map(|attachment| {
            let attachment_index = attachment_descs.len() as u32;
            attachment_descs.push(
                vk::AttachmentDescription::builder()
                    .format(pixel_format_to_vk(attachment.format))
                    .samples(vk::SampleCountFlags::TYPE_1)
                    .load_op(load_op_to_vk(attachment.load_op))
                    .store_op(store_op_to_vk(attachment.store_op))
                    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .initial_layout(vk::ImageLayout::UNDEFINED)
                    .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
                    .build(),
            );
            vk::AttachmentReference { attachment: attachment_index, layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL }
        });

        let mut subpass_builder = vk::SubpassDescription::builder()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs);
        if let Some(depth_ref) = depth_ref.as_ref() {
            subpass_builder = subpass_builder.depth_stencil_attachment(depth_ref);
        }
        let subpass = subpass_builder.build();

        let dependency = vk::SubpassDependency::builder()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)
            .build();

        let subpasses = [subpass];
        let dependencies = [dependency];
        let render_pass_info = vk::RenderPassCreateInfo::builder()
            .attachments(&attachment_descs)
            .subpasses(&subpasses)
            .dependencies(&dependencies)
            .build();

        let render_pass = unsafe { device.raw().create_render_pass(&render_pass_info, None) }
            .map_err(|err| RhiError::resource_exhausted(format!("failed to create render pass: {:?}", err)))?;

        Ok(VulkanRenderPass {
            device: device.clone(),
            render_pass,
            color_attachment_count: desc.color_attachments.len(),
            has_depth_stencil: desc.depth_stencil_attachment.is_some(),
        })
    }
}

impl Drop for VulkanRenderPass {
    fn drop(&mut self) {
        unsafe { self.device.raw().destroy_render_pass(self.render_pass, None) };
    }
}
