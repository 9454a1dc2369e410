#![allow(unsafe_code)]
//! Render and compute pipeline state objects (§3, §4.5).
//!
//! Grounded on `vulkan_pipeline.rs`'s assembly of vertex-input/input-assembly/viewport/
//! rasterizer/multisample/depth-stencil/color-blend state into one `vkCreateGraphicsPipelines`
//! call. `rebuild`/`save_cache`/`load_cache` (§8) are grounded on the `vk::PipelineCache` object
//! the same file creates but never persists — this crate adds the persistence the original never
//! wired up (§9 supplement).

use std::ffi::CString;
use std::path::Path;

use ash::version::DeviceV1_0;
use ash::vk;

use crate::error::{Result, RhiError};
use crate::rhi::structs::{ComputePipelineDesc, RenderPipelineDesc};
use crate::rhi::traits::{PipelineState, PipelineStateKind};
use crate::rhi::vulkan::convert::*;
use crate::rhi::vulkan::device::VulkanDevice;
use crate::rhi::vulkan::pipeline_layout::VulkanPipelineLayout;
use crate::rhi::vulkan::render_pass::VulkanRenderPass;
use crate::rhi::vulkan::Vulkan;
use crate::rhi::cache::Handle;
use crate::shader::ShaderBundle;

enum Source {
    Render {
        desc: RenderPipelineDesc,
        render_pass: Handle<VulkanRenderPass>,
    },
    Compute {
        desc: ComputePipelineDesc,
    },
}

/// A lazily-built, cache-backed pipeline state object (§3, §4.5, §8).
pub struct VulkanPipelineState {
    device: VulkanDevice,
    layout: vk::PipelineLayout,
    pipeline: Option<vk::Pipeline>,
    pipeline_cache: vk::PipelineCache,
    kind: PipelineStateKind,
    source: Source,
}

fn create_shader_module(device: &VulkanDevice, bundle: &ShaderBundle) -> Result<vk::ShaderModule> {
    if bundle.raw_code.len() % 4 != 0 {
        return Err(RhiError::invalid_argument("SPIR-V byte code must be a multiple of 4 bytes"));
    }
    let code: Vec<u32> = bundle
        .raw_code
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    let module_info = vk::ShaderModuleCreateInfo::builder().code(&code).build();
    unsafe { device.raw().create_shader_module(&module_info, None) }
        .map_err(|err| RhiError::unsupported(format!("failed to create shader module: {:?}", err)))
}

impl VulkanPipelineState {
    pub(crate) fn new_render(
        device: VulkanDevice,
        desc: &RenderPipelineDesc,
        layout: &VulkanPipelineLayout,
        render_pass: Handle<VulkanRenderPass>,
    ) -> Result<VulkanPipelineState> {
        let cache_info = vk::PipelineCacheCreateInfo::builder().build();
        let pipeline_cache = unsafe { device.raw().create_pipeline_cache(&cache_info, None) }
            .map_err(|err| RhiError::resource_exhausted(format!("failed to create pipeline cache: {:?}", err)))?;

        let mut state = VulkanPipelineState {
            device,
            layout: layout.pipeline_layout,
            pipeline: None,
            pipeline_cache,
            kind: PipelineStateKind::Render,
            source: Source::Render { desc: desc.clone(), render_pass },
        };
        state.rebuild()?;
        Ok(state)
    }

    pub(crate) fn new_compute(device: VulkanDevice, desc: &ComputePipelineDesc, layout: &VulkanPipelineLayout) -> Result<VulkanPipelineState> {
        let cache_info = vk::PipelineCacheCreateInfo::builder().build();
        let pipeline_cache = unsafe { device.raw().create_pipeline_cache(&cache_info, None) }
            .map_err(|err| RhiError::resource_exhausted(format!("failed to create pipeline cache: {:?}", err)))?;

        let mut state = VulkanPipelineState {
            device,
            layout: layout.pipeline_layout,
            pipeline: None,
            pipeline_cache,
            kind: PipelineStateKind::Compute,
            source: Source::Compute { desc: desc.clone() },
        };
        state.rebuild()?;
        Ok(state)
    }

    fn build_render(&self, desc: &RenderPipelineDesc, render_pass: &Handle<VulkanRenderPass>) -> Result<vk::Pipeline> {
        let mut modules = Vec::new();
        let mut stages = Vec::new();
        let entry_point = CString::new("main").unwrap();

        macro_rules! add_stage {
            ($bundle:expr, $stage_flag:expr) => {
                if let Some(bundle) = $bundle {
                    let module = create_shader_module(&self.device, bundle)?;
                    stages.push(
                        vk::PipelineShaderStageCreateInfo::builder()
                            .stage($stage_flag)
                            .module(module)
                            .name(&entry_point)
                            .build(),
                    );
                    modules.push(module);
                }
            };
        }
        add_stage!(&desc.shaders.vertex, vk::ShaderStageFlags::VERTEX);
        add_stage!(&desc.shaders.fragment, vk::ShaderStageFlags::FRAGMENT);
        add_stage!(&desc.shaders.geometry, vk::ShaderStageFlags::GEOMETRY);
        add_stage!(&desc.shaders.hull, vk::ShaderStageFlags::TESSELLATION_CONTROL);
        add_stage!(&desc.shaders.domain, vk::ShaderStageFlags::TESSELLATION_EVALUATION);

        let bindings: Vec<vk::VertexInputBindingDescription> = desc
            .vertex_input
            .bindings
            .iter()
            .map(|binding| vk::VertexInputBindingDescription {
                binding: binding.binding,
                stride: binding.stride,
                input_rate: vertex_input_rate_to_vk(binding.input_rate),
            })
            .collect();
        let attributes: Vec<vk::VertexInputAttributeDescription> = desc
            .vertex_input
            .attributes
            .iter()
            .map(|attribute| vk::VertexInputAttributeDescription {
                location: attribute.location,
                binding: attribute.binding,
                format: vertex_format_from_name(attribute.format),
                offset: attribute.offset,
            })
            .collect();
        let vertex_input_info = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes)
            .build();

        let input_assembly_info = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(primitive_topology_to_vk(desc.topology))
            .build();

        let viewport_info = vk::PipelineViewportStateCreateInfo::builder().viewport_count(1).scissor_count(1).build();

        let rasterizer_info = vk::PipelineRasterizationStateCreateInfo::builder()
            .polygon_mode(fill_mode_to_vk(desc.rasterizer.fill_mode))
            .cull_mode(cull_mode_to_vk(desc.rasterizer.cull_mode))
            .front_face(front_face_to_vk(desc.rasterizer.front_face))
            .depth_bias_enable(desc.rasterizer.depth_bias != 0.0)
            .depth_bias_constant_factor(desc.rasterizer.depth_bias)
            .depth_bias_slope_factor(desc.rasterizer.depth_bias_slope_scale)
            .line_width(1.0)
            .build();

        let multisample_info = vk::PipelineMultisampleStateCreateInfo::builder()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1)
            .build();

        let depth_stencil_info = vk::PipelineDepthStencilStateCreateInfo::builder()
            .depth_test_enable(desc.depth_stencil.depth_test_enable)
            .depth_write_enable(desc.depth_stencil.depth_write_enable)
            .depth_compare_op(compare_op_to_vk(desc.depth_stencil.depth_compare_op))
            .stencil_test_enable(desc.depth_stencil.stencil_test_enable)
            .front(stencil_op_state(&desc.depth_stencil.front_face))
            .back(stencil_op_state(&desc.depth_stencil.back_face))
            .build();

        let blend_attachments: Vec<vk::PipelineColorBlendAttachmentState> = desc
            .blend
            .iter()
            .map(|blend| {
                vk::PipelineColorBlendAttachmentState::builder()
                    .blend_enable(blend.enabled)
                    .src_color_blend_factor(blend_factor_to_vk(blend.src_color))
                    .dst_color_blend_factor(blend_factor_to_vk(blend.dst_color))
                    .color_blend_op(blend_op_to_vk(blend.color_op))
                    .src_alpha_blend_factor(blend_factor_to_vk(blend.src_alpha))
                    .dst_alpha_blend_factor(blend_factor_to_vk(blend.dst_alpha))
                    .alpha_blend_op(blend_op_to_vk(blend.alpha_op))
                    .color_write_mask(vk::ColorComponentFlags::all())
                    .build()
            })
            .collect();
        let color_blend_info = vk::PipelineColorBlendStateCreateInfo::builder().attachments(&blend_attachments).build();

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state_info = vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&dynamic_states).build();

        let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stages)
            .vertex_input_state(&vertex_input_info)
            .input_assembly_state(&input_assembly_info)
            .viewport_state(&viewport_info)
            .rasterization_state(&rasterizer_info)
            .multisample_state(&multisample_info)
            .depth_stencil_state(&depth_stencil_info)
            .color_blend_state(&color_blend_info)
            .dynamic_state(&dynamic_state_info)
            .layout(self.layout)
            .render_pass(render_pass.render_pass)
            .subpass(0)
            .build();

        let result = unsafe {
            self.device
                .raw()
                .create_graphics_pipelines(self.pipeline_cache, &[pipeline_info], None)
        };

        for module in modules {
            unsafe { self.device.raw().destroy_shader_module(module, None) };
        }

        match result {
            Ok(pipelines) => Ok(pipelines[0]),
            Err((_, err)) => Err(RhiError::unsupported(format!("failed to create graphics pipeline: {:?}", err))),
        }
    }

    fn build_compute(&self, desc: &ComputePipelineDesc) -> Result<vk::Pipeline> {
        let module = create_shader_module(&self.device, &desc.shader)?;
        let entry_point = CString::new("main").unwrap();

        let stage = vk::PipelineShaderStageCreateInfo::builder()
            .stage(vk::ShaderStageFlags::COMPUTE)
            .module(module)
            .name(&entry_point)
            .build();

        let pipeline_info = vk::ComputePipelineCreateInfo::builder().stage(stage).layout(self.layout).build();

        let result = unsafe {
            self.device
                .raw()
                .create_compute_pipelines(self.pipeline_cache, &[pipeline_info], None)
        };

        unsafe { self.device.raw().destroy_shader_module(module, None) };

        match result {
            Ok(pipelines) => Ok(pipelines[0]),
            Err((_, err)) => Err(RhiError::unsupported(format!("failed to create compute pipeline: {:?}", err))),
        }
    }

    /// The bound native pipeline handle. Both constructors call `rebuild` before returning, so
    /// this is populated for the lifetime of every reachable `VulkanPipelineState`.
    pub(crate) fn native(&self) -> vk::Pipeline {
        self.pipeline.expect("pipeline state built by constructor")
    }
}

fn stencil_op_state(face: &crate::rhi::structs::StencilFaceDesc) -> vk::StencilOpState {
    vk::StencilOpState {
        fail_op: stencil_op_to_vk(face.fail_op),
        pass_op: stencil_op_to_vk(face.pass_op),
        depth_fail_op: stencil_op_to_vk(face.depth_fail_op),
        compare_op: compare_op_to_vk(face.compare_op),
        compare_mask: 0xFF,
        write_mask: 0xFF,
        reference: 0,
    }
}

fn vertex_format_from_name(name: &str) -> vk::Format {
    match name {
        "float" => vk::Format::R32_SFLOAT,
        "vec2" => vk::Format::R32G32_SFLOAT,
        "vec3" => vk::Format::R32G32B32_SFLOAT,
        "vec4" => vk::Format::R32G32B32A32_SFLOAT,
        "int" => vk::Format::R32_SINT,
        "uint" => vk::Format::R32_UINT,
        _ => vk::Format::R32G32B32A32_SFLOAT,
    }
}

impl Drop for VulkanPipelineState {
    fn drop(&mut self) {
        unsafe {
            if let Some(pipeline) = self.pipeline {
                self.device.raw().destroy_pipeline(pipeline, None);
            }
            self.device.raw().destroy_pipeline_cache(self.pipeline_cache, None);
        }
    }
}

impl PipelineState<Vulkan> for VulkanPipelineState {
    fn kind(&self) -> PipelineStateKind {
        self.kind
    }

    fn rebuild(&mut self) -> Result<()> {
        if self.pipeline.is_some() {
            return Ok(());
        }
        let pipeline = match &self.source {
            Source::Render { desc, render_pass } => self.build_render(desc, render_pass)?,
            Source::Compute { desc } => self.build_compute(desc)?,
        };
        self.pipeline = Some(pipeline);
        Ok(())
    }

    fn save_cache(&self, path: &Path) -> Result<()> {
        let data = unsafe { self.device.raw().get_pipeline_cache_data(self.pipeline_cache) }
            .map_err(|err| RhiError::unsupported(format!("failed to read pipeline cache: {:?}", err)))?;
        std::fs::write(path, data).map_err(|err| RhiError::unsupported(format!("failed to write pipeline cache to disk: {}", err)))
    }

    fn load_cache(&mut self, path: &Path) -> Result<()> {
        let data = std::fs::read(path).map_err(|err| RhiError::not_found(format!("pipeline cache file not found: {}", err)))?;

        let cache_info = vk::PipelineCacheCreateInfo::builder().initial_data(&data).build();
        let new_cache = unsafe { self.device.raw().create_pipeline_cache(&cache_info, None) }
            .map_err(|err| RhiError::unsupported(format!("failed to load pipeline cache: {:?}", err)))?;

        unsafe { self.device.raw().destroy_pipeline_cache(self.pipeline_cache, None) };
        self.pipeline_cache = new_cache;
        Ok(())
    }
}
