//! The in-memory device: the sole creator of every mock RHI object (§4.2, §9 supplement).
//!
//! Grounded on `vulkan_device.rs`'s `DeviceInner` split and its render-pass-cache-then-insert
//! pattern; this back-end has no physical adapter to query, so [`MockFactory::enumerate_devices`]
//! always returns one fixed, software-rasterizer-class device.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::RhiConfig;
use crate::error::{Result, RhiError};
use crate::rhi::cache::{hash_render_pass_desc, Handle};
use crate::rhi::enums::*;
use crate::rhi::mock::framebuffer::MockFramebuffer;
use crate::rhi::mock::pipeline_layout::MockPipelineLayout;
use crate::rhi::mock::pipeline_state::MockPipelineState;
use crate::rhi::mock::queue::MockCommandQueue;
use crate::rhi::mock::render_pass::MockRenderPass;
use crate::rhi::mock::resource::{bytes_per_texel, MockBuffer, MockTexture};
use crate::rhi::mock::sampler::MockSampler;
use crate::rhi::mock::swapchain::MockSwapchain;
use crate::rhi::mock::sync::MockFence;
use crate::rhi::mock::view::{MockShaderResourceView, MockUnorderedAccessView};
use crate::rhi::mock::Mock;
use crate::rhi::structs::*;
use crate::rhi::traits::{Device, Factory, GpuTexture};
use crate::surface::Surface;

struct DeviceInner {
    properties: PhysicalDeviceProperties,
    memory_types: Vec<MemoryTypeInfo>,
    render_pass_cache: Mutex<HashMap<u64, Handle<MockRenderPass>>>,
    framebuffer_cache: Mutex<HashMap<u64, Handle<MockFramebuffer>>>,
}

/// The in-memory implementation of [`Device`], cheaply `Clone`-able like its Vulkan counterpart
/// (§9 Design Notes).
#[derive(Clone)]
pub struct MockDevice {
    inner: Arc<DeviceInner>,
}

impl MockDevice {
    fn new() -> MockDevice {
        MockDevice {
            inner: Arc::new(DeviceInner {
                properties: PhysicalDeviceProperties {
                    manufacturer: PhysicalDeviceManufacturer::Other,
                    device_id: 0,
                    device_name: "Mock Adapter".to_string(),
                    device_type: PhysicalDeviceType::Cpu,
                    max_color_attachments: 8,
                },
                memory_types: vec![
                    MemoryTypeInfo { index: 0, heap_index: 0, properties: MemoryAccessFlags::DEVICE_LOCAL },
                    MemoryTypeInfo {
                        index: 1,
                        heap_index: 0,
                        properties: MemoryAccessFlags::HOST_VISIBLE | MemoryAccessFlags::HOST_COHERENT,
                    },
                ],
                render_pass_cache: Mutex::new(HashMap::new()),
                framebuffer_cache: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn framebuffer_cache(&self) -> &Mutex<HashMap<u64, Handle<MockFramebuffer>>> {
        &self.inner.framebuffer_cache
    }
}

impl Device<Mock> for MockDevice {
    fn properties(&self) -> &PhysicalDeviceProperties {
        &self.inner.properties
    }

    fn create_command_queue(&self, queue_type: QueueType) -> Result<MockCommandQueue> {
        Ok(MockCommandQueue::new(self.clone(), queue_type))
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<Handle<MockBuffer>> {
        MockBuffer::new(self.clone(), desc)
    }

    fn create_texture(&self, desc: &TextureDesc) -> Result<Handle<MockTexture>> {
        MockTexture::new(self.clone(), desc)
    }

    fn create_shader_resource_view(&self, texture: &Handle<MockTexture>, desc: &ViewDesc) -> Result<MockShaderResourceView> {
        Ok(MockShaderResourceView::new(texture, desc))
    }

    fn create_unordered_access_view(&self, texture: &Handle<MockTexture>, desc: &ViewDesc) -> Result<MockUnorderedAccessView> {
        Ok(MockUnorderedAccessView::new(texture, desc))
    }

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<MockSampler> {
        Ok(MockSampler::new(desc))
    }

    fn create_pipeline_layout(&self, desc: &PipelineLayoutDesc) -> Result<MockPipelineLayout> {
        Ok(MockPipelineLayout::new(desc))
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Handle<MockRenderPass>> {
        let hash = hash_render_pass_desc(desc);
        {
            let cache = self.inner.render_pass_cache.lock().unwrap();
            if let Some(existing) = cache.get(&hash) {
                return Ok(existing.clone());
            }
        }

        let render_pass = Handle::new(MockRenderPass::new(desc));
        self.inner.render_pass_cache.lock().unwrap().insert(hash, render_pass.clone());
        Ok(render_pass)
    }

    fn create_render_pipeline_state(
        &self,
        desc: &RenderPipelineDesc,
        _layout: &MockPipelineLayout,
        render_pass: &Handle<MockRenderPass>,
    ) -> Result<MockPipelineState> {
        MockPipelineState::new_render(desc, render_pass.clone())
    }

    fn create_compute_pipeline_state(&self, desc: &ComputePipelineDesc, _layout: &MockPipelineLayout) -> Result<MockPipelineState> {
        MockPipelineState::new_compute(desc)
    }

    fn create_fence(&self) -> Result<MockFence> {
        Ok(MockFence::new())
    }

    fn find_memory_type(&self, type_bits: u32, required: MemoryAccessFlags) -> Result<u32> {
        self.inner
            .memory_types
            .iter()
            .find(|memory_type| (type_bits & (1 << memory_type.index)) != 0 && memory_type.properties.contains(required))
            .map(|memory_type| memory_type.index)
            .ok_or_else(|| RhiError::not_found("no memory type satisfies the requested access flags"))
    }

    fn query_texture_subresource_layout(&self, texture: &Handle<MockTexture>, _spec: SubResourceSpec) -> Result<SubResourceLayout> {
        let bytes_per_texel = bytes_per_texel(texture.format());
        let extent = texture.extent();
        let row_pitch = bytes_per_texel * extent.width as u64;
        let depth_pitch = row_pitch * extent.height as u64;
        Ok(SubResourceLayout {
            offset: 0,
            size: depth_pitch * extent.depth as u64,
            row_pitch,
            array_pitch: depth_pitch * extent.depth as u64,
            depth_pitch,
        })
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

/// Enumerates the fixed mock adapter and creates headless swapchains (§4.1, §9 supplement).
pub struct MockFactory {
    validation_enabled: bool,
}

impl MockFactory {
    /// There is no native instance to create; `config.enable_validation` is only recorded so
    /// [`Factory::validation_enabled`] reports the same value a caller configured, the way
    /// `VulkanFactory::new` does.
    pub fn new(config: &RhiConfig) -> MockFactory {
        MockFactory { validation_enabled: config.enable_validation }
    }
}

impl Factory<Mock> for MockFactory {
    fn enumerate_devices(&self) -> Result<Vec<MockDevice>> {
        Ok(vec![MockDevice::new()])
    }

    fn create_swapchain<W: Surface<()>>(
        &self,
        _device: &MockDevice,
        _queue: &MockCommandQueue,
        window: &mut W,
        desc: &mut SwapchainDesc,
    ) -> Result<MockSwapchain> {
        window.platform_object().map_err(|err| RhiError::invalid_argument(format!("failed to obtain native surface: {}", err)))?;
        let size = window.get_current_size();
        desc.extent = Extent2D { width: size.x, height: size.y };
        MockSwapchain::new(desc)
    }

    fn validation_enabled(&self) -> bool {
        self.validation_enabled
    }
}
