//! Exercises the in-memory back-end end to end: device enumeration, buffer/texture lifetime,
//! render-pass and framebuffer caching, swapchain acquire/resize, and descriptor-pool exhaustion.

use cgmath::Vector2;

use vkrhi::config::RhiConfig;
use vkrhi::rhi::cache::Handle;
use vkrhi::rhi::enums::{
    BufferViewFlags, ImageAspectFlags, MemoryAccessFlags, PixelFormat, PresentMode, QueueType, ResourceCreationFlags, ResourceState,
    TextureDimension, TextureViewFlags,
};
use vkrhi::rhi::mock::{Mock, MockFactory};
use vkrhi::rhi::structs::{
    BufferCopyRegion, BufferDesc, Extent2D, Extent3D, PlacedSubresourceFootprint, SubResourceRange, SubResourceSpec, SwapchainDesc,
    TextureDesc, ViewDesc,
};
use vkrhi::rhi::traits::{CommandBuffer, CommandQueue, Device, Factory, GpuBuffer, GpuResource, PipelineLayout, Swapchain};
use vkrhi::rhi::PipelineLayoutDesc;
use vkrhi::surface::{Surface, SurfaceError};

struct HeadlessWindow {
    size: Vector2<u32>,
}

impl Surface<()> for HeadlessWindow {
    fn platform_object(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn get_current_size(&self) -> Vector2<u32> {
        self.size
    }
}

fn buffer_desc(size: u64) -> BufferDesc {
    BufferDesc {
        size,
        view_flags: BufferViewFlags::STORAGE,
        creation_flags: ResourceCreationFlags::empty(),
        access_flags: MemoryAccessFlags::HOST_VISIBLE | MemoryAccessFlags::HOST_COHERENT,
        debug_name: Some("test buffer".to_string()),
    }
}

fn texture_desc(extent: Extent3D) -> TextureDesc {
    TextureDesc {
        dimension: TextureDimension::D2,
        extent,
        mip_levels: 1,
        array_layers: 1,
        format: PixelFormat::Rgba8Unorm,
        sample_count: 1,
        view_flags: TextureViewFlags::SHADER_RESOURCE,
        creation_flags: ResourceCreationFlags::TRANSFER_DST,
        access_flags: MemoryAccessFlags::DEVICE_LOCAL,
        debug_name: None,
    }
}

fn open_device() -> vkrhi::rhi::mock::MockDevice {
    let factory = MockFactory::new(&RhiConfig::default());
    factory.enumerate_devices().unwrap().remove(0)
}

#[test]
fn enumerate_devices_reports_the_fixed_adapter() {
    let device = open_device();
    assert_eq!(device.properties().device_name, "Mock Adapter");
}

#[test]
fn buffer_rejects_zero_size() {
    let device = open_device();
    let err = device.create_buffer(&buffer_desc(0)).unwrap_err();
    assert!(matches!(err, vkrhi::error::RhiError::InvalidArgument { .. }));
}

#[test]
fn buffer_map_write_unmap_round_trips_bytes() {
    let device = open_device();
    let buffer = device.create_buffer(&buffer_desc(16)).unwrap();
    assert_eq!(buffer.state(), ResourceState::Undefined);

    unsafe {
        let ptr = buffer.map(0, 16).unwrap();
        std::ptr::write_bytes(ptr, 0xAB, 16);
    }
    assert_eq!(buffer.state(), ResourceState::Mapped);
    buffer.unmap();

    unsafe {
        let ptr = buffer.map(0, 16).unwrap();
        assert_eq!(*ptr, 0xAB);
        buffer.unmap();
    }
}

#[test]
fn map_past_buffer_end_is_rejected() {
    let device = open_device();
    let buffer = device.create_buffer(&buffer_desc(16)).unwrap();
    let err = unsafe { buffer.map(8, 16) }.unwrap_err();
    assert!(matches!(err, vkrhi::error::RhiError::InvalidArgument { .. }));
}

#[test]
fn texture_subresource_layout_matches_tight_packing() {
    let device = open_device();
    let extent = Extent3D { width: 4, height: 2, depth: 1 };
    let texture = device.create_texture(&texture_desc(extent)).unwrap();

    let layout = device
        .query_texture_subresource_layout(&texture, SubResourceSpec { aspect: ImageAspectFlags::COLOR, mip_level: 0, array_layer: 0 })
        .unwrap();

    assert_eq!(layout.row_pitch, 4 * 4);
    assert_eq!(layout.size, 4 * 4 * 2);
    assert_eq!(layout.offset, 0);
}

#[test]
fn copy_buffer_moves_bytes_between_mock_buffers() {
    let device = open_device();
    let queue = device.create_command_queue(QueueType::Graphics).unwrap();
    let mut command_buffer = queue.obtain_command_buffer(vkrhi::rhi::enums::CommandBufferLevel::Primary).unwrap();

    let src = device.create_buffer(&buffer_desc(8)).unwrap();
    let dst = device.create_buffer(&buffer_desc(8)).unwrap();
    unsafe {
        let ptr = src.map(0, 8).unwrap();
        std::ptr::write_bytes(ptr, 0x42, 8);
        src.unmap();
    }

    command_buffer.copy_buffer(&dst, &src, BufferCopyRegion { src_offset: 0, dst_offset: 0, size: 8 }).unwrap();

    unsafe {
        let ptr = dst.map(0, 8).unwrap();
        for offset in 0..8 {
            assert_eq!(*ptr.add(offset), 0x42);
        }
        dst.unmap();
    }
}

#[test]
fn copy_buffer_rejects_an_out_of_bounds_region() {
    let device = open_device();
    let queue = device.create_command_queue(QueueType::Graphics).unwrap();
    let mut command_buffer = queue.obtain_command_buffer(vkrhi::rhi::enums::CommandBufferLevel::Primary).unwrap();

    let src = device.create_buffer(&buffer_desc(8)).unwrap();
    let dst = device.create_buffer(&buffer_desc(8)).unwrap();

    let err = command_buffer.copy_buffer(&dst, &src, BufferCopyRegion { src_offset: 0, dst_offset: 0, size: 9 }).unwrap_err();
    assert!(matches!(err, vkrhi::error::RhiError::InvalidArgument { .. }));
}

#[test]
fn copy_texture_places_bytes_at_the_requested_offset() {
    let device = open_device();
    let queue = device.create_command_queue(QueueType::Graphics).unwrap();
    let mut command_buffer = queue.obtain_command_buffer(vkrhi::rhi::enums::CommandBufferLevel::Primary).unwrap();

    let staging = device.create_buffer(&buffer_desc(16)).unwrap();
    unsafe {
        let ptr = staging.map(0, 16).unwrap();
        std::ptr::write_bytes(ptr, 0x7E, 16);
        staging.unmap();
    }
    let texture = device.create_texture(&texture_desc(Extent3D { width: 4, height: 4, depth: 1 })).unwrap();

    command_buffer
        .copy_texture(
            &texture,
            &staging,
            PlacedSubresourceFootprint {
                buffer_offset: 0,
                row_pitch: 16,
                image_extent: Extent3D { width: 4, height: 1, depth: 1 },
                image_offset: vkrhi::rhi::structs::Offset3D { x: 0, y: 0, z: 0 },
            },
        )
        .unwrap();

    let view = device.create_shader_resource_view(&texture, &ViewDesc { range: SubResourceRange::default(), format: None }).unwrap();
    let _ = view;
}

#[test]
fn render_pass_lookups_with_identical_descriptors_share_one_cache_entry() {
    let device = open_device();
    let desc = vkrhi::rhi::structs::RenderPassDesc {
        color_attachments: vec![vkrhi::rhi::structs::AttachmentDesc {
            format: PixelFormat::Rgba8Unorm,
            load_op: vkrhi::rhi::structs::LoadOp::Clear,
            store_op: vkrhi::rhi::structs::StoreOp::Store,
        }],
        depth_stencil_attachment: None,
    };

    let first = device.create_render_pass(&desc).unwrap();
    let second = device.create_render_pass(&desc).unwrap();
    assert!(Handle::ptr_eq(&first, &second));
}

#[test]
fn pipeline_layout_exhausts_after_max_sets() {
    let device = open_device();
    let layout = device.create_pipeline_layout(&PipelineLayoutDesc::default()).unwrap();

    for _ in 0..64 {
        layout.obtain_binding_group().unwrap();
    }
    let err = layout.obtain_binding_group().unwrap_err();
    assert!(matches!(err, vkrhi::error::RhiError::ResourceExhausted { .. }));
}

#[test]
fn fence_is_unsignaled_until_a_command_buffer_commits_with_it() {
    let device = open_device();
    let queue = device.create_command_queue(QueueType::Graphics).unwrap();
    let mut command_buffer = queue.obtain_command_buffer(vkrhi::rhi::enums::CommandBufferLevel::Primary).unwrap();
    let fence = device.create_fence().unwrap();

    assert!(!vkrhi::rhi::traits::Fence::is_signaled(&fence).unwrap());
    command_buffer.commit(Some(&fence)).unwrap();
    assert!(vkrhi::rhi::traits::Fence::is_signaled(&fence).unwrap());
}

#[test]
fn swapchain_acquire_cycles_through_backbuffers_and_resize_rebuilds_them() {
    let device = open_device();
    let queue = device.create_command_queue(QueueType::Graphics).unwrap();
    let factory = MockFactory::new(&RhiConfig::default());
    let mut window = HeadlessWindow { size: Vector2::new(640, 480) };
    let mut desc = SwapchainDesc { format: PixelFormat::Bgra8Unorm, extent: Extent2D { width: 0, height: 0 }, buffer_count: 2, present_mode: PresentMode::Fifo };

    let mut swapchain: <Mock as vkrhi::rhi::traits::Backend>::Swapchain =
        Factory::<Mock>::create_swapchain(&factory, &device, &queue, &mut window, &mut desc).unwrap();

    assert_eq!(swapchain.extent(), Extent2D { width: 640, height: 480 });
    let first_index = swapchain.current_index();
    swapchain.acquire_next_image().unwrap();
    assert_ne!(swapchain.current_index(), first_index);

    swapchain.resize(320, 240).unwrap();
    assert_eq!(swapchain.extent(), Extent2D { width: 320, height: 240 });
}
