//! Cached framebuffers, keyed by attachment identity and dimensions (§4.6).
//!
//! Grounded on `vulkan_framebuffer.rs::obtain_framebuffer`'s cache-check-then-insert pattern,
//! reproduced verbatim here against the mock resource cache instead of a native framebuffer pool.

use crate::error::Result;
use crate::rhi::cache::{hash_framebuffer_key, Handle};
use crate::rhi::mock::device::MockDevice;
use crate::rhi::mock::render_pass::MockRenderPass;
use crate::rhi::mock::view::MockShaderResourceView;

/// A cached framebuffer bound to one concrete set of attachment views (§4.6).
pub struct MockFramebuffer {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl MockFramebuffer {
    fn new(width: u32, height: u32) -> MockFramebuffer {
        MockFramebuffer { width, height }
    }
}

/// Looks up, or builds and caches, the framebuffer matching this exact attachment set (§4.6).
pub(crate) fn obtain_framebuffer(
    device: &MockDevice,
    render_pass: &Handle<MockRenderPass>,
    color_views: &[&MockShaderResourceView],
    depth_stencil_view: Option<&MockShaderResourceView>,
    width: u32,
    height: u32,
) -> Result<Handle<MockFramebuffer>> {
    let render_pass_identity = std::sync::Arc::as_ptr(render_pass) as usize;
    let mut view_identities: Vec<usize> = color_views.iter().map(|view| view.identity()).collect();
    if let Some(view) = depth_stencil_view {
        view_identities.push(view.identity());
    }

    let key = hash_framebuffer_key(render_pass_identity, &view_identities, width, height);

    {
        let cache = device.framebuffer_cache().lock().unwrap();
        if let Some(existing) = cache.get(&key) {
            return Ok(existing.clone());
        }
    }

    let framebuffer = Handle::new(MockFramebuffer::new(width, height));
    device.framebuffer_cache().lock().unwrap().insert(key, framebuffer.clone());
    Ok(framebuffer)
}
