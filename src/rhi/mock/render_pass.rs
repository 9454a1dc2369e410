//! Cached render-pass descriptors (§4.6).
//!
//! Grounded on `vulkan_renderpass.rs`'s cached, hash-keyed object; this back-end has no native
//! render pass to build, so the cache is keyed on the same descriptor hash and simply retains the
//! descriptor it was built from.

use crate::rhi::structs::RenderPassDesc;

/// A cached render pass compatibility descriptor (§4.6).
pub struct MockRenderPass {
    pub(crate) desc: RenderPassDesc,
}

impl MockRenderPass {
    pub(crate) fn new(desc: &RenderPassDesc) -> MockRenderPass {
        MockRenderPass { desc: desc.clone() }
    }
}
