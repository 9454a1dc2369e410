//! Shader-resource and unordered-access views over a texture (§3, §4.3).
//!
//! Grounded on `vulkan_view.rs`; this back-end builds no native image view, so a view is just the
//! `(texture, sub-resource range, format)` triple `ViewDesc` already carries, plus the identity
//! helper the framebuffer cache keys on.

use std::sync::Arc;

use crate::rhi::cache::Handle;
use crate::rhi::enums::PixelFormat;
use crate::rhi::mock::resource::MockTexture;
use crate::rhi::structs::{SubResourceRange, ViewDesc};

/// A read-only view over a texture (§3, §4.3).
#[derive(Clone)]
pub struct MockShaderResourceView {
    pub(crate) texture: Handle<MockTexture>,
    pub(crate) range: SubResourceRange,
    pub(crate) format: Option<PixelFormat>,
}

impl MockShaderResourceView {
    pub(crate) fn new(texture: &Handle<MockTexture>, desc: &ViewDesc) -> MockShaderResourceView {
        MockShaderResourceView { texture: texture.clone(), range: desc.range, format: desc.format }
    }

    /// Stable identity of this view's target texture, used to key the framebuffer cache (§4.6).
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.texture) as usize
    }
}

/// A read-write view over a texture (§3, §4.3).
#[derive(Clone)]
pub struct MockUnorderedAccessView {
    pub(crate) texture: Handle<MockTexture>,
    pub(crate) range: SubResourceRange,
    pub(crate) format: Option<PixelFormat>,
}

impl MockUnorderedAccessView {
    pub(crate) fn new(texture: &Handle<MockTexture>, desc: &ViewDesc) -> MockUnorderedAccessView {
        MockUnorderedAccessView { texture: texture.clone(), range: desc.range, format: desc.format }
    }
}
