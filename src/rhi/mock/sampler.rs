//! Immutable sampler state (§3).
//!
//! Grounded on `vulkan_sampler.rs`; this back-end builds no native sampler object, so a sampler is
//! just the descriptor snapshot it was created from.

use crate::rhi::structs::SamplerDesc;

/// An immutable sampler descriptor (§3).
#[derive(Clone, Copy)]
pub struct MockSampler {
    pub(crate) desc: SamplerDesc,
}

impl MockSampler {
    pub(crate) fn new(desc: &SamplerDesc) -> MockSampler {
        MockSampler { desc: *desc }
    }
}
