//! Render and compute pipeline state objects (§3, §4.5, §8).
//!
//! Grounded on `vulkan_pipeline_state.rs`'s lazily-built, cache-backed pipeline object; this
//! back-end never compiles a shader bundle, so `rebuild` only flips a built flag, after routing
//! every bundle through [`ignore_unused_bundle`] the same way an unused-but-accepted stage would
//! be on any back-end that skips compilation.

use std::path::Path;

use crate::error::{Result, RhiError};
use crate::rhi::cache::Handle;
use crate::rhi::mock::render_pass::MockRenderPass;
use crate::rhi::mock::Mock;
use crate::rhi::structs::{ComputePipelineDesc, RenderPipelineDesc};
use crate::rhi::traits::{ignore_unused_bundle, PipelineState, PipelineStateKind};

const CACHE_MAGIC: &[u8] = b"MOCKPSO1";

enum Source {
    Render { desc: RenderPipelineDesc, render_pass: Handle<MockRenderPass> },
    Compute { desc: ComputePipelineDesc },
}

/// A lazily-built pipeline state object (§3, §4.5, §8). There is no native pipeline to compile;
/// `built` models the same "rebuild is idempotent once built" contract the Vulkan back-end
/// honors.
pub struct MockPipelineState {
    built: bool,
    kind: PipelineStateKind,
    source: Source,
}

impl MockPipelineState {
    pub(crate) fn new_render(desc: &RenderPipelineDesc, render_pass: Handle<MockRenderPass>) -> Result<MockPipelineState> {
        let mut state =
            MockPipelineState { built: false, kind: PipelineStateKind::Render, source: Source::Render { desc: desc.clone(), render_pass } };
        state.rebuild()?;
        Ok(state)
    }

    pub(crate) fn new_compute(desc: &ComputePipelineDesc) -> Result<MockPipelineState> {
        let mut state = MockPipelineState { built: false, kind: PipelineStateKind::Compute, source: Source::Compute { desc: desc.clone() } };
        state.rebuild()?;
        Ok(state)
    }
}

impl PipelineState<Mock> for MockPipelineState {
    fn kind(&self) -> PipelineStateKind {
        self.kind
    }

    fn rebuild(&mut self) -> Result<()> {
        if self.built {
            return Ok(());
        }
        match &self.source {
            Source::Render { desc, .. } => {
                for bundle in [&desc.shaders.vertex, &desc.shaders.fragment, &desc.shaders.geometry, &desc.shaders.domain, &desc.shaders.hull] {
                    if let Some(bundle) = bundle {
                        ignore_unused_bundle(bundle);
                    }
                }
            }
            Source::Compute { desc } => ignore_unused_bundle(&desc.shader),
        }
        self.built = true;
        Ok(())
    }

    fn save_cache(&self, path: &Path) -> Result<()> {
        std::fs::write(path, CACHE_MAGIC).map_err(|err| RhiError::unsupported(format!("failed to write pipeline cache to disk: {}", err)))
    }

    fn load_cache(&mut self, path: &Path) -> Result<()> {
        let data = std::fs::read(path).map_err(|err| RhiError::not_found(format!("pipeline cache file not found: {}", err)))?;
        if data != CACHE_MAGIC {
            return Err(RhiError::invalid_argument("pipeline cache file has an unrecognized format"));
        }
        self.built = true;
        Ok(())
    }
}
