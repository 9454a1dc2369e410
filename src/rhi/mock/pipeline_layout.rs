//! Binding schema and allocatable binding groups (§4.4).
//!
//! Grounded on `vulkan_pipeline_layout.rs`'s fixed-size descriptor pool; this back-end has no
//! native pool to exhaust, so `MAX_SETS_PER_LAYOUT` bounds a plain atomic counter instead, keeping
//! `ResourceExhausted` observable in tests that run against either back-end.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::error::{Result, RhiError};
use crate::rhi::cache::Handle;
use crate::rhi::mock::resource::MockBuffer;
use crate::rhi::mock::sampler::MockSampler;
use crate::rhi::mock::view::{MockShaderResourceView, MockUnorderedAccessView};
use crate::rhi::mock::Mock;
use crate::rhi::structs::PipelineLayoutDesc;
use crate::rhi::traits::{BindingGroup, PipelineLayout};

const MAX_SETS_PER_LAYOUT: u32 = 64;

/// The merged binding schema shared by every pipeline state built against it (§4.4).
pub struct MockPipelineLayout {
    #[allow(dead_code)]
    bindings: PipelineLayoutDesc,
    allocated: AtomicU32,
}

impl MockPipelineLayout {
    pub(crate) fn new(desc: &PipelineLayoutDesc) -> MockPipelineLayout {
        MockPipelineLayout { bindings: desc.clone(), allocated: AtomicU32::new(0) }
    }
}

impl PipelineLayout<Mock> for MockPipelineLayout {
    fn obtain_binding_group(&self) -> Result<MockBindingGroup> {
        let previous = self.allocated.fetch_add(1, Ordering::AcqRel);
        if previous >= MAX_SETS_PER_LAYOUT {
            self.allocated.fetch_sub(1, Ordering::AcqRel);
            return Err(RhiError::resource_exhausted("descriptor pool exhausted"));
        }
        Ok(MockBindingGroup { bindings: Mutex::new(HashMap::new()) })
    }
}

enum MockBinding {
    Buffer(Handle<MockBuffer>),
    Image(MockShaderResourceView, MockSampler),
    StorageImage(MockUnorderedAccessView),
}

/// An allocated, writable descriptor set (§3, §4.4). Writes are recorded so tests can introspect
/// which resource is currently bound at a given slot.
pub struct MockBindingGroup {
    bindings: Mutex<HashMap<u32, MockBinding>>,
}

impl BindingGroup<Mock> for MockBindingGroup {
    fn update_buffer(&self, slot: u32, buffer: &Handle<MockBuffer>) {
        self.bindings.lock().unwrap().insert(slot, MockBinding::Buffer(buffer.clone()));
    }

    fn update_image(&self, slot: u32, view: &MockShaderResourceView, sampler: &MockSampler) {
        self.bindings.lock().unwrap().insert(slot, MockBinding::Image(view.clone(), *sampler));
    }

    fn update_storage_image(&self, slot: u32, view: &MockUnorderedAccessView) {
        self.bindings.lock().unwrap().insert(slot, MockBinding::StorageImage(view.clone()));
    }
}
