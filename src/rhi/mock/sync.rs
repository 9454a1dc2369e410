//! CPU-observable fences and opaque semaphores (§3, §4.7, §4.9).
//!
//! Grounded on `vulkan_sync.rs`'s thin fence/semaphore wrappers; this back-end executes every
//! submission synchronously inside `commit`, so a fence is signaled directly by the command
//! buffer that named it rather than by a native queue completing asynchronously.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, RhiError};
use crate::rhi::traits::Fence;

/// A CPU-observable synchronization primitive, created unsignaled (§3, §4.9).
pub struct MockFence {
    signaled: AtomicBool,
}

impl MockFence {
    pub(crate) fn new() -> MockFence {
        MockFence { signaled: AtomicBool::new(false) }
    }

    /// Marks this fence signaled; called once `MockCommandBuffer::commit`'s submission has
    /// completed, which on this back-end is immediate.
    pub(crate) fn signal(&self) {
        self.signaled.store(true, Ordering::Release);
    }
}

impl Fence for MockFence {
    fn wait_for(&self, _timeout_ns: u64) -> Result<()> {
        if self.signaled.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(RhiError::Timeout)
        }
    }

    fn reset(&self) -> Result<()> {
        self.signaled.store(false, Ordering::Release);
        Ok(())
    }

    fn is_signaled(&self) -> Result<bool> {
        Ok(self.signaled.load(Ordering::Acquire))
    }
}

/// An opaque GPU-to-GPU semaphore (§3, §4.8). This back-end never schedules an asynchronous
/// submission, so a semaphore carries no state of its own.
pub struct MockSemaphore;
