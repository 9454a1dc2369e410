//! Crate-wide RHI error type.
//!
//! The original interface this crate models exposes several small, overlapping error enums
//! (`DeviceCreationError`, `MemoryError`, `QueueGettingError`, `AllocationError`, ...). Rather
//! than carry that duplication forward, every fallible call in the public surface returns
//! [`RhiError`]: one logical set of error kinds, as called for by the abstract error kinds in
//! the interface contract this crate implements.

use failure::Fail;

/// Errors returned by RHI construction, recording and submission calls.
///
/// Propagation policy: construction failures are returned to the caller; recording errors are
/// fatal for the command buffer that recorded them but recoverable for the program (see
/// [`crate::rhi::command_buffer`]); submit errors are returned from `commit`; [`RhiError::OutOfDate`]
/// is a recoverable signal meaning the caller should call `resize` on the swapchain.
#[derive(Fail, Debug, Clone, Eq, PartialEq)]
pub enum RhiError {
    /// No adapter, no compatible memory type, or no supported format was found.
    #[fail(display = "not found: {}", reason)]
    NotFound {
        /// What could not be found.
        reason: String,
    },

    /// A descriptor passed to a creation call was malformed.
    #[fail(display = "invalid argument: {}", reason)]
    InvalidArgument {
        /// What was invalid about the argument.
        reason: String,
    },

    /// The device or host ran out of memory, or a descriptor pool is full.
    #[fail(display = "resource exhausted: {}", reason)]
    ResourceExhausted {
        /// Which resource was exhausted.
        reason: String,
    },

    /// The driver signalled device loss during submit or present.
    #[fail(display = "device lost")]
    DeviceLost,

    /// The requested feature is missing on the selected adapter.
    #[fail(display = "unsupported: {}", reason)]
    Unsupported {
        /// The missing feature or capability.
        reason: String,
    },

    /// The swapchain is incompatible with its surface; the caller should call `resize`.
    #[fail(display = "swapchain out of date")]
    OutOfDate,

    /// A fence wait expired before the fence was signalled.
    #[fail(display = "timeout")]
    Timeout,
}

impl RhiError {
    /// Shorthand for [`RhiError::NotFound`].
    pub fn not_found(reason: impl Into<String>) -> Self {
        RhiError::NotFound { reason: reason.into() }
    }

    /// Shorthand for [`RhiError::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        RhiError::InvalidArgument { reason: reason.into() }
    }

    /// Shorthand for [`RhiError::ResourceExhausted`].
    pub fn resource_exhausted(reason: impl Into<String>) -> Self {
        RhiError::ResourceExhausted { reason: reason.into() }
    }

    /// Shorthand for [`RhiError::Unsupported`].
    pub fn unsupported(reason: impl Into<String>) -> Self {
        RhiError::Unsupported { reason: reason.into() }
    }
}

/// Convenience alias used throughout the RHI's fallible call sites.
pub type Result<T> = std::result::Result<T, RhiError>;
