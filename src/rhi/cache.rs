//! Dual-reference-counted handles and content-hash keys for the device-owned caches (§3, §4.6,
//! §9 Design Notes "Dual reference counting" and "Global mutable state").
//!
//! The original interface counts `IRefCounted` references itself; this crate replaces that with
//! `Arc`/`Weak`, upgraded from the teacher's single-threaded `Rc` because RHI resources must be
//! `Send + Sync` (§5).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use crate::rhi::structs::{AttachmentDesc, RenderPassDesc};

/// A strongly-owned, externally-held reference to an RHI object.
///
/// Every public creation call returns a `Handle<T>`. Internally, device caches (the render-pass
/// and framebuffer caches, §4.6) hold a [`WeakHandle<T>`] instead, so that the last external
/// `Handle` drop releases the native resource even while a cache entry still technically exists —
/// the cache entry is pruned lazily the next time it is looked up.
pub type Handle<T> = Arc<T>;

/// A non-owning back-reference into a device cache; upgrades to a [`Handle<T>`] only while the
/// pointee is still externally referenced.
pub type WeakHandle<T> = Weak<T>;

/// Hashes a render-pass descriptor's (format, load-op, store-op) tuples, excluding clear values,
/// so that two `RenderPassDesc`s differing only in clear values hit the same cache entry (§4.6).
pub fn hash_render_pass_desc(desc: &RenderPassDesc) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_attachment_list(&desc.color_attachments, &mut hasher);
    desc.depth_stencil_attachment.hash(&mut hasher);
    hasher.finish()
}

fn hash_attachment_list(attachments: &[AttachmentDesc], hasher: &mut DefaultHasher) {
    attachments.len().hash(hasher);
    for attachment in attachments {
        attachment.hash(hasher);
    }
}

/// Hashes the concrete set of attachment identities (view addresses) plus the owning render
/// pass's identity and the framebuffer's dimensions, as used to key the framebuffer cache (§4.6).
///
/// `view_identities` must be stable addresses (e.g. `Arc::as_ptr` cast to `usize`) for the
/// lifetime of the cache entry; the caller is responsible for evicting entries whose views have
/// since been destroyed (swapchain resize does this by dropping the whole cache).
pub fn hash_framebuffer_key(render_pass_identity: usize, view_identities: &[usize], width: u32, height: u32) -> u64 {
    let mut hasher = DefaultHasher::new();
    render_pass_identity.hash(&mut hasher);
    view_identities.hash(&mut hasher);
    width.hash(&mut hasher);
    height.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::structs::{AttachmentDesc, LoadOp, RenderPassDesc, StoreOp};
    use crate::rhi::enums::PixelFormat;

    fn desc_with_clear(clear: bool) -> RenderPassDesc {
        RenderPassDesc {
            color_attachments: vec![AttachmentDesc {
                format: PixelFormat::Rgba8Unorm,
                load_op: if clear { LoadOp::Clear } else { LoadOp::Load },
                store_op: StoreOp::Store,
            }],
            depth_stencil_attachment: None,
        }
    }

    #[test]
    fn identical_format_load_store_hashes_equal() {
        let a = desc_with_clear(true);
        let b = desc_with_clear(true);
        assert_eq!(hash_render_pass_desc(&a), hash_render_pass_desc(&b));
    }

    #[test]
    fn differing_load_op_hashes_differ() {
        let a = desc_with_clear(true);
        let b = desc_with_clear(false);
        assert_ne!(hash_render_pass_desc(&a), hash_render_pass_desc(&b));
    }

    #[test]
    fn framebuffer_key_sensitive_to_dimensions() {
        let views = [1usize, 2usize];
        let a = hash_framebuffer_key(42, &views, 800, 600);
        let b = hash_framebuffer_key(42, &views, 1024, 768);
        assert_ne!(a, b);
    }
}
