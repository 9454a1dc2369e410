//! The Render Hardware Interface: back-end-agnostic contracts plus concrete back-ends.

pub mod cache;
pub mod enums;
pub mod structs;
pub mod traits;

pub mod mock;
pub mod vulkan;

pub use enums::*;
pub use structs::*;
pub use traits::*;

/// A [`GpuResource`] is either a buffer or a texture (§3, §9 Design Note: deep inheritance →
/// tagged variant). Back-ends return concrete `Buffer`/`Texture` handles directly from `Device`;
/// this variant exists for call sites (state-transition dispatch, debug logging) that need to
/// treat either kind uniformly without a trait object.
pub enum GpuResourceRef<'a, Buf, Tex> {
    /// A buffer resource.
    Buffer(&'a Buf),
    /// A texture resource.
    Texture(&'a Tex),
}
