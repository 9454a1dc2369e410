//! A thin, API-agnostic Render Hardware Interface (RHI).
//!
//! This crate abstracts over explicit GPU APIs the way Vulkan and Metal expose them: devices,
//! queues, command buffers, encoders, pipelines, resources and synchronization primitives are
//! all modeled as capability traits in [`rhi`], and [`rhi::vulkan`] implements those contracts
//! for Vulkan via `ash`.
//!
//! Shader compilation, window-system integration and application scaffolding are external
//! collaborators: this crate only consumes a [`shader::ShaderBundle`] and a [`surface::Surface`]
//! handle, it does not produce them.
#![deny(nonstandard_style)]
#![deny(future_incompatible)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs)]
#![warn(unused)]

pub mod config;
pub mod error;
pub mod rhi;
pub mod shader;
pub mod surface;
