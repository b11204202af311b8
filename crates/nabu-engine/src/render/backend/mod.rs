//! wgpu host surface.
//!
//! Vertices arrive in virtual units; the vertex shader applies the batch
//! transform followed by the scene projection. Colors are straight alpha and
//! premultiplied in the fragment stage.

mod common;
mod overlay;

pub use overlay::{WgpuFrame, WgpuOverlay};
