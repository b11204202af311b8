//! Batched 2D overlay rendering.
//!
//! Convention:
//! - Shapes are specified in virtual units (top-left origin, +Y down).
//! - Each batch carries a virtual → scene transform; the host surface applies
//!   its own scene → clip projection on top.
//! - The glyph atlas doubles as the texture for solid fills through its blank
//!   cell, so untextured shapes and text share batches.

mod batch;
mod clip;
mod ctx;
mod geometry;
mod renderer;
mod shapes;
mod surface;
mod text;
mod vertex;

pub mod backend;

pub use batch::{Batch, SubmeshBatcher};
pub use clip::{MAX_CLIP_VERTICES, VertexList, clip_polygon};
pub use ctx::{RenderCtx, RenderTarget};
pub use geometry::GeometryAccumulator;
pub use renderer::{Renderer2D, RendererConfig};
pub use surface::{DrawCall, FrameStats, Material, RenderSurface, TextureId};
pub use text::{HorizontalAlign, Overflow, TextFormat, VerticalAlign};
pub use vertex::Vertex;
