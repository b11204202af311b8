//! Coordinate and geometry types shared by the renderer and its hosts.
//!
//! Virtual space (what callers draw in):
//! - reference units, independent of device pixels
//! - origin top-left
//! - +X right, +Y down
//!
//! Scene space (what host surfaces project) is centered, +Y up. The mapping
//! between the two lives in [`CoordinateSystem`].

mod color;
mod rect;
mod vec2;
mod virtual_screen;

pub use color::Color32;
pub use rect::Rect;
pub use vec2::Vec2;
pub use virtual_screen::{
    CoordinateSystem, DEFAULT_REFERENCE_HEIGHT, DEFAULT_REFERENCE_WIDTH, FixedAxis, SurfaceMetrics,
};
