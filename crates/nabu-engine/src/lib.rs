//! Nabu engine crate.
//!
//! A batching 2D renderer for debug overlays: rectangles, triangles, lines,
//! borders and bitmap-font text in a virtual reference resolution, clipped by
//! an optional rectangular mask and flushed once per frame to a host surface.

pub mod coords;
pub mod logging;
pub mod render;
pub mod text;
