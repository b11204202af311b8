//! Glyph supply for text rendering.
//!
//! The renderer only talks to [`GlyphSource`]; [`FontAtlas`] is the fontdue
//! implementation whose pixels a host backend uploads as the glyph texture.

mod font_atlas;
mod glyph;

#[cfg(test)]
pub(crate) use glyph::testing;

pub use font_atlas::{AtlasConfig, FontAtlas, FontLoadError};
pub use glyph::{BLANK_GLYPH, FontStyle, GlyphInfo, GlyphSource};
