/// 8-bit straight-alpha RGBA color, the per-vertex color format.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    pub const WHITE: Color32 = Color32::new(255, 255, 255, 255);
    pub const BLACK: Color32 = Color32::new(0, 0, 0, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Linear per-channel interpolation, rounded to the nearest byte.
    ///
    /// `t` is clamped to `[0, 1]` so the result always stays representable.
    #[inline]
    pub fn lerp(self, other: Color32, t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| -> u8 {
            let v = a as f32 + (b as f32 - a as f32) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Color32::new(
            ch(self.r, other.r),
            ch(self.g, other.g),
            ch(self.b, other.b),
            ch(self.a, other.a),
        )
    }

    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color32 {
    #[inline]
    fn from(c: [u8; 4]) -> Self {
        Color32::new(c[0], c[1], c[2], c[3])
    }
}
