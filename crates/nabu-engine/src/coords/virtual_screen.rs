use cgmath::{Matrix4, Vector3, Vector4};

use super::Vec2;

/// Reference width used when the surface is narrower than 16:9.
pub const DEFAULT_REFERENCE_WIDTH: f32 = 1136.0;
/// Reference height used when the surface is 16:9 or wider.
pub const DEFAULT_REFERENCE_HEIGHT: f32 = 640.0;

const WIDE_ASPECT: f32 = 16.0 / 9.0;

/// What the host surface reports about itself.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceMetrics {
    /// Drawable width in device pixels.
    pub width_px: u32,
    /// Drawable height in device pixels.
    pub height_px: u32,
    /// Half of the vertical extent of scene space (orthographic half-height).
    pub half_height: f32,
}

impl SurfaceMetrics {
    #[inline]
    pub const fn new(width_px: u32, height_px: u32, half_height: f32) -> Self {
        Self { width_px, height_px, half_height }
    }

    #[inline]
    pub fn aspect(self) -> f32 {
        self.width_px.max(1) as f32 / self.height_px.max(1) as f32
    }
}

/// The reference dimension held constant; the other one follows the surface aspect.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FixedAxis {
    Width,
    Height,
}

/// Maps the virtual reference resolution to scene space and back.
///
/// Wide surfaces (aspect ≥ 16:9) keep the reference height, narrower ones keep
/// the reference width, so authored content stays on screen either way.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    surface: SurfaceMetrics,
    fixed: FixedAxis,
    reference_width: f32,
    reference_height: f32,
    scale_factor: f32,
    half_width: f32,
    transform: Matrix4<f32>,
}

impl CoordinateSystem {
    /// Derives the coordinate system with the default reference resolution.
    pub fn new(surface: SurfaceMetrics) -> Self {
        Self::with_reference(surface, DEFAULT_REFERENCE_WIDTH, DEFAULT_REFERENCE_HEIGHT)
    }

    /// Derives the coordinate system, fixing `reference_height` on wide surfaces
    /// and `reference_width` otherwise.
    pub fn with_reference(surface: SurfaceMetrics, reference_width: f32, reference_height: f32) -> Self {
        let mut cs = Self {
            surface,
            fixed: FixedAxis::Height,
            reference_width,
            reference_height,
            scale_factor: 1.0,
            half_width: 0.0,
            transform: Matrix4::from_scale(1.0),
        };

        if surface.aspect() >= WIDE_ASPECT {
            cs.set_reference_height(reference_height);
        } else {
            cs.set_reference_width(reference_width);
        }
        cs
    }

    /// Fixes the reference height; width follows the surface aspect.
    pub fn set_reference_height(&mut self, height: f32) {
        let w_px = self.surface.width_px.max(1) as f32;
        let h_px = self.surface.height_px.max(1) as f32;

        self.fixed = FixedAxis::Height;
        self.reference_height = height;
        self.reference_width = height * w_px / h_px;
        self.scale_factor = height / h_px;
        self.rebuild_transform();
    }

    /// Fixes the reference width; height follows the surface aspect.
    pub fn set_reference_width(&mut self, width: f32) {
        let w_px = self.surface.width_px.max(1) as f32;
        let h_px = self.surface.height_px.max(1) as f32;

        self.fixed = FixedAxis::Width;
        self.reference_width = width;
        self.reference_height = width * h_px / w_px;
        self.scale_factor = width / w_px;
        self.rebuild_transform();
    }

    /// Re-derives for a resized surface, keeping the fixed axis and its value.
    pub fn set_surface(&mut self, surface: SurfaceMetrics) {
        self.surface = surface;
        match self.fixed {
            FixedAxis::Height => self.set_reference_height(self.reference_height),
            FixedAxis::Width => self.set_reference_width(self.reference_width),
        }
    }

    fn rebuild_transform(&mut self) {
        let half_height = self.surface.half_height;
        self.half_width = half_height * self.reference_width / self.reference_height;

        let k = 2.0 * half_height / self.reference_height;
        self.transform = Matrix4::from_translation(Vector3::new(-self.half_width, half_height, 0.0))
            * Matrix4::from_nonuniform_scale(k, -k, 1.0);

        log::debug!(
            "coordinate system: {:?} fixed, reference {}x{}, scale {}",
            self.fixed,
            self.reference_width,
            self.reference_height,
            self.scale_factor
        );
    }

    #[inline]
    pub fn reference_width(&self) -> f32 {
        self.reference_width
    }

    #[inline]
    pub fn reference_height(&self) -> f32 {
        self.reference_height
    }

    /// Virtual units per device pixel along the fixed axis.
    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    #[inline]
    pub fn fixed_axis(&self) -> FixedAxis {
        self.fixed
    }

    /// Virtual → scene transform (translation, then scale with Y flipped).
    #[inline]
    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    /// Scene → clip-space orthographic projection for host surfaces.
    pub fn projection(&self) -> Matrix4<f32> {
        let hh = self.surface.half_height;
        cgmath::ortho(-self.half_width, self.half_width, -hh, hh, -1.0, 1.0)
    }

    /// Applies [`transform`](Self::transform) to a virtual-space point.
    pub fn to_scene(&self, p: Vec2) -> Vec2 {
        let v = self.transform * Vector4::new(p.x, p.y, 0.0, 1.0);
        Vec2::new(v.x, v.y)
    }

    /// Maps a device pointer position (pixels, +Y up) into virtual space.
    #[inline]
    pub fn to_virtual(&self, pointer_px: Vec2) -> Vec2 {
        Vec2::new(
            pointer_px.x * self.scale_factor,
            self.reference_height - pointer_px.y * self.scale_factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn exact_16_9_fixes_height() {
        let cs = CoordinateSystem::new(SurfaceMetrics::new(1920, 1080, 5.0));
        assert_eq!(cs.fixed_axis(), FixedAxis::Height);
        assert_eq!(cs.reference_height(), 640.0);
        assert!(approx(cs.reference_width(), 640.0 * 1920.0 / 1080.0));
        assert!(approx(cs.scale_factor(), 640.0 / 1080.0));
    }

    #[test]
    fn ultra_wide_fixes_height() {
        let cs = CoordinateSystem::new(SurfaceMetrics::new(3440, 1440, 5.0));
        assert_eq!(cs.fixed_axis(), FixedAxis::Height);
        assert_eq!(cs.reference_height(), 640.0);
    }

    #[test]
    fn narrow_fixes_width() {
        let cs = CoordinateSystem::new(SurfaceMetrics::new(1024, 768, 5.0));
        assert_eq!(cs.fixed_axis(), FixedAxis::Width);
        assert_eq!(cs.reference_width(), 1136.0);
        assert!(approx(cs.reference_height(), 852.0));
        assert!(approx(cs.scale_factor(), 1.109375));
    }

    #[test]
    fn pointer_maps_with_y_flip() {
        let cs = CoordinateSystem::new(SurfaceMetrics::new(1024, 768, 5.0));

        let bottom_left = cs.to_virtual(Vec2::new(0.0, 0.0));
        assert!(approx(bottom_left.x, 0.0));
        assert!(approx(bottom_left.y, cs.reference_height()));

        let top_right = cs.to_virtual(Vec2::new(1024.0, 768.0));
        assert!(approx(top_right.x, cs.reference_width()));
        assert!(approx(top_right.y, 0.0));
    }

    #[test]
    fn forward_transform_maps_corners_to_scene_extents() {
        let cs = CoordinateSystem::new(SurfaceMetrics::new(1920, 1080, 5.0));
        let half_w = 5.0 * cs.reference_width() / cs.reference_height();

        let tl = cs.to_scene(Vec2::new(0.0, 0.0));
        assert!(approx(tl.x, -half_w));
        assert!(approx(tl.y, 5.0));

        let br = cs.to_scene(Vec2::new(cs.reference_width(), cs.reference_height()));
        assert!(approx(br.x, half_w));
        assert!(approx(br.y, -5.0));
    }

    #[test]
    fn set_surface_keeps_fixed_axis() {
        let mut cs = CoordinateSystem::new(SurfaceMetrics::new(1024, 768, 5.0));
        cs.set_surface(SurfaceMetrics::new(800, 800, 5.0));
        assert_eq!(cs.fixed_axis(), FixedAxis::Width);
        assert_eq!(cs.reference_width(), 1136.0);
        assert!(approx(cs.reference_height(), 1136.0));
    }

    #[test]
    fn explicit_reference_height_overrides_axis() {
        let mut cs = CoordinateSystem::new(SurfaceMetrics::new(1024, 768, 5.0));
        cs.set_reference_height(480.0);
        assert_eq!(cs.fixed_axis(), FixedAxis::Height);
        assert!(approx(cs.reference_width(), 640.0));
        assert!(approx(cs.scale_factor(), 0.625));
    }
}
