//! Camera module for pan/zoom transforms between image and screen space.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Camera manages the view transform for the image being annotated.
///
/// The image is drawn centered in the viewport, scaled by `scale` and shifted
/// by `offset` (screen pixels). Image space is the pixel grid of the image,
/// with the origin at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels
    pub offset: Vec2,
    /// Current zoom level (1.0 = one image pixel per screen pixel)
    pub scale: f64,
    /// Minimum allowed zoom level
    pub min_scale: f64,
    /// Maximum allowed zoom level
    pub max_scale: f64,
    /// Size of the drawing surface
    pub viewport: Size,
    /// Size of the image, zero until one is loaded
    pub image: Size,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: 0.1,
            max_scale: 5.0,
            viewport: Size::ZERO,
            image: Size::ZERO,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with a custom scale range.
    pub fn with_scale_range(min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    /// Screen position of the image's top-left corner.
    pub fn image_origin(&self) -> Point {
        Point::new(
            (self.viewport.width - self.image.width * self.scale) / 2.0 + self.offset.x,
            (self.viewport.height - self.image.height * self.scale) / 2.0 + self.offset.y,
        )
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts image coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.image_origin().to_vec2()) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to image coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.image_origin().to_vec2())
    }

    /// Convert a screen point to image coordinates.
    pub fn screen_to_image(&self, screen_point: Point) -> Point {
        let origin = self.image_origin();
        Point::new(
            (screen_point.x - origin.x) / self.scale,
            (screen_point.y - origin.y) / self.scale,
        )
    }

    /// Convert an image point to screen coordinates.
    pub fn image_to_screen(&self, image_point: Point) -> Point {
        self.image_origin() + image_point.to_vec2() * self.scale
    }

    /// Convert a screen-space displacement to image space.
    pub fn screen_delta_to_image(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    ///
    /// Returns `false` if the clamped scale did not change.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }

        let image_point = self.screen_to_image(screen_point);
        self.scale = new_scale;

        // Adjust offset so image_point stays at screen_point
        let new_screen = self.image_to_screen(image_point);
        self.offset += screen_point - new_screen;
        true
    }

    /// Zoom around the center of the viewport.
    pub fn zoom_centered(&mut self, factor: f64) -> bool {
        let center = Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
        self.zoom_at(center, factor)
    }

    /// Fit the image into the viewport without upscaling, and clear the pan.
    pub fn reset_to_fit(&mut self) {
        self.offset = Vec2::ZERO;
        let scale = if self.image.width > 0.0 && self.image.height > 0.0 {
            (self.viewport.width / self.image.width)
                .min(self.viewport.height / self.image.height)
                .min(1.0)
        } else {
            1.0
        };
        self.scale = if scale > 0.0 {
            scale.clamp(self.min_scale, self.max_scale)
        } else {
            self.min_scale
        };
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn set_image_size(&mut self, image: Size) {
        self.image = image;
    }

    /// Zoom level as a whole percentage, for display.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut camera = Camera::new();
        camera.set_viewport(Size::new(1000.0, 800.0));
        camera.set_image_size(Size::new(800.0, 600.0));
        camera
    }

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9, "{a:?} != {b:?}");
        assert!((a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_image_is_centered() {
        let camera = camera();
        assert_close(camera.image_to_screen(Point::ZERO), Point::new(100.0, 100.0));
        assert_close(camera.screen_to_image(Point::new(500.0, 400.0)), Point::new(400.0, 300.0));
    }

    #[test]
    fn test_round_trip_with_scale_and_pan() {
        let mut camera = camera();
        for (scale, offset) in [(0.1, Vec2::new(-40.0, 12.0)), (2.5, Vec2::new(300.0, -75.5)), (5.0, Vec2::ZERO)] {
            camera.scale = scale;
            camera.offset = offset;
            for p in [Point::ZERO, Point::new(123.4, 567.8), Point::new(800.0, 600.0)] {
                assert_close(camera.screen_to_image(camera.image_to_screen(p)), p);
            }
        }
    }

    #[test]
    fn test_affine_matches_point_conversion() {
        let mut camera = camera();
        camera.scale = 1.7;
        camera.offset = Vec2::new(15.0, -30.0);
        let p = Point::new(220.0, 310.0);
        assert_close(camera.transform() * p, camera.image_to_screen(p));
        let s = Point::new(640.0, 200.0);
        assert_close(camera.inverse_transform() * s, camera.screen_to_image(s));
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut camera = camera();
        let cursor = Point::new(250.0, 610.0);
        let before = camera.screen_to_image(cursor);
        assert!(camera.zoom_at(cursor, 1.1));
        assert!((camera.scale - 1.1).abs() < 1e-12);
        assert_close(camera.screen_to_image(cursor), before);
        assert_close(camera.image_to_screen(before), cursor);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = camera();
        camera.scale = 5.0;
        let offset = camera.offset;
        assert!(!camera.zoom_at(Point::new(10.0, 10.0), 1.1));
        assert_eq!(camera.offset, offset);
        camera.scale = 0.11;
        assert!(camera.zoom_at(Point::new(10.0, 10.0), 0.5));
        assert!((camera.scale - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan_and_delta() {
        let mut camera = camera();
        camera.scale = 2.0;
        camera.pan(Vec2::new(10.0, -4.0));
        assert_eq!(camera.offset, Vec2::new(10.0, -4.0));
        assert_eq!(camera.screen_delta_to_image(Vec2::new(10.0, -4.0)), Vec2::new(5.0, -2.0));
    }

    #[test]
    fn test_reset_to_fit() {
        let mut camera = camera();
        camera.set_image_size(Size::new(2000.0, 1000.0));
        camera.offset = Vec2::new(50.0, 50.0);
        camera.reset_to_fit();
        assert!((camera.scale - 0.5).abs() < f64::EPSILON);
        assert_eq!(camera.offset, Vec2::ZERO);

        // Small images are not upscaled
        camera.set_image_size(Size::new(100.0, 100.0));
        camera.reset_to_fit();
        assert!((camera.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_sized_image_is_finite() {
        let mut camera = Camera::new();
        camera.set_viewport(Size::new(400.0, 300.0));
        camera.reset_to_fit();
        let p = camera.screen_to_image(Point::new(200.0, 150.0));
        assert!(p.x.is_finite() && p.y.is_finite());
        assert_eq!(camera.zoom_percent(), 100);
    }
}
