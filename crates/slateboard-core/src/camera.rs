//! View transform between client (screen) and canvas coordinates.

use crate::elements::Frame;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Per-page camera.
///
/// A client point maps to the canvas as `(client - translate) / zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Pan offset in client pixels.
    pub translate: Vec2,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas to client transform, for renderers.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.zoom)
    }

    /// Client to canvas transform, for input.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.translate)
    }

    pub fn client_to_canvas(&self, client: Point) -> Point {
        self.inverse_transform() * client
    }

    pub fn canvas_to_client(&self, canvas: Point) -> Point {
        self.transform() * canvas
    }

    /// Convert a length in client pixels to canvas units.
    pub fn client_distance(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.translate += delta;
    }

    /// Zoom by `factor`, keeping the canvas point under `client` in place.
    pub fn zoom_at(&mut self, client: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.client_to_canvas(client);
        self.zoom = new_zoom;
        let drifted = self.canvas_to_client(anchor);
        self.translate += client - drifted;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fit `bounds` inside a viewport of `viewport` pixels with `padding` on each side.
    pub fn fit_to_bounds(&mut self, bounds: Frame, viewport: Size, padding: f64) {
        let rect = bounds.rect();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            self.reset();
            return;
        }
        let available = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        self.zoom = (available.width / rect.width())
            .min(available.height / rect.height())
            .clamp(MIN_ZOOM, MAX_ZOOM);
        let center = rect.center();
        self.translate = Vec2::new(
            viewport.width / 2.0 - center.x * self.zoom,
            viewport.height / 2.0 - center.y * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_to_canvas() {
        let camera = Camera {
            translate: Vec2::new(50.0, 100.0),
            zoom: 2.0,
        };
        let canvas = camera.client_to_canvas(Point::new(150.0, 300.0));
        assert!((canvas.x - 50.0).abs() < f64::EPSILON);
        assert!((canvas.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let camera = Camera {
            translate: Vec2::new(30.0, -20.0),
            zoom: 1.5,
        };
        let original = Point::new(123.0, 456.0);
        let back = camera.canvas_to_client(camera.client_to_canvas(original));
        assert!((back - original).hypot() < 1e-10);
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut camera = Camera::new();
        let client = Point::new(200.0, 100.0);
        let before = camera.client_to_canvas(client);
        camera.zoom_at(client, 2.0);
        let after = camera.client_to_canvas(client);
        assert!((before - after).hypot() < 1e-9);
        assert!((camera.zoom - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);
        camera.zoom_at(Point::ZERO, 1e6);
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_to_bounds_centers() {
        let mut camera = Camera::new();
        camera.fit_to_bounds(Frame::new(0.0, 0.0, 100.0, 50.0), Size::new(400.0, 400.0), 0.0);
        assert!((camera.zoom - 4.0).abs() < f64::EPSILON);
        let center = camera.canvas_to_client(Point::new(50.0, 25.0));
        assert!((center - Point::new(200.0, 200.0)).hypot() < 1e-9);
    }
}
