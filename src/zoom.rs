//! Preview zoom: keyboard, mouse wheel and two-finger pinch
//!
//! The preview is scaled with a CSS transform. This module keeps the zoom
//! factor and transform origin and turns input events into new values; the
//! webview applies `css_transform()` and `css_transform_origin()`.

use crate::config::ZoomConfig;
use serde::{Deserialize, Serialize};

/// A touch point in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding rectangle of the preview element in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Where the scale transform is anchored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformOrigin {
    Center,
    /// Percentages of the preview element, each in 0..=100
    Percent { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy)]
struct Pinch {
    initial_distance: f64,
    initial_zoom: f64,
}

/// Snapshot of the zoom state for the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomView {
    pub zoom: f64,
    pub min: f64,
    pub max: f64,
    pub transform: String,
    pub transform_origin: String,
}

#[derive(Debug, Clone)]
pub struct ZoomState {
    current: f64,
    min: f64,
    max: f64,
    step: f64,
    origin: TransformOrigin,
    pinch: Option<Pinch>,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::new(&ZoomConfig::default())
    }
}

pub fn touch_distance(a: TouchPoint, b: TouchPoint) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Midpoint of two touches as a percentage of the preview rect, clamped to 0..=100
pub fn pinch_center(a: TouchPoint, b: TouchPoint, rect: &PreviewRect) -> (f64, f64) {
    let center_x = (a.x + b.x) / 2.0;
    let center_y = (a.y + b.y) / 2.0;

    let relative = |offset: f64, extent: f64| {
        if extent <= 0.0 {
            50.0
        } else {
            (offset / extent * 100.0).clamp(0.0, 100.0)
        }
    };

    (
        relative(center_x - rect.left, rect.width),
        relative(center_y - rect.top, rect.height),
    )
}

impl ZoomState {
    pub fn new(config: &ZoomConfig) -> Self {
        Self {
            current: 1.0_f64.clamp(config.min, config.max),
            min: config.min,
            max: config.max,
            step: config.step,
            origin: TransformOrigin::Center,
            pinch: None,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.current
    }

    pub fn limits(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn origin(&self) -> TransformOrigin {
        self.origin
    }

    pub fn zoom_in(&mut self) {
        self.current = (self.current + self.step).min(self.max);
    }

    pub fn zoom_out(&mut self) {
        self.current = (self.current - self.step).max(self.min);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.current = zoom.clamp(self.min, self.max);
        }
    }

    /// Back to 1x, centred, with any pinch forgotten
    pub fn reset(&mut self) {
        self.current = 1.0_f64.clamp(self.min, self.max);
        self.origin = TransformOrigin::Center;
        self.pinch = None;
    }

    /// `+`/`=` zoom in, `-` zooms out. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match key {
            "+" | "=" => {
                self.origin = TransformOrigin::Center;
                self.zoom_in();
                true
            }
            "-" => {
                self.origin = TransformOrigin::Center;
                self.zoom_out();
                true
            }
            _ => false,
        }
    }

    /// Wheel up (negative delta) zooms in, anything else zooms out
    pub fn handle_wheel(&mut self, delta_y: f64) {
        self.origin = TransformOrigin::Center;
        if delta_y < 0.0 {
            self.zoom_in();
        } else {
            self.zoom_out();
        }
    }

    /// Two fingers down: remember distance and zoom, anchor at the pinch centre
    pub fn pinch_start(&mut self, a: TouchPoint, b: TouchPoint, rect: &PreviewRect) {
        let distance = touch_distance(a, b);
        if distance <= f64::EPSILON {
            return;
        }
        self.pinch = Some(Pinch {
            initial_distance: distance,
            initial_zoom: self.current,
        });
        let (x, y) = pinch_center(a, b, rect);
        self.origin = TransformOrigin::Percent { x, y };
    }

    /// Fingers moved: scale relative to the gesture start
    pub fn pinch_move(&mut self, a: TouchPoint, b: TouchPoint) {
        if let Some(pinch) = self.pinch {
            let scale = touch_distance(a, b) / pinch.initial_distance;
            self.set_zoom(pinch.initial_zoom * scale);
        }
    }

    /// A finger lifted; the gesture ends once fewer than two remain
    pub fn pinch_end(&mut self, remaining_touches: usize) {
        if remaining_touches < 2 {
            self.pinch = None;
        }
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn css_transform(&self) -> String {
        format!("scale({})", self.current)
    }

    pub fn css_transform_origin(&self) -> String {
        match self.origin {
            TransformOrigin::Center => "center center".to_string(),
            TransformOrigin::Percent { x, y } => format!("{}% {}%", x, y),
        }
    }

    pub fn view(&self) -> ZoomView {
        ZoomView {
            zoom: self.current,
            min: self.min,
            max: self.max,
            transform: self.css_transform(),
            transform_origin: self.css_transform_origin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn rect() -> PreviewRect {
        PreviewRect {
            left: 0.0,
            top: 0.0,
            width: 200.0,
            height: 100.0,
        }
    }

    #[test]
    fn test_zoom_in_and_out_clamp() {
        let mut zoom = ZoomState::default();
        for _ in 0..50 {
            zoom.zoom_in();
        }
        assert!(approx(zoom.zoom(), 3.0));
        for _ in 0..50 {
            zoom.zoom_out();
        }
        assert!(approx(zoom.zoom(), 0.5));
    }

    #[test]
    fn test_keyboard_resets_origin() {
        let mut zoom = ZoomState::default();
        zoom.pinch_start(TouchPoint::new(10.0, 10.0), TouchPoint::new(30.0, 10.0), &rect());
        assert!(matches!(zoom.origin(), TransformOrigin::Percent { .. }));

        assert!(zoom.handle_key("="));
        assert_eq!(zoom.origin(), TransformOrigin::Center);
        assert!(approx(zoom.zoom(), 1.1));
        assert!(!zoom.handle_key("x"));
    }

    #[test]
    fn test_wheel_direction() {
        let mut zoom = ZoomState::default();
        zoom.handle_wheel(-120.0);
        assert!(approx(zoom.zoom(), 1.1));
        zoom.handle_wheel(120.0);
        zoom.handle_wheel(120.0);
        assert!(approx(zoom.zoom(), 0.9));
    }

    #[test]
    fn test_pinch_scales_from_start() {
        let mut zoom = ZoomState::default();
        zoom.pinch_start(TouchPoint::new(50.0, 50.0), TouchPoint::new(150.0, 50.0), &rect());
        assert_eq!(zoom.css_transform_origin(), "50% 50%");

        zoom.pinch_move(TouchPoint::new(25.0, 50.0), TouchPoint::new(175.0, 50.0));
        assert!(approx(zoom.zoom(), 1.5));

        zoom.pinch_move(TouchPoint::new(0.0, 50.0), TouchPoint::new(1000.0, 50.0));
        assert!(approx(zoom.zoom(), 3.0));

        zoom.pinch_end(1);
        assert!(!zoom.is_pinching());
        zoom.pinch_move(TouchPoint::new(0.0, 0.0), TouchPoint::new(1.0, 0.0));
        assert!(approx(zoom.zoom(), 3.0));
    }

    #[test]
    fn test_pinch_center_is_clamped() {
        let (x, y) = pinch_center(TouchPoint::new(-100.0, 500.0), TouchPoint::new(-50.0, 700.0), &rect());
        assert_eq!((x, y), (0.0, 100.0));
    }

    #[test]
    fn test_css_output() {
        let mut zoom = ZoomState::default();
        assert_eq!(zoom.css_transform(), "scale(1)");
        zoom.set_zoom(2.5);
        assert_eq!(zoom.css_transform(), "scale(2.5)");
        zoom.reset();
        assert_eq!(zoom.css_transform_origin(), "center center");
    }
}
