//! View transform for the design preview.
//!
//! `pan_x` / `pan_y` are the screen position (CSS pixels) of the canvas
//! origin; `zoom` is the scale factor, clamped to `ZOOM_MIN..=ZOOM_MAX`.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point (CSS pixels) to canvas coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a canvas point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x.mul_add(self.zoom, self.pan_x),
            y: world.y.mul_add(self.zoom, self.pan_y),
        }
    }

    /// Set the zoom, clamped, keeping the canvas point under `anchor`
    /// (a screen point) fixed on screen.
    pub fn zoom_to(&mut self, zoom: f64, anchor: Point) {
        let before = self.screen_to_world(anchor);
        self.zoom = if zoom.is_finite() { zoom.clamp(ZOOM_MIN, ZOOM_MAX) } else { 1.0 };
        self.pan_x = anchor.x - before.x * self.zoom;
        self.pan_y = anchor.y - before.y * self.zoom;
    }

    pub fn zoom_in(&mut self, anchor: Point) {
        self.zoom_to(self.zoom * ZOOM_STEP, anchor);
    }

    pub fn zoom_out(&mut self, anchor: Point) {
        self.zoom_to(self.zoom / ZOOM_STEP, anchor);
    }

    /// Back to 100% with the canvas origin at the screen origin.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
