//! Canvas geometry: element bounds, hit-testing, marquee selection, snapping.
//!
//! All inputs are in canvas coordinates. Bounds are axis-aligned and ignore
//! rotation; [`point_in_element`] is the one rotation-aware test, so clicks
//! land on what the user sees.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::{CONTENT_MARGIN, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::doc::{DesignElement, ElementId};

/// Round `value` to the nearest multiple of `grid`. A non-positive grid
/// leaves the value unchanged.
#[must_use]
pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
    if grid > 0.0 { (value / grid).round() * grid } else { value }
}

/// Axis-aligned rectangle with inclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    #[must_use]
    pub fn of(el: &DesignElement) -> Self {
        Self { left: el.x, top: el.y, right: el.x + el.width, bottom: el.y + el.height }
    }

    /// Rectangle spanned by two corners given in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.left >= self.left && other.right <= self.right && other.top >= self.top && other.bottom <= self.bottom
    }
}

/// Whether `p` lies on the element, taking its rotation about its center
/// into account.
#[must_use]
pub fn point_in_element(p: Point, el: &DesignElement) -> bool {
    if el.rotation == 0.0 {
        return Bounds::of(el).contains_point(p);
    }
    let cx = el.x + el.width / 2.0;
    let cy = el.y + el.height / 2.0;
    let (sin, cos) = (-el.rotation.to_radians()).sin_cos();
    let dx = p.x - cx;
    let dy = p.y - cy;
    let local = Point::new(dx.mul_add(cos, -dy * sin) + cx, dx.mul_add(sin, dy * cos) + cy);
    Bounds::of(el).contains_point(local)
}

/// The topmost visible element under `p`, if any.
#[must_use]
pub fn hit_test(p: Point, elements: &[DesignElement]) -> Option<ElementId> {
    elements
        .iter()
        .rev()
        .find(|el| el.visible && point_in_element(p, el))
        .map(|el| el.id)
}

/// Visible elements lying entirely inside the rectangle spanned by `a` and
/// `b`, in paint order.
#[must_use]
pub fn elements_in_marquee(a: Point, b: Point, elements: &[DesignElement]) -> Vec<ElementId> {
    let marquee = Bounds::from_corners(a, b);
    elements
        .iter()
        .filter(|el| el.visible && marquee.contains(&Bounds::of(el)))
        .map(|el| el.id)
        .collect()
}

/// Canvas size that fits every element plus a margin, never smaller than
/// the default canvas.
#[must_use]
pub fn content_extent(elements: &[DesignElement]) -> (f64, f64) {
    let (max_x, max_y) = elements
        .iter()
        .map(Bounds::of)
        .fold((0.0_f64, 0.0_f64), |(mx, my), b| (mx.max(b.right), my.max(b.bottom)));
    (
        DEFAULT_CANVAS_WIDTH.max(max_x + CONTENT_MARGIN),
        DEFAULT_CANVAS_HEIGHT.max(max_y + CONTENT_MARGIN),
    )
}
