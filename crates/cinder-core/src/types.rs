//! Spatial and common types

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen space (origin top-left, y down)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of size `extent` centered on `center`
    pub fn from_center(center: Vec2, extent: Vec2) -> Self {
        Self {
            x: center.x - extent.x * 0.5,
            y: center.y - extent.y * 0.5,
            w: extent.x,
            h: extent.y,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Overlap test with open edges: rectangles that only touch do not intersect.
    /// A zero-sized rect still intersects when it lies strictly inside.
    pub fn intersects(&self, other: &Rect) -> bool {
        let w = self.w.max(f32::MIN_POSITIVE);
        let h = self.h.max(f32::MIN_POSITIVE);
        self.x < other.right() && self.x + w > other.left() && self.y < other.bottom() && self.y + h > other.top()
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }
}

/// Unit vector (scaled by `magnitude`) pointing at `angle_deg`, measured
/// counter-clockwise from +x on a y-down screen.
pub fn vec_from_angle(angle_deg: f32, magnitude: f32) -> Vec2 {
    let r = angle_deg.to_radians();
    Vec2::new(r.cos(), -r.sin()) * magnitude
}

/// Rotate `v` by `deg` degrees using the standard (x cos - y sin, x sin + y cos) form
pub fn rotate_deg(v: Vec2, deg: f32) -> Vec2 {
    let (s, c) = deg.to_radians().sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

/// Linear interpolation between two floats
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
