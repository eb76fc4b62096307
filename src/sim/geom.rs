//! Axis-aligned rectangles and line segments
//!
//! Everything in the world is a rectangle except lasers, which are segments.
//! All functions here are pure.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
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

    /// Rectangle at `pos` with the given size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap: rectangles sharing only an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Point containment, inclusive on all four edges
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// The four edges as segments (top, right, bottom, left)
    pub fn edges(&self) -> [Segment; 4] {
        let tl = Vec2::new(self.x, self.y);
        let tr = Vec2::new(self.right(), self.y);
        let br = Vec2::new(self.right(), self.bottom());
        let bl = Vec2::new(self.x, self.bottom());
        [
            Segment::new(tl, tr),
            Segment::new(tr, br),
            Segment::new(br, bl),
            Segment::new(bl, tl),
        ]
    }
}

/// A line segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub const fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    /// Parametric intersection test.
    ///
    /// Parallel segments never intersect, collinear overlapping ones
    /// included.
    pub fn intersects(&self, other: &Segment) -> bool {
        let d1 = self.b - self.a;
        let d2 = other.b - other.a;
        let denom = d1.perp_dot(d2);
        if denom == 0.0 {
            return false;
        }

        let offset = other.a - self.a;
        let t = offset.perp_dot(d2) / denom;
        let u = offset.perp_dot(d1) / denom;
        (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
    }

    /// True if either endpoint lies in `rect` or the segment crosses an edge
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        if rect.contains_point(self.a) || rect.contains_point(self.b) {
            return true;
        }
        rect.edges().iter().any(|edge| self.intersects(edge))
    }
}
